//! Common types and utilities for the typeshape type resolution engine.
//!
//! This crate provides foundational types shared by the resolver and the CLI:
//! - Line/column source positions (`Position`, `Span`)
//! - Resolution limits and thresholds
//! - Workspace root discovery and project-relative paths

// Position/Span types for line/column source locations
pub mod position;
pub use position::{Position, Span};

// Centralized limits and thresholds
pub mod limits;

// Workspace root discovery and project-relative file paths
pub mod root;
pub use root::{RootError, VENDOR_DIRECTORY, find_workspace_root, is_vendor_path, relative_to_root};
