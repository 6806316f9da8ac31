//! Diagnostic logging for the `typeshape` binary.
//!
//! Logging is off unless `TYPESHAPE_LOG` (or `RUST_LOG`) holds a filter.
//! `TYPESHAPE_LOG_FORMAT` picks the layout: `text`, `tree` or `json`.
//!
//! ```bash
//! # Watch the reference policy decide for one export
//! TYPESHAPE_LOG=typeshape_resolver::reference=debug TYPESHAPE_LOG_FORMAT=tree \
//!     typeshape program.json -e Button
//! ```
//!
//! Everything is written to stderr; stdout carries the resolved JSON.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

const FILTER_VAR: &str = "TYPESHAPE_LOG";
const FORMAT_VAR: &str = "TYPESHAPE_LOG_FORMAT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    /// Indented spans via `tracing-tree`; one export's nested expansions
    /// read top to bottom.
    Tree,
    Json,
}

impl LogFormat {
    /// Unrecognised values fall back to [`LogFormat::Text`].
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.eq_ignore_ascii_case("tree") {
            Self::Tree
        } else if value.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// `TYPESHAPE_LOG` first, then `RUST_LOG`; `None` when neither is set.
fn env_filter() -> Option<EnvFilter> {
    match std::env::var(FILTER_VAR) {
        Ok(directives) => Some(EnvFilter::builder().parse_lossy(directives)),
        Err(_) if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() => {
            Some(EnvFilter::from_default_env())
        }
        Err(_) => None,
    }
}

pub fn init_tracing() {
    let Some(filter) = env_filter() else {
        return;
    };
    let format = std::env::var(FORMAT_VAR)
        .map(|value| LogFormat::parse(&value))
        .unwrap_or_default();

    let registry = Registry::default().with(filter);
    match format {
        LogFormat::Tree => registry
            .with(
                tracing_tree::HierarchicalLayer::new(2)
                    .with_indent_lines(true)
                    .with_deferred_spans(true)
                    .with_targets(true),
            )
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}
