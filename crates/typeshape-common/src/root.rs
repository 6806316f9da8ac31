//! Workspace root discovery and project-relative file paths.
//!
//! Declaration locations are reported relative to the root of the workspace
//! being documented. The root is the nearest ancestor that declares a
//! monorepo (`pnpm-workspace.yaml`, or a `package.json` with a `workspaces`
//! field); failing that, the outermost directory containing a `package.json`.
//!
//! Lookups are memoized per start directory in a process-wide concurrent map,
//! so parallel resolution workers share the answer.

use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, trace};

use crate::limits::MAX_ROOT_SEARCH_DEPTH;

/// Directory name that marks vendor (dependency) code.
pub const VENDOR_DIRECTORY: &str = "node_modules";

static ROOT_CACHE: OnceLock<DashMap<PathBuf, PathBuf>> = OnceLock::new();

fn root_cache() -> &'static DashMap<PathBuf, PathBuf> {
    ROOT_CACHE.get_or_init(DashMap::new)
}

/// Failure to determine a workspace root.
#[derive(Debug)]
pub enum RootError {
    /// No `pnpm-workspace.yaml` or `package.json` exists above the start directory.
    NotFound { start: PathBuf },
    /// A manifest exists but could not be read.
    Io { path: PathBuf, source: std::io::Error },
}

impl std::fmt::Display for RootError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RootError::NotFound { start } => write!(
                f,
                "workspace root directory could not be found from {}",
                start.display()
            ),
            RootError::Io { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for RootError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RootError::NotFound { .. } => None,
            RootError::Io { source, .. } => Some(source),
        }
    }
}

/// Resolve the root of the workspace containing `start`.
pub fn find_workspace_root(start: &Path) -> Result<PathBuf, RootError> {
    if let Some(cached) = root_cache().get(start) {
        return Ok(cached.clone());
    }

    let mut current = Some(start);
    let mut package_json_directory: Option<PathBuf> = None;

    for _ in 0..MAX_ROOT_SEARCH_DEPTH {
        let Some(directory) = current else {
            break;
        };

        if directory.join("pnpm-workspace.yaml").exists() {
            return Ok(remember(start, directory.to_path_buf()));
        }

        match read_package_json(directory)? {
            Some(ManifestKind::Workspace) => {
                return Ok(remember(start, directory.to_path_buf()));
            }
            Some(ManifestKind::Package) => {
                package_json_directory = Some(directory.to_path_buf());
            }
            None => {}
        }

        current = directory.parent();
    }

    match package_json_directory {
        Some(directory) => Ok(remember(start, directory)),
        None => Err(RootError::NotFound {
            start: start.to_path_buf(),
        }),
    }
}

enum ManifestKind {
    Workspace,
    Package,
}

fn read_package_json(directory: &Path) -> Result<Option<ManifestKind>, RootError> {
    let path = directory.join("package.json");
    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => return Err(RootError::Io { path, source }),
    };

    let manifest: serde_json::Value = match serde_json::from_str(&content) {
        Ok(manifest) => manifest,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "ignoring unparsable package.json");
            return Ok(None);
        }
    };

    let is_workspace = manifest
        .get("workspaces")
        .is_some_and(|workspaces| workspaces.is_array() || workspaces.is_object());

    Ok(Some(if is_workspace {
        ManifestKind::Workspace
    } else {
        ManifestKind::Package
    }))
}

fn remember(start: &Path, root: PathBuf) -> PathBuf {
    trace!(start = %start.display(), root = %root.display(), "workspace root resolved");
    root_cache().insert(start.to_path_buf(), root.clone());
    root
}

/// Compute a file path relative to `root`.
///
/// Vendor files are rewritten to begin at the last `node_modules` segment so
/// that links into dependencies do not depend on where the dependency tree was
/// hoisted. Separators are normalized to `/`.
pub fn relative_to_root(file_path: &str, root: &str) -> String {
    let file_path = file_path.replace('\\', "/");
    let root = root.replace('\\', "/");
    let root = root.trim_end_matches('/');

    let mut relative = if !root.is_empty() {
        file_path
            .strip_prefix(root)
            .filter(|rest| rest.is_empty() || rest.starts_with('/'))
            .unwrap_or(&file_path)
    } else {
        &file_path
    };

    if let Some(index) = relative.rfind(VENDOR_DIRECTORY) {
        relative = &relative[index..];
    }

    relative.trim_start_matches('/').to_string()
}

/// Check whether a path lies inside a vendor directory.
pub fn is_vendor_path(file_path: &str) -> bool {
    file_path
        .split(['/', '\\'])
        .any(|segment| segment == VENDOR_DIRECTORY)
}

#[cfg(test)]
#[path = "tests/root_tests.rs"]
mod tests;
