//! Resolve the exports of a program snapshot and render them as JSON.

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde_json::{Map, Value, json};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use typeshape_common::find_workspace_root;
use typeshape_resolver::snapshot::ExportData;
use typeshape_resolver::{
    NodeKind, ProgramSnapshot, ResolutionContext, ResolveError, ResolvedType, SymbolFilter,
    TypeOracle, TypeResolver, exclude_node_modules, include_all,
};

use crate::args::CliArgs;
use crate::config::{Settings, load_settings};

/// Entry point behind `main`.
pub fn run(args: &CliArgs) -> Result<()> {
    let settings = load_settings(args)?;
    let snapshot = load_snapshot(&args.snapshot)?;
    let root = project_root(&settings, &snapshot, &args.snapshot);

    let report = resolve_snapshot(&snapshot, &settings, &root)?;
    let rendered = if settings.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };

    match &args.out {
        Some(path) => std::fs::write(path, rendered + "\n")
            .with_context(|| format!("failed to write output: {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{rendered}").context("failed to write output")?;
        }
    }
    Ok(())
}

pub fn load_snapshot(path: &Path) -> Result<ProgramSnapshot> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot: {}", path.display()))?;
    ProgramSnapshot::from_json(&source)
        .with_context(|| format!("failed to load snapshot: {}", path.display()))
}

/// Directory that reported file paths are relative to.
///
/// In order: `--root` or the config's `root`, the snapshot's own `root`, the
/// workspace containing the snapshot file, the snapshot's directory.
pub fn project_root(settings: &Settings, snapshot: &ProgramSnapshot, snapshot_path: &Path) -> String {
    if let Some(root) = &settings.root {
        return root.to_string_lossy().into_owned();
    }
    if let Some(root) = snapshot.root.as_ref().filter(|root| !root.is_empty()) {
        return root.clone();
    }

    let directory = snapshot_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let directory = std::fs::canonicalize(&directory).unwrap_or(directory);
    match find_workspace_root(&directory) {
        Ok(root) => root.to_string_lossy().into_owned(),
        Err(err) => {
            debug!(%err, "falling back to the snapshot directory");
            directory.to_string_lossy().into_owned()
        }
    }
}

/// Resolve the selected exports into a JSON object keyed by export name.
///
/// A declaration that fails to resolve is recorded as `{ "error": ... }` and
/// does not stop the others. Exports with nothing to document map to `null`.
pub fn resolve_snapshot(
    snapshot: &ProgramSnapshot,
    settings: &Settings,
    root: &str,
) -> Result<Map<String, Value>> {
    let exports = selected_exports(snapshot, &settings.exports)?;
    info!(exports = exports.len(), jobs = settings.jobs, "resolving exports");

    let outcomes: Vec<Result<Option<ResolvedType>, ResolveError>> = if settings.jobs > 1 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(settings.jobs)
            .build()
            .context("failed to start the worker pool")?;
        pool.install(|| {
            exports
                .par_iter()
                .map(|export| {
                    let mut resolver = request_resolver(snapshot, settings, root);
                    resolve_export(&mut resolver, export, symbol_filter(settings.include_vendor))
                })
                .collect()
        })
    } else {
        let mut resolver = request_resolver(snapshot, settings, root);
        let filter = symbol_filter(settings.include_vendor);
        exports
            .iter()
            .map(|export| resolve_export(&mut resolver, export, filter))
            .collect()
    };

    let mut report = Map::with_capacity(exports.len());
    for (export, outcome) in exports.iter().zip(outcomes) {
        let value = match outcome {
            Ok(Some(resolved)) => serde_json::to_value(&resolved)
                .with_context(|| format!("failed to serialize export {}", export.name))?,
            Ok(None) => Value::Null,
            Err(err) => {
                warn!(export = %export.name, %err, "export could not be resolved");
                json!({ "error": err.to_string() })
            }
        };
        report.insert(export.name.clone(), value);
    }
    Ok(report)
}

fn symbol_filter(include_vendor: bool) -> SymbolFilter<'static> {
    if include_vendor {
        &include_all
    } else {
        &exclude_node_modules
    }
}

fn selected_exports<'s>(
    snapshot: &'s ProgramSnapshot,
    names: &[String],
) -> Result<Vec<&'s ExportData>> {
    if names.is_empty() {
        return Ok(snapshot.exports().iter().collect());
    }
    names
        .iter()
        .map(|name| snapshot.export(name).map_err(anyhow::Error::from))
        .collect()
}

fn request_resolver<'s>(
    snapshot: &'s ProgramSnapshot,
    settings: &Settings,
    root: &str,
) -> TypeResolver<'s, ProgramSnapshot> {
    let context =
        ResolutionContext::with_limits(settings.resolver.expansion_limits()).with_project_root(root);
    TypeResolver::with_options(snapshot, &settings.resolver).with_context(context)
}

/// Classes are decomposed from their declaration; everything else resolves
/// the declared type.
pub fn resolve_export(
    resolver: &mut TypeResolver<'_, ProgramSnapshot>,
    export: &ExportData,
    filter: SymbolFilter<'_>,
) -> Result<Option<ResolvedType>, ResolveError> {
    let snapshot = resolver.oracle();
    let node = export.node;
    debug!(export = %export.name, node = node.0, "resolving export");

    if snapshot.node_kind(node) == NodeKind::ClassDeclaration {
        return resolver.resolve_class(node, filter).map(Some);
    }
    let Some(ty) = snapshot.type_of_node(node) else {
        debug!(export = %export.name, "export has no type");
        return Ok(None);
    };
    resolver.resolve_type(ty, Some(node), filter)
}
