use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for the typeshape binary.
#[derive(Parser, Debug)]
#[command(
    name = "typeshape",
    version,
    about = "Resolve exported TypeScript types into documentation descriptors"
)]
pub struct CliArgs {
    /// Program snapshot exported by the host compiler (JSON).
    pub snapshot: PathBuf,

    /// Path to typeshape.json. Defaults to typeshape.json next to the snapshot.
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Resolve only the named export. Repeatable; defaults to every export.
    #[arg(short = 'e', long = "export", value_name = "NAME")]
    pub exports: Vec<String>,

    /// Resolve exports on this many worker threads, each with its own context.
    #[arg(short = 'j', long)]
    pub jobs: Option<usize>,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pub pretty: bool,

    /// Keep properties declared in node_modules.
    #[arg(long = "include-vendor", alias = "includeVendor")]
    pub include_vendor: bool,

    /// Directory that reported file paths are relative to.
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Write the output to a file instead of stdout.
    #[arg(short = 'o', long = "out")]
    pub out: Option<PathBuf>,
}
