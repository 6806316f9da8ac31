use anyhow::Result;
use clap::Parser;

use typeshape_cli::args::CliArgs;
use typeshape_cli::{driver, tracing_config};

fn main() -> Result<()> {
    // Initialize tracing if TYPESHAPE_LOG or RUST_LOG is set.
    tracing_config::init_tracing();

    let args = CliArgs::parse();
    driver::run(&args)
}
