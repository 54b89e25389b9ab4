//! CLI entry point for context-sensitive wave function collapse generation

use clap::Parser;
use contextile::io::cli::{Cli, FileProcessor};
use tracing::Level;

fn main() -> contextile::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let mut processor = FileProcessor::new(cli);
    processor.process()
}
