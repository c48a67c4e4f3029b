// Csputil — Application Entry Point
//
// Parses CLI arguments, initializes structured logging on stderr (key
// material is never logged), and dispatches to the command handler.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use csputil::cli::{execute, Cli};

fn main() {
    // RUST_LOG=csputil=debug shows every provider call and its native code.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("csputil=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = execute(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
