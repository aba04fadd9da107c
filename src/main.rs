//! Hollowcheck CLI entry point.

use clap::Parser;
use hollowcheck::cli::{self, Cli, Commands, EXIT_ERROR};
use hollowcheck::logging;

fn main() {
    logging::init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Scan(args) => cli::run_scan(&args),
        Commands::Init(args) => cli::run_init(&args),
    };
    let exit_code = result.unwrap_or_else(|e| {
        eprintln!("Error: {:#}", e);
        EXIT_ERROR
    });

    std::process::exit(exit_code);
}
