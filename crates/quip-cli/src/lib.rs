pub mod cli;
pub mod commands;
pub mod console;
pub mod utils;

use clap::Parser;
use cli::Quip;
use commands::handle_command;
use std::process;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();
}

/// Run the quip CLI application
pub fn run_main() {
    let args = Quip::parse();
    init_logging(args.verbose);

    if let Err(e) = handle_command(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
