//! Main entry point for the tablebook CLI.
//!
//! Each subcommand handles one request the way the API would: it resolves
//! the caller from `--api-key`, runs the library operation and prints the
//! JSON response on stdout, or the JSON error envelope on stderr.

use clap::Parser;
use tablebook_cli::Cli;

fn main() {
    let cli = Cli::parse();

    let _level = tablebook::init_logger(cli.verbose, cli.quiet);

    let global = cli.global_options();

    match cli.command.execute(&global) {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("{}", e.to_json());
            std::process::exit(e.exit_code());
        }
    }
}
