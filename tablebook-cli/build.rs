//! Build script for tablebook-cli.
//!
//! Generates the man page at build time using clap_mangen and places it in
//! OUT_DIR for inclusion in release builds.
//!
//! Build scripts cannot depend on the crate being built, so the command
//! structure is declared again here.

use clap::{Arg, Command};
use clap_mangen::Man;
use std::fs;
use std::path::PathBuf;

/// Build the CLI command structure for man page generation.
///
/// Keep this structure synchronized with src/cli.rs.
fn build_cli() -> Command {
    Command::new("tablebook")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Check restaurant table availability and book reservations")
        .long_about(
            "Command-line front end of the tablebook engine: imports restaurant catalogs, \
             answers availability queries and books reservations onto the smallest free table",
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .help("Enable verbose output")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .help("Suppress non-essential output")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .help("Override the data directory location")
                .value_name("PATH")
                .global(true)
                .env("TABLEBOOK_DATA_DIR"),
        )
        .arg(
            Arg::new("busy-timeout")
                .long("busy-timeout")
                .help("Override the default busy timeout (in seconds)")
                .value_name("SECONDS")
                .global(true)
                .env("TABLEBOOK_BUSY_TIMEOUT"),
        )
        .arg(
            Arg::new("api-key")
                .long("api-key")
                .help("API key of the restaurant the request acts for")
                .value_name("KEY")
                .global(true)
                .env("TABLEBOOK_API_KEY")
                .hide_env_values(true),
        )
        .subcommands(vec![
            Command::new("init")
                .about("Initialize the data directory and database")
                .long_about("Create the data directory, an empty database and optionally config.yaml"),
            Command::new("import")
                .about("Import restaurants, tables and schedules from a catalog file")
                .long_about("Load a YAML catalog of restaurants, zones, tables, weekly schedules and exceptions"),
            Command::new("availability")
                .about("List the day's bookable slots for a party size")
                .long_about("Show future slots with at least one free table and the best per-slot count"),
            Command::new("slot")
                .about("Check a single slot for a party size")
                .long_about("Show whether a slot is free and how many tables remain"),
            Command::new("available-tables")
                .about("List the tables free for a slot")
                .long_about("List tables seating the party that are free for the whole reservation"),
            Command::new("book")
                .about("Book a reservation on the smallest free table")
                .long_about("Validate, resolve the client, allocate a table and store the reservation"),
            Command::new("gaps")
                .about("Show the free windows of one table on a date")
                .long_about("List windows on a table long enough to hold a reservation"),
            Command::new("list")
                .about("List confirmed reservations")
                .long_about("List the restaurant's confirmed reservations, optionally by date and table"),
            Command::new("completions")
                .about("Generate shell completion scripts")
                .long_about("Generate shell completion scripts for bash, zsh, fish, or PowerShell"),
        ])
}

fn main() -> std::io::Result<()> {
    let out_dir = PathBuf::from(std::env::var_os("OUT_DIR").ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::NotFound, "OUT_DIR is not set")
    })?);
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir)?;

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();
    man.render(&mut buffer)?;
    fs::write(man_dir.join("tablebook.1"), buffer)?;

    println!("cargo:rerun-if-changed=src/cli.rs");
    println!("cargo:rerun-if-changed=src/commands/");
    Ok(())
}
