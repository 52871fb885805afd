//! Import command implementation.
//!
//! The configuration collaborator: loads restaurants, zones, tables and
//! schedules from a YAML catalog. The database is created if needed.

use crate::error::CliError;
use crate::utils::{data_dir, database_config, load_configuration, print_success, GlobalOptions};
use clap::Args;
use std::path::PathBuf;
use tablebook::database::{resolve_database_path, Catalog};
use tablebook::Database;

/// Import a catalog file.
#[derive(Args)]
pub struct ImportCommand {
    /// Catalog YAML file
    #[arg(value_name = "CATALOG")]
    pub catalog: PathBuf,
}

impl ImportCommand {
    /// Execute the import command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let catalog = Catalog::load(&self.catalog)?;

        let dir = data_dir(global)?;
        std::fs::create_dir_all(&dir)?;
        let config = load_configuration(global)?;
        let db_path = resolve_database_path(Some(&dir))?;
        let mut db = Database::open(database_config(global, &config, db_path))?;

        let summary = db.import_catalog(&catalog)?;
        log::info!(
            "imported {} restaurant(s), {} table(s) from {}",
            summary.restaurants.len(),
            summary.tables,
            self.catalog.display()
        );

        print_success(summary)
    }
}
