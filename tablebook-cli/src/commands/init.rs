//! Init command implementation.
//!
//! Creates the data directory and an empty database, optionally with a
//! commented `config.yaml`.

use crate::error::CliError;
use crate::utils::{data_dir, print_success, GlobalOptions};
use clap::Args;
use tablebook::operations::{init_database, InitOptions};

/// Initialize the data directory and database.
#[derive(Args)]
pub struct InitCommand {
    /// Replace an existing database (all reservations are lost)
    #[arg(long)]
    pub overwrite: bool,

    /// Create a default configuration file
    #[arg(long)]
    pub with_config: bool,
}

impl InitCommand {
    /// Execute the init command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let options = InitOptions::new(data_dir(global)?)
            .with_overwrite(self.overwrite)
            .with_create_config(self.with_config);

        let result = init_database(&options)?;
        log::info!("initialized {}", result.database.display());

        print_success(result)
    }
}
