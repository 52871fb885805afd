//! CLI command implementations.
//!
//! - `init`: create the data directory and database
//! - `import`: load restaurants, tables and schedules from a catalog
//! - `availability`: bookable slots of a day
//! - `slot`: availability of one slot
//! - `available_tables`: free tables for one slot
//! - `book`: run the booking transaction
//! - `gaps`: free windows of one table
//! - `list`: confirmed reservations
//! - `completions`: shell completion scripts

pub mod availability;
pub mod available_tables;
pub mod book;
pub mod completions;
pub mod gaps;
pub mod import;
pub mod init;
pub mod list;
pub mod slot;

pub use availability::AvailabilityCommand;
pub use available_tables::AvailableTablesCommand;
pub use book::BookCommand;
pub use completions::CompletionsCommand;
pub use gaps::GapsCommand;
pub use import::ImportCommand;
pub use init::InitCommand;
pub use list::ListCommand;
pub use slot::SlotCommand;
