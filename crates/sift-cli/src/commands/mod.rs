//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Init/datasets commands and shared utilities (open_db)
//! - `import` - CSV import command
//! - `reports` - Report and merchant ranking commands
//! - `suggestions` - Budget suggestion command
//! - `analyze` - Combined report + merchants + suggestions brief
//! - `serve` - Web server command

pub mod analyze;
pub mod core;
pub mod import;
pub mod reports;
pub mod serve;
pub mod suggestions;

// Re-export command functions for main.rs
pub use analyze::*;
pub use core::*;
pub use import::*;
pub use reports::*;
pub use serve::*;
pub use suggestions::*;
