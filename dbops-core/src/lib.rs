pub mod backup;
pub mod backup_config;
pub mod backup_validator;
pub mod config;
pub mod constants;
pub mod error;
pub mod lock;
pub mod migration;
pub mod migration_validator;
pub mod monitoring;
pub mod outcome;
pub mod process;
pub mod rollback;

pub use error::{DbOpsError, Result};
