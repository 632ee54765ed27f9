pub mod backup_locator;

pub use backup_locator::{BackupArchive, BackupLocator, DEFAULT_PATTERN};
