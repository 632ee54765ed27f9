use crate::error::{Result, XgExtractError};
use chrono::{DateTime, Utc};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

/// Backup file names the firewall's scheduled API export produces, e.g.
/// `API-FW01_12.01.2024.tar`.
pub const DEFAULT_PATTERN: &str = r"(?i)api-.*\.tar$";

/// A candidate configuration backup in the working directory.
#[derive(Debug, Clone)]
pub struct BackupArchive {
    pub path: PathBuf,
    pub file_name: String,
    pub modified: SystemTime,
    pub size: u64,
}

impl BackupArchive {
    pub fn modified_utc(&self) -> DateTime<Utc> {
        self.modified.into()
    }

    /// Derives the default export destination from the archive name:
    /// `API-FW01.tar` becomes `API-FW01-hostgroups.<ext>` next to it.
    pub fn derived_destination(&self, extension: &str) -> PathBuf {
        let stem = self
            .file_name
            .strip_suffix(".tar")
            .or_else(|| self.file_name.strip_suffix(".TAR"))
            .unwrap_or(&self.file_name);
        self.path
            .with_file_name(format!("{}-hostgroups.{}", stem, extension))
    }
}

/// Scans a working directory for backup archives and picks the most
/// recently modified one.
pub struct BackupLocator {
    pattern: Regex,
}

impl BackupLocator {
    pub fn new() -> Self {
        Self {
            // The default pattern is a compile-time constant and always valid.
            pattern: Regex::new(DEFAULT_PATTERN).expect("default pattern"),
        }
    }

    pub fn with_pattern(pattern: &str) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|e| XgExtractError::Config {
            message: format!("invalid backup filename pattern '{}': {}", pattern, e),
        })?;
        Ok(Self { pattern })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Enumerates matching regular files directly inside `dir`.
    /// Unreadable entries are skipped; subdirectories are never entered.
    pub fn candidates<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<BackupArchive>> {
        let dir = dir.as_ref();

        if !dir.is_dir() {
            return Err(XgExtractError::InvalidPath {
                path: dir.display().to_string(),
            });
        }

        let mut candidates = Vec::new();

        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy().to_string();
            if !self.pattern.is_match(&file_name) {
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(_) => continue,
            };

            candidates.push(BackupArchive {
                path: entry.path().to_path_buf(),
                file_name,
                modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
                size: metadata.len(),
            });
        }

        Ok(candidates)
    }

    /// Returns the candidate with the latest modification time. Equal
    /// timestamps resolve by lexical filename order, later name winning,
    /// so the pick is stable for same-second exports.
    pub fn locate<P: AsRef<Path>>(&self, dir: P) -> Result<BackupArchive> {
        let dir = dir.as_ref();
        let candidates = self.candidates(dir)?;

        candidates
            .into_iter()
            .max_by(|a, b| {
                a.modified
                    .cmp(&b.modified)
                    .then_with(|| a.file_name.cmp(&b.file_name))
            })
            .ok_or_else(|| XgExtractError::NoBackupFound {
                search_dir: dir.display().to_string(),
                pattern: self.pattern.as_str().to_string(),
            })
    }
}

impl Default for BackupLocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::{set_file_mtime, FileTime};
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str, mtime_secs: i64) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, b"stub").unwrap();
        set_file_mtime(&path, FileTime::from_unix_time(mtime_secs, 0)).unwrap();
        path
    }

    #[test]
    fn test_picks_latest_mtime() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "API-old.tar", 1_000);
        touch(temp_dir.path(), "API-new.tar", 2_000);
        touch(temp_dir.path(), "API-middle.tar", 1_500);

        let selected = BackupLocator::new().locate(temp_dir.path()).unwrap();
        assert_eq!(selected.file_name, "API-new.tar");
    }

    #[test]
    fn test_tie_breaks_on_lexical_filename_order() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "API-a.tar", 1_000);
        touch(temp_dir.path(), "API-b.tar", 1_000);

        let selected = BackupLocator::new().locate(temp_dir.path()).unwrap();
        assert_eq!(selected.file_name, "API-b.tar");
    }

    #[test]
    fn test_ignores_non_matching_and_directories() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "notes.txt", 9_000);
        touch(temp_dir.path(), "backup.tar", 9_000);
        fs::create_dir(temp_dir.path().join("API-dir.tar")).unwrap();
        touch(temp_dir.path(), "api-match.tar", 1_000);

        let selected = BackupLocator::new().locate(temp_dir.path()).unwrap();
        assert_eq!(selected.file_name, "api-match.tar");
    }

    #[test]
    fn test_no_match_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "unrelated.bin", 1_000);

        let result = BackupLocator::new().locate(temp_dir.path());
        assert!(matches!(result, Err(XgExtractError::NoBackupFound { .. })));
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let result = BackupLocator::new().locate("/nonexistent/xgextract-test");
        assert!(matches!(result, Err(XgExtractError::InvalidPath { .. })));
    }

    #[test]
    fn test_custom_pattern() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "weekly-backup.tar", 1_000);

        let locator = BackupLocator::with_pattern(r"^weekly-.*\.tar$").unwrap();
        let selected = locator.locate(temp_dir.path()).unwrap();
        assert_eq!(selected.file_name, "weekly-backup.tar");

        assert!(BackupLocator::with_pattern("(unclosed").is_err());
    }

    #[test]
    fn test_derived_destination() {
        let archive = BackupArchive {
            path: PathBuf::from("/data/API-FW01.tar"),
            file_name: "API-FW01.tar".to_string(),
            modified: SystemTime::UNIX_EPOCH,
            size: 0,
        };
        assert_eq!(
            archive.derived_destination("txt"),
            PathBuf::from("/data/API-FW01-hostgroups.txt")
        );
    }
}
