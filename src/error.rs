use thiserror::Error;

#[derive(Error, Debug)]
pub enum XgExtractError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("no backup archive matching '{pattern}' found in {search_dir}")]
    NoBackupFound { search_dir: String, pattern: String },

    #[error("cannot read backup archive {path}: {message}")]
    ArchiveCorrupt { path: String, message: String },

    #[error("no XML configuration entry inside {archive}")]
    ConfigNotFound { archive: String },

    #[error("configuration XML is malformed: {message}")]
    MalformedXml { message: String },

    #[error("invalid group selection: {terms}")]
    InvalidSelection { terms: String },

    #[error("cannot write {path}: {message}")]
    WriteError { path: String, message: String },

    #[error("output file already exists: {path}")]
    OutputExists { path: String },

    #[error("not a directory: {path}")]
    InvalidPath { path: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for XgExtractError {
    fn user_message(&self) -> String {
        match self {
            XgExtractError::NoBackupFound {
                search_dir,
                pattern,
            } => {
                format!(
                    "No backup archive matching '{}' found in {}",
                    pattern, search_dir
                )
            }
            XgExtractError::ArchiveCorrupt { path, message } => {
                format!("Cannot read backup archive {}: {}", path, message)
            }
            XgExtractError::ConfigNotFound { archive } => {
                format!("No XML configuration entry inside {}", archive)
            }
            XgExtractError::MalformedXml { message } => {
                format!("Configuration XML is malformed: {}", message)
            }
            XgExtractError::InvalidSelection { terms } => {
                format!("Invalid group selection: {}", terms)
            }
            XgExtractError::WriteError { path, message } => {
                format!("Cannot write {}: {}", path, message)
            }
            XgExtractError::OutputExists { path } => {
                format!("Output file already exists: {}", path)
            }
            XgExtractError::InvalidPath { path } => {
                format!("Not a directory: {}", path)
            }
            XgExtractError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            XgExtractError::NoBackupFound { .. } => Some(
                "Export a configuration backup from the firewall UI into the working directory, \
                 or point at the right directory. Use --pattern to change the expected file name."
                    .to_string(),
            ),
            XgExtractError::ArchiveCorrupt { .. } => Some(
                "The file does not look like a tar archive. Re-export the backup from the \
                 firewall and try again."
                    .to_string(),
            ),
            XgExtractError::ConfigNotFound { .. } => Some(
                "The archive contains no .xml entry. Make sure you exported the configuration \
                 backup, not a firmware or log archive."
                    .to_string(),
            ),
            XgExtractError::MalformedXml { .. } => Some(
                "The embedded configuration could not be parsed. The backup may be truncated; \
                 re-export it from the firewall."
                    .to_string(),
            ),
            XgExtractError::InvalidSelection { .. } => Some(
                "Run with --list to see the available group names, then pass exact names or \
                 unambiguous substrings to --groups."
                    .to_string(),
            ),
            XgExtractError::WriteError { .. } => Some(
                "Check write permissions and free disk space for the destination directory."
                    .to_string(),
            ),
            XgExtractError::OutputExists { .. } => Some(
                "Choose a different destination or pass --force to overwrite.".to_string(),
            ),
            XgExtractError::Config { .. } => Some(
                "Check your configuration file syntax and the values passed on the command line."
                    .to_string(),
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for XgExtractError {
    fn from(error: toml::de::Error) -> Self {
        XgExtractError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, XgExtractError>;
