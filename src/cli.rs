use crate::config::{CliOverrides, Config};
use crate::error::Result;
use crate::export::ExportFormat;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "xgextract")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Extract FQDN and IP host groups from Sophos XG configuration backups")]
#[command(
    long_about = "xgextract picks the most recently modified configuration backup in a \
                  working directory, parses the XML export embedded in the tar and writes \
                  the FQDN and IP host groups it contains to a stable listing."
)]
#[command(after_help = "EXAMPLES:\n  \
    xgextract\n  \
    xgextract /backups --format json\n  \
    xgextract /backups --list\n  \
    xgextract /backups --groups Servers,WebDMZ --output subset.txt\n  \
    xgextract /backups --groups Servers --repack servers-only.tar\n")]
pub struct Cli {
    /// Directory to scan for backup archives
    #[arg(default_value = ".")]
    pub directory: PathBuf,

    /// Listing destination (defaults to <archive>-hostgroups.<ext> next to the backup)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Listing format
    #[arg(short = 'F', long, value_enum)]
    pub format: Option<ExportFormat>,

    /// Restrict the export to these groups (names or unique substrings)
    #[arg(short, long, value_delimiter = ',')]
    pub groups: Option<Vec<String>>,

    /// List the groups in the newest backup and exit
    #[arg(long, conflicts_with = "repack")]
    pub list: bool,

    /// Write a filtered backup archive instead of a listing
    #[arg(long, value_name = "FILE")]
    pub repack: Option<PathBuf>,

    /// Backup filename pattern (regular expression)
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for messages
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Overwrite an existing repack destination
    #[arg(long)]
    pub force: bool,

    /// Generate a sample configuration file
    #[arg(long)]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_pattern(self.pattern.clone())
            .with_format(self.format)
            .with_destination(self.output.clone())
            .with_groups(self.groups.clone())
            // Only an explicit --force overrides the config file value.
            .with_overwrite(self.force.then_some(true))
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose > 0 && !self.quiet
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["xgextract"]);
        assert_eq!(cli.directory, PathBuf::from("."));
        assert!(cli.output.is_none());
        assert!(cli.format.is_none());
        assert!(!cli.list);
        assert!(!cli.force);
        assert_eq!(cli.verbosity_level(), 0);
    }

    #[test]
    fn test_group_terms_are_comma_separated() {
        let cli = Cli::parse_from(["xgextract", "/backups", "--groups", "Servers,Web DMZ"]);
        assert_eq!(cli.directory, PathBuf::from("/backups"));
        assert_eq!(
            cli.groups,
            Some(vec!["Servers".to_string(), "Web DMZ".to_string()])
        );
    }

    #[test]
    fn test_list_conflicts_with_repack() {
        let result = Cli::try_parse_from(["xgextract", "--list", "--repack", "out.tar"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["xgextract", "-q", "-v"]);
        assert!(result.is_err());

        let cli = Cli::parse_from(["xgextract", "-vv"]);
        assert_eq!(cli.verbosity_level(), 2);
        assert!(cli.is_verbose());
    }

    #[test]
    fn test_overrides_only_carry_explicit_flags() {
        let cli = Cli::parse_from(["xgextract", "--pattern", "^weekly-.*"]);
        let overrides = cli.create_cli_overrides();
        assert_eq!(overrides.pattern.as_deref(), Some("^weekly-.*"));
        assert!(overrides.format.is_none());
        assert!(overrides.overwrite.is_none());

        let cli = Cli::parse_from(["xgextract", "--force", "--format", "json"]);
        let overrides = cli.create_cli_overrides();
        assert_eq!(overrides.overwrite, Some(true));
        assert_eq!(overrides.format, Some(ExportFormat::Json));
    }

    #[test]
    fn test_invalid_pattern_fails_config_load() {
        let cli = Cli::parse_from(["xgextract", "--pattern", "(unclosed"]);
        assert!(cli.load_config().is_err());
    }
}
