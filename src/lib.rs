pub mod archive;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod locator;
pub mod parser;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, ExportConfig, LocatorConfig};
pub use error::{Result, UserFriendlyError, XgExtractError};

// Core functionality re-exports
pub use archive::{ArchiveReader, ConfigPayload};
pub use export::{ExportFormat, ExportSummary, ListingExporter, RepackSummary, RepackWriter};
pub use locator::{BackupArchive, BackupLocator};
pub use parser::{GroupKind, Host, HostGroup, HostValue, Inventory, XmlExtractor};
pub use ui::{OutputFormatter, OutputMode};

use parser::resolve_selection;
use std::path::{Path, PathBuf};

/// Main library interface: drives the locate → read → parse → export
/// pipeline over a working directory.
pub struct XgExtract {
    config: Config,
    formatter: OutputFormatter,
}

impl XgExtract {
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let formatter = OutputFormatter::new(output_mode, verbose, quiet);
        Self { config, formatter }
    }

    /// Create an XgExtract instance from CLI arguments
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            cli::OutputFormat::Human => OutputMode::Human,
            cli::OutputFormat::Json => OutputMode::Json,
            cli::OutputFormat::Plain => OutputMode::Plain,
        };

        Ok(Self::new(
            config,
            output_mode,
            cli_args.verbose,
            cli_args.quiet,
        ))
    }

    /// Write the host-group listing for the newest backup in `dir`.
    pub fn export(&self, dir: &Path) -> Result<ExportSummary> {
        let (backup, payload, inventory) = self.load_inventory(dir)?;

        let selected = resolve_selection(&self.config.export.groups, &inventory.groups)?;
        let destination = self.listing_destination(&backup);

        self.formatter.start_operation("Writing listing");
        let summary = ListingExporter::new(self.config.export.format).export(
            &inventory,
            &selected,
            &backup,
            &payload.entry_name,
            &destination,
        )?;

        self.formatter.print_export_summary(&summary);
        Ok(summary)
    }

    /// Write a filtered backup archive containing only the selected groups.
    pub fn repack(&self, dir: &Path, destination: &Path) -> Result<RepackSummary> {
        let (_backup, payload, inventory) = self.load_inventory(dir)?;

        let selected = resolve_selection(&self.config.export.groups, &inventory.groups)?;

        self.formatter.start_operation("Writing filtered archive");
        let summary = RepackWriter::new()
            .with_force_overwrite(self.config.export.overwrite)
            .write(&inventory, &selected, &payload.entry_name, destination)?;

        self.formatter.print_repack_summary(&summary);
        Ok(summary)
    }

    /// Print the groups available in the newest backup without writing
    /// anything.
    pub fn list_groups(&self, dir: &Path) -> Result<()> {
        let (_backup, _payload, inventory) = self.load_inventory(dir)?;
        self.formatter.print_group_list(&inventory);
        Ok(())
    }

    /// The shared locate → read → parse front half of every mode.
    fn load_inventory(&self, dir: &Path) -> Result<(BackupArchive, ConfigPayload, Inventory)> {
        self.formatter.start_operation("Locating backup archive");
        let locator = BackupLocator::with_pattern(&self.config.locator.pattern)?;
        let backup = locator.locate(dir)?;
        self.formatter.info(&format!(
            "Using backup {} (modified {})",
            backup.file_name,
            backup.modified_utc().format("%Y-%m-%d %H:%M:%S UTC")
        ));

        self.formatter.start_operation("Reading configuration entry");
        let payload = ArchiveReader::new().read_config(&backup.path)?;
        self.formatter.debug(&format!(
            "Config entry {} ({} bytes)",
            payload.entry_name,
            payload.bytes.len()
        ));

        self.formatter.start_operation("Parsing host groups");
        let inventory = XmlExtractor::new().parse(&payload.bytes)?;
        for warning in &inventory.warnings {
            self.formatter.warning(warning);
        }
        self.formatter.info(&format!(
            "Found {} FQDN and {} IP host groups",
            inventory.group_count(GroupKind::Fqdn),
            inventory.group_count(GroupKind::Ip)
        ));

        Ok((backup, payload, inventory))
    }

    fn listing_destination(&self, backup: &BackupArchive) -> PathBuf {
        match self.config.export.destination {
            Some(ref destination) => destination.clone(),
            None => backup.derived_destination(self.config.export.format.extension()),
        }
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config).map_err(XgExtractError::Io)?;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn formatter(&self) -> &OutputFormatter {
        &self.formatter
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &XgExtractError) {
        self.formatter.print_user_friendly_error(error);
    }
}

/// Get version information
pub fn version_info() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
