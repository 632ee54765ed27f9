use crate::error::{Result, XgExtractError};
use crate::locator::BackupArchive;
use crate::parser::{GroupKind, HostGroup, Inventory};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// One group per block, members indented beneath
    #[default]
    Text,
    /// A single pretty-printed JSON document
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Text => "txt",
            ExportFormat::Json => "json",
        }
    }
}

/// What a listing run produced, for the end-of-run summary.
#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    pub destination: String,
    pub format: ExportFormat,
    pub fqdn_groups: usize,
    pub ip_groups: usize,
    pub members: usize,
    pub bytes_written: u64,
    pub warnings: Vec<String>,
}

/// Writes the host-group listing.
///
/// Output ordering is a contract for downstream consumers: groups sorted
/// by kind (FQDN first) then name, members in declaration order. The only
/// timestamp in the file is the backup's own mtime, so re-running over an
/// unmodified archive is byte-identical.
pub struct ListingExporter {
    format: ExportFormat,
}

impl ListingExporter {
    pub fn new(format: ExportFormat) -> Self {
        Self { format }
    }

    pub fn export(
        &self,
        inventory: &Inventory,
        selected: &[String],
        source: &BackupArchive,
        entry_name: &str,
        destination: &Path,
    ) -> Result<ExportSummary> {
        let mut groups: Vec<&HostGroup> = inventory
            .groups
            .iter()
            .filter(|g| selected.contains(&g.name))
            .collect();
        groups.sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| a.name.cmp(&b.name)));

        let rendered = match self.format {
            ExportFormat::Text => self.render_text(inventory, &groups, source, entry_name),
            ExportFormat::Json => self.render_json(inventory, &groups, source, entry_name)?,
        };

        let bytes_written = write_atomic(destination, rendered.as_bytes())?;

        Ok(ExportSummary {
            destination: destination.display().to_string(),
            format: self.format,
            fqdn_groups: groups.iter().filter(|g| g.kind == GroupKind::Fqdn).count(),
            ip_groups: groups.iter().filter(|g| g.kind == GroupKind::Ip).count(),
            members: groups.iter().map(|g| g.members.len()).sum(),
            bytes_written,
            warnings: inventory.warnings.clone(),
        })
    }

    fn render_text(
        &self,
        inventory: &Inventory,
        groups: &[&HostGroup],
        source: &BackupArchive,
        entry_name: &str,
    ) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "# host groups exported from {}\n",
            source.file_name
        ));
        out.push_str(&format!(
            "# config entry: {} (backup modified {})\n",
            entry_name,
            source.modified_utc().format("%Y-%m-%d %H:%M:%S UTC")
        ));

        for group in groups {
            out.push('\n');
            out.push_str(&format!(
                "[{}] {} ({})\n",
                group.kind.label(),
                group.name,
                pluralize(group.members.len(), "member")
            ));
            if let Some(ref description) = group.description {
                out.push_str(&format!("  # {}\n", description));
            }
            for member in &group.members {
                match inventory.host(group.kind, member).and_then(|h| h.value.as_ref()) {
                    Some(value) => out.push_str(&format!("  {} = {}\n", member, value)),
                    None => out.push_str(&format!("  {}\n", member)),
                }
            }
        }

        out
    }

    fn render_json(
        &self,
        inventory: &Inventory,
        groups: &[&HostGroup],
        source: &BackupArchive,
        entry_name: &str,
    ) -> Result<String> {
        #[derive(Serialize)]
        struct JsonMember<'a> {
            name: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            value: Option<String>,
        }

        #[derive(Serialize)]
        struct JsonGroup<'a> {
            name: &'a str,
            kind: GroupKind,
            #[serde(skip_serializing_if = "Option::is_none")]
            description: Option<&'a str>,
            members: Vec<JsonMember<'a>>,
        }

        #[derive(Serialize)]
        struct JsonListing<'a> {
            source: &'a str,
            config_entry: &'a str,
            backup_modified: String,
            groups: Vec<JsonGroup<'a>>,
        }

        let listing = JsonListing {
            source: &source.file_name,
            config_entry: entry_name,
            backup_modified: source
                .modified_utc()
                .format("%Y-%m-%dT%H:%M:%SZ")
                .to_string(),
            groups: groups
                .iter()
                .map(|group| JsonGroup {
                    name: &group.name,
                    kind: group.kind,
                    description: group.description.as_deref(),
                    members: group
                        .members
                        .iter()
                        .map(|member| JsonMember {
                            name: member,
                            value: inventory
                                .host(group.kind, member)
                                .and_then(|h| h.value.as_ref())
                                .map(|v| v.to_string()),
                        })
                        .collect(),
                })
                .collect(),
        };

        let mut rendered =
            serde_json::to_string_pretty(&listing).map_err(|e| XgExtractError::WriteError {
                path: "listing".to_string(),
                message: e.to_string(),
            })?;
        rendered.push('\n');
        Ok(rendered)
    }
}

/// Writes through a named temp file in the destination directory and
/// persists by rename, so a failed run never leaves a partial file.
fn write_atomic(destination: &Path, content: &[u8]) -> Result<u64> {
    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| write_error(destination, e))?;
    tmp.write_all(content)
        .map_err(|e| write_error(destination, e))?;
    tmp.persist(destination)
        .map_err(|e| write_error(destination, e.error))?;

    Ok(content.len() as u64)
}

fn write_error(destination: &Path, error: std::io::Error) -> XgExtractError {
    XgExtractError::WriteError {
        path: destination.display().to_string(),
        message: error.to_string(),
    }
}

fn pluralize(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::XmlExtractor;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    const SAMPLE: &str = r#"<Configuration>
  <FQDNHost><Name>cdn</Name><FQDN>cdn.example.com</FQDN></FQDNHost>
  <IPHost><Name>web-1</Name><IPAddress>10.0.0.1</IPAddress></IPHost>
  <IPHostGroup>
    <Name>Servers</Name>
    <HostList><Host>web-1</Host><Host>ghost</Host></HostList>
  </IPHostGroup>
  <FQDNHostGroup>
    <Name>WebServices</Name>
    <Description>Public endpoints</Description>
    <FQDNHostList><FQDNHost>cdn</FQDNHost></FQDNHostList>
  </FQDNHostGroup>
</Configuration>"#;

    fn sample_archive() -> BackupArchive {
        BackupArchive {
            path: PathBuf::from("/data/API-FW01.tar"),
            file_name: "API-FW01.tar".to_string(),
            modified: SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000),
            size: 0,
        }
    }

    fn sample_inventory() -> Inventory {
        XmlExtractor::new().parse(SAMPLE.as_bytes()).unwrap()
    }

    fn all_names(inventory: &Inventory) -> Vec<String> {
        inventory.groups.iter().map(|g| g.name.clone()).collect()
    }

    #[test]
    fn test_text_listing_orders_groups_by_kind_then_name() {
        let temp_dir = TempDir::new().unwrap();
        let destination = temp_dir.path().join("listing.txt");
        let inventory = sample_inventory();

        let summary = ListingExporter::new(ExportFormat::Text)
            .export(
                &inventory,
                &all_names(&inventory),
                &sample_archive(),
                "Entities.xml",
                &destination,
            )
            .unwrap();

        assert_eq!(summary.fqdn_groups, 1);
        assert_eq!(summary.ip_groups, 1);

        let content = fs::read_to_string(&destination).unwrap();
        let fqdn_at = content.find("[FQDN] WebServices (1 member)").unwrap();
        let ip_at = content.find("[IP] Servers (2 members)").unwrap();
        assert!(fqdn_at < ip_at, "FQDN groups sort before IP groups");

        assert!(content.contains("# host groups exported from API-FW01.tar"));
        assert!(content.contains("# config entry: Entities.xml"));
        assert!(content.contains("  # Public endpoints"));
        assert!(content.contains("  cdn = cdn.example.com"));
        assert!(content.contains("  web-1 = 10.0.0.1"));
        // Member without a host definition keeps its name-only line.
        assert!(content.contains("\n  ghost\n"));
    }

    #[test]
    fn test_repeated_export_is_byte_identical() {
        let temp_dir = TempDir::new().unwrap();
        let first = temp_dir.path().join("a.txt");
        let second = temp_dir.path().join("b.txt");
        let inventory = sample_inventory();
        let names = all_names(&inventory);
        let archive = sample_archive();
        let exporter = ListingExporter::new(ExportFormat::Text);

        exporter
            .export(&inventory, &names, &archive, "Entities.xml", &first)
            .unwrap();
        exporter
            .export(&inventory, &names, &archive, "Entities.xml", &second)
            .unwrap();

        assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
    }

    #[test]
    fn test_empty_inventory_writes_header_only() {
        let temp_dir = TempDir::new().unwrap();
        let destination = temp_dir.path().join("empty.txt");
        let inventory = XmlExtractor::new().parse(b"<Configuration/>").unwrap();

        let summary = ListingExporter::new(ExportFormat::Text)
            .export(&inventory, &[], &sample_archive(), "Entities.xml", &destination)
            .unwrap();

        assert_eq!(summary.fqdn_groups + summary.ip_groups, 0);
        let content = fs::read_to_string(&destination).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.starts_with("# host groups exported from"));
    }

    #[test]
    fn test_json_listing_structure() {
        let temp_dir = TempDir::new().unwrap();
        let destination = temp_dir.path().join("listing.json");
        let inventory = sample_inventory();

        ListingExporter::new(ExportFormat::Json)
            .export(
                &inventory,
                &all_names(&inventory),
                &sample_archive(),
                "Entities.xml",
                &destination,
            )
            .unwrap();

        let parsed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&destination).unwrap()).unwrap();
        assert_eq!(parsed["source"], "API-FW01.tar");
        assert_eq!(parsed["groups"][0]["kind"], "FQDN");
        assert_eq!(parsed["groups"][0]["members"][0]["value"], "cdn.example.com");
        assert_eq!(parsed["groups"][1]["name"], "Servers");
        // Unresolved member carries no value key at all.
        assert!(parsed["groups"][1]["members"][1].get("value").is_none());
    }

    #[test]
    fn test_selection_filters_the_listing() {
        let temp_dir = TempDir::new().unwrap();
        let destination = temp_dir.path().join("subset.txt");
        let inventory = sample_inventory();

        ListingExporter::new(ExportFormat::Text)
            .export(
                &inventory,
                &["Servers".to_string()],
                &sample_archive(),
                "Entities.xml",
                &destination,
            )
            .unwrap();

        let content = fs::read_to_string(&destination).unwrap();
        assert!(content.contains("[IP] Servers"));
        assert!(!content.contains("WebServices"));
    }

    #[test]
    fn test_unwritable_destination_is_a_write_error() {
        let inventory = sample_inventory();
        let result = ListingExporter::new(ExportFormat::Text).export(
            &inventory,
            &[],
            &sample_archive(),
            "Entities.xml",
            Path::new("/nonexistent/xgextract/out.txt"),
        );
        assert!(matches!(result, Err(XgExtractError::WriteError { .. })));
    }

    #[test]
    fn test_export_overwrites_previous_run() {
        let temp_dir = TempDir::new().unwrap();
        let destination = temp_dir.path().join("listing.txt");
        fs::write(&destination, "stale").unwrap();
        let inventory = sample_inventory();

        ListingExporter::new(ExportFormat::Text)
            .export(
                &inventory,
                &all_names(&inventory),
                &sample_archive(),
                "Entities.xml",
                &destination,
            )
            .unwrap();

        let content = fs::read_to_string(&destination).unwrap();
        assert!(!content.contains("stale"));
    }
}
