use crate::error::{Result, XgExtractError};
use crate::parser::{GroupField, Host, HostGroup, Inventory};
use chrono::Utc;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde::Serialize;
use std::fs::File;
use std::path::Path;

#[derive(Debug, Clone, Serialize)]
pub struct RepackSummary {
    pub destination: String,
    pub groups: usize,
    pub hosts: usize,
    pub bytes_written: u64,
}

/// Writes a filtered configuration archive: the selected groups plus each
/// host definition they reference, wrapped in a fresh tar whose single
/// entry reuses the source entry name so the firewall importer accepts it.
pub struct RepackWriter {
    force_overwrite: bool,
}

impl RepackWriter {
    pub fn new() -> Self {
        Self {
            force_overwrite: false,
        }
    }

    pub fn with_force_overwrite(mut self, force: bool) -> Self {
        self.force_overwrite = force;
        self
    }

    pub fn write(
        &self,
        inventory: &Inventory,
        selected: &[String],
        entry_name: &str,
        destination: &Path,
    ) -> Result<RepackSummary> {
        if destination.exists() && !self.force_overwrite {
            return Err(XgExtractError::OutputExists {
                path: destination.display().to_string(),
            });
        }

        let groups: Vec<&HostGroup> = inventory
            .groups
            .iter()
            .filter(|g| selected.contains(&g.name))
            .collect();

        // Referenced host definitions, once each, in first-reference order.
        let mut hosts: Vec<&Host> = Vec::new();
        for group in &groups {
            for member in &group.members {
                if let Some(host) = inventory.host(group.kind, member) {
                    if !hosts
                        .iter()
                        .any(|h| h.kind == host.kind && h.name == host.name)
                    {
                        hosts.push(host);
                    }
                }
            }
        }

        let xml = render_xml(inventory, &groups, &hosts)
            .map_err(|e| write_error(destination, e))?;

        let file = File::create(destination).map_err(|e| write_error(destination, e))?;
        let mut builder = tar::Builder::new(file);

        let mut header = tar::Header::new_gnu();
        header.set_size(xml.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(Utc::now().timestamp() as u64);
        header.set_cksum();
        builder
            .append_data(&mut header, entry_name, xml.as_slice())
            .map_err(|e| write_error(destination, e))?;
        builder.finish().map_err(|e| write_error(destination, e))?;

        Ok(RepackSummary {
            destination: destination.display().to_string(),
            groups: groups.len(),
            hosts: hosts.len(),
            bytes_written: xml.len() as u64,
        })
    }
}

impl Default for RepackWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn render_xml(
    inventory: &Inventory,
    groups: &[&HostGroup],
    hosts: &[&Host],
) -> std::result::Result<Vec<u8>, quick_xml::Error> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    let mut root = BytesStart::new(inventory.root.tag.as_str());
    for (key, value) in &inventory.root.attributes {
        root.push_attribute((key.as_str(), value.as_str()));
    }
    writer.write_event(Event::Start(root))?;

    for host in hosts {
        writer.write_event(Event::Start(BytesStart::new(host.kind.host_tag())))?;
        for (tag, text) in &host.fields {
            write_leaf(&mut writer, tag, text)?;
        }
        writer.write_event(Event::End(BytesEnd::new(host.kind.host_tag())))?;
    }

    for group in groups {
        writer.write_event(Event::Start(BytesStart::new(group.kind.group_tag())))?;
        for field in &group.fields {
            match field {
                GroupField::Leaf { tag, text } => write_leaf(&mut writer, tag, text)?,
                GroupField::MemberList { tag } => {
                    let member_tag = tag.strip_suffix("List").unwrap_or("Host");
                    writer.write_event(Event::Start(BytesStart::new(tag.as_str())))?;
                    for member in &group.members {
                        write_leaf(&mut writer, member_tag, member)?;
                    }
                    writer.write_event(Event::End(BytesEnd::new(tag.as_str())))?;
                }
            }
        }
        writer.write_event(Event::End(BytesEnd::new(group.kind.group_tag())))?;
    }

    writer.write_event(Event::End(BytesEnd::new(inventory.root.tag.as_str())))?;

    Ok(writer.into_inner())
}

fn write_leaf(
    writer: &mut Writer<Vec<u8>>,
    tag: &str,
    text: &str,
) -> std::result::Result<(), quick_xml::Error> {
    if text.is_empty() {
        writer.write_event(Event::Empty(BytesStart::new(tag)))?;
    } else {
        writer.write_event(Event::Start(BytesStart::new(tag)))?;
        writer.write_event(Event::Text(BytesText::new(text)))?;
        writer.write_event(Event::End(BytesEnd::new(tag)))?;
    }
    Ok(())
}

fn write_error<E: std::fmt::Display>(destination: &Path, error: E) -> XgExtractError {
    XgExtractError::WriteError {
        path: destination.display().to_string(),
        message: error.to_string(),
    }
}
