use crate::error::{Result, XgExtractError};
use crate::parser::model::{GroupField, GroupKind, Host, HostGroup, HostValue, Inventory, RootElement};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fmt::Display;

/// Walks the configuration document for host-group and host entities.
///
/// Parsing is tolerant per entity: a group or host definition that lacks a
/// usable `Name` is skipped with a recorded warning instead of aborting the
/// run, so schema drift between firmware versions degrades gracefully. A
/// document that fails to parse at all is fatal.
pub struct XmlExtractor;

impl XmlExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, xml: &[u8]) -> Result<Inventory> {
        let mut reader = Reader::from_reader(xml);
        let mut inventory = Inventory::default();
        let mut saw_root = false;

        loop {
            match reader.read_event().map_err(|e| malformed(&reader, e))? {
                Event::Start(e) => {
                    if !saw_root {
                        saw_root = true;
                        inventory.root = read_root(&e)?;
                        continue;
                    }
                    match e.local_name().as_ref() {
                        b"FQDNHostGroup" => {
                            self.parse_group(&mut reader, GroupKind::Fqdn, &mut inventory)?
                        }
                        b"IPHostGroup" => {
                            self.parse_group(&mut reader, GroupKind::Ip, &mut inventory)?
                        }
                        b"FQDNHost" => {
                            self.parse_host(&mut reader, GroupKind::Fqdn, &mut inventory)?
                        }
                        b"IPHost" => self.parse_host(&mut reader, GroupKind::Ip, &mut inventory)?,
                        // Foreign entity sections may nest host groups, so
                        // descend instead of skipping the subtree.
                        _ => {}
                    }
                }
                Event::Empty(e) if !saw_root => {
                    saw_root = true;
                    inventory.root = read_root(&e)?;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !saw_root {
            return Err(XgExtractError::MalformedXml {
                message: "document has no root element".to_string(),
            });
        }

        Ok(inventory)
    }

    fn parse_group(
        &self,
        reader: &mut Reader<&[u8]>,
        kind: GroupKind,
        inventory: &mut Inventory,
    ) -> Result<()> {
        let start = reader.buffer_position();
        let mut name: Option<String> = None;
        let mut description: Option<String> = None;
        let mut members: Vec<String> = Vec::new();
        let mut fields: Vec<GroupField> = Vec::new();
        let mut saw_member_list = false;
        // Distinguishes a definition (child elements) from a bare
        // reference to the group somewhere else in the document.
        let mut structured = false;

        loop {
            match reader.read_event().map_err(|e| malformed(reader, e))? {
                Event::Start(e) => {
                    structured = true;
                    let tag = tag_name(&e);
                    if !saw_member_list && kind.list_tags().contains(&tag.as_str()) {
                        saw_member_list = true;
                        self.parse_member_list(reader, &tag, &mut members)?;
                        fields.push(GroupField::MemberList { tag });
                        continue;
                    }

                    let text = reader
                        .read_text(e.name())
                        .map_err(|e| malformed(reader, e))?
                        .trim()
                        .to_string();
                    match tag.as_str() {
                        "Name" if !text.is_empty() => name = Some(text.clone()),
                        "Description" if !text.is_empty() => description = Some(text.clone()),
                        _ => {}
                    }
                    fields.push(GroupField::Leaf { tag, text });
                }
                Event::Empty(e) => {
                    structured = true;
                    fields.push(GroupField::Leaf {
                        tag: tag_name(&e),
                        text: String::new(),
                    });
                }
                Event::End(_) => break,
                Event::Eof => {
                    return Err(XgExtractError::MalformedXml {
                        message: format!("unexpected end of document inside {}", kind.group_tag()),
                    })
                }
                _ => {}
            }
        }

        match name {
            Some(name) => inventory.groups.push(HostGroup {
                name,
                kind,
                description,
                members,
                fields,
            }),
            None if structured => inventory.warnings.push(format!(
                "skipping {} without a Name near byte {}",
                kind.group_tag(),
                start
            )),
            None => {}
        }

        Ok(())
    }

    fn parse_member_list(
        &self,
        reader: &mut Reader<&[u8]>,
        list_tag: &str,
        members: &mut Vec<String>,
    ) -> Result<()> {
        loop {
            match reader.read_event().map_err(|e| malformed(reader, e))? {
                Event::Start(e) => {
                    let text = reader
                        .read_text(e.name())
                        .map_err(|e| malformed(reader, e))?;
                    let text = text.trim();
                    if !text.is_empty() {
                        members.push(text.to_string());
                    }
                }
                Event::End(e) if e.local_name().as_ref() == list_tag.as_bytes() => break,
                Event::Eof => {
                    return Err(XgExtractError::MalformedXml {
                        message: "unexpected end of document inside a member list".to_string(),
                    })
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn parse_host(
        &self,
        reader: &mut Reader<&[u8]>,
        kind: GroupKind,
        inventory: &mut Inventory,
    ) -> Result<()> {
        let start = reader.buffer_position();
        let mut name: Option<String> = None;
        let mut fields: Vec<(String, String)> = Vec::new();
        let mut structured = false;

        loop {
            match reader.read_event().map_err(|e| malformed(reader, e))? {
                Event::Start(e) => {
                    structured = true;
                    let tag = tag_name(&e);
                    // Group-membership lists inside a host definition are
                    // redundant in repacked output; the group elements
                    // carry the membership.
                    if tag.ends_with("List") {
                        reader
                            .read_to_end(e.name())
                            .map_err(|e| malformed(reader, e))?;
                        continue;
                    }

                    let text = reader
                        .read_text(e.name())
                        .map_err(|e| malformed(reader, e))?
                        .trim()
                        .to_string();
                    if tag == "Name" && !text.is_empty() {
                        name = Some(text.clone());
                    }
                    fields.push((tag, text));
                }
                Event::Empty(e) => {
                    structured = true;
                    fields.push((tag_name(&e), String::new()));
                }
                Event::End(_) => break,
                Event::Eof => {
                    return Err(XgExtractError::MalformedXml {
                        message: format!("unexpected end of document inside {}", kind.host_tag()),
                    })
                }
                _ => {}
            }
        }

        match name {
            Some(name) => {
                let value = host_value(kind, &fields);
                inventory.hosts.push(Host {
                    name,
                    kind,
                    value,
                    fields,
                });
            }
            None if structured => inventory.warnings.push(format!(
                "skipping {} without a Name near byte {}",
                kind.host_tag(),
                start
            )),
            // A bare reference element, not a definition.
            None => {}
        }

        Ok(())
    }
}

impl Default for XmlExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn host_value(kind: GroupKind, fields: &[(String, String)]) -> Option<HostValue> {
    let get = |tag: &str| {
        fields
            .iter()
            .find(|(t, _)| t == tag)
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.is_empty())
    };

    match kind {
        GroupKind::Fqdn => get("FQDN").map(|s| HostValue::Fqdn(s.to_string())),
        GroupKind::Ip => {
            if let (Some(start), Some(end)) = (get("StartIPAddress"), get("EndIPAddress")) {
                return Some(HostValue::Range {
                    start: start.to_string(),
                    end: end.to_string(),
                });
            }
            if let (Some(address), Some(netmask)) = (get("IPAddress"), get("Subnet")) {
                return Some(HostValue::Network {
                    address: address.to_string(),
                    netmask: netmask.to_string(),
                });
            }
            get("IPAddress").map(|s| HostValue::Address(s.to_string()))
        }
    }
}

fn tag_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).to_string()
}

fn read_root(e: &BytesStart) -> Result<RootElement> {
    let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
    let mut attributes = Vec::new();

    for attr in e.attributes() {
        let attr = attr.map_err(|e| XgExtractError::MalformedXml {
            message: format!("bad attribute on root element: {}", e),
        })?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| XgExtractError::MalformedXml {
                message: format!("bad attribute on root element: {}", e),
            })?
            .to_string();
        attributes.push((key, value));
    }

    Ok(RootElement { tag, attributes })
}

fn malformed<E: Display>(reader: &Reader<&[u8]>, error: E) -> XgExtractError {
    XgExtractError::MalformedXml {
        message: format!("{} at byte {}", error, reader.buffer_position()),
    }
}
