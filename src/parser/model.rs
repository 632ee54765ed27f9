use serde::Serialize;
use std::fmt;

/// The two host-group families a Sophos XG configuration export carries.
///
/// Ordering is part of the output contract: FQDN groups sort before IP
/// groups in exported listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum GroupKind {
    #[serde(rename = "FQDN")]
    Fqdn,
    #[serde(rename = "IP")]
    Ip,
}

impl GroupKind {
    /// XML element name of the group entity.
    pub fn group_tag(self) -> &'static str {
        match self {
            GroupKind::Fqdn => "FQDNHostGroup",
            GroupKind::Ip => "IPHostGroup",
        }
    }

    /// XML element name of the host entity this family references.
    pub fn host_tag(self) -> &'static str {
        match self {
            GroupKind::Fqdn => "FQDNHost",
            GroupKind::Ip => "IPHost",
        }
    }

    /// Member-list element names accepted inside a group, in match order.
    /// Firmware versions differ on which one they emit.
    pub fn list_tags(self) -> [&'static str; 2] {
        match self {
            GroupKind::Fqdn => ["FQDNHostList", "HostList"],
            GroupKind::Ip => ["IPHostList", "HostList"],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GroupKind::Fqdn => "FQDN",
            GroupKind::Ip => "IP",
        }
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The address payload of a host definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum HostValue {
    Fqdn(String),
    Address(String),
    Range { start: String, end: String },
    Network { address: String, netmask: String },
}

impl fmt::Display for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostValue::Fqdn(s) | HostValue::Address(s) => f.write_str(s),
            HostValue::Range { start, end } => write!(f, "{}-{}", start, end),
            HostValue::Network { address, netmask } => write!(f, "{}/{}", address, netmask),
        }
    }
}

/// A host definition found in the document ("dependent entity" in the
/// firewall's export dialog). Leaf children are kept verbatim so a
/// filtered archive can reproduce the element.
#[derive(Debug, Clone, Serialize)]
pub struct Host {
    pub name: String,
    pub kind: GroupKind,
    pub value: Option<HostValue>,
    #[serde(skip)]
    pub fields: Vec<(String, String)>,
}

/// One child of a group element, in document order. The member list keeps
/// its position so repacked XML round-trips through the firewall importer.
#[derive(Debug, Clone)]
pub enum GroupField {
    Leaf { tag: String, text: String },
    MemberList { tag: String },
}

/// A named collection of host references of one [`GroupKind`].
#[derive(Debug, Clone, Serialize)]
pub struct HostGroup {
    pub name: String,
    pub kind: GroupKind,
    pub description: Option<String>,
    /// Member host names in declaration order.
    pub members: Vec<String>,
    #[serde(skip)]
    pub fields: Vec<GroupField>,
}

/// Root element of the configuration document, preserved for repacking.
#[derive(Debug, Clone, Default)]
pub struct RootElement {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
}

/// Everything one parse pass extracts from the configuration XML.
#[derive(Debug, Default)]
pub struct Inventory {
    pub root: RootElement,
    /// Groups of both kinds in document order.
    pub groups: Vec<HostGroup>,
    /// Host definitions in document order.
    pub hosts: Vec<Host>,
    /// Per-entity skip notices collected by the partial-success policy.
    pub warnings: Vec<String>,
}

impl Inventory {
    pub fn host(&self, kind: GroupKind, name: &str) -> Option<&Host> {
        self.hosts.iter().find(|h| h.kind == kind && h.name == name)
    }

    pub fn group_count(&self, kind: GroupKind) -> usize {
        self.groups.iter().filter(|g| g.kind == kind).count()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
