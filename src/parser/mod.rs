pub mod model;
pub mod selection;
pub mod xml_extractor;

pub use model::{GroupField, GroupKind, Host, HostGroup, HostValue, Inventory, RootElement};
pub use selection::resolve_selection;
pub use xml_extractor::XmlExtractor;
