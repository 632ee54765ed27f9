pub mod tar_reader;

pub use tar_reader::{ArchiveReader, ConfigPayload};
