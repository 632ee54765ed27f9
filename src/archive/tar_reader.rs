use crate::error::{Result, XgExtractError};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// The configuration document pulled out of a backup archive.
#[derive(Debug, Clone)]
pub struct ConfigPayload {
    /// Name of the tar entry the document came from, reused verbatim when
    /// repacking so a filtered archive stays importable.
    pub entry_name: String,
    pub bytes: Vec<u8>,
}

/// Opens a backup tar and locates the embedded configuration XML.
pub struct ArchiveReader;

impl ArchiveReader {
    pub fn new() -> Self {
        Self
    }

    /// Yields the first regular `.xml` entry of the archive.
    pub fn read_config<P: AsRef<Path>>(&self, path: P) -> Result<ConfigPayload> {
        let path = path.as_ref();

        let file = File::open(path).map_err(|e| corrupt(path, e))?;
        let mut archive = tar::Archive::new(file);

        let entries = archive.entries().map_err(|e| corrupt(path, e))?;
        for entry in entries {
            let mut entry = entry.map_err(|e| corrupt(path, e))?;

            if !entry.header().entry_type().is_file() {
                continue;
            }

            let entry_name = {
                let entry_path = entry.path().map_err(|e| corrupt(path, e))?;
                entry_path.to_string_lossy().to_string()
            };
            if !entry_name.to_lowercase().ends_with(".xml") {
                continue;
            }

            let mut bytes = Vec::with_capacity(entry.size() as usize);
            entry
                .read_to_end(&mut bytes)
                .map_err(|e| corrupt(path, e))?;

            return Ok(ConfigPayload { entry_name, bytes });
        }

        Err(XgExtractError::ConfigNotFound {
            archive: path.display().to_string(),
        })
    }
}

impl Default for ArchiveReader {
    fn default() -> Self {
        Self::new()
    }
}

fn corrupt(path: &Path, error: std::io::Error) -> XgExtractError {
    XgExtractError::ArchiveCorrupt {
        path: path.display().to_string(),
        message: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_tar(dir: &Path, name: &str, entries: &[(&str, &[u8])]) -> PathBuf {
        let path = dir.join(name);
        let file = File::create(&path).unwrap();
        let mut builder = tar::Builder::new(file);
        for (entry_name, data) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, entry_name, *data).unwrap();
        }
        builder.finish().unwrap();
        path
    }

    #[test]
    fn test_reads_xml_entry() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_tar(
            temp_dir.path(),
            "API-1.tar",
            &[("readme.txt", b"hi"), ("Entities.xml", b"<Configuration/>")],
        );

        let payload = ArchiveReader::new().read_config(&path).unwrap();
        assert_eq!(payload.entry_name, "Entities.xml");
        assert_eq!(payload.bytes, b"<Configuration/>");
    }

    #[test]
    fn test_entry_suffix_match_is_case_insensitive() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_tar(temp_dir.path(), "API-1.tar", &[("EXPORT.XML", b"<a/>")]);

        let payload = ArchiveReader::new().read_config(&path).unwrap();
        assert_eq!(payload.entry_name, "EXPORT.XML");
    }

    #[test]
    fn test_missing_xml_entry() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_tar(temp_dir.path(), "API-1.tar", &[("readme.txt", b"hi")]);

        let result = ArchiveReader::new().read_config(&path);
        assert!(matches!(result, Err(XgExtractError::ConfigNotFound { .. })));
    }

    #[test]
    fn test_garbage_archive() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("API-junk.tar");
        fs::write(&path, vec![0xFFu8; 1024]).unwrap();

        let result = ArchiveReader::new().read_config(&path);
        assert!(matches!(result, Err(XgExtractError::ArchiveCorrupt { .. })));
    }

    #[test]
    fn test_missing_file() {
        let result = ArchiveReader::new().read_config("/nonexistent/API-void.tar");
        assert!(matches!(result, Err(XgExtractError::ArchiveCorrupt { .. })));
    }
}
