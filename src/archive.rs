//! Random-access, memoised file lookup inside the OFD container
//!
//! The archive is slurped into memory and read through a cursor, which keeps
//! the reader shareable and makes the file and byte-buffer entry points
//! symmetrical. Entry names are indexed once, on first lookup, with a
//! leading `/` stripped so absolute archive locations resolve directly.

use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::Path;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use zip::ZipArchive;

use crate::error::{Error, Result};

#[derive(Debug)]
pub struct ArchiveCache {
    archive: Mutex<ZipArchive<Cursor<Vec<u8>>>>,
    /// Stripped entry name → actual entry name.
    entries: OnceCell<HashMap<String, String>>,
}

impl ArchiveCache {
    /// Open an archive from a file on disk.
    pub fn open(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)
            .map_err(|e| Error::InvalidArchive(format!("{}: {e}", path.display())))?;
        Self::from_bytes(data)
    }

    /// Open an archive from an in-memory byte buffer.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let archive = ZipArchive::new(Cursor::new(data))
            .map_err(|e| Error::InvalidArchive(e.to_string()))?;
        Ok(ArchiveCache { archive: Mutex::new(archive), entries: OnceCell::new() })
    }

    /// The entry-name map, built on first access.
    fn entries(&self) -> &HashMap<String, String> {
        self.entries.get_or_init(|| {
            let archive = self.archive.lock();
            archive
                .file_names()
                .map(|name| (name.trim_start_matches('/').to_string(), name.to_string()))
                .collect()
        })
    }

    fn entry_name(&self, path: &str) -> Result<String> {
        self.entries()
            .get(path.trim_start_matches('/'))
            .cloned()
            .ok_or_else(|| Error::NotFound(path.to_string()))
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries().contains_key(path.trim_start_matches('/'))
    }

    /// Raw uncompressed bytes of an entry.
    pub fn read_bytes(&self, path: &str) -> Result<Vec<u8>> {
        let name = self.entry_name(path)?;
        let mut archive = self.archive.lock();
        let mut file = archive.by_name(&name)?;
        // Bound the read to the declared size plus a little slack, so a
        // corrupt entry cannot balloon.
        let limit = file.size() + 1024;
        let mut buf = Vec::with_capacity(file.size() as usize);
        file.by_ref().take(limit).read_to_end(&mut buf)?;
        Ok(buf)
    }

    /// Parse an XML entry and hand its root element to `f`.
    pub fn read_xml<T>(
        &self,
        path: &str,
        f: impl FnOnce(roxmltree::Node) -> Result<T>,
    ) -> Result<T> {
        let bytes = self.read_bytes(path)?;
        let text = String::from_utf8(bytes)
            .map_err(|e| Error::Parse(format!("{path}: not valid UTF-8: {e}")))?;
        let doc = roxmltree::Document::parse(&text)
            .map_err(|source| Error::Xml { path: path.to_string(), source })?;
        f(doc.root_element()).map_err(|e| match e {
            Error::Parse(msg) => Error::Parse(format!("{path}: {msg}")),
            other => other,
        })
    }

    /// Decode an image entry; the format is sniffed from the content.
    pub fn read_image(&self, path: &str) -> Result<image::RgbaImage> {
        let bytes = self.read_bytes(path)?;
        Ok(image::load_from_memory(&bytes)?.to_rgba8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn sample_archive() -> ArchiveCache {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        writer.start_file("OFD.xml", options).unwrap();
        writer.write_all(b"<OFD Version=\"1.0\"><DocBody><DocRoot>Doc_0/Document.xml</DocRoot></DocBody></OFD>").unwrap();
        writer.start_file("Doc_0/data.bin", options).unwrap();
        writer.write_all(&[1, 2, 3]).unwrap();
        let data = writer.finish().unwrap().into_inner();
        ArchiveCache::from_bytes(data).unwrap()
    }

    #[test]
    fn test_read_bytes_and_leading_slash() {
        let cache = sample_archive();
        assert_eq!(cache.read_bytes("Doc_0/data.bin").unwrap(), vec![1, 2, 3]);
        assert_eq!(cache.read_bytes("/Doc_0/data.bin").unwrap(), vec![1, 2, 3]);
        assert!(cache.contains("/OFD.xml"));
    }

    #[test]
    fn test_missing_entry_is_not_found() {
        let cache = sample_archive();
        match cache.read_bytes("/nope.xml") {
            Err(Error::NotFound(path)) => assert_eq!(path, "/nope.xml"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_read_xml() {
        let cache = sample_archive();
        let version = cache
            .read_xml("OFD.xml", |root| {
                Ok(crate::xml::attr(root, "Version").unwrap_or("").to_string())
            })
            .unwrap();
        assert_eq!(version, "1.0");
    }

    #[test]
    fn test_read_xml_error_carries_path() {
        let cache = sample_archive();
        let err = cache.read_xml("Doc_0/data.bin", |_| Ok(())).unwrap_err();
        assert!(err.to_string().contains("Doc_0/data.bin"), "{err}");
    }

    #[test]
    fn test_invalid_archive() {
        match ArchiveCache::from_bytes(vec![0; 16]) {
            Err(Error::InvalidArchive(_)) => {}
            other => panic!("expected InvalidArchive, got {other:?}"),
        }
    }
}
