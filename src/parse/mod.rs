//! The OFD parse pipeline
//!
//! [`Ofd::open`] and [`Ofd::from_bytes`] both route into the same archive
//! walk: parse the root `OFD.xml`, then for every `DocBody` build a
//! [`Document`] with its pages, templates, flattened resources, annotations
//! and seals.

pub mod der;
mod document;
pub mod seal;

use std::path::Path;
use std::sync::Arc;

pub use document::{Document, Page, SealInfo};
pub use seal::{extract_seal, find_all_seals, SealData};

use crate::archive::ArchiveCache;
use crate::error::{Error, Result};
use crate::model::doc::OfdRoot;

const ROOT_DOCUMENT: &str = "OFD.xml";

/// An opened OFD archive. The archive reader stays open for the lifetime of
/// this handle; the parsed trees are immutable.
pub struct Ofd {
    pub root: OfdRoot,
    pub documents: Vec<Document>,
    archive: Arc<ArchiveCache>,
}

impl Ofd {
    /// Open and parse an OFD file on disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Ofd> {
        Self::parse_archive(ArchiveCache::open(path.as_ref())?)
    }

    /// Open and parse an OFD archive from memory.
    pub fn from_bytes(data: Vec<u8>) -> Result<Ofd> {
        Self::parse_archive(ArchiveCache::from_bytes(data)?)
    }

    fn parse_archive(archive: ArchiveCache) -> Result<Ofd> {
        let root = archive
            .read_xml(ROOT_DOCUMENT, OfdRoot::from_node)
            .map_err(|e| match e {
                Error::NotFound(_) => Error::InvalidArchive("OFD.xml missing".to_string()),
                other => other,
            })?;
        let mut documents = Vec::new();
        for body in &root.bodies {
            documents.push(Document::parse(&archive, body)?);
        }
        Ok(Ofd { root, documents, archive: Arc::new(archive) })
    }

    pub fn archive(&self) -> &Arc<ArchiveCache> {
        &self.archive
    }
}
