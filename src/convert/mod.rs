//! Converter façade: OFD in, PDF or raster images out

mod image;
mod pdf;

use std::path::{Path, PathBuf};

pub use self::image::{to_images, FileWriter, ImageOptions, ImageWriter, OutputFormat};
pub use self::pdf::to_pdf;

use crate::error::Result;
use crate::parse::Ofd;

/// Converter input: a file on disk or an archive already in memory.
pub enum Source {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl Source {
    pub(crate) fn open(self) -> Result<Ofd> {
        match self {
            Source::Path(path) => Ofd::open(path),
            Source::Bytes(data) => Ofd::from_bytes(data),
        }
    }
}

impl From<&Path> for Source {
    fn from(path: &Path) -> Self {
        Source::Path(path.to_path_buf())
    }
}

impl From<PathBuf> for Source {
    fn from(path: PathBuf) -> Self {
        Source::Path(path)
    }
}

impl From<&str> for Source {
    fn from(path: &str) -> Self {
        Source::Path(PathBuf::from(path))
    }
}

impl From<Vec<u8>> for Source {
    fn from(data: Vec<u8>) -> Self {
        Source::Bytes(data)
    }
}
