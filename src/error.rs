//! Error types for the OFD convert library

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the OFD convert library
#[derive(Error, Debug)]
pub enum Error {
    /// ZIP open failed or OFD.xml missing
    #[error("invalid archive: {0}")]
    InvalidArchive(String),

    /// Requested archive entry or resource id missing
    #[error("not found: {0}")]
    NotFound(String),

    /// Numeric, path-command or DER parse failure
    #[error("parse error: {0}")]
    Parse(String),

    /// XML parse failure with the archive path it happened in
    #[error("XML error in {path}: {source}")]
    Xml {
        path: String,
        #[source]
        source: roxmltree::Error,
    },

    /// Seal extractor found no qualifying sequence
    #[error("no seal payload found")]
    NoSealFound,

    /// Converter façade misused
    #[error("invalid converter configuration: {0}")]
    InvalidConfig(&'static str),

    /// Canvas backend or image failure inside render
    #[error("render error: {0}")]
    Render(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP container error
    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Image decode error
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Font error
    #[error("font error: {0}")]
    Font(String),
}
