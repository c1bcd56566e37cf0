//! OFD Convert Library
//!
//! A library for parsing OFD (Open Fixed-layout Document) archives and
//! rendering them to PDF or raster images. This library provides
//! functionality to:
//! - Open OFD archives from disk or memory and build the document tree
//! - Resolve cross-referenced resources (fonts, media, draw parameters)
//! - Extract visual seal payloads from DER signature containers
//! - Compose templates, layers, annotations and seals onto a 2D canvas
//! - Emit the result as a multi-page PDF or per-page PNG/JPEG images
//!
//! # Example
//!
//! ```no_run
//! use ofd_convert::convert;
//!
//! let mut out = std::fs::File::create("out.pdf").expect("create output");
//! convert::to_pdf("sample.ofd", &mut out).expect("Failed to convert OFD");
//! ```

pub mod archive;
pub mod convert;
pub mod error;
pub mod model;
pub mod parse;
pub mod render;
pub mod util;
mod xml;

// Re-export commonly used items
pub use error::{Error, Result};
pub use parse::Ofd;
