//! In-memory model of an OFD archive
//!
//! Scalar types, the document tree, page content, resources, annotations
//! and signatures. All of these are plain data: they are produced by the
//! parser and read by the renderer, and are immutable after parse.

pub mod annot;
pub mod doc;
pub mod loc;
pub mod page;
pub mod path;
pub mod res;
pub mod scalar;
pub mod sig;

// Re-export commonly used items
pub use loc::Loc;
pub use path::{ArcData, PathCommand, PathData};
pub use scalar::{DateTime, FloatArray, Id, IntArray, Matrix, Pos, RefId, Rgba, StBox};
