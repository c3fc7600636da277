//! # sigproj-fiff
//!
//! Projection-record layer for signal-space projection (SSP) data.
//!
//! This crate provides:
//! - **Tagged-tree surface**: `TreeNode` / `TreeSink` — the minimal slice of a
//!   tagged hierarchical container that the projection block lives in, plus an
//!   in-memory `TreeBuilder` sink
//! - **Value types**: `ProjectionItem` and `NamedMatrix`, the immutable records
//!   everything downstream consumes
//! - **Reader/Writer**: `read_proj` and `write_proj`, a round-trip pair over the
//!   projection block
//!
//! ## Example
//!
//! ```ignore
//! use sigproj_fiff::{read_proj, write_proj, TreeBuilder};
//!
//! let mut sink = TreeBuilder::new();
//! write_proj(&mut sink, &items);
//! let tree = sink.finish();
//! let restored = read_proj(&tree)?;
//! ```

pub mod constants;

mod item;
mod reader;
mod tree;
mod writer;

pub use item::{ItemKind, NamedMatrix, NamedMatrixError, ProjectionItem};
pub use reader::{read_proj, ProjReadError};
pub use tree::{MatrixTag, Tag, TagValue, TreeBuilder, TreeNode, TreeSink};
pub use writer::write_proj;
