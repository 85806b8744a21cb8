//! COLLADA (DAE) reading: shared-index triangulation and skin weight
//! resolution over a `roxmltree` front-end.

mod animation;
mod document;
mod input;
mod material;
mod reader;
mod skeleton;
mod skin;
mod source;
mod triangulate;
mod types;
pub mod xml;

use std::{fs, path::Path};

use anyhow::Context;

use crate::error::DaeError;

pub use animation::{Animation, Channel, Sampler, SamplerData};
pub use document::{Controller, Document, Geometry, Mesh};
pub use input::{InputBinding, InputBindingMap, ResolvedInput, UnsharedInputs, VerticesDecl};
pub use material::Material;
pub use skeleton::{Joints, Node, VisualScene};
pub use skin::{Influence, SkinBinding, SkinRecord, VertexInfluences, VertexWeights};
pub use source::{Source, SourceTable, reference_matches};
pub use triangulate::{
    AttributeBuffer, IndexedPrimitiveBlock, InterleavedBuffer, Triangulator, VertexLayout,
};
pub use types::{
    DocumentSummary, GeometrySummary, JOINT_NODE_TYPE, ParseOptions, ReferenceMatching, Semantic,
    SkinSummary,
};

/// Parses a COLLADA document held in memory.
///
/// # Errors
///
/// Fails on malformed XML, a root other than `<COLLADA>`, and malformed
/// numeric tokens. Missing optional data is not an error.
pub fn parse_str(text: &str, options: ParseOptions) -> Result<Document, DaeError> {
    let xml = roxmltree::Document::parse(text)?;
    reader::read_document(&xml, options)
}

/// Same as [`parse_str`] for raw bytes; a UTF-8 byte order mark is skipped.
pub fn parse_slice(bytes: &[u8], options: ParseOptions) -> Result<Document, DaeError> {
    let text = std::str::from_utf8(bytes)?;
    parse_str(text.strip_prefix('\u{feff}').unwrap_or(text), options)
}

/// Reads and parses a `.dae` file.
pub fn parse_file(path: impl AsRef<Path>, options: ParseOptions) -> anyhow::Result<Document> {
    let path = path.as_ref();
    let bytes =
        fs::read(path).with_context(|| format!("failed to read input file: {}", path.display()))?;
    parse_slice(&bytes, options)
        .with_context(|| format!("failed to parse COLLADA document: {}", path.display()))
}
