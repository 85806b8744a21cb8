use log::warn;
use serde::{Deserialize, Serialize};

use super::input::InputBindingMap;
use super::source::SourceTable;
use super::types::{
    DEFAULT_NORMAL_STRIDE, DEFAULT_POSITION_STRIDE, DEFAULT_TEXCOORD_STRIDE, Semantic,
};

// ─── Primitive block ──────────────────────────────────────────────────────────

/// One `<triangles>` element: its inputs and the flat composite index stream.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IndexedPrimitiveBlock {
    pub inputs: InputBindingMap,
    pub raw_indices: Vec<i32>,
    pub triangle_count: usize,
    /// Material symbol from the `material` attribute.
    pub material: Option<String>,
}

impl IndexedPrimitiveBlock {
    /// Integers per composite index record.
    pub fn stride(&self) -> usize {
        self.inputs.stride()
    }

    /// `true` when the index stream holds exactly `triangle_count * 3` records.
    pub fn is_well_formed(&self) -> bool {
        self.triangle_count
            .checked_mul(3)
            .and_then(|corners| corners.checked_mul(self.stride()))
            .is_some_and(|len| len == self.raw_indices.len())
    }

    /// Triangle corners the index stream can actually address: the declared
    /// count, capped by the records present (a trailing partial record counts).
    pub fn corner_count(&self) -> usize {
        let stride = self.stride();
        if stride == 0 {
            return 0;
        }
        self.triangle_count
            .saturating_mul(3)
            .min(self.raw_indices.len().div_ceil(stride))
    }
}

// ─── Output buffers ───────────────────────────────────────────────────────────

/// Components per attribute in an interleaved vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexLayout {
    pub position: usize,
    pub normal: Option<usize>,
    pub tex_coord: Option<usize>,
}

impl VertexLayout {
    /// Floats per interleaved vertex.
    pub fn width(&self) -> usize {
        self.position
            .saturating_add(self.normal.unwrap_or(0))
            .saturating_add(self.tex_coord.unwrap_or(0))
    }
}

/// `[position, normal?, texcoord?]` per triangle corner, in stream order.
#[derive(Debug, Clone, PartialEq)]
pub struct InterleavedBuffer {
    pub layout: VertexLayout,
    pub data: Vec<f32>,
    /// Length the buffer would have without any bounds violation.
    pub expected_len: usize,
}

impl InterleavedBuffer {
    pub fn is_truncated(&self) -> bool {
        self.data.len() < self.expected_len
    }
}

/// A single attribute gathered per triangle corner.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeBuffer {
    pub semantic: Semantic,
    pub components: usize,
    pub data: Vec<f32>,
    pub expected_len: usize,
}

impl AttributeBuffer {
    pub fn is_truncated(&self) -> bool {
        self.data.len() < self.expected_len
    }
}

// ─── Triangulator ─────────────────────────────────────────────────────────────

/// An attribute stream ready to be gathered: record offset plus value groups.
struct Stream<'a> {
    offset: usize,
    components: usize,
    data: &'a [f32],
}

/// Dereferences a block's shared index stream into dense per-corner buffers.
///
/// Borrows the mesh's source table and one block; nothing is cached, so
/// repeated calls produce identical output.
pub struct Triangulator<'a> {
    sources: &'a SourceTable,
    block: &'a IndexedPrimitiveBlock,
}

impl<'a> Triangulator<'a> {
    pub fn new(sources: &'a SourceTable, block: &'a IndexedPrimitiveBlock) -> Self {
        Self { sources, block }
    }

    /// Attribute widths of the interleaved output, or `None` without positions.
    pub fn layout(&self) -> Option<VertexLayout> {
        let position = self.stream(&Semantic::Position)?;
        Some(VertexLayout {
            position: position.components,
            normal: self.stream(&Semantic::Normal).map(|s| s.components),
            tex_coord: self.stream(&Semantic::TexCoord).map(|s| s.components),
        })
    }

    /// Interleaved `[position, normal?, texcoord?]` buffer.
    ///
    /// # Returns
    ///
    /// `None` when the block has no indices or no resolvable position source.
    /// Bounds violations shorten the buffer instead of padding it.
    pub fn interleaved(&self) -> Option<InterleavedBuffer> {
        if self.block.raw_indices.is_empty() || self.block.stride() == 0 {
            return None;
        }

        let position = self.stream(&Semantic::Position)?;
        let normal = self.stream(&Semantic::Normal);
        let tex_coord = self.stream(&Semantic::TexCoord);
        let layout = VertexLayout {
            position: position.components,
            normal: normal.as_ref().map(|s| s.components),
            tex_coord: tex_coord.as_ref().map(|s| s.components),
        };

        let streams: Vec<Stream<'_>> = [Some(position), normal, tex_coord]
            .into_iter()
            .flatten()
            .collect();
        let expected_len = self.expected_len(layout.width());
        let data = self.gather(&streams);
        if data.len() < expected_len {
            warn!(
                "interleaved buffer truncated: {} of {} floats",
                data.len(),
                expected_len
            );
        }

        Some(InterleavedBuffer {
            layout,
            data,
            expected_len,
        })
    }

    pub fn positions(&self) -> Option<AttributeBuffer> {
        self.attribute(Semantic::Position)
    }

    pub fn normals(&self) -> Option<AttributeBuffer> {
        self.attribute(Semantic::Normal)
    }

    pub fn tex_coords(&self) -> Option<AttributeBuffer> {
        self.attribute(Semantic::TexCoord)
    }

    /// Single-attribute buffer using the same offset logic as
    /// [`Triangulator::interleaved`]. `None` when the semantic is unbound.
    pub fn attribute(&self, semantic: Semantic) -> Option<AttributeBuffer> {
        if self.block.raw_indices.is_empty() || self.block.stride() == 0 {
            return None;
        }

        let stream = self.stream(&semantic)?;
        let components = stream.components;
        let expected_len = self.expected_len(components);
        let data = self.gather(std::slice::from_ref(&stream));
        if data.len() < expected_len {
            warn!(
                "{} buffer truncated: {} of {} floats",
                semantic,
                data.len(),
                expected_len
            );
        }

        Some(AttributeBuffer {
            semantic,
            components,
            data,
            expected_len,
        })
    }

    fn expected_len(&self, width: usize) -> usize {
        self.block.triangle_count.saturating_mul(3).saturating_mul(width)
    }

    /// Binding offset plus backing data for a semantic, if both resolve.
    fn stream(&self, semantic: &Semantic) -> Option<Stream<'a>> {
        let resolved = self.block.inputs.resolve(semantic)?;
        let source = self.sources.get(resolved.source_id)?;
        let default_stride = match semantic {
            Semantic::Position => DEFAULT_POSITION_STRIDE,
            Semantic::Normal => DEFAULT_NORMAL_STRIDE,
            Semantic::TexCoord => DEFAULT_TEXCOORD_STRIDE,
            _ => 1,
        };

        Some(Stream {
            offset: resolved.offset,
            components: source.stride_or(default_stride),
            data: source.float_data(),
        })
    }

    /// Walks triangle → corner → stream, copying each value group in order.
    ///
    /// Only corners backed by the index stream are visited, so a declared
    /// triangle count larger than the stream costs nothing.
    fn gather(&self, streams: &[Stream<'_>]) -> Vec<f32> {
        let stride = self.block.stride();
        let raw = &self.block.raw_indices;
        let corners = self.block.corner_count();
        let width = streams
            .iter()
            .map(|stream| stream.components.min(stream.data.len()))
            .fold(0usize, usize::saturating_add);
        let mut out = Vec::with_capacity(corners.saturating_mul(width));

        for corner in 0..corners {
            let record_start = corner * stride;
            for stream in streams {
                let Some(&index) = record_start
                    .checked_add(stream.offset)
                    .and_then(|position| raw.get(position))
                else {
                    continue;
                };
                let Ok(index) = usize::try_from(index) else {
                    continue;
                };
                let Some(start) = index.checked_mul(stream.components) else {
                    continue;
                };
                if start >= stream.data.len() {
                    continue;
                }
                let end = start.saturating_add(stream.components).min(stream.data.len());
                out.extend_from_slice(&stream.data[start..end]);
            }
        }

        out
    }
}
