use log::{debug, warn};
use nalgebra::Matrix4;

use super::input::{InputBindingMap, UnsharedInputs};
use super::source::SourceTable;
use super::types::Semantic;
use crate::math::{IDENTITY_MATRIX, matrix_block, matrix_from_row_major};

// ─── Influence table ──────────────────────────────────────────────────────────

/// One (joint, weight) pair as encoded by the `v` stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Influence {
    /// Index into the skin's joint names, kept exactly as the stream encoded it.
    pub joint: i32,
    pub weight: f32,
}

/// Variable-width per-vertex influence lists stored as one flat arena.
///
/// `offsets[i]..offsets[i + 1]` is the range of vertex `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexInfluences {
    offsets: Vec<usize>,
    influences: Vec<Influence>,
}

impl Default for VertexInfluences {
    fn default() -> Self {
        Self {
            offsets: vec![0],
            influences: Vec::new(),
        }
    }
}

impl VertexInfluences {
    fn with_capacity(vertices: usize, influences: usize) -> Self {
        let mut offsets = Vec::with_capacity(vertices + 1);
        offsets.push(0);
        Self {
            offsets,
            influences: Vec::with_capacity(influences),
        }
    }

    fn push(&mut self, influence: Influence) {
        self.influences.push(influence);
    }

    fn close_vertex(&mut self) {
        self.offsets.push(self.influences.len());
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, vertex: usize) -> Option<&[Influence]> {
        let start = *self.offsets.get(vertex)?;
        let end = *self.offsets.get(vertex + 1)?;
        self.influences.get(start..end)
    }

    pub fn iter(&self) -> impl Iterator<Item = &[Influence]> {
        self.offsets
            .windows(2)
            .map(|range| &self.influences[range[0]..range[1]])
    }

    /// Every pair of every vertex, in stream order.
    pub fn flat(&self) -> &[Influence] {
        &self.influences
    }

    /// Longest list actually resolved.
    pub fn max_influences(&self) -> usize {
        self.iter().map(<[Influence]>::len).max().unwrap_or(0)
    }
}

// ─── Skin records ─────────────────────────────────────────────────────────────

/// `<vertex_weights>` as read from the document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VertexWeights {
    pub count: usize,
    pub inputs: InputBindingMap,
    pub vcount: Vec<u32>,
    pub v: Vec<i32>,
}

/// `<skin>` as read from the document, before resolution.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SkinRecord {
    pub source_geometry_id: String,
    /// Present only when the document held exactly 16 values.
    pub bind_shape_matrix: Option<[f32; 16]>,
    pub sources: SourceTable,
    pub joints: UnsharedInputs,
    pub vertex_weights: Option<VertexWeights>,
}

// ─── Skin binding ─────────────────────────────────────────────────────────────

/// Resolved bind-time skinning data for one controller.
#[derive(Debug, Clone, PartialEq)]
pub struct SkinBinding {
    source_geometry_id: String,
    bind_shape_matrix: [f32; 16],
    joint_names: Vec<String>,
    inverse_bind_matrices: Vec<f32>,
    weight_values: Vec<f32>,
    vertex_influences: VertexInfluences,
    max_joint_influences: usize,
    expected_influences: usize,
}

impl SkinBinding {
    /// Resolves a skin record into its influence table and joint data.
    ///
    /// # Arguments
    ///
    /// * `record` - The `<skin>` element's sources and inputs.
    ///
    /// # Returns
    ///
    /// The binding. Missing pieces narrow the result (no joints, empty
    /// influence lists, identity matrices) rather than failing.
    pub fn resolve(record: &SkinRecord) -> Self {
        let joint_names = resolve_joint_names(record);
        let inverse_bind_matrices = resolve_inverse_bind_matrices(record, joint_names.len());

        let (weight_values, vertex_influences, max_joint_influences, expected_influences) =
            match &record.vertex_weights {
                Some(weights) => {
                    let weight_values = weights
                        .inputs
                        .binding(&Semantic::Weight)
                        .and_then(|binding| record.sources.as_float_slice(&binding.source_id))
                        .unwrap_or_default()
                        .to_vec();
                    let influences = resolve_influences(weights, &weight_values);
                    let max = weights.vcount.iter().copied().max().unwrap_or(0) as usize;
                    let expected = declared_influences(&weights.vcount);
                    (weight_values, influences, max, expected)
                }
                None => (Vec::new(), VertexInfluences::default(), 0, 0),
            };

        debug!(
            "skin of {}: {} joints, {} vertices, up to {} influences",
            record.source_geometry_id,
            joint_names.len(),
            vertex_influences.len(),
            max_joint_influences
        );

        Self {
            source_geometry_id: record.source_geometry_id.clone(),
            bind_shape_matrix: record.bind_shape_matrix.unwrap_or(IDENTITY_MATRIX),
            joint_names,
            inverse_bind_matrices,
            weight_values,
            vertex_influences,
            max_joint_influences,
            expected_influences,
        }
    }

    pub fn source_geometry_id(&self) -> &str {
        &self.source_geometry_id
    }

    /// Row-major bind shape matrix; identity when the document had none.
    pub fn bind_shape_matrix(&self) -> &[f32; 16] {
        &self.bind_shape_matrix
    }

    pub fn bind_shape_matrix4(&self) -> Matrix4<f32> {
        matrix_from_row_major(&self.bind_shape_matrix)
    }

    pub fn joint_names(&self) -> &[String] {
        &self.joint_names
    }

    pub fn joint_count(&self) -> usize {
        self.joint_names.len()
    }

    pub fn joint_index(&self, name: &str) -> Option<usize> {
        self.joint_names.iter().position(|joint| joint == name)
    }

    /// All inverse-bind matrices, 16 row-major floats per joint.
    pub fn inverse_bind_matrices(&self) -> &[f32] {
        &self.inverse_bind_matrices
    }

    /// Inverse-bind matrix of joint `index`; `None` when out of range.
    pub fn joint_inverse_bind_matrix(&self, index: usize) -> Option<[f32; 16]> {
        matrix_block(&self.inverse_bind_matrices, index.checked_mul(16)?)
    }

    pub fn inverse_bind_matrix4(&self, index: usize) -> Option<Matrix4<f32>> {
        self.joint_inverse_bind_matrix(index)
            .map(|values| matrix_from_row_major(&values))
    }

    pub fn weight_values(&self) -> &[f32] {
        &self.weight_values
    }

    pub fn vertex_influences(&self) -> &VertexInfluences {
        &self.vertex_influences
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_influences.len()
    }

    pub fn influences(&self, vertex: usize) -> Option<&[Influence]> {
        self.vertex_influences.get(vertex)
    }

    /// Largest `vcount` entry.
    pub fn max_joint_influences(&self) -> usize {
        self.max_joint_influences
    }

    /// Influence pairs the `vcount` list declares.
    pub fn expected_influences(&self) -> usize {
        self.expected_influences
    }

    /// `true` when the `v` stream (or a missing input) left fewer pairs than declared.
    pub fn is_truncated(&self) -> bool {
        self.vertex_influences.flat().len() < self.expected_influences
    }
}

// ─── Resolution helpers ───────────────────────────────────────────────────────

/// Joint names from `<joints>`, falling back to the `<vertex_weights>` input.
fn resolve_joint_names(record: &SkinRecord) -> Vec<String> {
    let reference = record.joints.source_for(&Semantic::Joint).or_else(|| {
        record
            .vertex_weights
            .as_ref()?
            .inputs
            .binding(&Semantic::Joint)
            .map(|binding| binding.source_id.as_str())
    });

    reference
        .and_then(|reference| record.sources.as_string_slice(reference))
        .map(<[String]>::to_vec)
        .unwrap_or_default()
}

/// One 16-float block per joint; missing blocks become identity.
fn resolve_inverse_bind_matrices(record: &SkinRecord, joint_count: usize) -> Vec<f32> {
    let values = record
        .joints
        .source_for(&Semantic::InvBindMatrix)
        .and_then(|reference| record.sources.as_float_slice(reference))
        .unwrap_or_default();

    let available = values.len() / 16;
    if available < joint_count {
        warn!(
            "skin of {}: {} inverse bind matrices for {} joints, filling with identity",
            record.source_geometry_id, available, joint_count
        );
    } else if available > joint_count {
        warn!(
            "skin of {}: dropping {} inverse bind matrices without a joint",
            record.source_geometry_id,
            available - joint_count
        );
    }

    let mut matrices = Vec::with_capacity(joint_count * 16);
    for joint in 0..joint_count {
        let block = matrix_block(values, joint * 16).unwrap_or(IDENTITY_MATRIX);
        matrices.extend_from_slice(&block);
    }
    matrices
}

/// Single sequential walk over `v`, `vcount[i] * stride` integers per vertex.
/// Sum of the `vcount` entries, saturating on overflow.
fn declared_influences(vcount: &[u32]) -> usize {
    vcount
        .iter()
        .map(|count| *count as usize)
        .fold(0, usize::saturating_add)
}

fn resolve_influences(weights: &VertexWeights, weight_values: &[f32]) -> VertexInfluences {
    let stride = weights.inputs.stride();
    let joint_offset = weights.inputs.offset_of(&Semantic::Joint);
    let weight_offset = weights.inputs.offset_of(&Semantic::Weight);
    let declared = declared_influences(&weights.vcount);
    let present = weights.v.len() / stride.max(1);
    let mut table = VertexInfluences::with_capacity(weights.vcount.len(), declared.min(present));

    let (Some(joint_offset), Some(weight_offset)) = (joint_offset, weight_offset) else {
        warn!("vertex_weights without JOINT and WEIGHT inputs, influence lists left empty");
        for _ in &weights.vcount {
            table.close_vertex();
        }
        return table;
    };

    let mut cursor = 0usize;
    let mut exhausted = false;
    for (vertex, count) in weights.vcount.iter().enumerate() {
        for _ in 0..*count {
            if exhausted {
                break;
            }
            let joint = cursor
                .checked_add(joint_offset)
                .and_then(|position| weights.v.get(position));
            let weight_index = cursor
                .checked_add(weight_offset)
                .and_then(|position| weights.v.get(position));
            let (Some(&joint), Some(&weight_index)) = (joint, weight_index) else {
                warn!("v stream ends inside the influences of vertex {vertex}");
                exhausted = true;
                break;
            };

            let weight = usize::try_from(weight_index)
                .ok()
                .and_then(|index| weight_values.get(index))
                .copied()
                .unwrap_or(0.0);
            table.push(Influence { joint, weight });
            cursor = cursor.saturating_add(stride);
        }
        table.close_vertex();
    }

    if weights.vcount.len() != weights.count {
        debug!(
            "vertex_weights count {} differs from {} vcount entries",
            weights.count,
            weights.vcount.len()
        );
    }

    table
}
