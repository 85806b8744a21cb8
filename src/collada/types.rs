use std::fmt;

use serde::{Deserialize, Serialize};

// ─── Constants ────────────────────────────────────────────────────────────────

/// Value of a `<node type="...">` attribute that marks a skeleton joint.
pub const JOINT_NODE_TYPE: &str = "JOINT";

/// Value-group widths used when a `<source>` declares no accessor stride.
pub(super) const DEFAULT_POSITION_STRIDE: usize = 3;
pub(super) const DEFAULT_NORMAL_STRIDE: usize = 3;
pub(super) const DEFAULT_TEXCOORD_STRIDE: usize = 2;

// ─── Semantics ────────────────────────────────────────────────────────────────

/// Meaning of a source inside a binding context (`<input semantic="...">`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Semantic {
    Vertex,
    Position,
    Normal,
    TexCoord,
    Color,
    Joint,
    Weight,
    InvBindMatrix,
    Input,
    Output,
    Interpolation,
    InTangent,
    OutTangent,
    /// Any semantic this crate does not interpret; kept verbatim.
    Other(String),
}

impl Semantic {
    pub fn as_str(&self) -> &str {
        match self {
            Semantic::Vertex => "VERTEX",
            Semantic::Position => "POSITION",
            Semantic::Normal => "NORMAL",
            Semantic::TexCoord => "TEXCOORD",
            Semantic::Color => "COLOR",
            Semantic::Joint => "JOINT",
            Semantic::Weight => "WEIGHT",
            Semantic::InvBindMatrix => "INV_BIND_MATRIX",
            Semantic::Input => "INPUT",
            Semantic::Output => "OUTPUT",
            Semantic::Interpolation => "INTERPOLATION",
            Semantic::InTangent => "IN_TANGENT",
            Semantic::OutTangent => "OUT_TANGENT",
            Semantic::Other(name) => name,
        }
    }
}

impl From<&str> for Semantic {
    fn from(value: &str) -> Self {
        match value {
            "VERTEX" => Semantic::Vertex,
            "POSITION" => Semantic::Position,
            "NORMAL" => Semantic::Normal,
            "TEXCOORD" => Semantic::TexCoord,
            "COLOR" => Semantic::Color,
            "JOINT" => Semantic::Joint,
            "WEIGHT" => Semantic::Weight,
            "INV_BIND_MATRIX" => Semantic::InvBindMatrix,
            "INPUT" => Semantic::Input,
            "OUTPUT" => Semantic::Output,
            "INTERPOLATION" => Semantic::Interpolation,
            "IN_TANGENT" => Semantic::InTangent,
            "OUT_TANGENT" => Semantic::OutTangent,
            other => Semantic::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Semantic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Options ──────────────────────────────────────────────────────────────────

/// How `<input source="#...">` references are matched against source ids.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ReferenceMatching {
    /// Reference and source id must be equal.
    Exact,
    /// Equal, or one ends with the other (library-prefixed references).
    #[default]
    Lenient,
}

/// Options shared by the library entry points and the CLI.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ParseOptions {
    /// Source lookup policy used by every source table in the document.
    pub reference_matching: ReferenceMatching,
    /// Reads `<library_animations>` when enabled.
    pub read_animations: bool,
    /// Reads `<library_visual_scenes>` when enabled.
    pub read_scene: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            reference_matching: ReferenceMatching::Lenient,
            read_animations: true,
            read_scene: true,
        }
    }
}

// ─── Reports ──────────────────────────────────────────────────────────────────

/// Triangulation outcome for the first primitive block of one geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeometrySummary {
    pub id: String,
    pub name: Option<String>,
    pub triangle_count: usize,
    pub vertex_width: Option<usize>,
    pub float_count: usize,
    pub expected_float_count: usize,
    pub truncated: bool,
}

/// Resolved skin statistics for one controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkinSummary {
    pub id: String,
    pub source_geometry: String,
    pub joint_count: usize,
    pub vertex_count: usize,
    pub max_joint_influences: usize,
    /// The `v` stream held fewer pairs than `vcount` declares.
    pub truncated: bool,
}

/// Whole-document report printed by the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub version: String,
    pub geometries: Vec<GeometrySummary>,
    pub skins: Vec<SkinSummary>,
    pub material_count: usize,
    pub animation_count: usize,
    pub root_node_count: usize,
    pub joint_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_known_and_unknown_semantics_when_parsing_then_names_round_trip() {
        for name in ["VERTEX", "NORMAL", "TEXCOORD", "INV_BIND_MATRIX", "BINORMAL"] {
            assert_eq!(Semantic::from(name).as_str(), name);
        }
        assert_eq!(
            Semantic::from("BINORMAL"),
            Semantic::Other("BINORMAL".to_string())
        );
    }

    #[test]
    fn given_default_options_when_created_then_lookup_is_lenient() {
        let options = ParseOptions::default();

        assert_eq!(options.reference_matching, ReferenceMatching::Lenient);
        assert!(options.read_animations);
        assert!(options.read_scene);
    }
}
