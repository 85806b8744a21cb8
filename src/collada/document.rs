use super::animation::Animation;
use super::input::VerticesDecl;
use super::material::Material;
use super::skeleton::VisualScene;
use super::skin::SkinBinding;
use super::source::SourceTable;
use super::triangulate::{AttributeBuffer, IndexedPrimitiveBlock, InterleavedBuffer, Triangulator};
use super::types::{DocumentSummary, GeometrySummary, SkinSummary};

// ─── Geometry ─────────────────────────────────────────────────────────────────

/// `<mesh>`: shared sources plus every `<triangles>` block in document order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    pub sources: SourceTable,
    pub vertices: Option<VerticesDecl>,
    pub primitives: Vec<IndexedPrimitiveBlock>,
    /// `<polylist>`/`<polygons>` blocks seen but not tessellated.
    pub skipped_primitives: usize,
}

impl Mesh {
    /// Triangulator over the first triangle block.
    pub fn triangulator(&self) -> Option<Triangulator<'_>> {
        self.primitives
            .first()
            .map(|block| Triangulator::new(&self.sources, block))
    }

    pub fn interleaved(&self) -> Option<InterleavedBuffer> {
        self.triangulator()?.interleaved()
    }

    pub fn positions(&self) -> Option<AttributeBuffer> {
        self.triangulator()?.positions()
    }

    pub fn normals(&self) -> Option<AttributeBuffer> {
        self.triangulator()?.normals()
    }

    pub fn tex_coords(&self) -> Option<AttributeBuffer> {
        self.triangulator()?.tex_coords()
    }

    /// Triangle count of the first block, 0 without one.
    pub fn triangle_count(&self) -> usize {
        self.primitives
            .first()
            .map_or(0, |block| block.triangle_count)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Geometry {
    pub id: String,
    pub name: Option<String>,
    /// `None` for non-mesh geometry (splines, B-reps).
    pub mesh: Option<Mesh>,
}

// ─── Controller ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Controller {
    pub id: String,
    pub name: Option<String>,
    /// `None` for morph controllers.
    pub skin: Option<SkinBinding>,
}

// ─── Document ─────────────────────────────────────────────────────────────────

/// A parsed COLLADA document. Immutable once returned by the reader.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub version: String,
    pub geometries: Vec<Geometry>,
    pub materials: Vec<Material>,
    pub animations: Vec<Animation>,
    pub controllers: Vec<Controller>,
    pub visual_scenes: Vec<VisualScene>,
    /// `<scene><instance_visual_scene url>`, `#` stripped.
    pub active_scene_ref: Option<String>,
}

impl Document {
    pub fn geometry(&self, id: &str) -> Option<&Geometry> {
        let id = id.strip_prefix('#').unwrap_or(id);
        self.geometries.iter().find(|geometry| geometry.id == id)
    }

    pub fn controller(&self, id: &str) -> Option<&Controller> {
        let id = id.strip_prefix('#').unwrap_or(id);
        self.controllers.iter().find(|controller| controller.id == id)
    }

    pub fn material(&self, id: &str) -> Option<&Material> {
        let id = id.strip_prefix('#').unwrap_or(id);
        self.materials.iter().find(|material| material.id == id)
    }

    /// The instantiated visual scene, else the first one.
    pub fn scene(&self) -> Option<&VisualScene> {
        self.active_scene_ref
            .as_deref()
            .and_then(|id| self.visual_scenes.iter().find(|scene| scene.id == id))
            .or_else(|| self.visual_scenes.first())
    }

    /// Mesh a controller's skin deforms.
    pub fn skinned_mesh(&self, controller: &Controller) -> Option<&Mesh> {
        let skin = controller.skin.as_ref()?;
        self.geometry(skin.source_geometry_id())?.mesh.as_ref()
    }

    pub fn summary(&self) -> DocumentSummary {
        let geometries = self.geometries.iter().map(summarize_geometry).collect();
        let skins = self
            .controllers
            .iter()
            .filter_map(|controller| {
                let skin = controller.skin.as_ref()?;
                Some(SkinSummary {
                    id: controller.id.clone(),
                    source_geometry: skin.source_geometry_id().to_string(),
                    joint_count: skin.joint_count(),
                    vertex_count: skin.vertex_count(),
                    max_joint_influences: skin.max_joint_influences(),
                    truncated: skin.is_truncated(),
                })
            })
            .collect();
        let scene = self.scene();

        DocumentSummary {
            version: self.version.clone(),
            geometries,
            skins,
            material_count: self.materials.len(),
            animation_count: self.animations.len(),
            root_node_count: scene.map_or(0, |scene| scene.nodes.len()),
            joint_count: scene.map_or(0, VisualScene::joint_count),
        }
    }
}

fn summarize_geometry(geometry: &Geometry) -> GeometrySummary {
    let mesh = geometry.mesh.as_ref();
    let buffer = mesh.and_then(Mesh::interleaved);

    GeometrySummary {
        id: geometry.id.clone(),
        name: geometry.name.clone(),
        triangle_count: mesh.map_or(0, Mesh::triangle_count),
        vertex_width: buffer.as_ref().map(|buffer| buffer.layout.width()),
        float_count: buffer.as_ref().map_or(0, |buffer| buffer.data.len()),
        expected_float_count: buffer.as_ref().map_or(0, |buffer| buffer.expected_len),
        truncated: buffer.as_ref().is_some_and(InterleavedBuffer::is_truncated),
    }
}
