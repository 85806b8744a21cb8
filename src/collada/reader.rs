use log::{debug, warn};
use nalgebra::{Matrix4, Vector3};
use roxmltree::Node as XmlNode;

use super::animation::{Animation, Channel, Sampler};
use super::document::{Controller, Document, Geometry, Mesh};
use super::input::{InputBinding, InputBindingMap, UnsharedInputs, VerticesDecl};
use super::material::Material;
use super::skeleton::{Node, VisualScene};
use super::skin::{SkinBinding, SkinRecord, VertexWeights};
use super::source::{Source, SourceTable};
use super::triangulate::IndexedPrimitiveBlock;
use super::types::{ParseOptions, ReferenceMatching, Semantic};
use super::xml::{NodeExt, parse_counts, parse_floats, parse_ints, parse_names, strip_reference};
use crate::error::DaeError;
use crate::math::{
    matrix_from_row_major, matrix_to_row_major, rotation_matrix, scale_matrix, translation_matrix,
};

const ROOT_ELEMENT: &str = "COLLADA";

// ─── Document ─────────────────────────────────────────────────────────────────

/// Walks a parsed XML tree into the document model.
pub(super) fn read_document(
    xml: &roxmltree::Document<'_>,
    options: ParseOptions,
) -> Result<Document, DaeError> {
    let root = xml.root_element();
    if root.name() != ROOT_ELEMENT {
        return Err(DaeError::UnexpectedRoot(root.name().to_string()));
    }

    let matching = options.reference_matching;
    let mut document = Document {
        version: root.owned_attribute("version").unwrap_or_default(),
        ..Document::default()
    };

    for library in root.element_children() {
        match library.name() {
            "library_geometries" => {
                for node in library.children_named("geometry") {
                    document.geometries.push(read_geometry(node, matching)?);
                }
            }
            "library_materials" => {
                for node in library.children_named("material") {
                    document.materials.push(read_material(node));
                }
            }
            "library_animations" if options.read_animations => {
                for node in library.children_named("animation") {
                    document.animations.push(read_animation(node, matching)?);
                }
            }
            "library_controllers" => {
                for node in library.children_named("controller") {
                    document.controllers.push(read_controller(node, matching)?);
                }
            }
            "library_visual_scenes" if options.read_scene => {
                for node in library.children_named("visual_scene") {
                    document.visual_scenes.push(read_visual_scene(node)?);
                }
            }
            "scene" => {
                document.active_scene_ref = library
                    .child("instance_visual_scene")
                    .and_then(|instance| instance.reference_attribute("url"));
            }
            _ => {}
        }
    }

    debug!(
        "read COLLADA {}: {} geometries, {} controllers, {} materials, {} animations, {} visual scenes",
        document.version,
        document.geometries.len(),
        document.controllers.len(),
        document.materials.len(),
        document.animations.len(),
        document.visual_scenes.len()
    );
    Ok(document)
}

// ─── Sources and inputs ───────────────────────────────────────────────────────

fn read_sources(parent: XmlNode<'_, '_>, matching: ReferenceMatching) -> Result<SourceTable, DaeError> {
    let sources = parent
        .children_named("source")
        .map(read_source)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(SourceTable::new(sources, matching))
}

fn read_source(node: XmlNode<'_, '_>) -> Result<Source, DaeError> {
    let id = node.owned_attribute("id").unwrap_or_default();
    let stride = match node
        .child("technique_common")
        .and_then(|technique| technique.child("accessor"))
    {
        Some(accessor) => accessor.parse_index_attribute("stride")?,
        None => None,
    };

    let mut source = Source::from_floats(id.clone(), Vec::new(), stride);
    for array in node.element_children() {
        let count = array.parse_index_attribute("count")?;
        let read = match array.name() {
            "float_array" => {
                Source::from_floats(id.clone(), parse_floats(array.body(), array.name())?, stride)
            }
            "Name_array" | "IDREF_array" => {
                Source::from_names(id.clone(), parse_names(array.body()), stride)
            }
            _ => continue,
        };
        source = match count {
            Some(count) => read.with_count(count),
            None => read,
        };
        break;
    }

    if !source.is_well_formed() {
        warn!(
            "source {id}: {} floats do not divide into stride {}",
            source.float_data().len(),
            source.stride()
        );
    }
    Ok(match node.attribute("name") {
        Some(name) => source.with_name(name),
        None => source,
    })
}

/// Offset-bearing `<input>` children (primitive blocks, `<vertex_weights>`).
fn read_shared_inputs(parent: XmlNode<'_, '_>) -> Result<Vec<InputBinding>, DaeError> {
    parent
        .children_named("input")
        .map(|input| {
            let semantic = Semantic::from(input.attribute("semantic").unwrap_or_default());
            let source_id = input.reference_attribute("source").unwrap_or_default();
            let offset = input.parse_index_attribute("offset")?.unwrap_or(0);
            let mut binding = InputBinding::new(semantic, source_id, offset);
            binding.set = input.parse_attribute::<u32>("set")?;
            Ok(binding)
        })
        .collect()
}

/// Offset-less `<input>` children (`<vertices>`, `<joints>`, `<sampler>`).
fn read_unshared_inputs(parent: XmlNode<'_, '_>) -> UnsharedInputs {
    UnsharedInputs::new(
        parent
            .children_named("input")
            .map(|input| {
                (
                    Semantic::from(input.attribute("semantic").unwrap_or_default()),
                    input.reference_attribute("source").unwrap_or_default(),
                )
            })
            .collect(),
    )
}

// ─── Geometry ─────────────────────────────────────────────────────────────────

fn read_geometry(node: XmlNode<'_, '_>, matching: ReferenceMatching) -> Result<Geometry, DaeError> {
    let id = node.owned_attribute("id").unwrap_or_default();
    let mesh = match node.child("mesh") {
        Some(mesh) => Some(read_mesh(mesh, matching)?),
        None => {
            debug!("geometry {id} has no <mesh>, skipping");
            None
        }
    };

    Ok(Geometry {
        id,
        name: node.owned_attribute("name"),
        mesh,
    })
}

fn read_mesh(node: XmlNode<'_, '_>, matching: ReferenceMatching) -> Result<Mesh, DaeError> {
    let sources = read_sources(node, matching)?;
    let vertices = node.child("vertices").map(|vertices| VerticesDecl {
        id: vertices.owned_attribute("id").unwrap_or_default(),
        inputs: read_unshared_inputs(vertices),
    });

    let mut primitives = Vec::new();
    let mut skipped_primitives = 0;
    for child in node.element_children() {
        match child.name() {
            "triangles" => primitives.push(read_triangles(child, vertices.clone())?),
            "polylist" | "polygons" | "lines" | "linestrips" | "trifans" | "tristrips" => {
                warn!("<{}> blocks are not triangulated, skipping", child.name());
                skipped_primitives += 1;
            }
            _ => {}
        }
    }

    Ok(Mesh {
        sources,
        vertices,
        primitives,
        skipped_primitives,
    })
}

fn read_triangles(
    node: XmlNode<'_, '_>,
    vertices: Option<VerticesDecl>,
) -> Result<IndexedPrimitiveBlock, DaeError> {
    let inputs = InputBindingMap::new(read_shared_inputs(node)?).with_vertices(vertices);
    let raw_indices = match node.child("p") {
        Some(p) => parse_ints(p.body(), "p")?,
        None => Vec::new(),
    };

    let stride = inputs.stride();
    let triangle_count = match node.parse_index_attribute("count")? {
        Some(count) => count,
        None if stride > 0 => raw_indices.len() / stride.saturating_mul(3),
        None => 0,
    };

    let block = IndexedPrimitiveBlock {
        inputs,
        raw_indices,
        triangle_count,
        material: node.owned_attribute("material"),
    };
    if !block.is_well_formed() {
        warn!(
            "<triangles> declares {} triangles but holds {} indices at stride {}",
            block.triangle_count,
            block.raw_indices.len(),
            stride
        );
    }
    Ok(block)
}

// ─── Controllers ──────────────────────────────────────────────────────────────

fn read_controller(
    node: XmlNode<'_, '_>,
    matching: ReferenceMatching,
) -> Result<Controller, DaeError> {
    let skin = match node.child("skin") {
        Some(skin) => Some(SkinBinding::resolve(&read_skin(skin, matching)?)),
        None => None,
    };

    Ok(Controller {
        id: node.owned_attribute("id").unwrap_or_default(),
        name: node.owned_attribute("name"),
        skin,
    })
}

fn read_skin(node: XmlNode<'_, '_>, matching: ReferenceMatching) -> Result<SkinRecord, DaeError> {
    let source_geometry_id = node.reference_attribute("source").unwrap_or_default();

    let bind_shape_matrix = match node.child("bind_shape_matrix") {
        Some(matrix) => {
            let values = parse_floats(matrix.body(), "bind_shape_matrix")?;
            match <[f32; 16]>::try_from(values.as_slice()) {
                Ok(values) => Some(values),
                Err(_) => {
                    warn!(
                        "skin of {source_geometry_id}: bind_shape_matrix has {} values, using identity",
                        values.len()
                    );
                    None
                }
            }
        }
        None => None,
    };

    let vertex_weights = match node.child("vertex_weights") {
        Some(weights) => Some(VertexWeights {
            count: weights.parse_index_attribute("count")?.unwrap_or(0),
            inputs: InputBindingMap::new(read_shared_inputs(weights)?),
            vcount: match weights.child("vcount") {
                Some(vcount) => parse_counts(vcount.body(), "vcount")?,
                None => Vec::new(),
            },
            v: match weights.child("v") {
                Some(v) => parse_ints(v.body(), "v")?,
                None => Vec::new(),
            },
        }),
        None => None,
    };

    Ok(SkinRecord {
        source_geometry_id,
        bind_shape_matrix,
        sources: read_sources(node, matching)?,
        joints: node
            .child("joints")
            .map(read_unshared_inputs)
            .unwrap_or_default(),
        vertex_weights,
    })
}

// ─── Materials ────────────────────────────────────────────────────────────────

fn read_material(node: XmlNode<'_, '_>) -> Material {
    let mut material = Material::new(node.owned_attribute("id").unwrap_or_default());
    material.name = node.owned_attribute("name");
    material.effect_ref = node
        .child("instance_effect")
        .and_then(|effect| effect.reference_attribute("url"));
    material
}

// ─── Animations ───────────────────────────────────────────────────────────────

fn read_animation(
    node: XmlNode<'_, '_>,
    matching: ReferenceMatching,
) -> Result<Animation, DaeError> {
    let samplers = node
        .children_named("sampler")
        .map(|sampler| Sampler {
            id: sampler.owned_attribute("id").unwrap_or_default(),
            inputs: read_unshared_inputs(sampler),
        })
        .collect();
    let channels = node
        .children_named("channel")
        .map(|channel| Channel {
            source: channel.reference_attribute("source").unwrap_or_default(),
            target: channel.owned_attribute("target").unwrap_or_default(),
        })
        .collect();
    let children = node
        .children_named("animation")
        .map(|child| read_animation(child, matching))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Animation {
        id: node.owned_attribute("id"),
        name: node.owned_attribute("name"),
        sources: read_sources(node, matching)?,
        samplers,
        channels,
        children,
    })
}

// ─── Visual scenes ────────────────────────────────────────────────────────────

fn read_visual_scene(node: XmlNode<'_, '_>) -> Result<VisualScene, DaeError> {
    Ok(VisualScene {
        id: node.owned_attribute("id").unwrap_or_default(),
        name: node.owned_attribute("name"),
        nodes: node
            .children_named("node")
            .map(read_node)
            .collect::<Result<Vec<_>, _>>()?,
    })
}

fn read_node(node: XmlNode<'_, '_>) -> Result<Node, DaeError> {
    let mut out = Node {
        id: node.owned_attribute("id"),
        name: node.owned_attribute("name"),
        node_type: node.owned_attribute("type"),
        transform: matrix_to_row_major(&compose_transform(node)?),
        ..Node::default()
    };

    for child in node.element_children() {
        match child.name() {
            "node" => out.children.push(read_node(child)?),
            "instance_geometry" => {
                out.geometry_ref = child.reference_attribute("url");
                out.material_refs.extend(read_material_refs(child));
            }
            "instance_controller" => {
                out.controller_ref = child.reference_attribute("url");
                out.skeleton_root_refs.extend(
                    child
                        .children_named("skeleton")
                        .map(|skeleton| strip_reference(skeleton.body().trim()).to_string()),
                );
                out.material_refs.extend(read_material_refs(child));
            }
            _ => {}
        }
    }

    Ok(out)
}

/// `bind_material/technique_common/instance_material@target` values.
fn read_material_refs(instance: XmlNode<'_, '_>) -> Vec<String> {
    instance
        .child("bind_material")
        .and_then(|bind| bind.child("technique_common"))
        .map(|technique| {
            technique
                .children_named("instance_material")
                .filter_map(|material| material.reference_attribute("target"))
                .collect()
        })
        .unwrap_or_default()
}

/// Multiplies the node's transform elements in document order.
fn compose_transform(node: XmlNode<'_, '_>) -> Result<Matrix4<f32>, DaeError> {
    let mut transform = Matrix4::identity();
    for child in node.element_children() {
        let element = child.name();
        if !matches!(element, "matrix" | "translate" | "rotate" | "scale") {
            continue;
        }

        let values = parse_floats(child.body(), element)?;
        let local = match (element, values.as_slice()) {
            ("matrix", values) => match <&[f32; 16]>::try_from(values) {
                Ok(values) => matrix_from_row_major(values),
                Err(_) => {
                    warn!("<matrix> with {} values ignored", values.len());
                    continue;
                }
            },
            ("translate", &[x, y, z]) => translation_matrix(x, y, z),
            ("rotate", &[x, y, z, degrees]) => rotation_matrix(Vector3::new(x, y, z), degrees),
            ("scale", &[x, y, z]) => scale_matrix(x, y, z),
            (element, values) => {
                warn!("<{element}> with {} values ignored", values.len());
                continue;
            }
        };
        transform *= local;
    }
    Ok(transform)
}
