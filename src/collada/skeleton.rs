use nalgebra::Matrix4;

use super::types::JOINT_NODE_TYPE;
use crate::math::{IDENTITY_MATRIX, matrix_from_row_major};

// ─── Node ─────────────────────────────────────────────────────────────────────

/// A `<node>` of a visual scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: Option<String>,
    pub name: Option<String>,
    /// Raw `type` attribute (`NODE` or `JOINT`).
    pub node_type: Option<String>,
    /// Local transform, row-major, composed from the node's transform elements.
    pub transform: [f32; 16],
    pub geometry_ref: Option<String>,
    pub controller_ref: Option<String>,
    /// `<skeleton>` references of an `<instance_controller>`, `#` stripped.
    pub skeleton_root_refs: Vec<String>,
    /// `instance_material@target` values, `#` stripped.
    pub material_refs: Vec<String>,
    pub children: Vec<Node>,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            id: None,
            name: None,
            node_type: None,
            transform: IDENTITY_MATRIX,
            geometry_ref: None,
            controller_ref: None,
            skeleton_root_refs: Vec::new(),
            material_refs: Vec::new(),
            children: Vec::new(),
        }
    }
}

impl Node {
    pub fn is_joint(&self) -> bool {
        self.node_type.as_deref() == Some(JOINT_NODE_TYPE)
    }

    pub fn transform_matrix(&self) -> Matrix4<f32> {
        matrix_from_row_major(&self.transform)
    }

    /// `true` when `key` equals the node's id or name.
    pub fn is_named(&self, key: &str) -> bool {
        self.id.as_deref() == Some(key) || self.name.as_deref() == Some(key)
    }

    /// Depth-first search of this subtree by id or name.
    pub fn find(&self, key: &str) -> Option<&Node> {
        if self.is_named(key) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(key))
    }

    /// Joint nodes of this subtree, this node included, in pre-order.
    pub fn joints(&self) -> Joints<'_> {
        Joints { stack: vec![self] }
    }

    /// World transform of every node in this subtree, in pre-order.
    ///
    /// # Arguments
    ///
    /// * `parent` - World transform of this node's parent.
    pub fn world_transforms(&self, parent: &Matrix4<f32>) -> Vec<(&Node, Matrix4<f32>)> {
        let mut out = Vec::new();
        collect_world_transforms(self, parent, &mut out);
        out
    }
}

fn collect_world_transforms<'a>(
    node: &'a Node,
    parent: &Matrix4<f32>,
    out: &mut Vec<(&'a Node, Matrix4<f32>)>,
) {
    let world = parent * node.transform_matrix();
    out.push((node, world));
    for child in &node.children {
        collect_world_transforms(child, &world, out);
    }
}

/// Pre-order iterator over joint nodes.
pub struct Joints<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Joints<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            self.stack.extend(node.children.iter().rev());
            if node.is_joint() {
                return Some(node);
            }
        }
        None
    }
}

// ─── Visual scene ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default)]
pub struct VisualScene {
    pub id: String,
    pub name: Option<String>,
    pub nodes: Vec<Node>,
}

impl VisualScene {
    pub fn find_node(&self, key: &str) -> Option<&Node> {
        let key = key.strip_prefix('#').unwrap_or(key);
        self.nodes.iter().find_map(|node| node.find(key))
    }

    /// Node named by the first `<skeleton>` reference of a controller instance.
    pub fn skeleton_root(&self, controller_node: &Node) -> Option<&Node> {
        let reference = controller_node.skeleton_root_refs.first()?;
        self.find_node(reference)
    }

    /// Nodes carrying an `<instance_controller>`.
    pub fn controller_nodes(&self) -> Vec<&Node> {
        let mut out = Vec::new();
        let mut stack: Vec<&Node> = self.nodes.iter().rev().collect();
        while let Some(node) = stack.pop() {
            if node.controller_ref.is_some() {
                out.push(node);
            }
            stack.extend(node.children.iter().rev());
        }
        out
    }

    pub fn joint_count(&self) -> usize {
        self.nodes.iter().map(|node| node.joints().count()).sum()
    }
}
