//! Deterministic node-link layout for mindmap trees.
//!
//! The layout is a post-order depth-first walk:
//! - x depends only on depth: `depth * level_gap_x`
//! - a node without visible children (no children, or collapsed) is a leaf and
//!   takes the current vertical cursor, which then advances by `node_gap_y`
//! - an internal node sits halfway between its highest and lowest visible child,
//!   so lopsided subtrees stay centered on their extremes
//!
//! Leaves are therefore evenly spaced in depth-first order and never overlap.
//! The result depends only on the tree shape and the parameters.

use crate::tree::{NodeKind, TreeNode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec2f {
    pub x: f32,
    pub y: f32,
}

impl Vec2f {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutParams {
    /// Horizontal distance between depth levels.
    pub level_gap_x: f32,
    /// Vertical distance between consecutive leaves.
    pub node_gap_y: f32,
    /// Smallest drawing height reported, however few leaves there are.
    pub min_height: f32,
    /// Space added below the last leaf.
    pub bottom_margin: f32,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            level_gap_x: 220.0,
            node_gap_y: 22.0,
            min_height: 240.0,
            bottom_margin: 60.0,
        }
    }
}

impl LayoutParams {
    pub fn with_gaps(level_gap_x: f32, node_gap_y: f32) -> Self {
        Self {
            level_gap_x,
            node_gap_y,
            ..Self::default()
        }
    }
}

/// A laid-out node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedNode {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
    pub depth: usize,
    pub pos: Vec2f,
    /// The node has children in the logical tree (visible or not).
    pub has_children: bool,
    pub collapsed: bool,
}

/// A parent → child link. Both ends index into [`TreeLayout::nodes`].
///
/// Category and item ids come from separate namespaces and may collide, so
/// links never refer to nodes by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub source: usize,
    pub target: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeLayout {
    /// Nodes in post-order (children before their parent).
    pub nodes: Vec<PositionedNode>,
    pub edges: Vec<Edge>,
    pub total_height: f32,
}

impl TreeLayout {
    pub fn node(&self, kind: NodeKind, id: &str) -> Option<&PositionedNode> {
        self.nodes.iter().find(|n| n.kind == kind && n.id == id)
    }

    pub fn position(&self, kind: NodeKind, id: &str) -> Option<Vec2f> {
        self.node(kind, id).map(|n| n.pos)
    }

    /// Both ends of `edge`, or `None` if it does not belong to this layout.
    pub fn endpoints(&self, edge: &Edge) -> Option<(&PositionedNode, &PositionedNode)> {
        Some((self.nodes.get(edge.source)?, self.nodes.get(edge.target)?))
    }

    /// Right-most node x coordinate.
    pub fn max_x(&self) -> f32 {
        self.nodes.iter().map(|n| n.pos.x).fold(0.0, f32::max)
    }
}

/// Lay out `root` with the default height constants.
pub fn layout(root: &TreeNode, level_gap_x: f32, node_gap_y: f32) -> TreeLayout {
    layout_with(root, LayoutParams::with_gaps(level_gap_x, node_gap_y))
}

pub fn layout_with(root: &TreeNode, params: LayoutParams) -> TreeLayout {
    let mut walker = Walker {
        params,
        cursor: 0.0,
        nodes: Vec::new(),
        edges: Vec::new(),
    };
    walker.visit(root, 0);
    let total_height = params
        .min_height
        .max(walker.cursor + params.bottom_margin);
    TreeLayout {
        nodes: walker.nodes,
        edges: walker.edges,
        total_height,
    }
}

struct Walker {
    params: LayoutParams,
    cursor: f32,
    nodes: Vec<PositionedNode>,
    edges: Vec<Edge>,
}

impl Walker {
    /// Returns the index of `node` in `self.nodes` and its y coordinate.
    fn visit(&mut self, node: &TreeNode, depth: usize) -> (usize, f32) {
        let x = depth as f32 * self.params.level_gap_x;
        let kids = node.visible_children();
        let mut kid_indices = Vec::with_capacity(kids.len());
        let y = if kids.is_empty() {
            let y = self.cursor;
            self.cursor += self.params.node_gap_y;
            y
        } else {
            let mut min_y = f32::INFINITY;
            let mut max_y = f32::NEG_INFINITY;
            for kid in kids {
                let (idx, ky) = self.visit(kid, depth + 1);
                kid_indices.push(idx);
                min_y = min_y.min(ky);
                max_y = max_y.max(ky);
            }
            (min_y + max_y) / 2.0
        };
        let index = self.nodes.len();
        self.nodes.push(PositionedNode {
            id: node.id.clone(),
            label: node.label.clone(),
            kind: node.kind,
            depth,
            pos: Vec2f::new(x, y),
            has_children: !node.children.is_empty(),
            collapsed: node.collapsed,
        });
        self.edges.extend(kid_indices.into_iter().map(|target| Edge {
            source: index,
            target,
        }));
        (index, y)
    }
}
