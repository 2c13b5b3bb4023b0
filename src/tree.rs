//! Mindmap tree construction.
//!
//! The tree is always three levels deep: a root for the whole collection, one
//! node per category, and one leaf per selected item. Leaves are created
//! collapsed and without children whatever the dataset looks like.

use crate::model::{CatalogItem, Dataset};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Root,
    Category,
    Leaf,
}

/// A node of the diagram tree. Children are owned exclusively by their parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
    pub children: Vec<TreeNode>,
    /// When set, children stay in the tree but are left out of the layout.
    pub collapsed: bool,
}

impl TreeNode {
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
            children: Vec::new(),
            collapsed: false,
        }
    }

    pub fn with_children(mut self, children: Vec<TreeNode>) -> Self {
        self.children = children;
        self
    }

    pub fn collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = collapsed;
        self
    }

    /// Children that take part in layout.
    pub fn visible_children(&self) -> &[TreeNode] {
        if self.collapsed { &[] } else { &self.children }
    }

    /// Depth-first search by id.
    pub fn find(&self, id: &str) -> Option<&TreeNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut TreeNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(id))
    }

    /// Set the collapsed flag of every node below the root that has children.
    pub fn set_collapsed_below_root(&mut self, collapsed: bool) {
        fn rec(node: &mut TreeNode, collapsed: bool) {
            for child in &mut node.children {
                if !child.children.is_empty() {
                    child.collapsed = collapsed;
                }
                rec(child, collapsed);
            }
        }
        rec(self, collapsed);
    }

    pub fn expand_all(&mut self) {
        self.set_collapsed_below_root(false);
    }

    pub fn collapse_all(&mut self) {
        self.set_collapsed_below_root(true);
    }

    /// Number of nodes in the tree, hidden ones included.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(TreeNode::node_count).sum::<usize>()
    }
}

/// Knobs for [`build_tree`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeOptions {
    pub root_label: String,
    /// Restrict the tree to one category.
    pub category_id: Option<String>,
    /// Executive mode shows only the primary items of each category.
    pub exec_mode: bool,
    /// How many ranked items to show when a category has no opportunities.
    pub ranked_fallback: usize,
    /// Extra UseCase-level items appended outside executive mode.
    pub extra_use_cases: usize,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            root_label: "Opportunities".to_string(),
            category_id: None,
            exec_mode: false,
            ranked_fallback: 10,
            extra_use_cases: 12,
        }
    }
}

pub const ROOT_ID: &str = "ROOT";

/// Build the root → category → leaf tree for the dataset.
pub fn build_tree(dataset: &Dataset, opts: &TreeOptions) -> TreeNode {
    let categories = dataset
        .domains
        .iter()
        .filter(|d| opts.category_id.as_deref().is_none_or(|id| d.id == id))
        .map(|d| {
            let items: Vec<&CatalogItem> = dataset.items_in_category(&d.id).collect();
            let mut children = primary_items(&items, opts.ranked_fallback);
            if !opts.exec_mode {
                let mut seen: HashSet<&str> = children.iter().map(|u| u.id.as_str()).collect();
                let extra = items
                    .iter()
                    .copied()
                    .filter(|u| u.is_use_case())
                    .take(opts.extra_use_cases)
                    .filter(|u| seen.insert(u.id.as_str()))
                    .collect::<Vec<_>>();
                children.extend(extra);
            }
            TreeNode::new(&d.id, &d.name, NodeKind::Category).with_children(
                children
                    .into_iter()
                    .map(|u| TreeNode::new(&u.id, u.display_name(), NodeKind::Leaf).collapsed(true))
                    .collect(),
            )
        })
        .collect();
    TreeNode::new(ROOT_ID, &opts.root_label, NodeKind::Root).with_children(categories)
}

/// The items that represent a category: its Opportunity-level items, or when
/// there are none, the `limit` best-ranked items (unranked last, stable).
pub fn primary_items<'a>(items: &[&'a CatalogItem], limit: usize) -> Vec<&'a CatalogItem> {
    let opportunities: Vec<&CatalogItem> = items.iter().copied().filter(|u| u.is_opportunity()).collect();
    if !opportunities.is_empty() {
        return opportunities;
    }
    let mut ranked: Vec<&CatalogItem> = items.to_vec();
    ranked.sort_by(|a, b| a.rank_key().total_cmp(&b.rank_key()));
    ranked.truncate(limit);
    ranked
}
