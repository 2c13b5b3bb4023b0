mod common;

use common::sample;
use oppmap::layout::{LayoutParams, layout, layout_with};
use oppmap::tree::{NodeKind, ROOT_ID, TreeNode, TreeOptions, build_tree, primary_items};

fn child_ids(node: &TreeNode) -> Vec<&str> {
    node.children.iter().map(|c| c.id.as_str()).collect()
}

#[test]
fn categories_show_opportunities_then_use_cases() {
    let ds = sample();
    let root = build_tree(&ds, &TreeOptions::default());
    assert_eq!(root.id, ROOT_ID);
    assert_eq!(root.label, "Opportunities");
    assert_eq!(child_ids(&root), vec!["fin", "ops", "empty"]);

    let fin = root.find("fin").unwrap();
    assert_eq!(fin.kind, NodeKind::Category);
    assert_eq!(child_ids(fin), vec!["u1", "u3", "u2"]);
}

#[test]
fn exec_mode_keeps_primary_items_only() {
    let ds = sample();
    let opts = TreeOptions {
        exec_mode: true,
        ..TreeOptions::default()
    };
    let root = build_tree(&ds, &opts);
    assert_eq!(child_ids(root.find("fin").unwrap()), vec!["u1", "u3"]);
}

#[test]
fn ranked_fallback_puts_unranked_last() {
    let ds = sample();
    let root = build_tree(&ds, &TreeOptions::default());
    assert_eq!(child_ids(root.find("ops").unwrap()), vec!["u6", "u4", "u5"]);

    let items: Vec<_> = ds.items_in_category("ops").collect();
    let top2 = primary_items(&items, 2);
    assert_eq!(top2.iter().map(|u| u.id.as_str()).collect::<Vec<_>>(), vec!["u6", "u4"]);
}

#[test]
fn tree_is_capped_at_three_levels() {
    let ds = sample();
    let root = build_tree(&ds, &TreeOptions::default());
    for cat in &root.children {
        for leaf in &cat.children {
            assert_eq!(leaf.kind, NodeKind::Leaf);
            assert!(leaf.children.is_empty());
            assert!(leaf.collapsed);
        }
    }
    assert_eq!(root.node_count(), 1 + 3 + 6);
}

#[test]
fn single_category_tree() {
    let ds = sample();
    let opts = TreeOptions {
        category_id: Some("ops".into()),
        ..TreeOptions::default()
    };
    let root = build_tree(&ds, &opts);
    assert_eq!(child_ids(&root), vec!["ops"]);
}

#[test]
fn parent_is_centered_on_its_children() {
    let root = TreeNode::new("r", "Root", NodeKind::Root).with_children(vec![
        TreeNode::new("a", "A", NodeKind::Leaf),
        TreeNode::new("b", "B", NodeKind::Leaf),
        TreeNode::new("c", "C", NodeKind::Leaf),
    ]);
    let l = layout(&root, 220.0, 22.0);
    assert_eq!(l.position(NodeKind::Leaf, "a").unwrap().y, 0.0);
    assert_eq!(l.position(NodeKind::Leaf, "b").unwrap().y, 22.0);
    assert_eq!(l.position(NodeKind::Leaf, "c").unwrap().y, 44.0);
    let r = l.position(NodeKind::Root, "r").unwrap();
    assert_eq!((r.x, r.y), (0.0, 22.0));
    assert_eq!(l.position(NodeKind::Leaf, "a").unwrap().x, 220.0);
    assert_eq!(l.edges.len(), 3);
    assert_eq!(l.total_height, 240.0);
}

#[test]
fn lopsided_subtrees_center_on_extremes() {
    let ds = sample();
    let root = build_tree(&ds, &TreeOptions::default());
    let l = layout(&root, 230.0, 22.0);
    assert_eq!(l.position(NodeKind::Category, "fin").unwrap().y, 22.0);
    assert_eq!(l.position(NodeKind::Category, "ops").unwrap().y, 88.0);
    // a childless category is laid out as a leaf
    assert_eq!(l.position(NodeKind::Category, "empty").unwrap().y, 132.0);
    assert_eq!(l.position(NodeKind::Root, ROOT_ID).unwrap().y, 77.0);
    assert_eq!(l.position(NodeKind::Leaf, "u5").unwrap().x, 460.0);
}

#[test]
fn collapsed_children_are_not_laid_out() {
    let ds = sample();
    let mut root = build_tree(&ds, &TreeOptions::default());
    root.collapse_all();
    let l = layout(&root, 230.0, 22.0);
    assert_eq!(l.nodes.len(), 4);
    assert_eq!(l.edges.len(), 3);
    assert!(l.node(NodeKind::Leaf, "u1").is_none());
    let fin = l.node(NodeKind::Category, "fin").unwrap();
    assert!(fin.has_children && fin.collapsed);
    assert!(!l.node(NodeKind::Category, "empty").unwrap().collapsed);

    root.expand_all();
    assert_eq!(layout(&root, 230.0, 22.0).nodes.len(), 10);
}

#[test]
fn toggling_one_node_hides_only_its_subtree() {
    let ds = sample();
    let mut root = build_tree(&ds, &TreeOptions::default());
    root.find_mut("fin").unwrap().collapsed = true;
    let l = layout(&root, 230.0, 22.0);
    assert!(l.node(NodeKind::Leaf, "u1").is_none());
    assert!(l.node(NodeKind::Leaf, "u6").is_some());
    assert_eq!(l.position(NodeKind::Category, "fin").unwrap().y, 0.0);
}

#[test]
fn layout_is_deterministic_and_height_grows() {
    let ds = sample();
    let root = build_tree(&ds, &TreeOptions::default());
    let params = LayoutParams {
        node_gap_y: 40.0,
        ..LayoutParams::default()
    };
    let a = layout_with(&root, params);
    let b = layout_with(&root, params);
    assert_eq!(a, b);
    // 7 leaves -> cursor 280, plus the bottom margin
    assert_eq!(a.total_height, 340.0);
}

#[test]
fn colliding_category_and_item_ids_get_separate_links() {
    let ds = oppmap::loader::parse_dataset_json(
        r#"{
          "domains": [{ "id": 1, "name": "One" }],
          "usecases": [
            { "id": 1, "name": "First", "domain_id": 1, "item_level": "Opportunity" },
            { "id": 2, "name": "Second", "domain_id": 1, "item_level": "Opportunity" }
          ]
        }"#,
    )
    .unwrap();
    let root = build_tree(&ds, &TreeOptions::default());
    let l = layout(&root, 220.0, 22.0);

    let cat = l.position(NodeKind::Category, "1").unwrap();
    let leaf = l.position(NodeKind::Leaf, "1").unwrap();
    assert_eq!((cat.x, cat.y), (220.0, 11.0));
    assert_eq!((leaf.x, leaf.y), (440.0, 0.0));

    assert_eq!(l.edges.len(), 3);
    for edge in &l.edges {
        let (source, target) = l.endpoints(edge).unwrap();
        assert_eq!(target.depth, source.depth + 1);
        assert_ne!(source.pos, target.pos);
    }
    let to_leaf = l
        .edges
        .iter()
        .filter_map(|e| l.endpoints(e))
        .find(|(_, t)| t.kind == NodeKind::Leaf && t.id == "1")
        .unwrap();
    assert_eq!(to_leaf.0.kind, NodeKind::Category);
}
