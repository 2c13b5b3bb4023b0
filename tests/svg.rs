mod common;

use common::sample;
use oppmap::layout::layout;
use oppmap::svg::{SvgOptions, render_svg, write_svg_file};
use oppmap::tree::{TreeOptions, build_tree};
use tempfile::tempdir;

#[test]
fn renders_standalone_svg() {
    let ds = sample();
    let l = layout(&build_tree(&ds, &TreeOptions::default()), 230.0, 22.0);
    let svg = render_svg(&l, &SvgOptions::default());

    assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" id=\"mindmapSvg\""));
    assert!(svg.trim_end().ends_with("</svg>"));
    assert!(svg.contains("viewBox=\"0 0 1400 240\""));
    assert_eq!(svg.matches("<path ").count(), l.edges.len());
    assert_eq!(svg.matches("<circle ").count(), l.nodes.len());
    assert!(svg.contains("data-dom=\"fin\""));
    assert!(svg.contains("data-uc=\"u1\""));
    assert!(svg.contains("● Opportunities [−]"));
    assert!(svg.contains("◆ Empty</text>"));
}

#[test]
fn escapes_labels() {
    let ds = sample();
    let l = layout(&build_tree(&ds, &TreeOptions::default()), 230.0, 22.0);
    let svg = render_svg(&l, &SvgOptions::default());
    assert!(svg.contains("Forecast &amp; plan &lt;beta&gt;"));
    assert!(!svg.contains("<beta>"));
}

#[test]
fn links_are_horizontal_cubics() {
    let ds = sample();
    let opts = TreeOptions {
        category_id: Some("fin".into()),
        ..TreeOptions::default()
    };
    let l = layout(&build_tree(&ds, &opts), 230.0, 22.0);
    let svg = render_svg(&l, &SvgOptions::default());
    // root (30, 20+22) -> fin (260, 42); fin -> u1 at (490, 20)
    assert!(svg.contains("d=\"M 30 42 C 145 42, 145 42, 260 42\""));
    assert!(svg.contains("d=\"M 260 42 C 375 42, 375 20, 490 20\""));
}

#[test]
fn collapsed_nodes_show_expand_hint_and_title() {
    let ds = sample();
    let mut root = build_tree(&ds, &TreeOptions::default());
    root.collapse_all();
    let opts = SvgOptions {
        title: Some("Map & more".into()),
        ..SvgOptions::default()
    };
    let svg = render_svg(&layout(&root, 230.0, 22.0), &opts);
    assert!(svg.contains("◆ Finance [+]"));
    assert!(svg.contains("<title>Map &amp; more</title>"));
}

#[test]
fn writes_file() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("map.svg");
    write_svg_file(&path, "<svg/>")?;
    assert_eq!(std::fs::read_to_string(&path)?, "<svg/>");
    Ok(())
}

#[test]
fn shared_category_and_item_id_still_draws_the_leaf_link() {
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
    let l = layout(&build_tree(&ds, &TreeOptions::default()), 220.0, 22.0);
    let svg = render_svg(&l, &SvgOptions::default());
    // category "1" at (250, 31), leaf "1" at (470, 20)
    assert!(svg.contains("d=\"M 250 31 C 360 31, 360 20, 470 20\""));
    assert!(!svg.contains("M 250 31 C 250 31"));
    assert_eq!(svg.matches("<path ").count(), 3);
}
