//! Render a [`TreeLayout`] as standalone SVG markup.
//!
//! Links are horizontal cubic curves from parent to child; nodes are a circle
//! plus a label. The output always declares the SVG namespace so it can be
//! saved and opened as a file as-is.

use crate::layout::{TreeLayout, Vec2f};
use crate::tree::NodeKind;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

const SVG_NS: &str = "http://www.w3.org/2000/svg";
/// Room reserved right of the deepest column for its labels.
const LABEL_ROOM: f32 = 320.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SvgOptions {
    /// Minimum canvas width.
    pub width: f32,
    pub margin_left: f32,
    pub margin_top: f32,
    pub title: Option<String>,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            width: 1400.0,
            margin_left: 30.0,
            margin_top: 20.0,
            title: None,
        }
    }
}

struct NodeStyle {
    radius: f32,
    fill: &'static str,
    icon: &'static str,
    font_size: u32,
    font_weight: u32,
    data_attr: Option<&'static str>,
}

fn style(kind: NodeKind) -> NodeStyle {
    match kind {
        NodeKind::Root => NodeStyle {
            radius: 7.0,
            fill: "rgba(105,168,255,.95)",
            icon: "●",
            font_size: 14,
            font_weight: 700,
            data_attr: None,
        },
        NodeKind::Category => NodeStyle {
            radius: 6.0,
            fill: "rgba(94,224,143,.92)",
            icon: "◆",
            font_size: 12,
            font_weight: 600,
            data_attr: Some("data-dom"),
        },
        NodeKind::Leaf => NodeStyle {
            radius: 5.0,
            fill: "rgba(255,255,255,.82)",
            icon: "•",
            font_size: 12,
            font_weight: 600,
            data_attr: Some("data-uc"),
        },
    }
}

fn attr(s: &str) -> std::borrow::Cow<'_, str> {
    html_escape::encode_double_quoted_attribute(s)
}

fn text(s: &str) -> std::borrow::Cow<'_, str> {
    html_escape::encode_text(s)
}

/// Render the laid-out tree to an SVG document string.
pub fn render_svg(layout: &TreeLayout, opts: &SvgOptions) -> String {
    let w = opts
        .width
        .max(opts.margin_left + layout.max_x() + LABEL_ROOM);
    let h = layout.total_height;
    let offset = |p: Vec2f| Vec2f::new(opts.margin_left + p.x, opts.margin_top + p.y);

    let mut out = String::with_capacity(256 + layout.nodes.len() * 256);
    // Writing into a String cannot fail.
    let _ = writeln!(
        out,
        "<svg xmlns=\"{SVG_NS}\" id=\"mindmapSvg\" viewBox=\"0 0 {w} {h}\" width=\"{w}\" height=\"{h}\" role=\"img\" aria-label=\"Mindmap\">"
    );
    if let Some(title) = &opts.title {
        let _ = writeln!(out, "  <title>{}</title>", text(title));
    }
    let _ = writeln!(
        out,
        "  <rect x=\"0\" y=\"0\" width=\"{w}\" height=\"{h}\" fill=\"transparent\"/>"
    );

    for edge in &layout.edges {
        let Some((source, target)) = layout.endpoints(edge) else {
            continue;
        };
        let (a, b) = (offset(source.pos), offset(target.pos));
        let mid = (a.x + b.x) / 2.0;
        let _ = writeln!(
            out,
            "  <path d=\"M {} {} C {mid} {}, {mid} {}, {} {}\" fill=\"none\" stroke=\"rgba(255,255,255,.18)\" stroke-width=\"1.4\"/>",
            a.x, a.y, a.y, b.y, b.x, b.y
        );
    }

    for node in &layout.nodes {
        let s = style(node.kind);
        let p = offset(node.pos);
        let data = s
            .data_attr
            .map(|name| format!(" {}=\"{}\"", name, attr(&node.id)))
            .unwrap_or_default();
        let hint = match (node.has_children, node.collapsed) {
            (false, _) => "",
            (true, true) => " [+]",
            (true, false) => " [−]",
        };
        let _ = writeln!(out, "  <g class=\"mm-node\"{data} transform=\"translate({},{})\">", p.x, p.y);
        let _ = writeln!(out, "    <circle r=\"{}\" fill=\"{}\"/>", s.radius, s.fill);
        let _ = writeln!(
            out,
            "    <text x=\"{}\" y=\"4\" fill=\"rgba(232,238,252,.92)\" font-size=\"{}\" font-weight=\"{}\">{} {}{}</text>",
            s.radius + 10.0,
            s.font_size,
            s.font_weight,
            s.icon,
            text(&node.label),
            hint
        );
        out.push_str("  </g>\n");
    }
    out.push_str("</svg>\n");
    out
}

/// Write rendered markup to `path` verbatim.
pub fn write_svg_file(path: impl AsRef<std::path::Path>, markup: &str) -> anyhow::Result<()> {
    let path = path.as_ref();
    std::fs::write(path, markup).with_context(|| format!("Failed to write {}", path.display()))
}
