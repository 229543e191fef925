use crate::config::LayoutConfig;
#[cfg(feature = "png")]
use crate::config::RenderConfig;
use crate::ir::{Diagram, Tile};
use crate::layout::{EdgeLayout, EdgePath, Layout, NodeLayout};
use crate::theme::Theme;
use anyhow::Result;
use std::collections::BTreeMap;
use std::path::Path;

pub fn render_svg(layout: &Layout, diagram: &Diagram, theme: &Theme, config: &LayoutConfig) -> String {
    let mut svg = String::new();
    let width = layout.canvas.width.max(200.0);
    let height = layout.canvas.height.max(200.0);

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));

    let markers = arrow_markers(&layout.edges, diagram, theme);
    if !markers.is_empty() {
        svg.push_str("<defs>");
        for (idx, color) in markers.values() {
            svg.push_str(&format!(
                "<marker id=\"arrow-{idx}\" viewBox=\"0 0 10 10\" refX=\"10\" refY=\"5\" markerWidth=\"6\" markerHeight=\"6\" orient=\"auto-start-reverse\"><path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"{color}\"/></marker>",
            ));
        }
        svg.push_str("</defs>");
    }

    for edge in &layout.edges {
        let (idx, color) = markers
            .get(edge.from.as_str())
            .map(|(idx, color)| (*idx, color.as_str()))
            .unwrap_or((0, theme.line_color.as_str()));
        let d = edge.path.to_svg_path();
        match edge.path {
            EdgePath::Curve(_) => svg.push_str(&format!(
                "<path class=\"edge\" data-key=\"{}\" d=\"{d}\" fill=\"none\" stroke=\"{color}\" stroke-width=\"1.6\" marker-end=\"url(#arrow-{idx})\"/>",
                escape_xml(&edge.key)
            )),
            EdgePath::Loop(_) => svg.push_str(&format!(
                "<path class=\"edge loop\" data-key=\"{}\" d=\"{d}\" fill=\"none\" stroke=\"{color}\" stroke-width=\"1.6\" stroke-linecap=\"round\"/>",
                escape_xml(&edge.key)
            )),
        }
    }

    for row in &layout.rows {
        for id in &row.nodes {
            let Some(node) = layout.nodes.get(id) else {
                continue;
            };
            let selected = layout.selected.as_deref() == Some(id.as_str());
            svg.push_str(&node_svg(node, diagram, theme, config, selected));
        }
    }

    svg.push_str("</svg>");
    svg
}

/// One marker per edge source, coloured with the source node's accent.
fn arrow_markers<'a>(
    edges: &'a [EdgeLayout],
    diagram: &Diagram,
    theme: &Theme,
) -> BTreeMap<&'a str, (usize, String)> {
    let mut markers = BTreeMap::new();
    for edge in edges {
        if markers.contains_key(edge.from.as_str()) {
            continue;
        }
        let idx = diagram.node_index(&edge.from).unwrap_or(0);
        let color = theme
            .node_colors(idx)
            .map(|c| c.accent.clone())
            .unwrap_or_else(|| theme.line_color.clone());
        markers.insert(edge.from.as_str(), (idx, color));
    }
    markers
}

fn node_svg(
    node: &NodeLayout,
    diagram: &Diagram,
    theme: &Theme,
    config: &LayoutConfig,
    selected: bool,
) -> String {
    let sizing = &config.sizing;
    let colors = diagram
        .node_index(&node.id)
        .and_then(|idx| theme.node_colors(idx));
    let (header_fill, header_border) = colors
        .map(|c| (c.header_fill.as_str(), c.header_border.as_str()))
        .unwrap_or((theme.node_fill.as_str(), theme.node_border.as_str()));
    let (border, border_width) = if selected {
        (theme.selected_border.as_str(), 2.5)
    } else {
        (theme.node_border.as_str(), 1.2)
    };
    let tiles: &[Tile] = diagram
        .nodes
        .get(&node.id)
        .map(|n| n.tiles.as_slice())
        .unwrap_or(&[]);

    let mut out = String::new();
    out.push_str(&format!(
        "<g class=\"node{}\" data-id=\"{}\">",
        if selected { " selected" } else { "" },
        escape_xml(&node.id)
    ));
    out.push_str(&format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"12\" ry=\"12\" fill=\"{}\" stroke=\"{border}\" stroke-width=\"{border_width}\"/>",
        node.x, node.y, node.width, node.height, theme.node_fill
    ));
    out.push_str(&format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"12\" ry=\"12\" fill=\"{header_fill}\" stroke=\"{header_border}\" stroke-width=\"1\"/>",
        node.x,
        node.y,
        node.width,
        sizing.header_height.min(node.height)
    ));

    let text_x = node.x + sizing.padding / 2.0;
    out.push_str(&format!(
        "<text x=\"{text_x:.2}\" y=\"{:.2}\" font-family=\"{}\" font-size=\"{}\" font-weight=\"600\" fill=\"{}\">{}</text>",
        node.y + 26.0,
        theme.font_family,
        theme.font_size + 2.0,
        theme.text_color,
        escape_xml(&node.label)
    ));
    let count = match tiles.len() {
        1 => "1 event".to_string(),
        n => format!("{n} events"),
    };
    out.push_str(&format!(
        "<text x=\"{text_x:.2}\" y=\"{:.2}\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{count}</text>",
        node.y + 48.0,
        theme.font_family,
        theme.font_size - 1.0,
        theme.muted_text_color
    ));

    let tile_width = (node.width - sizing.padding).max(0.0);
    let mut tile_y = node.y + sizing.header_height + sizing.padding / 2.0;
    for tile in tiles {
        if tile_y + sizing.tile_height > node.y + node.height {
            break;
        }
        out.push_str(&format!(
            "<rect class=\"tile\" x=\"{text_x:.2}\" y=\"{tile_y:.2}\" width=\"{tile_width:.2}\" height=\"{:.2}\" rx=\"8\" ry=\"8\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1.2\"/>",
            sizing.tile_height,
            theme.tile_fill,
            theme.tile_border(tile.impact)
        ));
        out.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\" dominant-baseline=\"middle\">{}</text>",
            text_x + 12.0,
            tile_y + sizing.tile_height / 2.0,
            theme.font_family,
            theme.font_size,
            theme.text_color,
            escape_xml(&tile.name)
        ));
        tile_y += sizing.tile_height + sizing.tile_gap;
    }

    out.push_str("</g>");
    out
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = "Inter".to_string();
    opt.default_size = usvg::Size::from_wh(render_cfg.viewport_width.max(1.0), 600.0)
        .ok_or_else(|| anyhow::anyhow!("Invalid default size"))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;
    if let Some(color) = parse_hex_color(&render_cfg.background) {
        pixmap.fill(color);
    }

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(feature = "png")]
fn parse_hex_color(input: &str) -> Option<resvg::tiny_skia::Color> {
    let hex = input.trim().strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some(resvg::tiny_skia::Color::from_rgba8(
        channel(0)?,
        channel(2)?,
        channel(4)?,
        255,
    ))
}

pub(crate) fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::ImpactType;
    use crate::layout::{MeasuredHeights, compute_layout};
    use crate::selection::Selection;

    fn diagram() -> Diagram {
        let mut diagram = Diagram::new();
        diagram.push_row(["A", "B"]);
        diagram.ensure_node("B", Some("Beta & <co>".to_string()));
        diagram.set_tiles(
            "A",
            vec![Tile {
                name: "Hospital cost".to_string(),
                impact: ImpactType::Cost,
            }],
        );
        diagram.add_transitions("A", ["B", "A"]);
        diagram
    }

    fn render(selection: &Selection) -> String {
        let diagram = diagram();
        let config = LayoutConfig::default();
        let layout = compute_layout(&diagram, &MeasuredHeights::new(), 1000.0, selection, &config);
        render_svg(&layout, &diagram, &Theme::modern(), &config)
    }

    #[test]
    fn render_svg_basic() {
        let svg = render(&Selection::Unselected);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("Beta &amp; &lt;co&gt;"));
        assert!(svg.contains("Hospital cost"));
        assert!(svg.contains("1 event<"));
        assert!(svg.contains("0 events"));
        assert!(!svg.contains("class=\"edge"));
        assert!(!svg.contains("<marker"));
    }

    #[test]
    fn selected_node_draws_its_edges() {
        let svg = render(&Selection::Selected("A".to_string()));
        assert!(svg.contains("marker id=\"arrow-0\""));
        assert!(svg.contains("fill=\"#34d399\""));
        assert!(svg.contains("class=\"edge\""));
        assert!(svg.contains("class=\"edge loop\""));
        assert!(svg.contains("class=\"node selected\" data-id=\"A\""));
    }

    #[test]
    fn edges_are_drawn_beneath_nodes() {
        let svg = render(&Selection::Selected("A".to_string()));
        let first_edge = svg.find("class=\"edge").unwrap();
        let first_node = svg.find("<g class=\"node").unwrap();
        assert!(first_edge < first_node);
    }

    #[test]
    fn escape_xml_handles_quotes() {
        assert_eq!(escape_xml("a\"b'c"), "a&quot;b&apos;c");
    }
}
