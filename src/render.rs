use crate::config::LayoutConfig;
#[cfg(feature = "png")]
use crate::config::RenderConfig;
use crate::export::{ViewportSize, ViewportState, ViewportTransform};
use crate::layout::{HierarchyLayout, LayoutNode, NodeKind, PieLayout, PieSliceLayout, TextBlock};
use crate::theme::Theme;
use anyhow::Result;
use std::collections::HashMap;
use std::f32::consts::{FRAC_PI_2, PI};
use std::path::Path;

const CANVAS_PAD: f32 = 24.0;

fn default_state(layout: &HierarchyLayout) -> ViewportState {
    ViewportState {
        transform: ViewportTransform {
            x: 0.0,
            y: CANVAS_PAD,
            zoom: 1.0,
        },
        size: ViewportSize {
            width: layout.width.max(200.0),
            height: (layout.height + CANVAS_PAD * 2.0).max(200.0),
        },
    }
}

/// Paints the ownership graph. With `viewport`, the canvas takes the viewport's
/// size and the content its pan and zoom.
pub fn render_hierarchy_svg(
    layout: &HierarchyLayout,
    theme: &Theme,
    config: &LayoutConfig,
    viewport: Option<&ViewportState>,
) -> String {
    let state = viewport.copied().unwrap_or_else(|| default_state(layout));
    let width = state.size.width;
    let height = state.size.height;
    let mut svg = String::new();

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));
    svg.push_str(&format!(
        "<g transform=\"translate({:.2} {:.2}) scale({:.4})\">",
        state.transform.x, state.transform.y, state.transform.zoom
    ));

    let default_height = layout.default_node_height;
    let nodes: HashMap<&str, &LayoutNode> =
        layout.nodes.iter().map(|node| (node.id.as_str(), node)).collect();

    for edge in &layout.edges {
        let (Some(source), Some(target)) = (
            nodes.get(edge.source.as_str()),
            nodes.get(edge.target.as_str()),
        ) else {
            continue;
        };
        let start = (
            source.x + source.width / 2.0,
            source.y + source.height_or(default_height),
        );
        let end = (target.x + target.width / 2.0, target.y);
        let mid_y = (start.1 + end.1) / 2.0;
        let points = [start, (start.0, mid_y), (end.0, mid_y), end];
        svg.push_str(&format!(
            "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1.4\"/>",
            points_to_path(&points),
            theme.line_color
        ));
    }

    for node in &layout.nodes {
        let (fill, stroke, radius) = match node.kind {
            NodeKind::Root => (&theme.root_fill, &theme.root_border, 12.0),
            NodeKind::GroupHeader => (&theme.header_fill, &theme.header_border, 18.0),
            NodeKind::Shareholder => (&theme.shareholder_fill, &theme.shareholder_border, 10.0),
            NodeKind::Representative => {
                (&theme.representative_fill, &theme.representative_border, 10.0)
            }
        };
        let node_height = node.height_or(default_height);
        svg.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{radius}\" ry=\"{radius}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1.4\"/>",
            node.x, node.y, node.width, node_height, fill, stroke
        ));
        let center_x = node.x + node.width / 2.0;
        let center_y = node.y + node_height / 2.0;
        svg.push_str(&text_block_svg(
            center_x,
            center_y,
            &node.label,
            theme.font_size,
            theme,
            config,
            node.kind != NodeKind::GroupHeader,
        ));
    }

    svg.push_str("</g></svg>");
    svg
}

/// Paints one distribution view: slices and legend, or the empty placeholder.
pub fn render_distribution_svg(pie: &PieLayout, theme: &Theme, config: &LayoutConfig) -> String {
    let width = pie.width.max(200.0);
    let height = pie.height.max(120.0);
    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));

    if let Some(title) = &pie.title {
        svg.push_str(&text_block_svg(
            title.x,
            title.y,
            &title.text,
            theme.pie_title_text_size,
            theme,
            config,
            true,
        ));
    }

    if let Some(empty) = &pie.empty {
        let pad = 16.0;
        svg.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"8\" ry=\"8\" fill=\"none\" stroke=\"{}\" stroke-dasharray=\"6 4\"/>",
            pad,
            pad + config.pie.title_height / 2.0,
            width - pad * 2.0,
            height - pad * 2.0 - config.pie.title_height / 2.0,
            theme.line_color
        ));
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" dominant-baseline=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            empty.x,
            empty.y,
            escape_xml(&theme.font_family),
            theme.font_size,
            theme.secondary_text_color,
            escape_xml(&empty.text.lines.join(" "))
        ));
        svg.push_str("</svg>");
        return svg;
    }

    for slice in &pie.slices {
        svg.push_str(&slice_svg(pie.center, pie.radius, slice, theme));
    }

    for item in &pie.legend {
        svg.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\"/>",
            item.x,
            item.y,
            item.marker_size,
            item.marker_size,
            item.color,
            item.color
        ));
        let text_x = item.x + item.marker_size + config.pie.legend_spacing;
        let text_y = item.y + item.marker_size / 2.0;
        svg.push_str(&format!(
            "<text x=\"{text_x:.2}\" y=\"{text_y:.2}\" dominant-baseline=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            escape_xml(&theme.font_family),
            theme.pie_legend_text_size,
            theme.primary_text_color,
            escape_xml(&item.label.lines.join(" "))
        ));
    }

    svg.push_str("</svg>");
    svg
}

fn slice_svg(center: (f32, f32), radius: f32, slice: &PieSliceLayout, theme: &Theme) -> String {
    let span = slice.end_angle - slice.start_angle;
    if span <= 0.0 {
        return String::new();
    }
    let tooltip = format!(
        "<title>{}: {:.2}% ({} shares)</title>",
        escape_xml(&slice.label),
        slice.percentage,
        slice.share_count.round()
    );
    if span >= PI * 2.0 - 1e-4 {
        return format!(
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\">{tooltip}</circle>",
            center.0, center.1, radius, slice.color, theme.pie_stroke_color, theme.pie_stroke_width
        );
    }
    // Angles run clockwise from twelve o'clock.
    let point = |angle: f32| {
        (
            center.0 + radius * (angle - FRAC_PI_2).cos(),
            center.1 + radius * (angle - FRAC_PI_2).sin(),
        )
    };
    let start = point(slice.start_angle);
    let end = point(slice.end_angle);
    let large_arc = if span > PI { 1 } else { 0 };
    format!(
        "<path d=\"M {:.2} {:.2} L {:.2} {:.2} A {:.2} {:.2} 0 {large_arc} 1 {:.2} {:.2} Z\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\">{tooltip}</path>",
        center.0,
        center.1,
        start.0,
        start.1,
        radius,
        radius,
        end.0,
        end.1,
        slice.color,
        theme.pie_stroke_color,
        theme.pie_stroke_width
    )
}

fn points_to_path(points: &[(f32, f32)]) -> String {
    if points.is_empty() {
        return String::new();
    }
    let mut d = String::new();
    d.push_str(&format!("M {:.2} {:.2}", points[0].0, points[0].1));
    for point in points.iter().skip(1) {
        d.push_str(&format!(" L {:.2} {:.2}", point.0, point.1));
    }
    d
}

fn text_block_svg(
    x: f32,
    y: f32,
    label: &TextBlock,
    font_size: f32,
    theme: &Theme,
    config: &LayoutConfig,
    bold_first: bool,
) -> String {
    let line_height = font_size * config.label_line_height;
    let total_height = label.lines.len() as f32 * line_height;
    let start_y = y - total_height / 2.0 + font_size;
    let mut text = String::new();

    text.push_str(&format!(
        "<text x=\"{x:.2}\" y=\"{start_y:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">",
        escape_xml(&theme.font_family),
        font_size,
        theme.primary_text_color
    ));
    for (idx, line) in label.lines.iter().enumerate() {
        let dy = if idx == 0 { 0.0 } else { line_height };
        let weight = if idx == 0 && bold_first {
            " font-weight=\"600\""
        } else {
            ""
        };
        text.push_str(&format!(
            "<tspan x=\"{x:.2}\" dy=\"{dy:.2}\"{weight}>{}</tspan>",
            escape_xml(line)
        ));
    }
    text.push_str("</text>");
    text
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
pub(crate) fn rasterize_svg(
    svg: &str,
    scale: f32,
    background: Option<&str>,
    render_cfg: &RenderConfig,
) -> Result<resvg::tiny_skia::Pixmap> {
    use crate::theme::parse_hex_color;
    use resvg::tiny_skia::{Color, Pixmap, Transform};

    let mut opt = usvg::Options::default();
    opt.font_family = "Inter".to_string();
    opt.fontdb_mut().load_system_fonts();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .or_else(|| usvg::Size::from_wh(800.0, 600.0))
        .ok_or_else(|| anyhow::anyhow!("Invalid default canvas size"))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree
        .size()
        .to_int_size()
        .scale_by(scale)
        .ok_or_else(|| anyhow::anyhow!("Invalid raster scale {scale}"))?;
    let mut pixmap = Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;
    if let Some((r, g, b)) = background.and_then(parse_hex_color) {
        pixmap.fill(Color::from_rgba8(r, g, b, 255));
    }

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap_mut);
    Ok(pixmap)
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let pixmap = rasterize_svg(svg, 1.0, Some(&render_cfg.background), render_cfg)?;
    pixmap.save_png(output)?;
    Ok(())
}

pub(crate) fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
