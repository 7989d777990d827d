use crate::config::LayoutConfig;
use crate::distribution::{DistributionView, SliceCategory};
use crate::theme::Theme;

use super::text::measure_single;
use super::{PieEmptyLayout, PieLayout, PieLegendItem, PieSliceLayout, PieTitleLayout, TextBlock};

const TAU: f32 = std::f32::consts::PI * 2.0;

fn format_percentage(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if (rounded - rounded.round()).abs() < 0.001 {
        format!("{:.0}%", rounded)
    } else {
        format!("{:.2}%", rounded)
    }
}

/// Pie geometry for one distribution view. Slices keep the view's order.
pub fn compute_pie_layout(view: &DistributionView, theme: &Theme, config: &LayoutConfig) -> PieLayout {
    let pie_cfg = &config.pie;
    let font_family = theme.font_family.as_str();
    let title_block = measure_single(&view.id.title(), theme.pie_title_text_size, config, font_family);

    if view.is_empty() {
        let text = measure_single(&pie_cfg.empty_message, theme.font_size, config, font_family);
        let width = pie_cfg.empty_width.max(text.width + pie_cfg.margin * 2.0);
        let height = pie_cfg.empty_height;
        return PieLayout {
            view: view.id.clone(),
            slices: Vec::new(),
            legend: Vec::new(),
            center: (width / 2.0, height / 2.0),
            radius: 0.0,
            title: Some(PieTitleLayout {
                x: width / 2.0,
                y: pie_cfg.title_height / 2.0,
                text: title_block,
            }),
            empty: Some(PieEmptyLayout {
                x: width / 2.0,
                y: height / 2.0,
                text,
            }),
            width,
            height,
        };
    }

    // Colors follow slice order; equal labels do not share a color.
    let palette = &theme.pie_colors;
    let mut color_index = 0usize;
    let mut resolve_color = |category: SliceCategory| -> String {
        if matches!(category, SliceCategory::Remaining | SliceCategory::Unissued) {
            return theme.remaining_color.clone();
        }
        let color = if palette.is_empty() {
            theme.line_color.clone()
        } else {
            palette[color_index % palette.len()].clone()
        };
        color_index += 1;
        color
    };

    let total: f64 = view.percentage_sum().max(f64::EPSILON);
    let mut slices = Vec::with_capacity(view.slices.len());
    let mut angle = 0.0_f32;
    for slice in &view.slices {
        let span = (slice.percentage / total) as f32 * TAU;
        slices.push(PieSliceLayout {
            label: slice.name.clone(),
            percentage: slice.percentage,
            share_count: slice.share_count,
            start_angle: angle,
            end_angle: angle + span,
            color: resolve_color(slice.category),
            category: slice.category,
        });
        angle += span;
    }

    let mut legend_width: f32 = 0.0;
    let mut legend_items: Vec<(TextBlock, String)> = Vec::new();
    for slice in &slices {
        let text = format!("{} {}", slice.label, format_percentage(slice.percentage));
        let label = measure_single(&text, theme.pie_legend_text_size, config, font_family);
        legend_width = legend_width.max(label.width);
        legend_items.push((label, slice.color.clone()));
    }

    let height = pie_cfg.height.max(1.0) + pie_cfg.title_height;
    let pie_size = pie_cfg.height.max(1.0);
    let radius = (pie_size / 2.0 - pie_cfg.margin).max(1.0);
    let center_x = pie_size / 2.0;
    let center_y = pie_cfg.title_height + pie_size / 2.0;
    let legend_x = center_x + radius + pie_cfg.margin * 0.6;

    let legend_item_height = pie_cfg.legend_rect_size + pie_cfg.legend_spacing;
    let legend_offset = legend_item_height * legend_items.len() as f32 / 2.0;
    let legend = legend_items
        .into_iter()
        .enumerate()
        .map(|(idx, (label, color))| PieLegendItem {
            x: legend_x,
            y: center_y + idx as f32 * legend_item_height - legend_offset,
            label,
            color,
            marker_size: pie_cfg.legend_rect_size,
        })
        .collect();

    let width = legend_x
        + pie_cfg.legend_rect_size
        + pie_cfg.legend_spacing
        + legend_width
        + pie_cfg.margin * 0.4;

    PieLayout {
        view: view.id.clone(),
        slices,
        legend,
        center: (center_x, center_y),
        radius,
        title: Some(PieTitleLayout {
            x: center_x,
            y: pie_cfg.title_height / 2.0,
            text: title_block,
        }),
        empty: None,
        width: width.max(200.0),
        height,
    }
}
