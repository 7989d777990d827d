use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_ROLE_PATTERN: &str = "director|secretary|representative";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchyConfig {
    pub columns: usize,
    pub node_width: f32,
    pub default_node_height: f32,
    pub node_gap: f32,
    pub level_gap: f32,
    pub root_width_multiplier: f32,
    pub layout_margin: f32,
    pub node_padding: f32,
    /// Case-insensitive pattern a zero-share involvement's role must match to be drawn.
    pub role_pattern: String,
    pub shareholders_label: String,
    pub representatives_label: String,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            columns: 3,
            node_width: 250.0,
            default_node_height: 110.0,
            node_gap: 50.0,
            level_gap: 180.0,
            root_width_multiplier: 1.5,
            layout_margin: 100.0,
            node_padding: 12.0,
            role_pattern: DEFAULT_ROLE_PATTERN.to_string(),
            shareholders_label: "Shareholders/representatives".to_string(),
            representatives_label: "Representatives".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionConfig {
    pub remaining_tolerance: f64,
    pub remaining_label: String,
    pub issued_label: String,
    pub unissued_label: String,
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            remaining_tolerance: 0.0001,
            remaining_label: "Remaining Shares".to_string(),
            issued_label: "Issued".to_string(),
            unissued_label: "Remaining".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PieConfig {
    pub height: f32,
    pub margin: f32,
    pub legend_rect_size: f32,
    pub legend_spacing: f32,
    pub title_height: f32,
    pub empty_message: String,
    pub empty_width: f32,
    pub empty_height: f32,
}

impl Default for PieConfig {
    fn default() -> Self {
        Self {
            height: 450.0,
            margin: 40.0,
            legend_rect_size: 18.0,
            legend_spacing: 4.0,
            title_height: 40.0,
            empty_message: "No data".to_string(),
            empty_width: 400.0,
            empty_height: 240.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub label_line_height: f32,
    pub fast_text_metrics: bool,
    pub hierarchy: HierarchyConfig,
    pub distribution: DistributionConfig,
    pub pie: PieConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            label_line_height: 1.4,
            fast_text_metrics: false,
            hierarchy: HierarchyConfig::default(),
            distribution: DistributionConfig::default(),
            pie: PieConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    pub margin_left: f32,
    pub margin_right: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub pixel_ratio: f32,
    pub page_width: f32,
    pub page_height: f32,
    pub page_margin: f32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            margin_left: 150.0,
            // Extra room on the right for the legend/minimap area.
            margin_right: 250.0,
            margin_top: 80.0,
            margin_bottom: 80.0,
            pixel_ratio: 2.0,
            // A4 portrait at 96 dpi.
            page_width: 794.0,
            page_height: 1123.0,
            page_margin: 24.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            background: "#FFFFFF".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub export: ExportConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::modern();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            export: ExportConfig::default(),
            render,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    primary_text_color: Option<String>,
    secondary_text_color: Option<String>,
    line_color: Option<String>,
    root_fill: Option<String>,
    root_border: Option<String>,
    header_fill: Option<String>,
    header_border: Option<String>,
    shareholder_fill: Option<String>,
    shareholder_border: Option<String>,
    representative_fill: Option<String>,
    representative_border: Option<String>,
    background: Option<String>,
    pie_colors: Option<Vec<String>>,
    remaining_color: Option<String>,
    pie_stroke_color: Option<String>,
    pie_stroke_width: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct HierarchyConfigFile {
    columns: Option<usize>,
    node_width: Option<f32>,
    default_node_height: Option<f32>,
    node_gap: Option<f32>,
    level_gap: Option<f32>,
    root_width_multiplier: Option<f32>,
    layout_margin: Option<f32>,
    node_padding: Option<f32>,
    role_pattern: Option<String>,
    shareholders_label: Option<String>,
    representatives_label: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct DistributionConfigFile {
    remaining_tolerance: Option<f64>,
    remaining_label: Option<String>,
    issued_label: Option<String>,
    unissued_label: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct PieConfigFile {
    height: Option<f32>,
    margin: Option<f32>,
    legend_rect_size: Option<f32>,
    legend_spacing: Option<f32>,
    title_height: Option<f32>,
    empty_message: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ExportConfigFile {
    margin_left: Option<f32>,
    margin_right: Option<f32>,
    margin_top: Option<f32>,
    margin_bottom: Option<f32>,
    pixel_ratio: Option<f32>,
    page_width: Option<f32>,
    page_height: Option<f32>,
    page_margin: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    fast_text_metrics: Option<bool>,
    hierarchy: Option<HierarchyConfigFile>,
    distribution: Option<DistributionConfigFile>,
    pie: Option<PieConfigFile>,
    export: Option<ExportConfigFile>,
}

/// Loads an optional JSON/JSON5 config file and merges it over the defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = json5::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        if theme_name == "classic" || theme_name == "default" {
            config.theme = Theme::classic();
        } else if theme_name == "modern" {
            config.theme = Theme::modern();
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.primary_text_color {
            config.theme.primary_text_color = v;
        }
        if let Some(v) = vars.secondary_text_color {
            config.theme.secondary_text_color = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.line_color = v;
        }
        if let Some(v) = vars.root_fill {
            config.theme.root_fill = v;
        }
        if let Some(v) = vars.root_border {
            config.theme.root_border = v;
        }
        if let Some(v) = vars.header_fill {
            config.theme.header_fill = v;
        }
        if let Some(v) = vars.header_border {
            config.theme.header_border = v;
        }
        if let Some(v) = vars.shareholder_fill {
            config.theme.shareholder_fill = v;
        }
        if let Some(v) = vars.shareholder_border {
            config.theme.shareholder_border = v;
        }
        if let Some(v) = vars.representative_fill {
            config.theme.representative_fill = v;
        }
        if let Some(v) = vars.representative_border {
            config.theme.representative_border = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
        if let Some(v) = vars.pie_colors {
            if !v.is_empty() {
                config.theme.pie_colors = v;
            }
        }
        if let Some(v) = vars.remaining_color {
            config.theme.remaining_color = v;
        }
        if let Some(v) = vars.pie_stroke_color {
            config.theme.pie_stroke_color = v;
        }
        if let Some(v) = vars.pie_stroke_width {
            config.theme.pie_stroke_width = v;
        }
    }

    if let Some(v) = parsed.fast_text_metrics {
        config.layout.fast_text_metrics = v;
    }

    if let Some(hierarchy) = parsed.hierarchy {
        let target = &mut config.layout.hierarchy;
        if let Some(v) = hierarchy.columns {
            target.columns = v.max(1);
        }
        if let Some(v) = hierarchy.node_width {
            target.node_width = v;
        }
        if let Some(v) = hierarchy.default_node_height {
            target.default_node_height = v;
        }
        if let Some(v) = hierarchy.node_gap {
            target.node_gap = v;
        }
        if let Some(v) = hierarchy.level_gap {
            target.level_gap = v;
        }
        if let Some(v) = hierarchy.root_width_multiplier {
            target.root_width_multiplier = v;
        }
        if let Some(v) = hierarchy.layout_margin {
            target.layout_margin = v;
        }
        if let Some(v) = hierarchy.node_padding {
            target.node_padding = v;
        }
        if let Some(v) = hierarchy.role_pattern {
            target.role_pattern = v;
        }
        if let Some(v) = hierarchy.shareholders_label {
            target.shareholders_label = v;
        }
        if let Some(v) = hierarchy.representatives_label {
            target.representatives_label = v;
        }
    }

    if let Some(distribution) = parsed.distribution {
        let target = &mut config.layout.distribution;
        if let Some(v) = distribution.remaining_tolerance {
            target.remaining_tolerance = v.abs();
        }
        if let Some(v) = distribution.remaining_label {
            target.remaining_label = v;
        }
        if let Some(v) = distribution.issued_label {
            target.issued_label = v;
        }
        if let Some(v) = distribution.unissued_label {
            target.unissued_label = v;
        }
    }

    if let Some(pie) = parsed.pie {
        let target = &mut config.layout.pie;
        if let Some(v) = pie.height {
            target.height = v;
        }
        if let Some(v) = pie.margin {
            target.margin = v;
        }
        if let Some(v) = pie.legend_rect_size {
            target.legend_rect_size = v;
        }
        if let Some(v) = pie.legend_spacing {
            target.legend_spacing = v;
        }
        if let Some(v) = pie.title_height {
            target.title_height = v;
        }
        if let Some(v) = pie.empty_message {
            target.empty_message = v;
        }
    }

    if let Some(export) = parsed.export {
        let target = &mut config.export;
        if let Some(v) = export.margin_left {
            target.margin_left = v;
        }
        if let Some(v) = export.margin_right {
            target.margin_right = v;
        }
        if let Some(v) = export.margin_top {
            target.margin_top = v;
        }
        if let Some(v) = export.margin_bottom {
            target.margin_bottom = v;
        }
        if let Some(v) = export.pixel_ratio {
            target.pixel_ratio = v;
        }
        if let Some(v) = export.page_width {
            target.page_width = v;
        }
        if let Some(v) = export.page_height {
            target.page_height = v;
        }
        if let Some(v) = export.page_margin {
            target.page_margin = v;
        }
    }

    config.render.background = config.theme.background.clone();

    Ok(config)
}
