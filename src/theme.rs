use serde::{Deserialize, Serialize};

const PIE_COLORS: [&str; 12] = [
    "#4E79A7", "#F28E2B", "#E15759", "#76B7B2", "#59A14F", "#EDC948", "#B07AA1", "#FF9DA7",
    "#9C755F", "#BAB0AC", "#86BCB6", "#D37295",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub primary_text_color: String,
    pub secondary_text_color: String,
    pub line_color: String,
    pub root_fill: String,
    pub root_border: String,
    pub header_fill: String,
    pub header_border: String,
    pub shareholder_fill: String,
    pub shareholder_border: String,
    pub representative_fill: String,
    pub representative_border: String,
    pub background: String,
    pub pie_colors: Vec<String>,
    pub remaining_color: String,
    pub pie_stroke_color: String,
    pub pie_stroke_width: f32,
    pub pie_title_text_size: f32,
    pub pie_legend_text_size: f32,
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            font_family: "\"trebuchet ms\", verdana, arial, sans-serif".to_string(),
            font_size: 14.0,
            primary_text_color: "#333333".to_string(),
            secondary_text_color: "#666666".to_string(),
            line_color: "#333333".to_string(),
            root_fill: "#ECECFF".to_string(),
            root_border: "#9370DB".to_string(),
            header_fill: "#FFFFDE".to_string(),
            header_border: "#AAAA33".to_string(),
            shareholder_fill: "#FFFFFF".to_string(),
            shareholder_border: "#9370DB".to_string(),
            representative_fill: "#F4F4F4".to_string(),
            representative_border: "#999999".to_string(),
            background: "#FFFFFF".to_string(),
            pie_colors: PIE_COLORS.iter().map(|value| value.to_string()).collect(),
            remaining_color: "#D9D9D9".to_string(),
            pie_stroke_color: "#FFFFFF".to_string(),
            pie_stroke_width: 2.0,
            pie_title_text_size: 20.0,
            pie_legend_text_size: 14.0,
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            primary_text_color: "#1C2430".to_string(),
            secondary_text_color: "#5B6B82".to_string(),
            line_color: "#7A8AA6".to_string(),
            root_fill: "#EEF2F8".to_string(),
            root_border: "#7A8AA6".to_string(),
            header_fill: "#F7FAFF".to_string(),
            header_border: "#D7E0F0".to_string(),
            shareholder_fill: "#FFFFFF".to_string(),
            shareholder_border: "#C7D2E5".to_string(),
            representative_fill: "#FAFBFD".to_string(),
            representative_border: "#D7E0F0".to_string(),
            background: "#FFFFFF".to_string(),
            pie_colors: PIE_COLORS.iter().map(|value| value.to_string()).collect(),
            remaining_color: "#E3E8F0".to_string(),
            pie_stroke_color: "#FFFFFF".to_string(),
            pie_stroke_width: 1.5,
            pie_title_text_size: 18.0,
            pie_legend_text_size: 13.0,
        }
    }
}

/// Parses `#RGB` / `#RRGGBB` into components; anything else is `None`.
pub fn parse_hex_color(value: &str) -> Option<(u8, u8, u8)> {
    let hex = value.trim().strip_prefix('#')?;
    match hex.len() {
        3 => {
            let mut out = [0u8; 3];
            for (idx, ch) in hex.chars().enumerate() {
                let digit = ch.to_digit(16)? as u8;
                out[idx] = digit * 17;
            }
            Some((out[0], out[1], out[2]))
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some((r, g, b))
        }
        _ => None,
    }
}
