use std::collections::HashMap;

use serde::Serialize;

use crate::distribution::{SliceCategory, ViewId};
use crate::ir::HolderKind;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    Root,
    GroupHeader,
    Shareholder,
    Representative,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareLine {
    pub class: String,
    pub amount: u64,
}

/// What a node displays. Carries no behavior.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NodePayload {
    #[serde(rename_all = "camelCase")]
    Company {
        name: String,
        address: String,
        authorized_shares: u64,
        issued_shares: u64,
    },
    #[serde(rename_all = "camelCase")]
    Header { label: String, count: usize },
    #[serde(rename_all = "camelCase")]
    Holder {
        involvement_id: String,
        name: String,
        address: String,
        holder_kind: HolderKind,
        nationality: Option<String>,
        roles: Vec<String>,
        shares: Vec<ShareLine>,
        total_shares: u64,
        percentage: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutNode {
    pub id: String,
    pub kind: NodeKind,
    pub payload: NodePayload,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    /// Rendered height; `None` until measured.
    pub height: Option<f32>,
    pub label: TextBlock,
}

impl LayoutNode {
    pub fn height_or(&self, fallback: f32) -> f32 {
        self.height.unwrap_or(fallback)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutEdge {
    pub id: String,
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HierarchyLayout {
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<LayoutEdge>,
    pub width: f32,
    pub height: f32,
    pub default_node_height: f32,
}

impl HierarchyLayout {
    pub fn node(&self, id: &str) -> Option<&LayoutNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &LayoutNode> {
        self.nodes.iter().filter(move |node| node.kind == kind)
    }

    /// Records heights measured by a rendering collaborator.
    ///
    /// Positions are untouched; only the export bounding box depends on heights.
    pub fn apply_measured_sizes(&mut self, heights: &HashMap<String, f32>) {
        for node in &mut self.nodes {
            if let Some(height) = heights.get(&node.id) {
                if height.is_finite() && *height > 0.0 {
                    node.height = Some(*height);
                }
            }
        }
        self.height = self
            .nodes
            .iter()
            .map(|node| node.y + node.height_or(self.default_node_height))
            .fold(0.0, f32::max);
    }
}

#[derive(Debug, Clone)]
pub struct PieSliceLayout {
    pub label: String,
    pub percentage: f64,
    pub share_count: f64,
    pub start_angle: f32,
    pub end_angle: f32,
    pub color: String,
    pub category: SliceCategory,
}

#[derive(Debug, Clone)]
pub struct PieLegendItem {
    pub x: f32,
    pub y: f32,
    pub label: TextBlock,
    pub color: String,
    pub marker_size: f32,
}

#[derive(Debug, Clone)]
pub struct PieTitleLayout {
    pub x: f32,
    pub y: f32,
    pub text: TextBlock,
}

#[derive(Debug, Clone)]
pub struct PieEmptyLayout {
    pub x: f32,
    pub y: f32,
    pub text: TextBlock,
}

#[derive(Debug, Clone)]
pub struct PieLayout {
    pub view: ViewId,
    pub slices: Vec<PieSliceLayout>,
    pub legend: Vec<PieLegendItem>,
    pub center: (f32, f32),
    pub radius: f32,
    pub title: Option<PieTitleLayout>,
    /// Set when the view has no slices; the renderer draws a placeholder.
    pub empty: Option<PieEmptyLayout>,
    pub width: f32,
    pub height: f32,
}
