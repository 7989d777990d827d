//! Ownership graph: root entity, group headers, shareholder and representative
//! leaves, placed on a row-wrapping grid.

use std::cmp::Ordering;
use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

use crate::config::{HierarchyConfig, LayoutConfig};
use crate::ir::{Holder, Involvement, ShareAmounts, ShareClassName, Snapshot};
use crate::theme::Theme;

use super::text::{measure_lines, measure_single};
use super::{HierarchyLayout, LayoutEdge, LayoutNode, NodeKind, NodePayload, ShareLine, TextBlock};

pub const ROOT_ID: &str = "root";
pub const SHAREHOLDERS_HEADER_ID: &str = "group-shareholders";
pub const REPRESENTATIVES_HEADER_ID: &str = "group-representatives";

static DEFAULT_ROLE_MATCHER: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new("director|secretary|representative")
        .case_insensitive(true)
        .build()
        .expect("default role pattern is valid")
});

/// Case-insensitive matcher for representative roles. An invalid pattern
/// falls back to the default one.
pub fn role_matcher(pattern: &str) -> Regex {
    match RegexBuilder::new(pattern).case_insensitive(true).build() {
        Ok(regex) => regex,
        Err(err) => {
            tracing::warn!(pattern, error = %err, "invalid role pattern, using default");
            DEFAULT_ROLE_MATCHER.clone()
        }
    }
}

#[derive(Debug, Default)]
pub struct Classified<'a> {
    pub shareholders: Vec<&'a Involvement>,
    pub representatives: Vec<&'a Involvement>,
}

pub fn is_shareholder(involvement: &Involvement) -> bool {
    involvement.total_shares() > 0
        || involvement.shares.has_positive()
        || involvement.valid_percentage().is_some()
}

/// Splits involvements into shareholders and pure representatives. Anything
/// else carries no visual information and is dropped.
pub fn classify<'a>(involvements: &'a [Involvement], roles: &Regex) -> Classified<'a> {
    let mut classified = Classified::default();
    for involvement in involvements {
        if is_shareholder(involvement) {
            classified.shareholders.push(involvement);
        } else if involvement.has_role_matching(roles) {
            classified.representatives.push(involvement);
        }
    }
    classified
}

/// 0 for any Class A holding, 1 for B, 2 for C, 3 otherwise.
pub fn share_class_priority(shares: &ShareAmounts) -> u8 {
    if shares.get(&ShareClassName::A) > 0 {
        0
    } else if shares.get(&ShareClassName::B) > 0 {
        1
    } else if shares.get(&ShareClassName::C) > 0 {
        2
    } else {
        3
    }
}

/// Share of the company held, against `base` (issued shares or class sum).
pub fn ownership_percentage(involvement: &Involvement, base: f64) -> f64 {
    let total = involvement.total_shares() as f64;
    if total > 0.0 && base > 0.0 {
        return total / base * 100.0;
    }
    involvement.valid_percentage().unwrap_or(0.0)
}

/// Stable sort: class priority ascending, then ownership descending.
pub fn sort_by_priority(holders: &mut [&Involvement], base: f64) {
    holders.sort_by(|a, b| {
        share_class_priority(&a.shares)
            .cmp(&share_class_priority(&b.shares))
            .then_with(|| {
                ownership_percentage(b, base)
                    .partial_cmp(&ownership_percentage(a, base))
                    .unwrap_or(Ordering::Equal)
            })
    });
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSlot {
    pub row: usize,
    pub column: usize,
    pub x: f32,
}

/// Places `count` nodes in rows of `columns`, each row centered on its own width.
pub fn grid_positions(
    count: usize,
    columns: usize,
    total_width: f32,
    node_width: f32,
    gap: f32,
) -> Vec<GridSlot> {
    let columns = columns.max(1);
    let mut slots = Vec::with_capacity(count);
    for idx in 0..count {
        let row = idx / columns;
        let column = idx % columns;
        let in_row = (count - row * columns).min(columns) as f32;
        let row_width = in_row * node_width + (in_row - 1.0) * gap;
        let start_x = (total_width - row_width) / 2.0;
        slots.push(GridSlot {
            row,
            column,
            x: start_x + column as f32 * (node_width + gap),
        });
    }
    slots
}

pub fn row_count(count: usize, columns: usize) -> usize {
    count.div_ceil(columns.max(1))
}

/// `max_group * node_width + (max_group - 1) * gap + margin`, where the widest
/// group is capped at one row.
pub fn total_layout_width(max_group: usize, config: &HierarchyConfig) -> f32 {
    let widest = max_group.clamp(1, config.columns.max(1)) as f32;
    widest * config.node_width + (widest - 1.0) * config.node_gap + config.layout_margin
}

pub fn compute_hierarchy_layout(
    snapshot: &Snapshot,
    theme: &Theme,
    config: &LayoutConfig,
) -> HierarchyLayout {
    let hierarchy = &config.hierarchy;
    let roles = role_matcher(&hierarchy.role_pattern);
    let mut classified = classify(&snapshot.involvements, &roles);

    let company = &snapshot.company;
    let base = if company.issued_shares > 0 {
        company.issued_shares as f64
    } else if company.total_class_shares() > 0 {
        company.total_class_shares() as f64
    } else {
        classified
            .shareholders
            .iter()
            .map(|holder| holder.total_shares() as f64)
            .sum()
    };
    sort_by_priority(&mut classified.shareholders, base);

    let max_group = classified
        .shareholders
        .len()
        .max(classified.representatives.len());
    let total_width = total_layout_width(max_group, hierarchy);
    let mut builder = GraphBuilder::new(theme, config);

    let root_width = hierarchy.node_width * hierarchy.root_width_multiplier;
    let root_payload = NodePayload::Company {
        name: company.name.clone(),
        address: company.address.clone(),
        authorized_shares: company.authorized_shares,
        issued_shares: company.issued_shares,
    };
    builder.push_node(
        ROOT_ID.to_string(),
        NodeKind::Root,
        root_payload,
        (total_width - root_width) / 2.0,
        0.0,
        root_width,
    );

    let header_x = (total_width - hierarchy.node_width) / 2.0;
    let mut next_level = 1usize;
    let mut representatives_parent = ROOT_ID;

    if !classified.shareholders.is_empty() {
        builder.push_node(
            SHAREHOLDERS_HEADER_ID.to_string(),
            NodeKind::GroupHeader,
            NodePayload::Header {
                label: hierarchy.shareholders_label.clone(),
                count: classified.shareholders.len(),
            },
            header_x,
            level_y(next_level, hierarchy),
            hierarchy.node_width,
        );
        builder.push_edge(ROOT_ID, SHAREHOLDERS_HEADER_ID);
        let first_row = next_level + 1;
        let slots = grid_positions(
            classified.shareholders.len(),
            hierarchy.columns,
            total_width,
            hierarchy.node_width,
            hierarchy.node_gap,
        );
        for (holder, slot) in classified.shareholders.iter().zip(&slots) {
            let id = builder.unique_id(&format!("shareholder-{}", holder.id));
            builder.push_node(
                id.clone(),
                NodeKind::Shareholder,
                holder_payload(holder, base),
                slot.x,
                level_y(first_row + slot.row, hierarchy),
                hierarchy.node_width,
            );
            builder.push_edge(SHAREHOLDERS_HEADER_ID, &id);
        }
        next_level = first_row + row_count(classified.shareholders.len(), hierarchy.columns);
        representatives_parent = SHAREHOLDERS_HEADER_ID;
    }

    if !classified.representatives.is_empty() {
        builder.push_node(
            REPRESENTATIVES_HEADER_ID.to_string(),
            NodeKind::GroupHeader,
            NodePayload::Header {
                label: hierarchy.representatives_label.clone(),
                count: classified.representatives.len(),
            },
            header_x,
            level_y(next_level, hierarchy),
            hierarchy.node_width,
        );
        builder.push_edge(representatives_parent, REPRESENTATIVES_HEADER_ID);
        let first_row = next_level + 1;
        let slots = grid_positions(
            classified.representatives.len(),
            hierarchy.columns,
            total_width,
            hierarchy.node_width,
            hierarchy.node_gap,
        );
        for (representative, slot) in classified.representatives.iter().zip(&slots) {
            let id = builder.unique_id(&format!("representative-{}", representative.id));
            builder.push_node(
                id.clone(),
                NodeKind::Representative,
                holder_payload(representative, base),
                slot.x,
                level_y(first_row + slot.row, hierarchy),
                hierarchy.node_width,
            );
            builder.push_edge(REPRESENTATIVES_HEADER_ID, &id);
        }
    }

    let layout = builder.finish(total_width);
    tracing::debug!(
        company = %company.name,
        shareholders = classified.shareholders.len(),
        representatives = classified.representatives.len(),
        nodes = layout.nodes.len(),
        edges = layout.edges.len(),
        "computed hierarchy layout"
    );
    layout
}

fn level_y(level: usize, config: &HierarchyConfig) -> f32 {
    level as f32 * config.level_gap
}

fn holder_payload(involvement: &Involvement, base: f64) -> NodePayload {
    let nationality = match &involvement.holder {
        Holder::Person { nationality, .. } => nationality.clone(),
        Holder::Company { .. } => None,
    };
    NodePayload::Holder {
        involvement_id: involvement.id.clone(),
        name: involvement.holder.display_name().to_string(),
        address: involvement.holder.address().to_string(),
        holder_kind: involvement.holder.kind(),
        nationality,
        roles: involvement.roles.clone(),
        shares: involvement
            .shares
            .iter()
            .map(|(class, amount)| ShareLine {
                class: class.display_label(),
                amount,
            })
            .collect(),
        total_shares: involvement.total_shares(),
        percentage: ownership_percentage(involvement, base),
    }
}

/// Text lines shown inside a node, top to bottom.
pub fn payload_lines(payload: &NodePayload) -> Vec<String> {
    match payload {
        NodePayload::Company {
            name,
            address,
            authorized_shares,
            issued_shares,
        } => {
            let mut lines = vec![name.clone()];
            if !address.is_empty() {
                lines.push(address.clone());
            }
            if *authorized_shares > 0 || *issued_shares > 0 {
                lines.push(format!(
                    "Issued {issued_shares} of {authorized_shares} authorized"
                ));
            }
            lines
        }
        NodePayload::Header { label, count } => vec![format!("{label} ({count})")],
        NodePayload::Holder {
            name,
            address,
            nationality,
            roles,
            shares,
            percentage,
            ..
        } => {
            let mut lines = vec![name.clone()];
            if !address.is_empty() {
                lines.push(address.clone());
            }
            if let Some(nationality) = nationality {
                if !nationality.is_empty() {
                    lines.push(nationality.clone());
                }
            }
            if !shares.is_empty() {
                let breakdown: Vec<String> = shares
                    .iter()
                    .map(|line| format!("{}: {}", line.class, line.amount))
                    .collect();
                lines.push(breakdown.join(", "));
            }
            if *percentage > 0.0 {
                lines.push(format!("{percentage:.2}%"));
            }
            if !roles.is_empty() {
                lines.push(roles.join(", "));
            }
            lines
        }
    }
}

struct GraphBuilder<'a> {
    theme: &'a Theme,
    config: &'a LayoutConfig,
    nodes: Vec<LayoutNode>,
    edges: Vec<LayoutEdge>,
    used_ids: HashSet<String>,
}

impl<'a> GraphBuilder<'a> {
    fn new(theme: &'a Theme, config: &'a LayoutConfig) -> Self {
        Self {
            theme,
            config,
            nodes: Vec::new(),
            edges: Vec::new(),
            used_ids: [ROOT_ID, SHAREHOLDERS_HEADER_ID, REPRESENTATIVES_HEADER_ID]
                .iter()
                .map(|id| id.to_string())
                .collect(),
        }
    }

    fn unique_id(&mut self, candidate: &str) -> String {
        let mut id = candidate.to_string();
        let mut suffix = 2;
        while self.used_ids.contains(&id) {
            id = format!("{candidate}-{suffix}");
            suffix += 1;
        }
        self.used_ids.insert(id.clone());
        id
    }

    fn push_node(
        &mut self,
        id: String,
        kind: NodeKind,
        payload: NodePayload,
        x: f32,
        y: f32,
        width: f32,
    ) {
        let hierarchy = &self.config.hierarchy;
        let label = self.measure(kind, &payload, width);
        let min_height = match kind {
            NodeKind::GroupHeader => 0.0,
            _ => hierarchy.default_node_height,
        };
        let height = (label.height + hierarchy.node_padding * 2.0).max(min_height);
        self.nodes.push(LayoutNode {
            id,
            kind,
            payload,
            x,
            y,
            width,
            height: Some(height),
            label,
        });
    }

    fn measure(&self, kind: NodeKind, payload: &NodePayload, width: f32) -> TextBlock {
        let font_family = self.theme.font_family.as_str();
        let font_size = self.theme.font_size;
        let lines = payload_lines(payload);
        if kind == NodeKind::GroupHeader {
            let text = lines.first().cloned().unwrap_or_default();
            return measure_single(&text, font_size, self.config, font_family);
        }
        let max_width = (width - self.config.hierarchy.node_padding * 2.0).max(font_size);
        measure_lines(&lines, font_size, max_width, self.config, font_family)
    }

    fn push_edge(&mut self, source: &str, target: &str) {
        self.edges.push(LayoutEdge {
            id: format!("edge-{source}-{target}"),
            source: source.to_string(),
            target: target.to_string(),
        });
    }

    fn finish(self, total_width: f32) -> HierarchyLayout {
        let default_node_height = self.config.hierarchy.default_node_height;
        let width = self
            .nodes
            .iter()
            .map(|node| node.x + node.width)
            .fold(total_width, f32::max);
        let height = self
            .nodes
            .iter()
            .map(|node| node.y + node.height_or(default_node_height))
            .fold(0.0, f32::max);
        HierarchyLayout {
            nodes: self.nodes,
            edges: self.edges,
            width,
            height,
            default_node_height,
        }
    }
}
