use crate::distribution::{Distribution, DistributionView};
use crate::ir::Snapshot;
use crate::layout::{HierarchyLayout, NodeKind, NodePayload};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyDump {
    pub company_id: String,
    pub width: f32,
    pub height: f32,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDump {
    pub id: String,
    pub kind: NodeKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: Option<f32>,
    /// Positions come from the layout only; renderers must not let users move
    /// or wire nodes.
    pub draggable: bool,
    pub connectable: bool,
    pub label_lines: Vec<String>,
    pub data: NodePayload,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDump {
    pub id: String,
    pub source: String,
    pub target: String,
}

impl HierarchyDump {
    pub fn from_layout(layout: &HierarchyLayout, snapshot: &Snapshot) -> Self {
        let nodes = layout
            .nodes
            .iter()
            .map(|node| NodeDump {
                id: node.id.clone(),
                kind: node.kind,
                x: node.x,
                y: node.y,
                width: node.width,
                height: node.height,
                draggable: false,
                connectable: false,
                label_lines: node.label.lines.clone(),
                data: node.payload.clone(),
            })
            .collect();

        let edges = layout
            .edges
            .iter()
            .map(|edge| EdgeDump {
                id: edge.id.clone(),
                source: edge.source.clone(),
                target: edge.target.clone(),
            })
            .collect();

        HierarchyDump {
            company_id: snapshot.company.id.clone(),
            width: layout.width,
            height: layout.height,
            nodes,
            edges,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionDump<'a> {
    pub company_id: &'a str,
    /// View ids in tab order.
    pub view_ids: Vec<String>,
    pub views: &'a [DistributionView],
}

impl<'a> DistributionDump<'a> {
    pub fn new(distribution: &'a Distribution, snapshot: &'a Snapshot) -> Self {
        Self {
            company_id: &snapshot.company.id,
            view_ids: distribution
                .view_ids()
                .iter()
                .map(|id| id.key().to_string())
                .collect(),
            views: distribution.views(),
        }
    }

    /// Keeps only `view`; an unknown id leaves the dump empty.
    pub fn single(distribution: &'a Distribution, snapshot: &'a Snapshot, view: &DistributionView) -> Self {
        let position = distribution.views().iter().position(|candidate| candidate.id == view.id);
        let views = match position {
            Some(idx) => &distribution.views()[idx..=idx],
            None => &[],
        };
        Self {
            company_id: &snapshot.company.id,
            view_ids: views.iter().map(|view| view.id.key().to_string()).collect(),
            views,
        }
    }
}

/// Writes `dump` as pretty JSON to `path`, or to stdout when `path` is `None`.
pub fn write_dump<T: Serialize>(path: Option<&Path>, dump: &T) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            let file = File::create(path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, dump)?;
            writer.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, dump)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DistributionConfig, LayoutConfig};
    use crate::distribution::{DistributionInput, ViewId, compute_distribution};
    use crate::ir::{Company, Holder, Involvement, ShareClassName};
    use crate::layout::compute_hierarchy_layout;
    use crate::theme::Theme;

    fn snapshot() -> Snapshot {
        let mut company = Company::new("co-1", "Acme");
        company.authorized_shares = 1000;
        company.issued_shares = 600;
        Snapshot::new(
            company,
            vec![
                Involvement::new("1", Holder::person("Alice")).with_shares(ShareClassName::Ordinary, 600),
            ],
        )
    }

    #[test]
    fn hierarchy_dump_locks_nodes() {
        let snapshot = snapshot();
        let config = LayoutConfig {
            fast_text_metrics: true,
            ..LayoutConfig::default()
        };
        let layout = compute_hierarchy_layout(&snapshot, &Theme::modern(), &config);
        let dump = HierarchyDump::from_layout(&layout, &snapshot);
        let value = serde_json::to_value(&dump).unwrap();
        assert_eq!(value["companyId"], "co-1");
        let nodes = value["nodes"].as_array().unwrap();
        assert_eq!(nodes.len(), layout.nodes.len());
        assert!(nodes.iter().all(|node| node["draggable"] == false && node["connectable"] == false));
        assert_eq!(nodes[0]["kind"], "root");
        assert_eq!(nodes[0]["data"]["type"], "company");
        assert_eq!(value["edges"][0]["source"], "root");
    }

    #[test]
    fn distribution_dump_lists_views() {
        let snapshot = snapshot();
        let distribution = compute_distribution(
            &DistributionInput::from_snapshot(&snapshot),
            &DistributionConfig::default(),
        );
        let dump = DistributionDump::new(&distribution, &snapshot);
        let value = serde_json::to_value(&dump).unwrap();
        assert_eq!(value["viewIds"][0], "authorized");
        assert_eq!(value["views"][0]["slices"][0]["percentageValue"], 60.0);

        let total = distribution.view(&ViewId::Total).unwrap();
        let single = DistributionDump::single(&distribution, &snapshot, total);
        assert_eq!(single.view_ids, vec!["total".to_string()]);
    }
}
