use std::path::Path;

use ownership_chart::config::LayoutConfig;
use ownership_chart::distribution::SliceCategory;
use ownership_chart::layout::NodeKind;
use ownership_chart::layout::hierarchy::{REPRESENTATIVES_HEADER_ID, ROOT_ID, SHAREHOLDERS_HEADER_ID};
use ownership_chart::render::{render_distribution_svg, render_hierarchy_svg};
use ownership_chart::theme::Theme;
use ownership_chart::{
    Distribution, DistributionInput, HierarchyLayout, OwnershipModel, ShareClassName, Snapshot, ViewId,
    compute_distribution, compute_hierarchy_layout, compute_pie_layout, parse_snapshot,
};

fn load_fixture(name: &str) -> Snapshot {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    let input = std::fs::read_to_string(&path).expect("fixture read failed");
    parse_snapshot(&input).expect("parse failed")
}

fn layout_config() -> LayoutConfig {
    LayoutConfig {
        fast_text_metrics: true,
        ..LayoutConfig::default()
    }
}

fn hierarchy(snapshot: &Snapshot) -> HierarchyLayout {
    compute_hierarchy_layout(snapshot, &Theme::modern(), &layout_config())
}

fn distribution(snapshot: &Snapshot) -> Distribution {
    compute_distribution(
        &DistributionInput::from_snapshot(snapshot),
        &layout_config().distribution,
    )
}

fn assert_valid_svg(svg: &str, fixture: &str) {
    assert!(svg.contains("<svg"), "{fixture}: missing <svg tag");
    assert!(svg.contains("</svg>"), "{fixture}: missing </svg tag");
}

fn assert_close(actual: f64, expected: f64) {
    assert!((actual - expected).abs() < 1e-2, "expected {expected}, got {actual}");
}

#[test]
fn render_all_fixtures() {
    let theme = Theme::modern();
    let config = layout_config();
    // Keep this list explicit so new fixtures are added intentionally.
    let fixtures = [
        "balanced.json",
        "overshoot.json",
        "legacy_percentages.json",
        "empty.json",
        "wide.json",
    ];
    for fixture in fixtures {
        let snapshot = load_fixture(fixture);
        let layout = hierarchy(&snapshot);
        assert_valid_svg(&render_hierarchy_svg(&layout, &theme, &config, None), fixture);
        for view in distribution(&snapshot).views() {
            let pie = compute_pie_layout(view, &theme, &config);
            let svg = render_distribution_svg(&pie, &theme, &config);
            assert_valid_svg(&svg, fixture);
            if view.is_empty() {
                assert!(svg.contains("No data"), "{fixture}/{}: empty view without placeholder", view.id);
            }
        }
    }
}

#[test]
fn authorized_view_splits_issued_capital() {
    let distribution = distribution(&load_fixture("balanced.json"));
    let view = distribution.view(&ViewId::Authorized).unwrap();
    assert_eq!(view.slices.len(), 2);
    assert_eq!(view.slices[0].name, "Issued");
    assert_close(view.slices[0].percentage, 60.0);
    assert_close(view.slices[1].percentage, 40.0);
    assert_eq!(view.total_shares_sum, 600.0);
    assert_eq!(view.current_class_total, 1000.0);
}

#[test]
fn balanced_views_need_no_adjustment() {
    let distribution = distribution(&load_fixture("balanced.json"));
    let ids: Vec<String> = distribution.view_ids().iter().map(|id| id.to_string()).collect();
    assert_eq!(ids, vec!["authorized", "classes", "total", "A", "Ordinary"]);

    let ordinary = distribution.view(&ViewId::Class(ShareClassName::Ordinary)).unwrap();
    let names: Vec<&str> = ordinary.slices.iter().map(|slice| slice.name.as_str()).collect();
    assert_eq!(names, vec!["Bob Stewart", "Forth Capital plc"]);
    assert_close(ordinary.slices[0].percentage, 40.0);
    assert_close(ordinary.slices[1].percentage, 60.0);

    let total = distribution.view(&ViewId::Total).unwrap();
    assert!(total.slices.iter().all(|slice| slice.category != SliceCategory::Remaining));
    assert_close(total.percentage_sum(), 100.0);
}

#[test]
fn overshooting_class_is_scaled() {
    let distribution = distribution(&load_fixture("overshoot.json"));
    let view = distribution.view(&ViewId::Class(ShareClassName::Ordinary)).unwrap();
    assert_close(view.total_raw, 115.0);
    assert_eq!(view.slices.len(), 2);
    assert_close(view.slices[0].percentage, 70.0 * 100.0 / 115.0);
    assert_close(view.slices[1].percentage, 45.0 * 100.0 / 115.0);
    assert!((view.percentage_sum() - 100.0).abs() < 1e-6);
}

#[test]
fn flat_percentages_fall_back_to_ordinary() {
    let snapshot = load_fixture("legacy_percentages.json");
    let distribution = distribution(&snapshot);
    let view = distribution.view(&ViewId::Class(ShareClassName::Ordinary)).unwrap();
    let remaining = view.slices.last().unwrap();
    assert_eq!(remaining.category, SliceCategory::Remaining);
    assert_eq!(remaining.name, "Remaining Shares");
    assert_close(remaining.percentage, 44.5);
    assert_eq!(remaining.share_count, 445.0);

    let layout = hierarchy(&snapshot);
    assert_eq!(layout.nodes_of_kind(NodeKind::Shareholder).count(), 2);
    assert_eq!(layout.nodes_of_kind(NodeKind::Representative).count(), 1);
}

#[test]
fn hierarchy_orders_preferred_classes_first() {
    let layout = hierarchy(&load_fixture("balanced.json"));
    let shareholders: Vec<&str> = layout
        .nodes_of_kind(NodeKind::Shareholder)
        .map(|node| node.id.as_str())
        .collect();
    assert_eq!(
        shareholders,
        vec!["shareholder-inv-alice", "shareholder-inv-holdco", "shareholder-inv-bob"]
    );
    let representatives: Vec<&str> = layout
        .nodes_of_kind(NodeKind::Representative)
        .map(|node| node.id.as_str())
        .collect();
    assert_eq!(representatives, vec!["representative-inv-carol"]);
    assert!(layout.nodes.iter().all(|node| !node.id.contains("inv-dan")));
    assert_eq!(layout.edges.len(), layout.nodes.len() - 1);
}

#[test]
fn wide_register_wraps_into_centered_rows() {
    let layout = hierarchy(&load_fixture("wide.json"));
    let mut rows: Vec<(f32, Vec<f32>)> = Vec::new();
    for node in layout.nodes_of_kind(NodeKind::Shareholder) {
        match rows.iter_mut().find(|(y, _)| *y == node.y) {
            Some((_, xs)) => xs.push(node.x),
            None => rows.push((node.y, vec![node.x])),
        }
    }
    let sizes: Vec<usize> = rows.iter().map(|(_, xs)| xs.len()).collect();
    assert_eq!(sizes, vec![3, 3, 1]);

    let header = layout.node(SHAREHOLDERS_HEADER_ID).unwrap();
    let lone = layout
        .nodes_of_kind(NodeKind::Shareholder)
        .last()
        .unwrap();
    assert!((lone.x + lone.width / 2.0 - (header.x + header.width / 2.0)).abs() < 1e-3);
}

#[test]
fn empty_company_renders_root_alone() {
    let snapshot = load_fixture("empty.json");
    let layout = hierarchy(&snapshot);
    assert_eq!(layout.nodes.len(), 1);
    assert_eq!(layout.nodes[0].id, ROOT_ID);
    assert!(layout.node(REPRESENTATIVES_HEADER_ID).is_none());

    let distribution = distribution(&snapshot);
    assert!(distribution.view(&ViewId::Authorized).unwrap().is_empty());
    assert!(distribution.view(&ViewId::Total).unwrap().is_empty());
    assert!(distribution.view(&ViewId::Class(ShareClassName::Ordinary)).is_none());
}

#[test]
fn layout_is_idempotent_across_fixtures() {
    for fixture in ["balanced.json", "wide.json", "legacy_percentages.json"] {
        let snapshot = load_fixture(fixture);
        assert_eq!(hierarchy(&snapshot), hierarchy(&snapshot), "{fixture}");
    }
}

#[test]
fn model_recomputes_once_per_snapshot() {
    let mut config = ownership_chart::Config::default();
    config.layout.fast_text_metrics = true;
    let mut model = OwnershipModel::new(config);
    let snapshot = load_fixture("balanced.json");
    for _ in 0..3 {
        model.hierarchy(&snapshot);
        model.distribution(&snapshot);
    }
    assert_eq!(model.recomputations(), (1, 1));
    model.hierarchy(&load_fixture("wide.json"));
    assert_eq!(model.recomputations(), (1, 2));
}

#[cfg(feature = "png")]
#[test]
fn exports_pages_named_after_company() {
    use ownership_chart::config::ExportConfig;
    use ownership_chart::export::{
        ExportRequest, PngPageAssembler, ResvgSnapshotter, SvgViewport, Viewport, ViewportSize,
        export_hierarchy,
    };

    let snapshot = load_fixture("balanced.json");
    let layout = hierarchy(&snapshot);
    let initial = ViewportSize {
        width: 640.0,
        height: 480.0,
    };
    let mut viewport = SvgViewport::new(layout.clone(), Theme::modern(), layout_config(), initial);
    let mut snapshotter = ResvgSnapshotter::default();
    let out_dir = std::env::temp_dir().join(format!("ownership-chart-export-{}", std::process::id()));
    let mut assembler = PngPageAssembler::new(&out_dir, 1.0);
    let config = ExportConfig {
        pixel_ratio: 1.0,
        ..ExportConfig::default()
    };
    let request = ExportRequest {
        layout: &layout,
        entity_name: &snapshot.company.name,
        background: "#ffffff",
        config: &config,
    };

    let outcome = export_hierarchy(&request, Some(&mut viewport), Some(&mut snapshotter), &mut assembler)
        .expect("export failed")
        .expect("export skipped");

    assert_eq!(viewport.size(), initial);
    assert_eq!(outcome.document.name, "northwind-holdings-ltd-ownership");
    assert_eq!(outcome.document.files.len(), outcome.pages);
    assert!(outcome.pages >= 1);
    for file in &outcome.document.files {
        assert!(file.exists(), "missing page {}", file.display());
    }
    let _ = std::fs::remove_dir_all(&out_dir);
}
