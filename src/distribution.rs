//! Percentage breakdowns of share ownership.
//!
//! Every view is recomputed in full from one [`DistributionInput`]. Holder views
//! (per class and total) are normalized so their slices sum to 100: an
//! overshooting raw sum is scaled down, an undershooting one gets a synthetic
//! remaining slice for capital not attributed to any listed holder.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Serialize, Serializer};

use crate::config::DistributionConfig;
use crate::ir::{HolderKind, ShareAmounts, ShareClassName, Snapshot};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ViewId {
    Authorized,
    Classes,
    Total,
    Class(ShareClassName),
}

impl ViewId {
    pub fn key(&self) -> &str {
        match self {
            ViewId::Authorized => "authorized",
            ViewId::Classes => "classes",
            ViewId::Total => "total",
            ViewId::Class(class) => class.key(),
        }
    }

    pub fn parse(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "authorized" | "authorised" => ViewId::Authorized,
            "classes" => ViewId::Classes,
            "total" => ViewId::Total,
            _ => ViewId::Class(ShareClassName::from_label(token)),
        }
    }

    pub fn title(&self) -> String {
        match self {
            ViewId::Authorized => "Authorized vs issued".to_string(),
            ViewId::Classes => "Share classes".to_string(),
            ViewId::Total => "Total ownership".to_string(),
            ViewId::Class(class) => class.display_label(),
        }
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl Serialize for ViewId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SliceCategory {
    Holder(HolderKind),
    Remaining,
    ShareClass,
    Issued,
    Unissued,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedSlice {
    pub name: String,
    #[serde(rename = "percentageValue")]
    pub percentage: f64,
    #[serde(rename = "absoluteShareCount")]
    pub share_count: f64,
    pub category: SliceCategory,
}

impl NormalizedSlice {
    pub fn new(name: impl Into<String>, percentage: f64, share_count: f64, category: SliceCategory) -> Self {
        Self {
            name: name.into(),
            percentage,
            share_count,
            category,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionView {
    pub id: ViewId,
    pub slices: Vec<NormalizedSlice>,
    /// Sum of the raw percentages before normalization.
    pub total_raw: f64,
    pub total_shares_sum: f64,
    pub current_class_total: f64,
}

impl DistributionView {
    fn empty(id: ViewId, current_class_total: f64) -> Self {
        Self {
            id,
            slices: Vec::new(),
            total_raw: 0.0,
            total_shares_sum: 0.0,
            current_class_total,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    pub fn percentage_sum(&self) -> f64 {
        self.slices.iter().map(|slice| slice.percentage).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    pub views: Vec<DistributionView>,
}

impl Distribution {
    pub fn view(&self, id: &ViewId) -> Option<&DistributionView> {
        self.views.iter().find(|view| &view.id == id)
    }

    pub fn views(&self) -> &[DistributionView] {
        &self.views
    }

    pub fn view_ids(&self) -> Vec<ViewId> {
        self.views.iter().map(|view| view.id.clone()).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HolderRecord {
    pub name: String,
    pub kind: HolderKind,
    pub shares: ShareAmounts,
    pub share_percentage: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DistributionInput {
    pub holders: Vec<HolderRecord>,
    pub class_totals: BTreeMap<ShareClassName, u64>,
    pub authorized_shares: f64,
    pub issued_shares: f64,
    pub company_total_shares: f64,
}

impl DistributionInput {
    /// Shapes a snapshot into normalizer input.
    ///
    /// A class total is the company's issued count for that class, or the sum of
    /// holder amounts in that class when the company records none.
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let company = &snapshot.company;
        let holders: Vec<HolderRecord> = snapshot
            .involvements
            .iter()
            .map(|involvement| HolderRecord {
                name: involvement.holder.display_name().to_string(),
                kind: involvement.holder.kind(),
                shares: involvement.shares.clone(),
                share_percentage: involvement.share_percentage,
            })
            .collect();

        let mut classes: BTreeSet<ShareClassName> = company
            .share_classes
            .iter()
            .map(|class| class.name.clone())
            .collect();
        for holder in &holders {
            classes.extend(holder.shares.iter().map(|(class, _)| class.clone()));
        }

        let mut class_totals = BTreeMap::new();
        for class in classes {
            let recorded = company.class_total(&class);
            let total = if recorded > 0 {
                recorded
            } else {
                holders
                    .iter()
                    .map(|holder| holder.shares.get(&class))
                    .fold(0, u64::saturating_add)
            };
            class_totals.insert(class, total);
        }

        let company_total_shares = class_totals
            .values()
            .copied()
            .fold(0u64, u64::saturating_add) as f64;
        Self {
            holders,
            class_totals,
            authorized_shares: company.authorized_shares as f64,
            issued_shares: company.issued_shares as f64,
            company_total_shares,
        }
    }

    fn class_total(&self, class: &ShareClassName) -> f64 {
        self.class_totals.get(class).copied().unwrap_or(0) as f64
    }

    /// Denominator for the aggregate view: issued shares, else the class sum.
    pub fn aggregate_base(&self) -> f64 {
        if self.issued_shares > 0.0 {
            self.issued_shares
        } else {
            self.company_total_shares
        }
    }
}

pub fn compute_distribution(input: &DistributionInput, config: &DistributionConfig) -> Distribution {
    let mut views = vec![
        authorized_view(input, config),
        classes_view(input),
        total_view(input, config),
    ];

    let mut classes: BTreeSet<ShareClassName> = input.class_totals.keys().cloned().collect();
    classes.insert(ShareClassName::Ordinary);
    for class in classes {
        if let Some(view) = class_view(input, &class, config) {
            views.push(view);
        }
    }

    for view in &views {
        tracing::debug!(
            view = %view.id,
            raw_sum = view.total_raw,
            slices = view.slices.len(),
            "computed distribution view"
        );
    }

    Distribution { views }
}

/// Applies the 100%-sum rule to one holder view.
///
/// Returns the adjusted slices and the raw percentage sum. Slices whose
/// percentage is not finite or not positive are dropped first; a raw sum of
/// zero yields no slices at all.
pub fn normalize_slices(
    slices: Vec<NormalizedSlice>,
    base_total: f64,
    config: &DistributionConfig,
) -> (Vec<NormalizedSlice>, f64) {
    let mut slices: Vec<NormalizedSlice> = slices
        .into_iter()
        .filter(|slice| slice.percentage.is_finite() && slice.percentage > 0.0)
        .collect();
    let raw_sum: f64 = slices.iter().map(|slice| slice.percentage).sum();
    if raw_sum <= 0.0 || !raw_sum.is_finite() {
        return (Vec::new(), 0.0);
    }

    if raw_sum > 100.0 {
        let scale = 100.0 / raw_sum;
        for slice in &mut slices {
            slice.percentage *= scale;
        }
    } else if raw_sum < 100.0 - config.remaining_tolerance {
        let remaining = 100.0 - raw_sum;
        let base = if base_total.is_finite() { base_total.max(0.0) } else { 0.0 };
        slices.push(NormalizedSlice::new(
            config.remaining_label.clone(),
            remaining,
            (remaining / 100.0 * base).round(),
            SliceCategory::Remaining,
        ));
    }
    (slices, raw_sum)
}

fn holder_view(
    id: ViewId,
    slices: Vec<NormalizedSlice>,
    base_total: f64,
    config: &DistributionConfig,
) -> DistributionView {
    let (slices, raw_sum) = normalize_slices(slices, base_total, config);
    let total_shares_sum = slices
        .iter()
        .filter(|slice| slice.category != SliceCategory::Remaining)
        .map(|slice| slice.share_count)
        .sum();
    DistributionView {
        id,
        slices,
        total_raw: raw_sum,
        total_shares_sum,
        current_class_total: base_total,
    }
}

fn class_view(
    input: &DistributionInput,
    class: &ShareClassName,
    config: &DistributionConfig,
) -> Option<DistributionView> {
    let id = ViewId::Class(class.clone());
    let class_total = input.class_total(class);
    if class_total > 0.0 {
        let slices = input
            .holders
            .iter()
            .filter_map(|holder| {
                let amount = holder.shares.get(class) as f64;
                (amount > 0.0).then(|| {
                    NormalizedSlice::new(
                        holder.name.clone(),
                        amount / class_total * 100.0,
                        amount,
                        SliceCategory::Holder(holder.kind),
                    )
                })
            })
            .collect();
        return Some(holder_view(id, slices, class_total, config));
    }

    // Holders known only by a flat percentage are shown under Ordinary. Other
    // classes have no such fallback.
    if *class != ShareClassName::Ordinary {
        return None;
    }
    let base = input.aggregate_base();
    let slices: Vec<NormalizedSlice> = input
        .holders
        .iter()
        .filter_map(|holder| {
            let percentage = holder
                .share_percentage
                .filter(|value| value.is_finite() && *value > 0.0)?;
            Some(NormalizedSlice::new(
                holder.name.clone(),
                percentage,
                (percentage / 100.0 * base).round(),
                SliceCategory::Holder(holder.kind),
            ))
        })
        .collect();
    if slices.is_empty() {
        return None;
    }
    Some(holder_view(id, slices, base, config))
}

fn total_view(input: &DistributionInput, config: &DistributionConfig) -> DistributionView {
    let base = input.aggregate_base();
    if base <= 0.0 {
        return DistributionView::empty(ViewId::Total, 0.0);
    }
    let slices = input
        .holders
        .iter()
        .filter_map(|holder| {
            let total = holder.shares.total() as f64;
            (total > 0.0).then(|| {
                NormalizedSlice::new(
                    holder.name.clone(),
                    total / base * 100.0,
                    total,
                    SliceCategory::Holder(holder.kind),
                )
            })
        })
        .collect();
    holder_view(ViewId::Total, slices, base, config)
}

fn classes_view(input: &DistributionInput) -> DistributionView {
    let sum: f64 = input.class_totals.values().map(|total| *total as f64).sum();
    if sum <= 0.0 {
        return DistributionView::empty(ViewId::Classes, 0.0);
    }
    let slices: Vec<NormalizedSlice> = input
        .class_totals
        .iter()
        .filter(|(_, total)| **total > 0)
        .map(|(class, total)| {
            let total = *total as f64;
            NormalizedSlice::new(
                class.display_label(),
                total / sum * 100.0,
                total,
                SliceCategory::ShareClass,
            )
        })
        .collect();
    let total_raw = slices.iter().map(|slice| slice.percentage).sum();
    DistributionView {
        id: ViewId::Classes,
        slices,
        total_raw,
        total_shares_sum: sum,
        current_class_total: sum,
    }
}

fn authorized_view(input: &DistributionInput, config: &DistributionConfig) -> DistributionView {
    let authorized = input.authorized_shares;
    if authorized <= 0.0 {
        return DistributionView::empty(ViewId::Authorized, 0.0);
    }
    let issued = input.issued_shares.max(0.0);
    let remaining = (authorized - issued).max(0.0);
    // An inconsistent snapshot (issued > authorized) is drawn as fully issued.
    let denominator = authorized.max(issued);
    let slices = vec![
        NormalizedSlice::new(
            config.issued_label.clone(),
            issued / denominator * 100.0,
            issued,
            SliceCategory::Issued,
        ),
        NormalizedSlice::new(
            config.unissued_label.clone(),
            remaining / denominator * 100.0,
            remaining,
            SliceCategory::Unissued,
        ),
    ];
    let total_raw = slices.iter().map(|slice| slice.percentage).sum();
    DistributionView {
        id: ViewId::Authorized,
        slices,
        total_raw,
        total_shares_sum: issued,
        current_class_total: authorized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Company, Holder, Involvement, ShareClass};
    use proptest::prelude::*;

    fn config() -> DistributionConfig {
        DistributionConfig::default()
    }

    fn holder_slice(name: &str, percentage: f64) -> NormalizedSlice {
        NormalizedSlice::new(name, percentage, 0.0, SliceCategory::Holder(HolderKind::Person))
    }

    fn company(authorized: u64, issued: u64) -> Company {
        Company {
            authorized_shares: authorized,
            issued_shares: issued,
            ..Company::new("co-1", "Acme Ltd")
        }
    }

    #[test]
    fn authorized_view_splits_issued_and_remaining() {
        let snapshot = Snapshot::new(company(1000, 600), Vec::new());
        let distribution =
            compute_distribution(&DistributionInput::from_snapshot(&snapshot), &config());
        let view = distribution.view(&ViewId::Authorized).unwrap();
        assert_eq!(view.slices.len(), 2);
        assert_eq!(view.slices[0].name, "Issued");
        assert!((view.slices[0].percentage - 60.0).abs() < 1e-9);
        assert_eq!(view.slices[1].name, "Remaining");
        assert!((view.slices[1].percentage - 40.0).abs() < 1e-9);
        assert_eq!(view.total_shares_sum, 600.0);
        assert_eq!(view.current_class_total, 1000.0);
    }

    #[test]
    fn counts_near_u64_max_stay_bounded() {
        let snapshot = Snapshot::new(
            company(0, 0),
            vec![
                Involvement::new("1", Holder::person("Ada"))
                    .with_shares(ShareClassName::A, u64::MAX - 5)
                    .with_shares(ShareClassName::Ordinary, u64::MAX - 5),
                Involvement::new("2", Holder::person("Bo"))
                    .with_shares(ShareClassName::A, u64::MAX - 5),
            ],
        );
        let input = DistributionInput::from_snapshot(&snapshot);
        assert_eq!(input.class_totals[&ShareClassName::A], u64::MAX);
        let distribution = compute_distribution(&input, &config());
        for view in distribution.views() {
            assert!(view.percentage_sum().is_finite());
            assert!(view.percentage_sum() <= 100.0 + 1e-6, "{:?}", view.id);
        }
    }

    #[test]
    fn authorized_view_survives_overissued_snapshot() {
        let snapshot = Snapshot::new(company(500, 800), Vec::new());
        let distribution =
            compute_distribution(&DistributionInput::from_snapshot(&snapshot), &config());
        let view = distribution.view(&ViewId::Authorized).unwrap();
        assert_eq!(view.slices.len(), 2);
        assert!((view.slices[0].percentage - 100.0).abs() < 1e-9);
        assert_eq!(view.slices[1].percentage, 0.0);
        assert!(view.slices.iter().all(|slice| slice.percentage >= 0.0));
    }

    #[test]
    fn authorized_view_is_empty_without_authorized_capital() {
        let snapshot = Snapshot::new(company(0, 600), Vec::new());
        let distribution =
            compute_distribution(&DistributionInput::from_snapshot(&snapshot), &config());
        assert!(distribution.view(&ViewId::Authorized).unwrap().is_empty());
    }

    #[test]
    fn overshooting_class_is_scaled_to_one_hundred() {
        let mut input = DistributionInput::default();
        input.class_totals.insert(ShareClassName::Ordinary, 200);
        input.holders = vec![
            HolderRecord {
                name: "Ada".to_string(),
                kind: HolderKind::Person,
                shares: ShareAmounts::new().with(ShareClassName::Ordinary, 140),
                share_percentage: None,
            },
            HolderRecord {
                name: "Holdco".to_string(),
                kind: HolderKind::Company,
                shares: ShareAmounts::new().with(ShareClassName::Ordinary, 90),
                share_percentage: None,
            },
        ];
        let distribution = compute_distribution(&input, &config());
        let view = distribution
            .view(&ViewId::Class(ShareClassName::Ordinary))
            .unwrap();
        assert!((view.total_raw - 115.0).abs() < 1e-9);
        assert_eq!(view.slices.len(), 2);
        assert!((view.slices[0].percentage - 70.0 * 100.0 / 115.0).abs() < 1e-9);
        assert!((view.slices[1].percentage - 45.0 * 100.0 / 115.0).abs() < 1e-9);
        assert!((view.percentage_sum() - 100.0).abs() < 1e-6);
        assert_eq!(view.slices[1].category, SliceCategory::Holder(HolderKind::Company));
    }

    #[test]
    fn undershooting_view_gets_remaining_slice() {
        let (slices, raw) = normalize_slices(
            vec![holder_slice("Ada", 30.0), holder_slice("Bo", 20.0)],
            1000.0,
            &config(),
        );
        assert_eq!(raw, 50.0);
        assert_eq!(slices.len(), 3);
        let remaining = &slices[2];
        assert_eq!(remaining.name, "Remaining Shares");
        assert_eq!(remaining.category, SliceCategory::Remaining);
        assert!((remaining.percentage - 50.0).abs() < 1e-9);
        assert_eq!(remaining.share_count, 500.0);
    }

    #[test]
    fn sum_within_tolerance_is_left_alone() {
        let (slices, _) = normalize_slices(
            vec![holder_slice("Ada", 60.0), holder_slice("Bo", 39.99995)],
            100.0,
            &config(),
        );
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[1].percentage, 39.99995);
    }

    #[test]
    fn invalid_percentages_are_filtered() {
        let (slices, raw) = normalize_slices(
            vec![
                holder_slice("nan", f64::NAN),
                holder_slice("neg", -10.0),
                holder_slice("inf", f64::INFINITY),
                holder_slice("ok", 100.0),
            ],
            10.0,
            &config(),
        );
        assert_eq!(raw, 100.0);
        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].name, "ok");
    }

    #[test]
    fn zero_raw_sum_yields_empty_view() {
        let (slices, raw) = normalize_slices(vec![holder_slice("zero", 0.0)], 10.0, &config());
        assert!(slices.is_empty());
        assert_eq!(raw, 0.0);
    }

    #[test]
    fn total_view_uses_issued_then_class_sum() {
        let mut snapshot = Snapshot::new(
            company(0, 0),
            vec![
                Involvement::new("1", Holder::person("Ada"))
                    .with_shares(ShareClassName::A, 30)
                    .with_shares(ShareClassName::Ordinary, 30),
                Involvement::new("2", Holder::company("Holdco"))
                    .with_shares(ShareClassName::Ordinary, 40),
            ],
        );
        let distribution =
            compute_distribution(&DistributionInput::from_snapshot(&snapshot), &config());
        let total = distribution.view(&ViewId::Total).unwrap();
        assert_eq!(total.current_class_total, 100.0);
        assert_eq!(total.slices.len(), 2);
        assert!((total.slices[0].percentage - 60.0).abs() < 1e-9);

        snapshot.company.issued_shares = 200;
        let distribution =
            compute_distribution(&DistributionInput::from_snapshot(&snapshot), &config());
        let total = distribution.view(&ViewId::Total).unwrap();
        assert_eq!(total.current_class_total, 200.0);
        assert_eq!(total.slices.len(), 3);
        assert_eq!(total.slices[2].category, SliceCategory::Remaining);
        assert_eq!(total.slices[2].share_count, 100.0);
        assert_eq!(total.total_shares_sum, 100.0);
    }

    #[test]
    fn classes_view_is_independent_of_holders() {
        let mut snapshot = Snapshot::new(company(1000, 400), Vec::new());
        snapshot.company.share_classes = vec![
            ShareClass {
                name: ShareClassName::Ordinary,
                issued: 300,
            },
            ShareClass {
                name: ShareClassName::A,
                issued: 100,
            },
        ];
        let distribution =
            compute_distribution(&DistributionInput::from_snapshot(&snapshot), &config());
        let classes = distribution.view(&ViewId::Classes).unwrap();
        assert_eq!(classes.slices.len(), 2);
        assert_eq!(classes.slices[0].name, "Class A");
        assert!((classes.slices[0].percentage - 25.0).abs() < 1e-9);
        assert_eq!(classes.slices[1].name, "Ordinary");
        assert!((classes.slices[1].percentage - 75.0).abs() < 1e-9);

        // Class views exist for every class with a positive total, even if no
        // listed holder owns any of it.
        let class_a = distribution
            .view(&ViewId::Class(ShareClassName::A))
            .unwrap();
        assert!(class_a.is_empty());
    }

    #[test]
    fn ordinary_falls_back_to_flat_percentage() {
        let snapshot = Snapshot::new(
            company(0, 1000),
            vec![
                Involvement::new("1", Holder::person("Ada")).with_percentage(55.0),
                Involvement::new("2", Holder::person("Bo")).with_percentage(25.0),
            ],
        );
        let distribution =
            compute_distribution(&DistributionInput::from_snapshot(&snapshot), &config());
        let ordinary = distribution
            .view(&ViewId::Class(ShareClassName::Ordinary))
            .unwrap();
        assert_eq!(ordinary.slices.len(), 3);
        assert_eq!(ordinary.slices[0].share_count, 550.0);
        assert!((ordinary.slices[2].percentage - 20.0).abs() < 1e-9);
        assert_eq!(ordinary.slices[2].share_count, 200.0);
        assert!(distribution.view(&ViewId::Class(ShareClassName::A)).is_none());
    }

    #[test]
    fn view_order_and_ids() {
        let snapshot = Snapshot::new(
            company(100, 100),
            vec![
                Involvement::new("1", Holder::person("Ada"))
                    .with_shares(ShareClassName::B, 5)
                    .with_shares(ShareClassName::Ordinary, 5),
            ],
        );
        let distribution =
            compute_distribution(&DistributionInput::from_snapshot(&snapshot), &config());
        let keys: Vec<String> = distribution
            .view_ids()
            .iter()
            .map(|id| id.key().to_string())
            .collect();
        assert_eq!(keys, vec!["authorized", "classes", "total", "B", "Ordinary"]);
        assert_eq!(ViewId::parse("Total"), ViewId::Total);
        assert_eq!(ViewId::parse("ordinary"), ViewId::Class(ShareClassName::Ordinary));
    }

    #[test]
    fn slice_order_follows_holder_input_order() {
        let snapshot = Snapshot::new(
            company(0, 0),
            vec![
                Involvement::new("1", Holder::person("Small")).with_shares(ShareClassName::A, 1),
                Involvement::new("2", Holder::person("Large")).with_shares(ShareClassName::A, 9),
            ],
        );
        let distribution =
            compute_distribution(&DistributionInput::from_snapshot(&snapshot), &config());
        let view = distribution.view(&ViewId::Class(ShareClassName::A)).unwrap();
        assert_eq!(view.slices[0].name, "Small");
        assert_eq!(view.slices[1].name, "Large");
    }

    proptest! {
        #[test]
        fn prop_normalized_views_sum_to_one_hundred(
            percentages in prop::collection::vec(0.0f64..150.0, 1..8),
            base in 0.0f64..100_000.0,
        ) {
            let slices: Vec<NormalizedSlice> = percentages
                .iter()
                .enumerate()
                .map(|(idx, pct)| holder_slice(&format!("h{idx}"), *pct))
                .collect();
            let (out, raw) = normalize_slices(slices, base, &config());
            for slice in &out {
                prop_assert!(slice.percentage.is_finite());
                prop_assert!(slice.percentage >= 0.0);
            }
            if raw > 0.0 {
                let sum: f64 = out.iter().map(|slice| slice.percentage).sum();
                prop_assert!((sum - 100.0).abs() < 1e-6 || (100.0 - raw) <= 0.0001);
                let remaining = out
                    .iter()
                    .filter(|slice| slice.category == SliceCategory::Remaining)
                    .count();
                if raw < 100.0 - 0.0001 {
                    prop_assert_eq!(remaining, 1);
                } else {
                    prop_assert_eq!(remaining, 0);
                }
            } else {
                prop_assert!(out.is_empty());
            }
        }

        #[test]
        fn prop_scale_down_is_proportional(
            percentages in prop::collection::vec(1.0f64..90.0, 2..6),
        ) {
            let raw: f64 = percentages.iter().sum();
            prop_assume!(raw > 100.0);
            let slices: Vec<NormalizedSlice> = percentages
                .iter()
                .map(|pct| holder_slice("h", *pct))
                .collect();
            let (out, _) = normalize_slices(slices, 100.0, &config());
            prop_assert_eq!(out.len(), percentages.len());
            for (slice, original) in out.iter().zip(&percentages) {
                prop_assert!((slice.percentage - original * 100.0 / raw).abs() < 1e-9);
            }
        }
    }
}
