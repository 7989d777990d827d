use crate::config::Config;
use crate::distribution::{Distribution, DistributionInput, compute_distribution};
use crate::ir::Snapshot;
use crate::layout::{HierarchyLayout, compute_hierarchy_layout};

/// Single-entry cache keyed on structural equality of the input.
#[derive(Debug, Clone)]
pub struct Memo<I, O> {
    entry: Option<(I, O)>,
    computations: usize,
}

impl<I, O> Default for Memo<I, O> {
    fn default() -> Self {
        Self {
            entry: None,
            computations: 0,
        }
    }
}

impl<I: PartialEq + Clone, O> Memo<I, O> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached output when `input` equals the last input, otherwise
    /// recomputes and replaces the entry.
    pub fn get_or_compute(&mut self, input: &I, compute: impl FnOnce(&I) -> O) -> &O {
        if !self.is_cached_for(input) {
            self.entry = None;
        }
        let computations = &mut self.computations;
        let (_, output) = self.entry.get_or_insert_with(|| {
            *computations += 1;
            (input.clone(), compute(input))
        });
        output
    }

    pub fn is_cached_for(&self, input: &I) -> bool {
        matches!(&self.entry, Some((cached, _)) if cached == input)
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// How many times the compute closure has run.
    pub fn computations(&self) -> usize {
        self.computations
    }
}

/// Both derived views of a snapshot, each recomputed only when the snapshot
/// changes.
#[derive(Debug, Clone, Default)]
pub struct OwnershipModel {
    config: Config,
    distribution: Memo<Snapshot, Distribution>,
    hierarchy: Memo<Snapshot, HierarchyLayout>,
}

impl OwnershipModel {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            distribution: Memo::new(),
            hierarchy: Memo::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Replaces the configuration and drops both cached views.
    pub fn set_config(&mut self, config: Config) {
        self.config = config;
        self.distribution.invalidate();
        self.hierarchy.invalidate();
    }

    pub fn distribution(&mut self, snapshot: &Snapshot) -> &Distribution {
        let config = &self.config.layout.distribution;
        self.distribution.get_or_compute(snapshot, |snapshot| {
            tracing::debug!(company = %snapshot.company.name, "recomputing distribution");
            compute_distribution(&DistributionInput::from_snapshot(snapshot), config)
        })
    }

    pub fn hierarchy(&mut self, snapshot: &Snapshot) -> &HierarchyLayout {
        let theme = &self.config.theme;
        let layout = &self.config.layout;
        self.hierarchy.get_or_compute(snapshot, |snapshot| {
            tracing::debug!(company = %snapshot.company.name, "recomputing hierarchy layout");
            compute_hierarchy_layout(snapshot, theme, layout)
        })
    }

    pub fn recomputations(&self) -> (usize, usize) {
        (self.distribution.computations(), self.hierarchy.computations())
    }
}
