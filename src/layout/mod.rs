pub mod hierarchy;
mod pie;
pub(crate) mod text;
pub(crate) mod types;
pub use types::*;

pub use hierarchy::compute_hierarchy_layout;
pub use pie::compute_pie_layout;

use crate::config::LayoutConfig;
use crate::distribution::{Distribution, ViewId};
use crate::theme::Theme;

/// Pie layout for one view, or `None` when the distribution has no such view.
pub fn compute_view_layout(
    distribution: &Distribution,
    view: &ViewId,
    theme: &Theme,
    config: &LayoutConfig,
) -> Option<PieLayout> {
    distribution
        .view(view)
        .map(|view| compute_pie_layout(view, theme, config))
}
