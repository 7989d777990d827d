#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod distribution;
pub mod export;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod memo;
pub mod parser;
pub mod render;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, load_config};
pub use distribution::{Distribution, DistributionInput, ViewId, compute_distribution};
pub use export::{ExportError, export_hierarchy};
pub use ir::{Company, Holder, Involvement, ShareClassName, Snapshot};
pub use layout::{HierarchyLayout, compute_hierarchy_layout, compute_pie_layout};
pub use memo::OwnershipModel;
pub use parser::parse_snapshot;
