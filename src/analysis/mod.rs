//! Batch analysis of incast trace directories.
//!
//! This module groups per-flow metrics by experiment label and summarises
//! them as box-plot statistics.

pub mod batch;
pub mod distribution;
pub mod label;
pub mod metric;
pub mod report;

pub use batch::{load_batch, BatchOptions, BatchResult, ExperimentGroups, FlowFilter};
pub use distribution::BoxStats;
pub use label::{ExperimentLabel, LabelError, Scheme};
pub use metric::Metric;
pub use report::{build_report, generate_json_report, generate_text_report};
