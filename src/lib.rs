//! # Flowstat - flow-monitor trace analysis for incast simulations
//!
//! This library decodes ns-3 FlowMonitor XML traces, reconstructs every flow
//! of a simulation run and derives its performance metrics (throughput,
//! delay, loss, hop count, completion-time slowdown). Batches of runs are
//! grouped by congestion-control scheme and number of incast senders and
//! summarised as box-plot statistics.
//!
//! ## Architecture
//!
//! - `units`: `<integer>ns` timestamp decoding
//! - `trace`: incremental XML reader yielding one trace element at a time
//! - `model`: flows, five-tuples, probe samples and the simulation join
//! - `config`: link model and YAML analysis configuration
//! - `analysis`: experiment labels, batch grouping, distributions, reports
//! - `error`: the `TraceError` taxonomy
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use flowstat::config::LinkModel;
//! use flowstat::trace::{TraceReader, DEFAULT_TRACE_TAG};
//!
//! let reader = TraceReader::from_path(Path::new("incast_dctcp_s16.xml"), DEFAULT_TRACE_TAG)?;
//! for simulation in reader.simulations(LinkModel::default()) {
//!     for flow in simulation?.flows() {
//!         println!("flow {}: slowdown {:?}", flow.flow_id, flow.slowdown);
//!     }
//! }
//! # Ok::<(), flowstat::error::TraceError>(())
//! ```
//!
//! ## Error Handling
//!
//! Decoding functions return `Result<T, TraceError>`. Failures inside a
//! record are wrapped in `TraceError::InFlow` naming the flow. The batch layer wraps
//! these with `color_eyre` context naming the file, logs failures and keeps
//! going with the remaining files.

pub mod analysis;
pub mod config;
pub mod error;
pub mod model;
pub mod trace;
pub mod units;

pub use error::TraceError;
