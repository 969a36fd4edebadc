//! Flow-monitor data model.
//!
//! A [`Simulation`] is rebuilt from three independent sections of one trace
//! element: flow statistics, the IPv4 classifier, and the per-probe samples.

pub mod five_tuple;
pub mod flow;
pub mod histogram;
pub mod probe;
pub mod simulation;

pub use five_tuple::FiveTuple;
pub use flow::{Flow, HOP_COUNT_UNKNOWN};
pub use histogram::{Histogram, HistogramBin};
pub use probe::ProbeFlowStats;
pub use simulation::Simulation;
