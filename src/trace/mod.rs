//! Streaming access to flow-monitor XML traces.

pub mod element;
pub mod reader;

use std::path::Path;

use crate::config::LinkModel;
use crate::error::Result;
use crate::model::Simulation;

pub use element::Element;
pub use reader::{TraceReader, DEFAULT_TRACE_TAG};

/// Read every trace element of a file and build its simulations.
///
/// Stops at the first error; the whole file is considered unusable.
pub fn load_trace_file(path: &Path, tag: &str, link_model: &LinkModel) -> Result<Vec<Simulation>> {
    TraceReader::from_path(path, tag)?
        .simulations(*link_model)
        .collect()
}
