use std::fs::File;
use std::path::Path;

use color_eyre::eyre::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

use crate::analysis::Metric;
use crate::trace::DEFAULT_TRACE_TAG;

/// ns-3 discard port used by the incast senders for ACK-only flows
pub const ACK_PORT: u16 = 9;

/// Link parameters of the simulated datacenter fabric used to compute the
/// ideal flow completion time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkModel {
    /// Host-to-ToR link capacity in bits per second
    pub edge_capacity_bps: f64,
    /// ToR-to-aggregation link capacity in bits per second
    pub aggregation_capacity_bps: f64,
    /// Per-packet host stack delay in seconds (not part of the baseline)
    pub host_processing_delay: f64,
    /// Cable propagation delay in seconds (not part of the baseline)
    pub propagation_delay: f64,
    /// Switch software processing delay in seconds (not part of the baseline)
    pub switch_processing_delay: f64,
}

impl LinkModel {
    /// Ideal duration of a flow of `bits` size: one round trip across an edge
    /// link and an aggregation link at full capacity.
    pub fn ideal_duration(&self, bits: f64) -> f64 {
        2.0 * bits / self.edge_capacity_bps + 2.0 * bits / self.aggregation_capacity_bps
    }
}

impl Default for LinkModel {
    fn default() -> Self {
        Self {
            edge_capacity_bps: 10e9,
            aggregation_capacity_bps: 40e9,
            host_processing_delay: 1.5e-6,
            propagation_delay: 2e-6,
            switch_processing_delay: 250e-9,
        }
    }
}

/// Analysis configuration that mirrors the optional YAML file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Link parameters for the slowdown baseline
    pub link_model: LinkModel,
    /// Tag of the top-level trace element
    pub trace_tag: String,
    /// Flows whose source port is listed here are left out of the distributions
    pub exclude_ports: Vec<u16>,
    /// Per-flow metric to summarise
    pub metric: Metric,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            link_model: LinkModel::default(),
            trace_tag: DEFAULT_TRACE_TAG.to_string(),
            exclude_ports: vec![ACK_PORT],
            metric: Metric::default(),
        }
    }
}

/// Load and parse an analysis configuration from a YAML file
pub fn load_config(config_path: &Path) -> Result<AnalysisConfig> {
    info!("Loading configuration from: {:?}", config_path);

    let file = File::open(config_path)
        .with_context(|| format!("Failed to open config file: {}", config_path.display()))?;
    let config: AnalysisConfig = serde_yaml::from_reader(file)
        .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

    Ok(config)
}
