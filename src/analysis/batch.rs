//! Batch loading of incast trace directories.
//!
//! Each trace file is decoded on its own rayon worker. A file that fails to
//! decode is logged and skipped; the rest of the batch is still reported.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use color_eyre::eyre::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;

use super::label::{ExperimentLabel, Scheme};
use super::metric::Metric;
use crate::config::{AnalysisConfig, LinkModel};
use crate::error::TraceError;
use crate::model::{Flow, Simulation};
use crate::trace::TraceReader;

/// Which flows contribute to a distribution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowFilter {
    pub exclude_source_ports: Vec<u16>,
}

impl FlowFilter {
    /// Accept flows that completed (positive duration) and whose source port
    /// is not excluded
    pub fn accepts(&self, flow: &Flow) -> bool {
        let excluded = flow
            .five_tuple()
            .is_some_and(|t| self.exclude_source_ports.contains(&t.source_port));
        !excluded && flow.raw_duration > 0.0
    }
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub trace_tag: String,
    pub link_model: LinkModel,
    pub metric: Metric,
    pub filter: FlowFilter,
}

impl From<&AnalysisConfig> for BatchOptions {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            trace_tag: config.trace_tag.clone(),
            link_model: config.link_model,
            metric: config.metric,
            filter: FlowFilter {
                exclude_source_ports: config.exclude_ports.clone(),
            },
        }
    }
}

/// Metric samples extracted from one trace element
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSeries {
    pub file: String,
    pub label: ExperimentLabel,
    /// Position of the trace element within its file
    pub run_index: usize,
    pub flows: usize,
    pub values: Vec<f64>,
}

/// A file left out of the batch, with the reason
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedFile {
    pub file: String,
    pub reason: String,
    /// Flow whose record failed, when the failure is tied to one
    pub flow_id: Option<u32>,
}

/// Metric samples grouped by scheme and number of senders
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExperimentGroups {
    groups: BTreeMap<Scheme, BTreeMap<u32, Vec<f64>>>,
}

impl ExperimentGroups {
    /// Store the samples of one run, returning the samples it replaced
    pub fn insert(&mut self, label: &ExperimentLabel, values: Vec<f64>) -> Option<Vec<f64>> {
        self.groups
            .entry(label.scheme.clone())
            .or_default()
            .insert(label.senders, values)
    }

    pub fn get(&self, scheme: &Scheme, senders: u32) -> Option<&[f64]> {
        self.groups.get(scheme)?.get(&senders).map(|v| v.as_slice())
    }

    /// Schemes in order, each with its runs ordered by sender count
    pub fn iter(&self) -> impl Iterator<Item = (&Scheme, &BTreeMap<u32, Vec<f64>>)> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.values().map(|g| g.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of loading a directory of traces
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    pub groups: ExperimentGroups,
    pub runs: Vec<RunSeries>,
    pub skipped: Vec<SkippedFile>,
    pub files_processed: usize,
}

impl BatchResult {
    pub fn total_flows(&self) -> usize {
        self.runs.iter().map(|r| r.flows).sum()
    }
}

/// List the `*.xml` files directly inside `dir`, sorted by path
pub fn discover_trace_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read trace directory: {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to list trace directory: {}", dir.display()))?
            .path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "xml") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Samples of `metric` over the flows of a simulation accepted by `filter`
pub fn extract_series(simulation: &Simulation, metric: Metric, filter: &FlowFilter) -> Vec<f64> {
    simulation
        .flows()
        .iter()
        .filter(|flow| filter.accepts(flow))
        .filter_map(|flow| metric.extract(flow))
        .collect()
}

/// Decode one trace file into per-run metric series.
///
/// Simulations are reduced to their series as soon as they are built and
/// are not kept.
pub fn process_trace_file(path: &Path, options: &BatchOptions) -> Result<Vec<RunSeries>> {
    let file = path.display().to_string();
    let label = ExperimentLabel::from_path(path)
        .with_context(|| format!("Failed to decode experiment label of {}", file))?;

    let reader = TraceReader::from_path(path, &options.trace_tag)
        .with_context(|| format!("Failed to open trace file: {}", file))?;

    let mut series = Vec::new();
    for (run_index, simulation) in reader.simulations(options.link_model).enumerate() {
        let simulation = simulation
            .with_context(|| format!("Failed to decode trace element {} of {}", run_index, file))?;
        let values = extract_series(&simulation, options.metric, &options.filter);
        log::debug!(
            "{} run {}: {} flows, {} samples",
            file,
            run_index,
            simulation.len(),
            values.len()
        );
        series.push(RunSeries {
            file: file.clone(),
            label: label.clone(),
            run_index,
            flows: simulation.len(),
            values,
        });
    }

    if series.is_empty() {
        log::warn!("No <{}> element found in {}", options.trace_tag, file);
    }
    Ok(series)
}

/// Load every trace of a directory in parallel and group the samples.
///
/// When several runs share a scheme and sender count, the run read last
/// (in path order, then document order) wins.
pub fn load_batch(dir: &Path, options: &BatchOptions) -> Result<BatchResult> {
    let files = discover_trace_files(dir)?;
    log::info!("Processing {} trace files from {} in parallel...", files.len(), dir.display());

    let outcomes: Vec<(String, Result<Vec<RunSeries>>)> = files
        .par_iter()
        .map(|path| (path.display().to_string(), process_trace_file(path, options)))
        .collect();

    let mut result = BatchResult::default();
    for (file, outcome) in outcomes {
        match outcome {
            Ok(runs) => {
                result.files_processed += 1;
                for run in runs {
                    if result.groups.insert(&run.label, run.values.clone()).is_some() {
                        log::warn!("{} replaces an earlier run for {}", run.file, run.label);
                    }
                    result.runs.push(run);
                }
            }
            Err(err) => {
                let reason = err
                    .chain()
                    .map(|cause| cause.to_string())
                    .collect::<Vec<_>>()
                    .join(": ");
                let flow_id = err
                    .chain()
                    .find_map(|cause| cause.downcast_ref::<TraceError>())
                    .and_then(TraceError::flow_id);
                log::warn!("Skipping {}: {}", file, reason);
                result.skipped.push(SkippedFile { file, reason, flow_id });
            }
        }
    }

    log::info!(
        "Loaded {} runs ({} flows) from {} files, skipped {}",
        result.runs.len(),
        result.total_flows(),
        result.files_processed,
        result.skipped.len()
    );
    Ok(result)
}
