//! Report generation for batch distributions.
//!
//! Generates both JSON and human-readable text reports.

use std::fs;
use std::path::Path;

use color_eyre::eyre::{Context, Result};
use serde::Serialize;

use super::batch::{BatchOptions, BatchResult, SkippedFile};
use super::distribution::BoxStats;
use super::label::Scheme;
use super::metric::Metric;
use crate::config::LinkModel;

#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub analysis_timestamp: String,
    pub trace_dir: String,
    pub metric: Metric,
    pub metric_label: String,
    pub files_processed: usize,
    pub files_skipped: usize,
    pub runs: usize,
    pub total_flows: usize,
    pub exclude_ports: Vec<u16>,
    pub link_model: LinkModel,
}

/// Box statistics of one (scheme, senders) group
#[derive(Debug, Clone, Serialize)]
pub struct GroupRow {
    pub senders: u32,
    pub samples: usize,
    pub stats: Option<BoxStats>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SchemeDistribution {
    pub scheme: Scheme,
    pub name: String,
    pub rows: Vec<GroupRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DistributionReport {
    pub metadata: ReportMetadata,
    pub schemes: Vec<SchemeDistribution>,
    pub skipped: Vec<SkippedFile>,
}

/// Summarise every group of a batch
pub fn build_report(batch: &BatchResult, options: &BatchOptions, trace_dir: &Path) -> DistributionReport {
    let schemes = batch
        .groups
        .iter()
        .map(|(scheme, runs)| SchemeDistribution {
            scheme: scheme.clone(),
            name: scheme.to_string(),
            rows: runs
                .iter()
                .map(|(senders, values)| GroupRow {
                    senders: *senders,
                    samples: values.len(),
                    stats: BoxStats::from_values(values),
                })
                .collect(),
        })
        .collect();

    DistributionReport {
        metadata: ReportMetadata {
            analysis_timestamp: chrono::Utc::now().to_rfc3339(),
            trace_dir: trace_dir.display().to_string(),
            metric: options.metric,
            metric_label: options.metric.label().to_string(),
            files_processed: batch.files_processed,
            files_skipped: batch.skipped.len(),
            runs: batch.runs.len(),
            total_flows: batch.total_flows(),
            exclude_ports: options.filter.exclude_source_ports.clone(),
            link_model: options.link_model,
        },
        schemes,
        skipped: batch.skipped.clone(),
    }
}

/// Generate JSON report
pub fn generate_json_report(report: &DistributionReport, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)
        .context("Failed to serialize report to JSON")?;

    fs::write(output_path, json)
        .with_context(|| format!("Failed to write JSON report to {}", output_path.display()))?;

    log::info!("JSON report written to {}", output_path.display());
    Ok(())
}

/// Render the human-readable report
pub fn render_text_report(report: &DistributionReport) -> String {
    let mut lines: Vec<String> = Vec::new();
    let meta = &report.metadata;

    lines.push("=".repeat(80));
    lines.push("                     INCAST FLOW DISTRIBUTION ANALYSIS".to_string());
    lines.push("=".repeat(80));
    lines.push(String::new());

    lines.push(format!("Analysis Date: {}", meta.analysis_timestamp));
    lines.push(format!("Trace Directory: {}", meta.trace_dir));
    lines.push(format!("Metric: {} ({})", meta.metric_label, meta.metric));
    lines.push(format!(
        "Files: {} processed, {} skipped",
        meta.files_processed, meta.files_skipped
    ));
    lines.push(format!("Runs: {}  Flows: {}", meta.runs, meta.total_flows));
    if !meta.exclude_ports.is_empty() {
        let ports: Vec<String> = meta.exclude_ports.iter().map(|p| p.to_string()).collect();
        lines.push(format!("Excluded source ports: {}", ports.join(", ")));
    }
    lines.push(format!(
        "Ideal duration model: edge {:.0} Gb/s, aggregation {:.0} Gb/s",
        meta.link_model.edge_capacity_bps / 1e9,
        meta.link_model.aggregation_capacity_bps / 1e9
    ));
    lines.push(String::new());

    for scheme in &report.schemes {
        lines.push("=".repeat(80));
        lines.push(format!("  {}", scheme.name.to_uppercase()));
        lines.push("=".repeat(80));
        lines.push(format!(
            "{:>8} {:>8} {:>12} {:>12} {:>12} {:>12} {:>12}",
            "senders", "samples", "whisker_lo", "q1", "median", "q3", "whisker_hi"
        ));
        for row in &scheme.rows {
            match &row.stats {
                Some(stats) => lines.push(format!(
                    "{:>8} {:>8} {:>12.4e} {:>12.4e} {:>12.4e} {:>12.4e} {:>12.4e}",
                    row.senders,
                    row.samples,
                    stats.whisker_low,
                    stats.q1,
                    stats.median,
                    stats.q3,
                    stats.whisker_high
                )),
                None => lines.push(format!("{:>8} {:>8} {:>12}", row.senders, row.samples, "-")),
            }
        }
        lines.push(String::new());
    }

    if !report.skipped.is_empty() {
        lines.push("Skipped files:".to_string());
        for skipped in &report.skipped {
            match skipped.flow_id {
                Some(flow_id) => lines.push(format!("  {} (flow {}): {}", skipped.file, flow_id, skipped.reason)),
                None => lines.push(format!("  {}: {}", skipped.file, skipped.reason)),
            }
        }
        lines.push(String::new());
    }

    lines.push("=".repeat(80));
    lines.join("\n")
}

/// Generate human-readable text report
pub fn generate_text_report(report: &DistributionReport, output_path: &Path) -> Result<()> {
    fs::write(output_path, render_text_report(report))
        .with_context(|| format!("Failed to write text report to {}", output_path.display()))?;

    log::info!("Text report written to {}", output_path.display());
    Ok(())
}

/// Print a summary to stdout
pub fn print_summary(report: &DistributionReport) {
    println!("\n=== INCAST DISTRIBUTION SUMMARY ===\n");
    println!("Metric: {}", report.metadata.metric_label);
    println!("Runs: {}", report.metadata.runs);
    println!("Flows: {}", report.metadata.total_flows);
    if report.metadata.files_skipped > 0 {
        println!("Skipped files: {}", report.metadata.files_skipped);
    }

    for scheme in &report.schemes {
        println!("\n{}:", scheme.name);
        for row in &scheme.rows {
            match &row.stats {
                Some(stats) => println!(
                    "  {:>4} senders: median {:.4e} (IQR {:.4e} .. {:.4e}, n = {})",
                    row.senders, stats.median, stats.q1, stats.q3, stats.count
                ),
                None => println!("  {:>4} senders: no samples", row.senders),
            }
        }
    }

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::batch::{ExperimentGroups, FlowFilter, RunSeries};
    use crate::analysis::label::ExperimentLabel;

    fn batch() -> (BatchResult, BatchOptions) {
        let mut groups = ExperimentGroups::default();
        let mut runs = Vec::new();
        for (name, values) in [
            ("incast_dctcp_s2.xml", vec![1.0, 2.0, 3.0]),
            ("incast_a10_s2.xml", vec![]),
        ] {
            let label = ExperimentLabel::from_file_name(name).unwrap();
            groups.insert(&label, values.clone());
            runs.push(RunSeries {
                file: name.to_string(),
                label,
                run_index: 0,
                flows: values.len() + 1,
                values,
            });
        }
        let options = BatchOptions {
            trace_tag: "FlowMonitor".to_string(),
            link_model: LinkModel::default(),
            metric: Metric::Size,
            filter: FlowFilter {
                exclude_source_ports: vec![9],
            },
        };
        let result = BatchResult {
            groups,
            runs,
            skipped: vec![SkippedFile {
                file: "broken.xml".to_string(),
                reason: "bad".to_string(),
                flow_id: Some(42),
            }],
            files_processed: 2,
        };
        (result, options)
    }

    #[test]
    fn test_build_report() {
        let (batch, options) = batch();
        let report = build_report(&batch, &options, Path::new("traces"));
        assert_eq!(report.metadata.runs, 2);
        assert_eq!(report.metadata.total_flows, 5);
        assert_eq!(report.metadata.files_skipped, 1);
        assert_eq!(report.schemes.len(), 2);
        assert_eq!(report.schemes[0].name, "dctcp");
        assert_eq!(report.schemes[0].rows[0].stats.unwrap().median, 2.0);
        assert!(report.schemes[1].rows[0].stats.is_none());
    }

    #[test]
    fn test_text_report_lists_groups_and_skips() {
        let (batch, options) = batch();
        let text = render_text_report(&build_report(&batch, &options, Path::new("traces")));
        assert!(text.contains("Flow Size (bytes)"));
        assert!(text.contains("DCTCP"));
        assert!(text.contains("ALPHA = 10"));
        assert!(text.contains("broken.xml (flow 42): bad"));
        assert!(text.contains("Excluded source ports: 9"));
    }

    #[test]
    fn test_json_report_roundtrips_through_serde_json() {
        let (batch, options) = batch();
        let report = build_report(&batch, &options, Path::new("traces"));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        generate_json_report(&report, &path).unwrap();

        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["metadata"]["metric"], "size");
        assert_eq!(value["schemes"][0]["scheme"]["scheme"], "dctcp");
        assert_eq!(value["schemes"][1]["scheme"]["alpha"], "10");
    }
}
