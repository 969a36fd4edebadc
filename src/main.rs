//! Incast trace analysis CLI.
//!
//! Reads directories of ns-3 flow-monitor traces, groups per-flow metrics by
//! scheme and number of senders, and writes distribution reports.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result};
use env_logger::Env;

use flowstat::analysis::{self, BatchOptions, Metric};
use flowstat::config::{self, AnalysisConfig};
use flowstat::trace;

#[derive(Parser, Debug)]
#[command(name = "flowstat")]
#[command(about = "Flow-monitor trace analysis for incast simulation batches")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Optional YAML analysis configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Number of parallel workers (0 = auto-detect)
    #[arg(short = 'j', long, default_value = "0")]
    threads: usize,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Summarise a metric over a directory of traces
    Report {
        /// Directory containing <profile>_<scheme>_s<senders>.xml traces
        trace_dir: PathBuf,

        /// Output directory for reports
        #[arg(short, long, default_value = "flowstat_output")]
        output: PathBuf,

        /// Per-flow metric to summarise (overrides the config file)
        #[arg(long, value_enum)]
        metric: Option<Metric>,

        /// Leave out flows with this source port (repeatable, overrides the config file)
        #[arg(long = "exclude-port")]
        exclude_ports: Vec<u16>,
    },

    /// Print the per-flow metrics of one trace file
    Flows {
        trace_file: PathBuf,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show runs and flow counts of a trace directory
    Summary { trace_dir: PathBuf },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    // Initialize logging
    env_logger::Builder::from_env(Env::default().default_filter_or(&cli.log_level)).init();

    // Set thread pool size
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => AnalysisConfig::default(),
    };

    match cli.command {
        Commands::Report {
            trace_dir,
            output,
            metric,
            exclude_ports,
        } => {
            if let Some(metric) = metric {
                config.metric = metric;
            }
            if !exclude_ports.is_empty() {
                config.exclude_ports = exclude_ports;
            }
            run_report(&trace_dir, &output, &config)?;
        }
        Commands::Flows { trace_file, json } => {
            print_flows(&trace_file, &config, json)?;
        }
        Commands::Summary { trace_dir } => {
            print_batch_summary(&trace_dir, &config)?;
        }
    }

    Ok(())
}

fn run_report(trace_dir: &Path, output: &Path, config: &AnalysisConfig) -> Result<()> {
    let options = BatchOptions::from(config);
    let batch = analysis::load_batch(trace_dir, &options)?;

    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory: {}", output.display()))?;

    let report = analysis::build_report(&batch, &options, trace_dir);
    let stem = options.metric.name().replace('-', "_");
    analysis::generate_json_report(&report, &output.join(format!("{}_report.json", stem)))?;
    analysis::generate_text_report(&report, &output.join(format!("{}_report.txt", stem)))?;
    analysis::report::print_summary(&report);

    log::info!("Analysis complete. Reports written to {}", output.display());
    Ok(())
}

fn print_flows(trace_file: &Path, config: &AnalysisConfig, json: bool) -> Result<()> {
    let simulations = trace::load_trace_file(trace_file, &config.trace_tag, &config.link_model)
        .with_context(|| format!("Failed to decode trace file: {}", trace_file.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&simulations)?);
        return Ok(());
    }

    let fmt_opt = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{:.4e}", v));
    for (run, simulation) in simulations.iter().enumerate() {
        println!("\n=== RUN {} ({} flows) ===\n", run, simulation.len());
        println!(
            "{:>6} {:<44} {:>10} {:>11} {:>11} {:>11} {:>11} {:>6}",
            "flow", "five-tuple", "bytes", "duration", "slowdown", "delay", "rx bps", "loss"
        );
        for flow in simulation.flows() {
            let tuple = flow.five_tuple().map(|t| t.to_string()).unwrap_or_default();
            println!(
                "{:>6} {:<44} {:>10} {:>11.4e} {:>11} {:>11} {:>11} {:>6}",
                flow.flow_id,
                tuple,
                flow.size,
                flow.raw_duration,
                fmt_opt(flow.slowdown),
                fmt_opt(flow.delay_mean),
                fmt_opt(flow.rx_bitrate),
                flow.packet_loss_ratio.map_or_else(|| "-".to_string(), |l| format!("{:.3}", l)),
            );
        }
    }
    println!();
    Ok(())
}

fn print_batch_summary(trace_dir: &Path, config: &AnalysisConfig) -> Result<()> {
    let options = BatchOptions::from(config);
    let batch = analysis::load_batch(trace_dir, &options)?;

    println!("\n=== FLOWSTAT DATA SUMMARY ===\n");
    println!("Trace directory: {}", trace_dir.display());
    println!("Files processed: {}", batch.files_processed);
    println!("Files skipped: {}", batch.skipped.len());
    println!("Runs: {}", batch.runs.len());
    println!("Flows: {}", batch.total_flows());
    println!();
    for run in &batch.runs {
        println!(
            "  {} [run {}]: {} flows, {} {} samples",
            run.label,
            run.run_index,
            run.flows,
            run.values.len(),
            options.metric
        );
    }
    for skipped in &batch.skipped {
        println!("  skipped {}: {}", skipped.file, skipped.reason);
    }
    println!();
    Ok(())
}
