//! raysweep: benchmark sweeps over an external ray tracer.
//!
//!   raysweep sweep     → render every configuration not yet in the run log
//!   raysweep analyze   → speedup / duration analysis of the run log
//!   raysweep variants  → list logical variants and their executor identities

mod chart;
mod config;
mod logging;
mod report;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use raysweep_core::{
    durations, run_sweep, speedup, summarize, Invoker, ProcessLauncher, RunLog, SweepOptions,
    Variant,
};

use crate::chart::Metric;
use crate::config::Config;

// ─── Help text ────────────────────────────────────────────────────────────────

const AFTER_HELP: &str = "\
ENVIRONMENT:
    RAYSWEEP_CONFIG         Path to the configuration file (default:
                            ./raysweep.toml when present)

WORKFLOW:
    # Render everything not yet recorded in the run log
    raysweep sweep

    # Interrupted? Run it again; recorded configurations are skipped
    raysweep sweep

    # Chart speedup against the sequential renderer
    raysweep analyze --baseline sequential";

const SWEEP_AFTER_HELP: &str = "\
EXAMPLES:
    raysweep sweep --dry-run
    raysweep sweep --work-dir ../cmake-build-release --variant shader
    raysweep sweep --log-level debug --log-format json";

const ANALYZE_AFTER_HELP: &str = "\
EXAMPLES:
    raysweep analyze
    raysweep analyze --metric duration --chart timelog_plot.html
    raysweep analyze --baseline multi-threaded --csv speedup.csv --json";

// ─── CLI definition ───────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "raysweep",
    version,
    about = "raysweep: benchmark sweeps over an external ray tracer",
    after_help = AFTER_HELP,
    disable_help_subcommand = true
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    /// Log format (text, json)
    #[arg(long, global = true, default_value = "text")]
    log_format: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every configuration not yet recorded in the run log
    #[command(after_help = SWEEP_AFTER_HELP)]
    Sweep {
        /// Configuration file
        #[arg(long, env = "RAYSWEEP_CONFIG")]
        config: Option<PathBuf>,
        /// Directory the renderer runs in
        #[arg(long)]
        work_dir: Option<PathBuf>,
        /// Renderer executable, relative to the work directory
        #[arg(long)]
        executable: Option<PathBuf>,
        /// Run log the renderer appends to
        #[arg(long)]
        timelog: Option<PathBuf>,
        /// Directory for rendered images
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Restrict the sweep to these variants (repeatable)
        #[arg(long = "variant")]
        variants: Vec<Variant>,
        /// List pending configurations without rendering
        #[arg(long)]
        dry_run: bool,
        /// Print the sweep report as JSON
        #[arg(long)]
        json: bool,
        /// Discard the renderer's stdout
        #[arg(long)]
        quiet: bool,
    },

    /// Compute speedup or duration against workload from the run log
    #[command(after_help = ANALYZE_AFTER_HELP)]
    Analyze {
        /// Configuration file
        #[arg(long, env = "RAYSWEEP_CONFIG")]
        config: Option<PathBuf>,
        /// Run log to analyze
        #[arg(long)]
        timelog: Option<PathBuf>,
        /// What to chart
        #[arg(long, value_enum, default_value_t = MetricArg::Speedup)]
        metric: MetricArg,
        /// Reference variant for speedup
        #[arg(long)]
        baseline: Option<Variant>,
        /// Chart output path
        #[arg(long)]
        chart: Option<PathBuf>,
        /// Also write the dataset as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Print the dataset and summary as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List logical variants with their flags and executor identities
    Variants,
}

#[derive(Clone, Copy, ValueEnum)]
enum MetricArg {
    Speedup,
    Duration,
}

// ─── Dispatch ─────────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = logging::init_tracing(&cli.log_level, &cli.log_format) {
        eprintln!("error: cannot initialize logging: {err:#}");
        return ExitCode::FAILURE;
    }

    let result = match cli.command {
        None => {
            Cli::command().print_help().ok();
            println!();
            Ok(())
        }
        Some(Commands::Sweep {
            config,
            work_dir,
            executable,
            timelog,
            output_dir,
            variants,
            dry_run,
            json,
            quiet,
        }) => {
            let overrides = SweepOverrides {
                work_dir,
                executable,
                timelog,
                output_dir,
                variants,
            };
            run_sweep_command(config.as_deref(), overrides, dry_run, json, quiet)
        }
        Some(Commands::Analyze {
            config,
            timelog,
            metric,
            baseline,
            chart,
            csv,
            json,
        }) => {
            let metric = match metric {
                MetricArg::Speedup => Metric::Speedup,
                MetricArg::Duration => Metric::Duration,
            };
            run_analyze(
                config.as_deref(),
                timelog,
                metric,
                baseline,
                chart.as_deref(),
                csv.as_deref(),
                json,
            )
        }
        Some(Commands::Variants) => {
            run_variants();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

// ─── Sweep ────────────────────────────────────────────────────────────────────

struct SweepOverrides {
    work_dir: Option<PathBuf>,
    executable: Option<PathBuf>,
    timelog: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    variants: Vec<Variant>,
}

fn run_sweep_command(
    config_path: Option<&Path>,
    overrides: SweepOverrides,
    dry_run: bool,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let mut config = Config::load(config_path)?;
    if let Some(work_dir) = overrides.work_dir {
        config.work_dir = work_dir;
    }
    if let Some(executable) = overrides.executable {
        config.executable = executable;
    }
    if let Some(timelog) = overrides.timelog {
        config.timelog = timelog;
    }
    if let Some(output_dir) = overrides.output_dir {
        config.output_dir = output_dir;
    }
    if !overrides.variants.is_empty() {
        let mut variants = overrides.variants;
        variants.sort();
        variants.dedup();
        config.variants = variants;
    }
    config.validate()?;

    let executable = config.executable_path();
    if !dry_run && !executable.is_file() {
        bail!("renderer executable not found at {}", executable.display());
    }

    let scenes = config.resolve_scenes()?;
    let space = config.space(scenes);
    let history = RunLog::load(&config.timelog)?;
    tracing::info!(
        configurations = space.len(),
        recorded_runs = history.len(),
        timelog = %config.timelog.display(),
        "starting sweep"
    );

    let invoker = Invoker::new(
        &config.work_dir,
        &config.executable,
        &config.timelog,
        &config.output_dir,
    )?;
    let mut launcher = ProcessLauncher { quiet };
    let report = run_sweep(
        &space,
        &history,
        &invoker,
        &mut launcher,
        SweepOptions { dry_run },
    )?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("cannot encode sweep report")?
        );
    } else {
        report::print_sweep_report(&report, dry_run);
    }
    Ok(())
}

// ─── Analyze ──────────────────────────────────────────────────────────────────

fn run_analyze(
    config_path: Option<&Path>,
    timelog: Option<PathBuf>,
    metric: Metric,
    baseline: Option<Variant>,
    chart_path: Option<&Path>,
    csv_path: Option<&Path>,
    json: bool,
) -> Result<()> {
    let config = Config::load(config_path)?;
    let timelog = timelog.unwrap_or_else(|| config.timelog.clone());
    let baseline = baseline.unwrap_or(config.baseline);

    let present = timelog
        .try_exists()
        .with_context(|| format!("cannot access run log {}", timelog.display()))?;
    if !present {
        bail!(
            "run log {} not found; run `raysweep sweep` first",
            timelog.display()
        );
    }
    let log = RunLog::load(&timelog)?;

    let (rows, title, default_chart) = match metric {
        Metric::Speedup => (
            speedup(&log, baseline),
            format!("Speedup vs {baseline} by Workload"),
            config.speedup_chart.as_path(),
        ),
        Metric::Duration => (
            durations(&log),
            "Total Duration vs Workload by Implementation".to_string(),
            config.duration_chart.as_path(),
        ),
    };
    if rows.is_empty() {
        tracing::warn!(runs = log.len(), "no runs to chart");
    }

    let chart_path = chart_path.unwrap_or(default_chart);
    chart::write_chart(chart_path, &rows, metric, &title)?;
    if let Some(csv_path) = csv_path {
        report::write_dataset_csv(csv_path, &rows)?;
    }

    let summary = summarize(&rows);
    let shown_baseline = (metric == Metric::Speedup).then_some(baseline);
    if json {
        let out = serde_json::json!({
            "metric": match metric {
                Metric::Speedup => "speedup",
                Metric::Duration => "duration",
            },
            "baseline": shown_baseline,
            "chart": chart_path,
            "summary": summary,
            "rows": rows,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&out).context("cannot encode analysis")?
        );
    } else {
        report::print_summary(&summary, shown_baseline);
        println!("chart written to {}", chart_path.display());
    }
    Ok(())
}

// ─── Variants ─────────────────────────────────────────────────────────────────

fn run_variants() {
    println!("{}", report::variants_table());
}
