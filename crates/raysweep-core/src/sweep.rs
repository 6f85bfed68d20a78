//! One sequential pass over the configuration space.

use serde::Serialize;

use crate::invoker::{InvokeError, Invoker, Launcher};
use crate::resume::already_run;
use crate::runlog::RunLog;
use crate::space::{ConfigSpace, Configuration};
use crate::variant::Variant;

#[derive(Debug, thiserror::Error)]
pub enum SweepError {
    #[error(transparent)]
    Invoke(#[from] InvokeError),
}

/// Counters for one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub planned: usize,
    pub skipped: usize,
    pub launched: usize,
    /// Launches that could not start or exited unsuccessfully.
    pub failed: usize,
    /// Configurations that would have been launched in a dry run.
    pub pending: Vec<Configuration>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SweepOptions {
    /// Report what would run without launching anything.
    pub dry_run: bool,
}

/// Run every configuration of `space` not already present in `history`.
///
/// `history` is the run log as read at sweep start; rows appended during the
/// sweep are not re-read. Render failures are logged and counted but never
/// abort the sweep. Only an unusable output directory does.
pub fn run_sweep(
    space: &ConfigSpace,
    history: &RunLog,
    invoker: &Invoker,
    launcher: &mut dyn Launcher,
    options: SweepOptions,
) -> Result<SweepReport, SweepError> {
    warn_unknown_identities(history);

    let mut report = SweepReport {
        planned: space.len(),
        ..SweepReport::default()
    };

    for (index, config) in space.iter().enumerate() {
        if already_run(&config, history) {
            tracing::debug!(
                scene = %config.scene,
                width = config.size.width,
                height = config.size.height,
                samples = config.samples,
                bounces = config.bounces,
                variant = %config.variant,
                "skipping configuration already in run log"
            );
            report.skipped += 1;
            continue;
        }

        if options.dry_run {
            report.pending.push(config);
            continue;
        }

        let progress = format!("{}/{}", index + 1, report.planned);
        let size = format!("{}x{}", config.size.width, config.size.height);
        tracing::info!(
            progress = %progress,
            scene = %config.scene,
            size = %size,
            samples = config.samples,
            bounces = config.bounces,
            variant = %config.variant,
            "running configuration"
        );

        let invocation = invoker.prepare(&config)?;
        tracing::debug!(command = %invocation.command_line(), "launching renderer");
        report.launched += 1;

        match launcher.launch(&invocation) {
            Ok(outcome) if outcome.success() => {}
            Ok(outcome) => {
                report.failed += 1;
                tracing::warn!(
                    ?outcome,
                    scene = %config.scene,
                    variant = %config.variant,
                    "renderer did not exit cleanly; configuration will be retried next sweep"
                );
            }
            Err(err) => {
                report.failed += 1;
                tracing::error!(
                    error = %err,
                    program = %invocation.program.display(),
                    "failed to launch renderer"
                );
            }
        }
    }

    Ok(report)
}

fn warn_unknown_identities(history: &RunLog) {
    let mut reported = std::collections::BTreeSet::new();
    for record in history.records() {
        if let Err(err) = Variant::from_identity(&record.implementation) {
            if reported.insert(record.implementation.as_str()) {
                tracing::warn!(
                    identity = %err.0,
                    "run log contains an executor no variant claims; its rows never satisfy a resume check"
                );
            }
        }
    }
}
