//! Raysweep Core Library
//!
//! Configuration-space sweeps over an external ray tracer with resume from
//! its run log, and speedup analysis of the recorded runs.

pub mod analysis;
pub mod invoker;
pub mod resume;
pub mod runlog;
pub mod space;
pub mod sweep;
pub mod variant;

pub use analysis::{
    baseline_means, durations, speedup, summarize, AnalysisRow, ImplementationSummary,
    WorkloadKey,
};
pub use invoker::{
    artifact_name, InvokeError, Invocation, Invoker, LaunchOutcome, Launcher, ProcessLauncher,
};
pub use resume::{already_run, record_matches};
pub use runlog::{RunLog, RunLogError, RunRecord, SchemaError};
pub use space::{ConfigSpace, Configuration, WindowSize};
pub use sweep::{run_sweep, SweepError, SweepOptions, SweepReport};
pub use variant::{UnknownIdentity, UnknownVariant, Variant};
