//! Speedup and duration analysis over a finished run log.
//!
//! Speedup compares each run against the mean time of the baseline variant
//! for the same workload. Two runs describe the same workload when every
//! field of [`WorkloadKey`] matches; the implementation and timings are
//! deliberately left out so runs of different implementations line up.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::runlog::{RunLog, RunRecord};
use crate::variant::Variant;

/// Fields that define an equivalent workload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkloadKey {
    pub platform: String,
    pub architecture: String,
    pub filename: String,
    pub samples: u32,
    pub bounces: u32,
    pub rays: u64,
    pub width: u32,
    pub height: u32,
    pub triangles: u64,
    pub spheres: u64,
}

impl WorkloadKey {
    pub fn of(record: &RunRecord) -> Self {
        Self {
            platform: record.platform.clone(),
            architecture: record.architecture.clone(),
            filename: record.filename.clone(),
            samples: record.samples,
            bounces: record.bounces,
            rays: record.rays,
            width: record.width,
            height: record.height,
            triangles: record.triangles,
            spheres: record.spheres,
        }
    }
}

/// One charted point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRow {
    pub implementation: String,
    /// `None` when no variant claims the implementation.
    pub variant: Option<Variant>,
    pub filename: String,
    pub platform: String,
    pub architecture: String,
    pub git_hash: Option<String>,
    pub width: u32,
    pub height: u32,
    pub samples: u32,
    pub bounces: u32,
    pub rays: u64,
    pub triangles: u64,
    pub spheres: u64,
    pub workload: u64,
    pub encoding_ms: Option<f64>,
    pub raytracing_ms: Option<f64>,
    pub decoding_ms: Option<f64>,
    pub total_ms: f64,
    pub baseline_ms: Option<f64>,
    pub speedup: Option<f64>,
}

impl AnalysisRow {
    fn from_record(record: &RunRecord) -> Self {
        Self {
            implementation: record.implementation.clone(),
            variant: Variant::from_identity(&record.implementation).ok(),
            filename: record.filename.clone(),
            platform: record.platform.clone(),
            architecture: record.architecture.clone(),
            git_hash: record.git_hash.clone(),
            width: record.width,
            height: record.height,
            samples: record.samples,
            bounces: record.bounces,
            rays: record.rays,
            triangles: record.triangles,
            spheres: record.spheres,
            workload: record.workload(),
            encoding_ms: record.encoding_ms,
            raytracing_ms: record.raytracing_ms,
            decoding_ms: record.decoding_ms,
            total_ms: record.total_ms,
            baseline_ms: None,
            speedup: None,
        }
    }
}

/// Mean total time of `baseline` runs, per workload.
pub fn baseline_means(records: &[RunRecord], baseline: Variant) -> BTreeMap<WorkloadKey, f64> {
    let mut sums: BTreeMap<WorkloadKey, (f64, usize)> = BTreeMap::new();
    for record in records.iter().filter(|r| baseline.accepts(&r.implementation)) {
        let entry = sums.entry(WorkloadKey::of(record)).or_insert((0.0, 0));
        entry.0 += record.total_ms;
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(key, (sum, count))| (key, sum / count as f64))
        .collect()
}

/// Speedup of every run relative to the baseline mean of its workload,
/// sorted by workload ascending.
///
/// Runs whose workload has no baseline run are dropped, as are runs with a
/// non-positive time; the ratio is undefined for both.
pub fn speedup(log: &RunLog, baseline: Variant) -> Vec<AnalysisRow> {
    let means = baseline_means(log.records(), baseline);

    let mut dropped = 0usize;
    let mut rows: Vec<AnalysisRow> = log
        .records()
        .iter()
        .filter_map(|record| {
            let baseline_ms = means.get(&WorkloadKey::of(record)).copied();
            match baseline_ms {
                Some(baseline_ms) if baseline_ms > 0.0 && record.total_ms > 0.0 => {
                    let mut row = AnalysisRow::from_record(record);
                    row.baseline_ms = Some(baseline_ms);
                    row.speedup = Some(baseline_ms / record.total_ms);
                    Some(row)
                }
                _ => {
                    dropped += 1;
                    None
                }
            }
        })
        .collect();

    if dropped > 0 {
        tracing::debug!(dropped, %baseline, "runs without a comparable baseline were left out");
    }

    rows.sort_by_key(|row| row.workload);
    rows
}

/// Every run with its workload and total duration, sorted by workload
/// ascending.
pub fn durations(log: &RunLog) -> Vec<AnalysisRow> {
    let mut rows: Vec<AnalysisRow> = log.records().iter().map(AnalysisRow::from_record).collect();
    rows.sort_by_key(|row| row.workload);
    rows
}

/// Aggregate figures for one implementation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImplementationSummary {
    pub implementation: String,
    pub variant: Option<Variant>,
    pub runs: usize,
    pub mean_total_ms: f64,
    pub mean_speedup: Option<f64>,
    pub max_speedup: Option<f64>,
}

/// Per-implementation summary of `rows`, ordered by implementation name.
pub fn summarize(rows: &[AnalysisRow]) -> Vec<ImplementationSummary> {
    let mut groups: BTreeMap<&str, Vec<&AnalysisRow>> = BTreeMap::new();
    for row in rows {
        groups.entry(row.implementation.as_str()).or_default().push(row);
    }

    groups
        .into_iter()
        .map(|(implementation, group)| {
            let variant = group[0].variant;
            if variant.is_none() {
                tracing::warn!(identity = implementation, "no variant claims this executor");
            }
            let speedups: Vec<f64> = group.iter().filter_map(|r| r.speedup).collect();
            ImplementationSummary {
                implementation: implementation.to_string(),
                variant,
                runs: group.len(),
                mean_total_ms: group.iter().map(|r| r.total_ms).sum::<f64>() / group.len() as f64,
                mean_speedup: (!speedups.is_empty())
                    .then(|| speedups.iter().sum::<f64>() / speedups.len() as f64),
                max_speedup: speedups.iter().copied().reduce(f64::max),
            }
        })
        .collect()
}
