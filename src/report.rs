//! Human-readable and file output for sweep and analysis results.

use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};
use raysweep_core::{AnalysisRow, ImplementationSummary, SweepReport, Variant};

pub fn print_sweep_report(report: &SweepReport, dry_run: bool) {
    if dry_run {
        for config in &report.pending {
            println!(
                "pending  {:<16} {:<32} {}x{} s{} b{}",
                config.variant,
                config.scene,
                config.size.width,
                config.size.height,
                config.samples,
                config.bounces
            );
        }
        println!(
            "{} of {} configurations pending, {} already recorded",
            report.pending.len(),
            report.planned,
            report.skipped
        );
        return;
    }

    println!("sweep finished");
    println!("  Planned:  {}", report.planned);
    println!("  Skipped:  {}", report.skipped);
    println!("  Launched: {}", report.launched);
    println!("  Failed:   {}", report.failed);
    if report.failed > 0 {
        println!("  Failed configurations are retried on the next sweep.");
    }
}

pub fn print_summary(summary: &[ImplementationSummary], baseline: Option<Variant>) {
    if let Some(baseline) = baseline {
        println!("speedup vs {baseline}");
    }
    println!("{}", summary_table(summary));
}

fn summary_table(summary: &[ImplementationSummary]) -> Table {
    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header(&[
            "Implementation",
            "Variant",
            "Runs",
            "Mean (ms)",
            "Mean speedup",
            "Max speedup",
        ]));

    for entry in summary {
        let variant = entry
            .variant
            .map(|v| v.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        table.add_row(vec![
            Cell::new(&entry.implementation),
            Cell::new(variant),
            Cell::new(entry.runs).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}", entry.mean_total_ms)).set_alignment(CellAlignment::Right),
            Cell::new(format_ratio(entry.mean_speedup)).set_alignment(CellAlignment::Right),
            Cell::new(format_ratio(entry.max_speedup)).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

/// Registry of variants with their renderer flag and accepted executors.
pub fn variants_table() -> Table {
    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header(&["Variant", "Flag", "Identities"]));
    for variant in Variant::ALL {
        table.add_row(vec![
            Cell::new(variant.name()),
            Cell::new(variant.flag()),
            Cell::new(variant.identities().join(", ")),
        ]);
    }
    table
}

fn header(names: &[&str]) -> Vec<Cell> {
    names
        .iter()
        .map(|name| Cell::new(name).add_attribute(Attribute::Bold))
        .collect()
}

fn format_ratio(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.3}"))
        .unwrap_or_else(|| "-".to_string())
}

/// Write the dataset as CSV, one row per charted run.
pub fn write_dataset_csv(path: &Path, rows: &[AnalysisRow]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create directory {}", parent.display()))?;
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("cannot create {}", path.display()))?;
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("cannot write {}", path.display()))?;
    }
    writer.flush()?;
    tracing::info!(path = %path.display(), rows = rows.len(), "dataset written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use raysweep_core::{speedup, RunLog};

    const LOG: &str = "Platform,Architecture,Implementation,Filename,Width,Height,Samples,Bounces,Rays,Triangles,Spheres,Total Duration (ms)\n\
                       Linux,x86_64,SequentialRayTracer,scene/a.json,800,600,1,2,480000,10,1,100\n\
                       Linux,x86_64,OpenMPRayTracer,scene/a.json,800,600,1,2,480000,10,1,25\n";

    #[test]
    fn dataset_csv_has_header_and_rows() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("out").join("speedup.csv");
        let rows = speedup(&RunLog::from_reader(LOG.as_bytes()).unwrap(), Variant::Sequential);

        write_dataset_csv(&path, &rows).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("implementation,variant,filename"));
        assert!(header.ends_with("baseline_ms,speedup"));
        let body: Vec<&str> = lines.collect();
        assert_eq!(body.len(), 2);
        assert!(body.iter().any(|l| l.starts_with("OpenMPRayTracer,MULTI_THREADED,") && l.ends_with(",4.0")));
    }

    #[test]
    fn summary_table_lists_each_implementation() {
        let rows = speedup(&RunLog::from_reader(LOG.as_bytes()).unwrap(), Variant::Sequential);
        let rendered = summary_table(&raysweep_core::summarize(&rows)).to_string();

        assert!(rendered.contains("Mean speedup"));
        assert!(rendered.contains("OpenMPRayTracer"));
        assert!(rendered.contains("MULTI_THREADED"));
        assert!(rendered.contains("4.000"));
        assert!(rendered.contains("100.00"));
    }

    #[test]
    fn missing_ratios_render_as_placeholder() {
        let summary = vec![ImplementationSummary {
            implementation: "VulkanRayTracer".to_string(),
            variant: None,
            runs: 1,
            mean_total_ms: 12.5,
            mean_speedup: None,
            max_speedup: None,
        }];
        let rendered = summary_table(&summary).to_string();
        assert!(rendered.contains("unknown"));
        assert!(rendered.contains(" - "));
    }

    #[test]
    fn variants_table_shows_every_identity() {
        let rendered = variants_table().to_string();
        for variant in Variant::ALL {
            assert!(rendered.contains(variant.flag()));
            for identity in variant.identities() {
                assert!(rendered.contains(identity));
            }
        }
    }

    #[test]
    fn ratio_formatting() {
        assert_eq!(format_ratio(Some(2.0)), "2.000");
        assert_eq!(format_ratio(None), "-");
    }
}
