//! Self-contained HTML chart of an analysis dataset.
//!
//! The page loads plotly.js from its CDN and embeds the data as JSON, so the
//! file can be opened directly in a browser.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use raysweep_core::AnalysisRow;
use serde::Serialize;
use serde_json::json;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Speedup,
    Duration,
}

const DASHES: [&str; 4] = ["solid", "dash", "dot", "dashdot"];

#[derive(Debug, Default, Serialize)]
struct Trace {
    name: String,
    legendgroup: String,
    line: Line,
    x: Vec<u64>,
    y: Vec<f64>,
    text: Vec<String>,
    mode: &'static str,
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Default, Serialize)]
struct Line {
    dash: &'static str,
}

/// Chart `rows` (already sorted by workload) and write the page to `path`.
pub fn write_chart(path: &Path, rows: &[AnalysisRow], metric: Metric, title: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create directory {}", parent.display()))?;
    }

    let html = render_html(rows, metric, title)?;
    std::fs::write(path, html).with_context(|| format!("cannot write chart {}", path.display()))?;
    tracing::info!(path = %path.display(), points = rows.len(), "chart written");
    Ok(())
}

fn render_html(rows: &[AnalysisRow], metric: Metric, title: &str) -> Result<String> {
    let traces = build_traces(rows, metric);
    let y_title = match metric {
        Metric::Speedup => "Speedup",
        Metric::Duration => "Total Duration (ms)",
    };
    let layout = json!({
        "title": {
            "text": format!(
                "{title}<br><sub>generated {}</sub>",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
            ),
        },
        "xaxis": { "title": { "text": "Workload (Rays × Bounces × Triangles)" }, "type": "log" },
        "yaxis": { "title": { "text": y_title }, "type": "log" },
        "hovermode": "closest",
    });

    // A literal "</" inside the embedded JSON would end the script element.
    let data = serde_json::to_string(&traces)?.replace("</", "<\\/");
    let layout = serde_json::to_string(&layout)?.replace("</", "<\\/");

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="{cdn}"></script>
</head>
<body>
<div id="chart" style="width:100%;height:90vh;"></div>
<script>
Plotly.newPlot("chart", {data}, {layout});
</script>
</body>
</html>
"#,
        title = escape_html(title),
        cdn = PLOTLY_CDN,
    ))
}

/// Speedup gets one line per implementation, bounce count and sample count,
/// dashed by sample count. Duration gets one line per implementation and scene.
fn build_traces(rows: &[AnalysisRow], metric: Metric) -> Vec<Trace> {
    let mut sample_counts: Vec<u32> = rows.iter().map(|r| r.samples).collect();
    sample_counts.sort_unstable();
    sample_counts.dedup();

    let mut traces: BTreeMap<(String, u32, u32), Trace> = BTreeMap::new();
    for row in rows {
        let (key, name, y) = match metric {
            Metric::Speedup => match row.speedup {
                Some(speedup) => (
                    (row.implementation.clone(), row.bounces, row.samples),
                    format!("{} b{} s{}", row.implementation, row.bounces, row.samples),
                    speedup,
                ),
                None => continue,
            },
            Metric::Duration => (
                (format!("{} | {}", row.implementation, row.filename), 0, 0),
                format!("{} | {}", row.implementation, row.filename),
                row.total_ms,
            ),
        };

        let dash = match metric {
            Metric::Speedup => {
                let index = sample_counts.binary_search(&row.samples).unwrap_or(0);
                DASHES[index % DASHES.len()]
            }
            Metric::Duration => DASHES[0],
        };
        let trace = traces.entry(key).or_insert_with(|| Trace {
            name,
            legendgroup: row.implementation.clone(),
            line: Line { dash },
            mode: "lines+markers",
            kind: "scatter",
            ..Trace::default()
        });
        trace.x.push(row.workload);
        trace.y.push(y);
        trace.text.push(hover_text(row));
    }
    traces.into_values().collect()
}

fn hover_text(row: &AnalysisRow) -> String {
    let mut text = format!(
        "{}<br>{} {}x{}<br>samples {} bounces {}<br>rays {} triangles {} spheres {}<br>total {:.2} ms",
        row.implementation,
        row.filename,
        row.width,
        row.height,
        row.samples,
        row.bounces,
        row.rays,
        row.triangles,
        row.spheres,
        row.total_ms,
    );
    for (phase, ms) in [
        ("encoding", row.encoding_ms),
        ("raytracing", row.raytracing_ms),
        ("decoding", row.decoding_ms),
    ] {
        if let Some(ms) = ms {
            text.push_str(&format!("<br>{phase} {ms:.2} ms"));
        }
    }
    if let Some(hash) = &row.git_hash {
        text.push_str(&format!("<br>git {hash}"));
    }
    if let Some(baseline) = row.baseline_ms {
        text.push_str(&format!("<br>baseline {baseline:.2} ms"));
    }
    text
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
