use std::path::Path;

use owo_colors::{OwoColorize, Stream, Style};
use serde::Serialize;

use crate::driver::SweepReport;
use crate::types::{Aggregation, ResultRow};

fn style_header() -> Style {
    Style::new().bold()
}

fn style_time() -> Style {
    Style::new().yellow()
}

/// Seconds as written in the results file: shortest form that keeps a decimal point.
pub fn format_seconds(secs: f64) -> String {
    format!("{:?}", secs)
}

fn column_widths(rows: &[ResultRow]) -> [usize; 4] {
    let mut widths = [1, 1, 1, "time (s)".len()];
    for row in rows {
        widths[0] = widths[0].max(row.run.n.to_string().len());
        widths[1] = widths[1].max(row.run.k.to_string().len());
        widths[2] = widths[2].max(row.run.r.to_string().len());
        widths[3] = widths[3].max(format_seconds(row.elapsed_secs).len());
    }
    widths
}

/// Aligned table of result rows, a footer naming the output file, and a
/// count of skipped logs when there were any.
pub fn format_results(aggregation: &Aggregation, output: &Path) -> String {
    let mut out = String::new();
    let rows = &aggregation.rows;

    if !rows.is_empty() {
        let [wn, wk, wr, wt] = column_widths(rows);

        let header = format!(
            "{:>wn$}  {:>wk$}  {:>wr$}  {:>wt$}",
            "N", "K", "R", "time (s)"
        );
        out.push_str(
            &header
                .if_supports_color(Stream::Stdout, |s| s.style(style_header()))
                .to_string(),
        );
        out.push('\n');

        let time_style = style_time();
        for row in rows {
            let time = format!("{:>wt$}", format_seconds(row.elapsed_secs));
            out.push_str(&format!(
                "{:>wn$}  {:>wk$}  {:>wr$}  {}\n",
                row.run.n,
                row.run.k,
                row.run.r,
                time.if_supports_color(Stream::Stdout, |s| s.style(time_style))
            ));
        }
        out.push('\n');
    }

    let footer = format!(
        "Wrote {} {} to {}",
        rows.len(),
        if rows.len() == 1 { "row" } else { "rows" },
        output.display()
    );
    out.push_str(
        &footer
            .if_supports_color(Stream::Stdout, |s| s.dimmed())
            .to_string(),
    );
    out.push('\n');

    if !aggregation.skipped.is_empty() {
        let skipped = format!(
            "Skipped {} {}",
            aggregation.skipped.len(),
            if aggregation.skipped.len() == 1 { "file" } else { "files" }
        );
        out.push_str(
            &skipped
                .if_supports_color(Stream::Stdout, |s| s.red())
                .to_string(),
        );
        out.push('\n');
        for skip in &aggregation.skipped {
            out.push_str(&format!("  {}\n", skip.error));
        }
    }

    out
}

#[derive(Serialize)]
struct JsonRow {
    n: u64,
    k: u64,
    r: u64,
    time_s: f64,
    file: String,
}

#[derive(Serialize)]
struct JsonSkipped {
    file: String,
    error: String,
}

#[derive(Serialize)]
struct JsonResults {
    rows: Vec<JsonRow>,
    skipped: Vec<JsonSkipped>,
}

pub fn format_results_json(aggregation: &Aggregation) -> String {
    let results = JsonResults {
        rows: aggregation
            .rows
            .iter()
            .map(|row| JsonRow {
                n: row.run.n,
                k: row.run.k,
                r: row.run.r,
                time_s: row.elapsed_secs,
                file: row.path.to_string_lossy().into_owned(),
            })
            .collect(),
        skipped: aggregation
            .skipped
            .iter()
            .map(|skip| JsonSkipped {
                file: skip.path.to_string_lossy().into_owned(),
                error: skip.error.to_string(),
            })
            .collect(),
    };

    serde_json::to_string_pretty(&results).unwrap_or_else(|_| "{}".to_string())
}

/// One line per run of a sweep, then a completed/failed tally.
pub fn format_sweep(report: &SweepReport) -> String {
    let mut out = String::new();

    for (run, log_path) in &report.completed {
        let mark = "ok".if_supports_color(Stream::Stdout, |s| s.green()).to_string();
        out.push_str(&format!("  {}  {}  {}\n", mark, run, log_path.display()));
    }
    for failed in &report.failed {
        let mark = "failed"
            .if_supports_color(Stream::Stdout, |s| s.red())
            .to_string();
        out.push_str(&format!("  {}  {}  {}\n", mark, failed.run, failed.error));
    }

    let summary = format!(
        "{} completed, {} failed",
        report.completed.len(),
        report.failed.len()
    );
    out.push_str(
        &summary
            .if_supports_color(Stream::Stdout, |s| s.dimmed())
            .to_string(),
    );
    out.push('\n');

    out
}
