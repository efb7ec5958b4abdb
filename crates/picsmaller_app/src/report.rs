use std::fmt::Write;

use picsmaller_core::{BatchViewModel, JobRowView, JobStatus, SizeTrend};

const EMPTY: &str = "-";

/// Renders the batch as a plain-text table, one row per job.
pub fn render_table(view: &BatchViewModel) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<10} {:<32} {:>11} {:>11} {:>11} {:>11} {:>10}",
        "status", "name", "dimension", "new dim", "size", "new size", "decrease"
    );
    for row in &view.jobs {
        let _ = writeln!(out, "{}", render_row(row));
    }
    let _ = writeln!(
        out,
        "{} finished, {} failed ({})",
        view.done_count,
        view.failed_count,
        view.progress_hint()
    );
    out
}

fn render_row(row: &JobRowView) -> String {
    let decrease = row
        .decrease
        .as_ref()
        .map(|rate| {
            let arrow = match rate.trend {
                SizeTrend::Shrunk => "↓",
                SizeTrend::Grew => "↑",
            };
            format!("{} {arrow}", rate.text)
        })
        .unwrap_or_else(|| EMPTY.to_string());
    let mut line = format!(
        "{:<10} {:<32} {:>11} {:>11} {:>11} {:>11} {:>10}",
        status_label(row.status),
        truncate(&row.name, 32),
        row.dimension,
        row.new_dimension.as_deref().unwrap_or(EMPTY),
        row.size,
        row.new_size.as_deref().unwrap_or(EMPTY),
        decrease,
    );
    if let Some(failure) = &row.failure {
        let _ = write!(line, "  ({failure})");
    }
    line
}

fn status_label(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Pending => "pending",
        JobStatus::Processing => "working",
        JobStatus::Done => "done",
        JobStatus::Failed => "failed",
    }
}

fn truncate(name: &str, max: usize) -> String {
    if name.chars().count() <= max {
        return name.to_string();
    }
    let kept: String = name.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}
