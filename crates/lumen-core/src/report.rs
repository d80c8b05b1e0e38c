//! Plain-text metric reports.

use std::fmt::Write as _;
use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::metrics::accumulator::MetricSummary;

/// First line of a per-video report.
pub fn video_report_header(filename: &str) -> String {
    format!("Rata-rata MSE dan PSNR untuk video: {}", filename)
}

/// First line of the cross-video report.
pub const OVERALL_REPORT_HEADER: &str = "Rata-rata MSE dan PSNR dari semua video:";

/// One line per variant, in report order, each ending with a newline.
pub fn format_metric_lines(summary: &MetricSummary) -> String {
    let mut out = String::new();
    for (variant, avg) in summary.iter() {
        // Writing to a String cannot fail.
        let _ = writeln!(
            out,
            "{} - MSE: {:.2}, PSNR: {:.2} dB",
            variant.label(),
            avg.mse,
            avg.psnr
        );
    }
    out
}

pub fn format_video_report(filename: &str, summary: &MetricSummary) -> String {
    format!("{}\n{}", video_report_header(filename), format_metric_lines(summary))
}

pub fn format_overall_report(summary: &MetricSummary) -> String {
    format!("{}\n{}", OVERALL_REPORT_HEADER, format_metric_lines(summary))
}

pub fn write_report(path: &Path, text: &str) -> Result<()> {
    std::fs::write(path, text)?;
    info!(path = %path.display(), "Report written");
    Ok(())
}
