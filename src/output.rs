//! CLI output formatting for the manifest generator.
//!
//! Output is information-centric: the primary line for each photo is its
//! positional index and title, with file paths as indented context lines.
//! Warnings are grouped at the end so a long photo list doesn't bury them.
//!
//! Format functions are pure (return `Vec<String>`, no I/O) with `print_*`
//! wrappers that write to stdout. The format side is what tests exercise.

use crate::reconcile::ReconcileReport;

/// Format a reconciliation report for display.
pub fn format_report(report: &ReconcileReport) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push(format!("Photos ({})", report.photos.len()));
    for (index, photo) in report.photos.iter().enumerate() {
        let dims = match (photo.width, photo.height) {
            (Some(w), Some(h)) => format!("{w}\u{d7}{h}"),
            _ => "dimensions unknown".to_string(),
        };
        lines.push(format!("{:03} {} ({dims})", index + 1, photo.title));

        if photo.thumbnail == photo.full {
            lines.push(format!("    Source: {}", photo.full));
        } else {
            if !photo.thumbnail.is_empty() {
                lines.push(format!("    Thumbnail: {}", photo.thumbnail));
            }
            if !photo.full.is_empty() {
                lines.push(format!("    Full: {}", photo.full));
            }
        }
    }

    if !report.warnings.is_empty() {
        lines.push(String::new());
        lines.push(format!("Warnings ({})", report.warnings.len()));
        for warning in &report.warnings {
            lines.push(format!("    {warning}"));
        }
    }

    lines
}

/// Print a reconciliation report to stdout.
pub fn print_report(report: &ReconcileReport) {
    for line in format_report(report) {
        println!("{line}");
    }
}
