//! Upload report formatting

use crate::services::UploadReport;

/// Summarize an upload: rows stored per file, then every failure
pub fn format_upload_report(report: &UploadReport) -> String {
    let mut output = String::new();

    for (file, rows) in &report.imported {
        output.push_str(&format!("  ok     {} ({} rows)\n", file, rows));
    }
    for (file, message) in &report.failures {
        output.push_str(&format!("  FAILED {}: {}\n", file, message));
    }

    output.push_str(&format!(
        "{} file(s) imported, {} failed, {} rows stored\n",
        report.imported.len(),
        report.failures.len(),
        report.total_rows()
    ));
    output
}
