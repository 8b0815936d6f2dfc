//! HTML rendering of execution reports.

use crate::core::ExecutionReport;

const PROCESSED_COLOR: &str = "#667eea";
const FAILED_COLOR: &str = "#dc3545";
const SUCCESS_COLOR: &str = "#28a745";

/// Escapes the HTML special characters in `text`.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Renders the report as a self-contained HTML document.
///
/// Sections for processed files, failed files, and step outcomes are only
/// emitted when non-empty. Every value taken from the report is escaped.
#[must_use]
pub fn render_html(report: &ExecutionReport) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n");
    html.push_str("<title>Transfer report</title>\n</head>\n");
    html.push_str(
        "<body style=\"font-family:Arial,sans-serif;margin:0;padding:20px;background:#f4f4f4\">\n",
    );
    html.push_str("<div style=\"max-width:600px;margin:0 auto;background:#fff;border-radius:8px\">\n");

    html.push_str(&format!(
        "<div style=\"background:{PROCESSED_COLOR};color:#fff;padding:20px;border-radius:8px 8px 0 0\">\n\
         <h1 style=\"margin:0;font-size:24px\">Transfer report</h1>\n\
         <p style=\"margin:5px 0 0;font-size:14px\">{}</p>\n\
         <p style=\"margin:5px 0 0;font-size:12px\">{}</p>\n</div>\n",
        escape_html(&report.folder_name),
        report.timestamp.format("%d/%m/%Y %H:%M:%S"),
    ));

    html.push_str("<div style=\"padding:20px\">\n");
    if !report.processed_files.is_empty() {
        file_table(&mut html, "Processed files", PROCESSED_COLOR, &report.processed_files);
    }
    if !report.failed_files.is_empty() {
        file_table(&mut html, "Failed files", FAILED_COLOR, &report.failed_files);
    }
    if !report.steps.is_empty() {
        html.push_str(&format!(
            "<h2 style=\"color:{PROCESSED_COLOR};font-size:18px\">Execution details</h2>\n"
        ));
        for step in &report.steps {
            let (color, status) = if step.success {
                (SUCCESS_COLOR, "Succeeded")
            } else {
                (FAILED_COLOR, "Failed")
            };
            html.push_str(&format!(
                "<div style=\"margin-bottom:15px;padding:12px;background:#f8f9fa;border-left:4px solid {color}\">\n\
                 <strong>{}</strong> <span style=\"color:{color}\">{status}</span> \
                 <span style=\"font-size:12px;color:#6c757d\">{} ({:.0} ms)</span>\n\
                 <pre style=\"white-space:pre-wrap;font-size:12px;margin:8px 0 0\">{}</pre>\n</div>\n",
                escape_html(&step.label),
                step.timestamp.format("%H:%M:%S"),
                step.duration_ms,
                escape_html(&step.message),
            ));
        }
    }
    html.push_str("</div>\n");

    html.push_str(&format!(
        "<div style=\"padding:10px 20px;font-size:11px;color:#6c757d\">Run {}</div>\n",
        report.run_id
    ));
    html.push_str("</div>\n</body>\n</html>\n");
    html
}

fn file_table(html: &mut String, title: &str, color: &str, files: &[String]) {
    html.push_str(&format!(
        "<h2 style=\"color:{color};font-size:18px;border-bottom:2px solid {color}\">{title}</h2>\n\
         <table style=\"width:100%;border-collapse:collapse;font-size:14px\">\n\
         <tr><th style=\"text-align:left\">#</th><th style=\"text-align:left\">File</th></tr>\n"
    ));
    for (index, file) in files.iter().enumerate() {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td></tr>\n",
            index + 1,
            escape_html(file)
        ));
    }
    html.push_str(&format!(
        "</table>\n<p style=\"font-size:12px;color:#6c757d\">Total: {} file(s)</p>\n",
        files.len()
    ));
}
