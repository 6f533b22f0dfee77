//! Report rendering: HTML tables, aligned plain-text tables, and JSON.
//!
//! Row order is always taken verbatim from the report.

use std::borrow::Cow;
use std::fmt::Write as _;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;

use crate::report::{DepartmentHires, QuarterlyHires};

pub const QUARTERLY_HEADERS: [&str; 6] = ["Department", "Job", "Q1", "Q2", "Q3", "Q4"];
pub const ABOVE_AVERAGE_HEADERS: [&str; 3] = ["id", "department", "hired"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum ReportFormat {
    #[default]
    Html,
    Table,
    Json,
}

pub trait TabularRow {
    fn cells(&self) -> Vec<String>;
}

impl TabularRow for QuarterlyHires {
    fn cells(&self) -> Vec<String> {
        vec![
            self.department.clone(),
            self.job.clone(),
            self.q1.to_string(),
            self.q2.to_string(),
            self.q3.to_string(),
            self.q4.to_string(),
        ]
    }
}

impl TabularRow for DepartmentHires {
    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.department.clone(),
            self.hired.to_string(),
        ]
    }
}

pub fn render<R>(format: ReportFormat, headers: &[&str], rows: &[R]) -> Result<String>
where
    R: TabularRow + Serialize,
{
    let cells = rows.iter().map(TabularRow::cells).collect::<Vec<_>>();
    match format {
        ReportFormat::Html => Ok(render_html(headers, &cells)),
        ReportFormat::Table => Ok(render_text(headers, &cells)),
        ReportFormat::Json => {
            serde_json::to_string_pretty(rows).context("Serializing report rows")
        }
    }
}

pub fn render_html(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut html = String::from("<table border='1'>\n<tr>");
    for header in headers {
        let _ = write!(html, "<th>{}</th>", escape_html(header));
    }
    html.push_str("</tr>\n");
    for row in rows {
        html.push_str("<tr>");
        for cell in row {
            let _ = write!(html, "<td>{}</td>", escape_html(cell));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</table>");
    html
}

fn escape_html(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(value);
    }
    let mut escaped = String::with_capacity(value.len() + 8);
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}

/// Column-aligned text table with a dashed separator under the header.
pub fn render_text(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths = headers
        .iter()
        .map(|h| h.chars().count().max(3))
        .collect::<Vec<_>>();
    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(widths.len()) {
            widths[idx] = widths[idx].max(sanitize_cell(cell).chars().count());
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_line(headers.iter().copied(), &widths));
    let separator = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    let _ = writeln!(
        output,
        "{}",
        format_line(separator.iter().map(String::as_str), &widths)
    );
    for row in rows {
        let sanitized = row.iter().map(|c| sanitize_cell(c)).collect::<Vec<_>>();
        let _ = writeln!(
            output,
            "{}",
            format_line(sanitized.iter().map(|c| c.as_ref()), &widths)
        );
    }
    output
}

fn format_line<'a, I>(values: I, widths: &[usize]) -> String
where
    I: Iterator<Item = &'a str>,
{
    let line = values
        .zip(widths)
        .map(|(value, &width)| format!("{value:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    line.trim_end().to_string()
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quarterly() -> Vec<QuarterlyHires> {
        vec![QuarterlyHires {
            department: "Sales".into(),
            job: "Manager".into(),
            q1: 1,
            q2: 0,
            q3: 2,
            q4: 0,
        }]
    }

    #[test]
    fn quarterly_html_puts_department_before_job() {
        let html = render(ReportFormat::Html, &QUARTERLY_HEADERS, &quarterly()).unwrap();
        assert_eq!(
            html,
            "<table border='1'>\n\
             <tr><th>Department</th><th>Job</th><th>Q1</th><th>Q2</th><th>Q3</th><th>Q4</th></tr>\n\
             <tr><td>Sales</td><td>Manager</td><td>1</td><td>0</td><td>2</td><td>0</td></tr>\n\
             </table>"
        );
    }

    #[test]
    fn above_average_html_keeps_row_order() {
        let rows = vec![
            DepartmentHires {
                id: 8,
                department: "Support".into(),
                hired: 9,
            },
            DepartmentHires {
                id: 2,
                department: "R&D".into(),
                hired: 4,
            },
        ];
        let html = render(ReportFormat::Html, &ABOVE_AVERAGE_HEADERS, &rows).unwrap();
        let support = html.find("Support").unwrap();
        let research = html.find("R&amp;D").unwrap();
        assert!(support < research);
        assert!(html.starts_with("<table border='1'>\n<tr><th>id</th><th>department</th><th>hired</th></tr>"));
    }

    #[test]
    fn empty_report_renders_header_only() {
        let rows: Vec<DepartmentHires> = Vec::new();
        let html = render(ReportFormat::Html, &ABOVE_AVERAGE_HEADERS, &rows).unwrap();
        assert_eq!(html.matches("<tr>").count(), 1);
    }

    #[test]
    fn text_table_aligns_columns() {
        let text = render(ReportFormat::Table, &QUARTERLY_HEADERS, &quarterly()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "Department  Job      Q1   Q2   Q3   Q4");
        assert_eq!(lines[1], "----------  -------  ---  ---  ---  ---");
        assert_eq!(lines[2], "Sales       Manager  1    0    2    0");
    }

    #[test]
    fn json_uses_quarter_labels() {
        let json = render(ReportFormat::Json, &QUARTERLY_HEADERS, &quarterly()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["Q3"], 2);
        assert_eq!(value[0]["department"], "Sales");
    }
}
