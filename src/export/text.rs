use colored::Colorize;
use std::fmt::{self, Write};
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::dashboard::{DashboardReport, MetricTable, SectionView, NOT_ENOUGH_DATA};

fn period_line(report: &DashboardReport) -> String {
    let mut line = match (report.window_start, report.window_end) {
        (Some(start), Some(end)) => format!(
            "Period: {} to {} ({} nights)",
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d"),
            report.window_days
        ),
        _ => "Period: no observations".to_string(),
    };
    if let Some(cutoff) = report.cutoff {
        line.push_str(&format!(", data through {}", cutoff.format("%Y-%m-%d")));
    }
    line
}

fn insufficient_line(section: &SectionView<'_>) -> Option<String> {
    section
        .insufficient_reason
        .map(|reason| format!("{}: {}", NOT_ENOUGH_DATA, reason))
}

/// Box-drawn table for one metric group
pub fn format_table(table: &MetricTable) -> String {
    let mut builder = Builder::default();
    builder.push_record(table.headers.iter().cloned());
    for row in &table.rows {
        builder.push_record(row.iter().cloned());
    }

    let mut rendered = builder.build();
    rendered.with(Style::rounded());
    rendered.to_string()
}

/// Render the report as titled tables for a terminal
pub fn render_tables(report: &DashboardReport, color: bool) -> Result<String, fmt::Error> {
    let paint = |text: &str, style: fn(&str) -> colored::ColoredString| {
        if color {
            style(text).to_string()
        } else {
            text.to_string()
        }
    };

    let mut out = String::new();
    writeln!(out, "{}", paint(&report.title(), |t| t.bold().green()))?;
    writeln!(out, "{}", period_line(report))?;

    for section in report.sections() {
        writeln!(out)?;
        writeln!(out, "{}", paint(section.heading, |t| t.bold().cyan()))?;

        if let Some(line) = insufficient_line(&section) {
            writeln!(out, "{}", paint(&line, |t| t.yellow()))?;
            continue;
        }

        for table in section.tables {
            writeln!(out, "{}", paint(&table.title, |t| t.bold()))?;
            if table.rows.is_empty() {
                writeln!(out, "(no days)")?;
            } else {
                writeln!(out, "{}", format_table(table))?;
            }
            if let Some(caption) = &table.caption {
                writeln!(out, "{}", paint(caption, |t| t.dimmed()))?;
            }
        }
    }

    Ok(out)
}

/// Render the report as plain `Metric: value` lines
pub fn render_plain(report: &DashboardReport) -> Result<String, fmt::Error> {
    let mut out = String::new();
    let rule = "=".repeat(report.title().len());

    writeln!(out, "{}", rule)?;
    writeln!(out, "{}", report.title().to_uppercase())?;
    writeln!(out, "{}", rule)?;
    writeln!(out, "{}", period_line(report))?;

    for section in report.sections() {
        writeln!(out)?;
        writeln!(out, "{}", section.heading.to_uppercase())?;
        writeln!(out, "{}", "-".repeat(section.heading.len()))?;

        if let Some(line) = insufficient_line(&section) {
            writeln!(out, "{}", line)?;
            continue;
        }

        for table in section.tables {
            if let Some(caption) = &table.caption {
                writeln!(out, "{} ({})", table.title, caption)?;
            } else {
                writeln!(out, "{}", table.title)?;
            }
            for row in &table.rows {
                let (label, values) = match row.split_first() {
                    Some(split) => split,
                    None => continue,
                };
                if values.is_empty() {
                    writeln!(out, "  {}", label)?;
                } else {
                    writeln!(out, "  {}: {}", label, values.join(", "))?;
                }
            }
        }
    }

    Ok(out)
}
