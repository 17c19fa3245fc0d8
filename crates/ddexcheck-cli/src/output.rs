//! Output formatting and writing utilities
//!
//! Reports are rendered as human-readable text, JSON, YAML or CSV. The same
//! renderer backs stdout and `--save-to`, so a saved report matches what the
//! terminal would have shown in that format.

use crate::cli::OutputFormat;
use crate::error::Result;
use colored::Colorize;
use ddexcheck_core::{BatchEntry, BatchReport, BatchStatistics, Diagnostic, Severity};
use indicatif::{ProgressBar, ProgressStyle};
use is_terminal::IsTerminal;
use serde::Serialize;
use std::io::{self, Write};
use tracing::{debug, trace};

/// CSV column order
const CSV_HEADER: &str = "source,severity,code,path,line,column,message";

/// Trait for formatting output in the configured format
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;

    /// Format a complete batch report
    fn format_report(&self, report: &BatchReport, use_color: bool) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            // No tabular shape for arbitrary values
            OutputFormat::JsonPretty | OutputFormat::Human | OutputFormat::Csv => {
                Ok(serde_json::to_string_pretty(value)?)
            }
        }
    }

    fn format_report(&self, report: &BatchReport, use_color: bool) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(&ReportDocument::new(report))?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(&ReportDocument::new(report))?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(&ReportDocument::new(report))?),
            OutputFormat::Csv => Ok(format_report_csv(report)),
            OutputFormat::Human => Ok(format_report_human(report, use_color)),
        }
    }
}

/// Machine-readable report: the batch plus its statistics
#[derive(Serialize)]
struct ReportDocument<'a> {
    #[serde(flatten)]
    report: &'a BatchReport,
    complete: bool,
    all_valid: bool,
    statistics: BatchStatistics,
}

impl<'a> ReportDocument<'a> {
    fn new(report: &'a BatchReport) -> Self {
        Self {
            report,
            complete: report.is_complete(),
            all_valid: report.all_valid(),
            statistics: report.statistics(),
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    show_progress: bool,
    quiet: bool,
    verbose: u8,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer on stdout
    ///
    /// Progress bars draw on stderr and only when it is a terminal.
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool, verbose: u8) -> Self {
        Self {
            format,
            use_color,
            show_progress: !quiet && io::stderr().is_terminal(),
            quiet,
            verbose,
            writer: Box::new(io::stdout()),
        }
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(format: OutputFormat, use_color: bool, quiet: bool, verbose: u8, writer: Box<dyn Write>) -> Self {
        Self {
            format,
            use_color,
            show_progress: false,
            quiet,
            verbose,
            writer,
        }
    }

    /// Get the output format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Turn progress bars off, e.g. when the config file disables them
    pub fn disable_progress(&mut self) {
        self.show_progress = false;
    }

    /// Write raw output
    pub fn write(&mut self, content: &str) -> Result<()> {
        write!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        debug!("Output info: {}", message);

        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write a warning message
    pub fn warning(&mut self, message: &str) -> Result<()> {
        if self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.yellow().to_string())
        } else {
            self.writeln(&format!("WARNING: {}", message))
        }
    }

    /// Write a section header
    pub fn section(&mut self, title: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        self.writeln("")?;
        if self.use_color {
            self.writeln(&format!("═══ {} ═══", title).bright_blue().to_string())
        } else {
            self.writeln(&format!("=== {} ===", title))
        }
    }

    /// Write data in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let formatted = self.format.format(value)?;
        trace!(bytes = formatted.len(), "Outputting data");
        self.writeln(&formatted)
    }

    /// Write a batch report in the configured format
    ///
    /// In quiet human mode only invalid documents and the summary are shown.
    pub fn report(&mut self, report: &BatchReport) -> Result<()> {
        let formatted = if self.quiet && self.format == OutputFormat::Human {
            format_failures_human(report, self.use_color)
        } else {
            self.format.format_report(report, self.use_color)?
        };
        if formatted.ends_with('\n') {
            self.write(&formatted)
        } else {
            self.writeln(&formatted)
        }
    }

    /// Create a progress bar for long operations
    pub fn progress_bar(&self, length: u64, message: &str) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let pb = ProgressBar::new(length);
        pb.set_style(default_progress_style());
        pb.set_message(message.to_string());
        Some(pb)
    }

    /// Check if verbose output should be shown
    pub fn is_verbose(&self) -> bool {
        self.verbose > 0
    }

    /// Write a table (for human format)
    pub fn table(&mut self, headers: &[&str], rows: Vec<Vec<String>>) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        let mut widths = headers.iter().map(|h| h.chars().count()).collect::<Vec<_>>();
        for row in &rows {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(cell.chars().count());
                }
            }
        }

        let header_row = headers
            .iter()
            .enumerate()
            .map(|(i, h)| format!("{:width$}", h, width = widths[i]))
            .collect::<Vec<_>>()
            .join(" │ ");

        if self.use_color {
            self.writeln(&header_row.bold().to_string())?;
        } else {
            self.writeln(&header_row)?;
        }

        let separator = widths.iter().map(|w| "─".repeat(*w)).collect::<Vec<_>>().join("─┼─");
        self.writeln(&separator)?;

        for row in rows {
            let row_str = row
                .iter()
                .enumerate()
                .map(|(i, cell)| match widths.get(i) {
                    Some(width) => format!("{:width$}", cell, width = *width),
                    None => cell.clone(),
                })
                .collect::<Vec<_>>()
                .join(" │ ");
            self.writeln(row_str.trim_end())?;
        }

        Ok(())
    }
}

/// Progress bar style for batch runs
pub fn default_progress_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-")
}

/// Render a report as CSV, one row per diagnostic
///
/// Documents without diagnostics produce no rows.
pub fn format_report_csv(report: &BatchReport) -> String {
    let mut output = String::from(CSV_HEADER);
    output.push('\n');

    for entry in report.entries() {
        match &entry.outcome {
            Ok(result) => {
                for diagnostic in result.diagnostics() {
                    output.push_str(&csv_row(&entry.source_id, diagnostic));
                }
            }
            Err(fatal) => {
                let message = fatal.to_string();
                let row = [
                    entry.source_id.as_str(),
                    "ERROR",
                    fatal.code().as_str(),
                    "",
                    "",
                    "",
                    message.as_str(),
                ]
                .map(csv_field)
                .join(",");
                output.push_str(&row);
                output.push('\n');
            }
        }
    }

    output
}

fn csv_row(source: &str, diagnostic: &Diagnostic) -> String {
    let line = diagnostic.line().map(|l| l.to_string()).unwrap_or_default();
    let column = diagnostic.column().map(|c| c.to_string()).unwrap_or_default();
    let severity = severity_label(diagnostic.severity());
    let fields = [
        source,
        severity,
        diagnostic.code().as_str(),
        diagnostic.element_path(),
        line.as_str(),
        column.as_str(),
        diagnostic.message(),
    ];
    let mut row = fields.map(csv_field).join(",");
    row.push('\n');
    row
}

/// Quote a CSV field when it contains a delimiter, quote or line break
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "ERROR",
        Severity::Warning => "WARNING",
        Severity::Info => "INFO",
    }
}

/// Format a batch report for human reading
pub fn format_report_human(report: &BatchReport, use_color: bool) -> String {
    let mut output = String::new();
    for entry in report.entries() {
        output.push_str(&format_entry_human(entry, use_color));
    }
    output.push_str(&format_summary_human(report, use_color));
    output
}

/// Only the documents that need attention, then the summary
fn format_failures_human(report: &BatchReport, use_color: bool) -> String {
    let mut output = String::new();
    for entry in report.entries().iter().filter(|e| !e.is_valid()) {
        output.push_str(&format_entry_human(entry, use_color));
    }
    output.push_str(&format_summary_human(report, use_color));
    output
}

fn format_entry_human(entry: &BatchEntry, use_color: bool) -> String {
    let mut output = String::new();

    let result = match &entry.outcome {
        Ok(result) => result,
        Err(fatal) => {
            let mark = paint("✗", Severity::Error, use_color);
            output.push_str(&format!("{} {} - {}\n", mark, entry.source_id, fatal));
            return output;
        }
    };

    let mark = if result.is_valid() {
        paint("✓", Severity::Info, use_color)
    } else {
        paint("✗", Severity::Error, use_color)
    };

    let mut details = Vec::new();
    if let Some(message_type) = result.message_type() {
        details.push(message_type.to_string());
    }
    if let Some(version) = result.schema_version() {
        details.push(format!("ERN {}", version));
    }
    details.push(format!(
        "{} error(s), {} warning(s), {}ms",
        result.error_count(),
        result.warning_count(),
        result.elapsed().as_millis()
    ));
    output.push_str(&format!("{} {} ({})\n", mark, entry.source_id, details.join(", ")));

    for diagnostic in result.diagnostics() {
        let label = paint(severity_label(diagnostic.severity()), diagnostic.severity(), use_color);
        let location = diagnostic
            .location()
            .map(|l| format!(" [{}]", l))
            .unwrap_or_default();
        output.push_str(&format!(
            "    {} {}: {}\n      at {}{}\n",
            label, diagnostic.code(), diagnostic.message(), diagnostic.element_path(), location
        ));
        if let Some(context) = diagnostic.context() {
            output.push_str(&format!("      context: {}\n", context));
        }
        if let Some(suggestion) = diagnostic.suggestion() {
            output.push_str(&format!("      hint: {}\n", suggestion));
        }
    }

    output
}

fn format_summary_human(report: &BatchReport, use_color: bool) -> String {
    let stats = report.statistics();
    let mut output = String::new();

    let headline = format!(
        "{} of {} document(s) valid ({:.1}%), {} error(s), {} warning(s) in {}ms",
        stats.valid, stats.total_documents, stats.success_rate, stats.total_errors, stats.total_warnings, stats.elapsed_ms
    );
    let headline = if !use_color {
        headline
    } else if report.all_valid() {
        headline.green().bold().to_string()
    } else {
        headline.red().bold().to_string()
    };
    output.push('\n');
    output.push_str(&headline);
    output.push('\n');

    if let Some(fatal) = report.halted_by() {
        output.push_str(&format!(
            "Stopped after {} of {} document(s): {}\n",
            report.len(),
            report.total_sources(),
            fatal
        ));
    }

    let top = stats.top_codes(5);
    if !top.is_empty() {
        let codes = top
            .iter()
            .map(|(code, count)| format!("{} ×{}", code, count))
            .collect::<Vec<_>>()
            .join(", ");
        output.push_str(&format!("Most frequent: {}\n", codes));
    }

    output
}

fn paint(text: &str, severity: Severity, use_color: bool) -> String {
    if !use_color {
        return text.to_string();
    }
    match severity {
        Severity::Error => text.red().bold().to_string(),
        Severity::Warning => text.yellow().to_string(),
        Severity::Info => text.green().to_string(),
    }
}
