/*!
 * Reporting functionality for ClipCat
 *
 * Turns the counters of one drop into status text, tables rendered with
 * the tabled library, or JSON.
 */

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::error::Result;
use crate::types::{AggregationResult, AggregationStats, FinalDocument};

/// Per-file line of the report
#[derive(Debug, Clone, Default, Serialize)]
pub struct FileReportInfo {
    /// Display path of the file
    pub path: String,
    /// Absolute path the file was read from
    pub source: PathBuf,
    /// Number of lines in the file
    pub lines: usize,
    /// Number of characters in the file
    pub chars: usize,
}

/// Outcome of one drop
#[derive(Debug, Clone, Serialize)]
pub struct DropReport {
    /// Time spent in the pipeline
    #[serde(skip)]
    pub duration: Duration,
    /// Number of paths that resolved from the input
    pub paths_resolved: usize,
    /// Counters from aggregation
    #[serde(flatten)]
    pub stats: AggregationStats,
    /// Lines in the final document
    pub line_count: usize,
    /// Characters in the final document
    pub char_count: usize,
    /// Included files, in document order
    pub files: Vec<FileReportInfo>,
}

impl DropReport {
    /// Build a report from the pipeline outputs
    pub fn new(
        paths_resolved: usize,
        result: &AggregationResult,
        document: &FinalDocument,
        duration: Duration,
    ) -> Self {
        let files = result
            .chunks
            .iter()
            .map(|chunk| FileReportInfo {
                path: chunk.label(),
                source: chunk.source.clone(),
                lines: chunk.body.lines().count(),
                chars: chunk.body.chars().count(),
            })
            .collect();

        Self {
            duration,
            paths_resolved,
            stats: result.stats,
            line_count: document.line_count,
            char_count: document.char_count,
            files,
        }
    }

    /// Whether the drop produced any text
    pub fn has_content(&self) -> bool {
        self.char_count > 0
    }
}

/// Format of the report output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// A few lines of plain status text
    Status,
    /// Console tables
    ConsoleTable,
    /// Pretty-printed JSON
    Json,
}

/// Report generator for drop results
pub struct Reporter {
    format: ReportFormat,
}

impl Reporter {
    /// Create a new reporter
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Format a number with human-readable units
    fn format_number(&self, num: usize) -> String {
        if num >= 1_000_000 {
            format!("{:.1}M", num as f64 / 1_000_000.0)
        } else if num >= 1_000 {
            format!("{:.1}K", num as f64 / 1_000.0)
        } else {
            num.to_string()
        }
    }

    /// Generate a report string
    pub fn generate_report(&self, report: &DropReport) -> Result<String> {
        Ok(match self.format {
            ReportFormat::Status => self.status_lines(report).join("\n"),
            ReportFormat::ConsoleTable => self.generate_console_report(report),
            ReportFormat::Json => serde_json::to_string_pretty(report)?,
        })
    }

    /// Print the report to stderr
    pub fn print_report(&self, report: &DropReport) -> Result<()> {
        eprintln!("{}", self.generate_report(report)?);
        Ok(())
    }

    /// Short human-readable status
    pub fn status_lines(&self, report: &DropReport) -> Vec<String> {
        let stats = &report.stats;
        let mut lines = Vec::new();

        if report.paths_resolved == 0 {
            lines.push("Could not parse dropped item paths.".to_string());
            return lines;
        }

        if report.has_content() {
            lines.push("Processing complete.".to_string());
            lines.push(format!(
                "{} file(s) processed, {} unreadable/binary.",
                stats.files_processed, stats.files_skipped_unreadable
            ));
            if stats.files_skipped_by_ignore > 0 {
                lines.push(format!(
                    "{} file(s) skipped by .gitignore rules.",
                    stats.files_skipped_by_ignore
                ));
            }
            lines.push(format!(
                "Total lines: {}, Total characters: {} (incl. instructions).",
                report.line_count, report.char_count
            ));
        } else {
            lines.push("No text content processed.".to_string());
            if stats.files_processed == 0
                && (stats.files_skipped_unreadable > 0 || stats.files_skipped_by_ignore > 0)
            {
                lines.push(format!(
                    "Files: 0 read, {} unreadable, {} .gitignored.",
                    stats.files_skipped_unreadable, stats.files_skipped_by_ignore
                ));
            }
        }

        lines
    }

    // Create a summary table using the tabled crate
    fn create_summary_table(&self, report: &DropReport) -> String {
        #[derive(Tabled)]
        struct SummaryRow {
            #[tabled(rename = "Metric")]
            key: &'static str,

            #[tabled(rename = "Value")]
            value: String,
        }

        let stats = &report.stats;
        let rows = vec![
            SummaryRow {
                key: "Process Time",
                value: format!("{:.4?}", report.duration),
            },
            SummaryRow {
                key: "Files Processed",
                value: self.format_number(stats.files_processed),
            },
            SummaryRow {
                key: "Unreadable / Binary",
                value: self.format_number(stats.files_skipped_unreadable),
            },
            SummaryRow {
                key: "Skipped by .gitignore",
                value: self.format_number(stats.files_skipped_by_ignore),
            },
            SummaryRow {
                key: "Total Lines",
                value: self.format_number(report.line_count),
            },
            SummaryRow {
                key: "Total Characters",
                value: self.format_number(report.char_count),
            },
            SummaryRow {
                key: "LLM Tokens",
                value: format!(
                    "{} tokens (estimated)",
                    self.format_number(report.char_count / 4)
                ),
            },
        ];

        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));

        table.to_string()
    }

    // Create a files table using the tabled crate
    fn create_files_table(&self, report: &DropReport) -> String {
        #[derive(Tabled)]
        struct FileRow {
            #[tabled(rename = "File")]
            path: String,

            #[tabled(rename = "Lines")]
            lines: String,

            #[tabled(rename = "Chars")]
            chars: String,
        }

        let rows: Vec<FileRow> = report
            .files
            .iter()
            .map(|info| FileRow {
                path: truncate_left(&info.path, 60),
                lines: self.format_number(info.lines),
                chars: self.format_number(info.chars),
            })
            .collect();

        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));

        table.to_string()
    }

    // Generate a console table report
    fn generate_console_report(&self, report: &DropReport) -> String {
        let summary = self.create_summary_table(report);
        if report.files.is_empty() {
            return format!("SUMMARY\n{}", summary);
        }
        format!(
            "PROCESSED FILES\n{}\n\nSUMMARY\n{}",
            self.create_files_table(report),
            summary
        )
    }
}

/// Keep the tail of long strings, where the file name is
fn truncate_left(text: &str, max_chars: usize) -> String {
    let count = text.chars().count();
    if count <= max_chars {
        return text.to_string();
    }
    let tail: String = text.chars().skip(count - (max_chars - 3)).collect();
    format!("...{}", tail)
}
