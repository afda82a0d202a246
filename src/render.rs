//! Plain-text and JSON output of a grouped report.

use clap::ValueEnum;
use repotrail_protocol::{RepositoryRecord, Row, UNKNOWN_OWNER, yes_no};

/// Column headers, in display order.
pub(crate) const HEADERS: [&str; 6] = [
    "Name",
    "Visibility",
    "Owner",
    "Is Fork",
    "Original Owner",
    "Contribution Type",
];

const SEPARATOR_CELL: &str = "_";

const COLUMN_GAP: &str = "  ";

/// Printed instead of a table when nothing was found.
pub(crate) const EMPTY_REPORT: &str = "No repositories found.";

/// Output format for the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Display as an aligned table (default)
    #[default]
    Table,
    /// Display as JSON, without group separators
    Json,
}

fn cells(record: &RepositoryRecord) -> [String; 6] {
    [
        record.identity().to_string(),
        record.visibility().label().to_string(),
        record.owner_login().to_string(),
        yes_no(record.is_fork()).to_string(),
        record.original_owner().unwrap_or(UNKNOWN_OWNER).to_string(),
        record.contribution_summary(),
    ]
}

/// Turns rows into table cells; separators become a line of `_`.
pub(crate) fn table_lines(rows: &[Row]) -> Vec<[String; 6]> {
    rows.iter()
        .map(|row| match row.record() {
            Some(record) => cells(record),
            None => std::array::from_fn(|_| SEPARATOR_CELL.to_string()),
        })
        .collect()
}

/// Width in characters of each column, headers included.
pub(crate) fn column_widths(lines: &[[String; 6]]) -> [usize; 6] {
    let mut widths = HEADERS.map(|header| header.chars().count());
    for line in lines {
        for (width, cell) in widths.iter_mut().zip(line) {
            *width = (*width).max(cell.chars().count());
        }
    }
    widths
}

/// Renders rows as a left-aligned table, one line per row.
pub(crate) fn render_table(rows: &[Row]) -> String {
    if rows.iter().all(Row::is_separator) {
        return EMPTY_REPORT.to_string();
    }

    let lines = table_lines(rows);
    let widths = column_widths(&lines);

    let format_line = |line: &[&str]| {
        let padded: Vec<String> = line
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        padded.join(COLUMN_GAP).trim_end().to_string()
    };

    let mut output = format_line(&HEADERS[..]);
    for line in &lines {
        let line: Vec<&str> = line.iter().map(String::as_str).collect();
        output.push('\n');
        output.push_str(&format_line(&line));
    }
    output
}

/// Renders the records of `rows` as a pretty JSON array.
pub(crate) fn render_json(rows: &[Row]) -> serde_json::Result<String> {
    let records: Vec<&RepositoryRecord> = rows.iter().filter_map(Row::record).collect();
    serde_json::to_string_pretty(&records)
}
