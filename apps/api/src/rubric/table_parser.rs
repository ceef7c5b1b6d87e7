//! Table Parser — turns the Markdown pipe table in a completion into a `RubricTable`.
//!
//! The model is asked for a table but often wraps it in prose or code fences.
//! Parsing is best-effort:
//!
//! 1. The first line that contains `|` and is not a `---` separator row is the header.
//! 2. The line right after the header is skipped whatever it contains.
//! 3. Every later line with a `|` becomes a row if it has at least one non-empty
//!    cell, padded or truncated to the header width.
//!
//! Blank cells inside a row are handled per [`BlankCellPolicy`]. Under `Preserve`,
//! row cells that sit under an empty header cell are dropped along with it.

use std::str::FromStr;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// Label of the first column of every rubric.
pub const CRITERIA_HEADER: &str = "Criteria";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("no table header found")]
    NoHeader,

    #[error("table has no data rows")]
    NoRows,
}

/// How blank cells inside a data row are treated.
///
/// `Collapse` drops blank cells before padding, so `| A |  | C |` becomes
/// `[A, C, ""]`: the blank moves to the end and `C` shifts one column left.
/// It exists for output compatibility with older exports. `Preserve` keeps the
/// blank where it was: `[A, "", C]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlankCellPolicy {
    #[default]
    Preserve,
    Collapse,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown blank cell policy '{0}'")]
pub struct UnknownPolicy(String);

impl FromStr for BlankCellPolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "preserve" => Ok(BlankCellPolicy::Preserve),
            "collapse" => Ok(BlankCellPolicy::Collapse),
            other => Err(UnknownPolicy(other.to_string())),
        }
    }
}

/// A parsed rubric. Every row has exactly `headers.len()` cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RubricTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RubricTable {
    /// Builds a table from loose parts, normalising every row to the header width.
    /// Rows whose cells are all empty are dropped.
    pub fn from_parts(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, ParseError> {
        if headers.is_empty() {
            return Err(ParseError::NoHeader);
        }
        let width = headers.len();
        let rows: Vec<Vec<String>> = rows
            .into_iter()
            .filter(|row| row.iter().any(|c| !c.is_empty()))
            .map(|row| fit_to_width(row, width))
            .collect();
        if rows.is_empty() {
            return Err(ParseError::NoRows);
        }
        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Cell of `row` under the column named `header`.
    pub fn get(&self, row: usize, header: &str) -> Option<&str> {
        let col = self.headers.iter().position(|h| h == header)?;
        self.rows.get(row).map(|r| r[col].as_str())
    }

    /// Row `row` as (header, cell) pairs in column order.
    pub fn record(&self, row: usize) -> Option<Vec<(&str, &str)>> {
        self.rows.get(row).map(|r| {
            self.headers
                .iter()
                .map(String::as_str)
                .zip(r.iter().map(String::as_str))
                .collect()
        })
    }

    /// True when the header row is `Criteria` followed by exactly `levels`.
    pub fn matches_levels(&self, levels: &[String]) -> bool {
        self.headers.first().map(String::as_str) == Some(CRITERIA_HEADER)
            && self.headers[1..] == *levels
    }
}

/// Serialises as `{headers, rows, records}` where each record maps header → cell.
impl Serialize for RubricTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let records: Vec<Record<'_>> = (0..self.rows.len())
            .filter_map(|i| self.record(i))
            .map(Record)
            .collect();
        let mut state = serializer.serialize_struct("RubricTable", 3)?;
        state.serialize_field("headers", &self.headers)?;
        state.serialize_field("rows", &self.rows)?;
        state.serialize_field("records", &records)?;
        state.end()
    }
}

struct Record<'a>(Vec<(&'a str, &'a str)>);

impl Serialize for Record<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().copied())
    }
}

/// Parses the first Markdown table found in `text`.
pub fn parse_markdown_table(text: &str, policy: BlankCellPolicy) -> Result<RubricTable, ParseError> {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();

    let header_idx = lines
        .iter()
        .position(|l| l.contains('|') && !is_separator_row(l))
        .ok_or(ParseError::NoHeader)?;

    let header_cells: Vec<&str> = split_cells(lines[header_idx]).collect();
    let blank_columns: Vec<bool> = header_cells.iter().map(|h| h.is_empty()).collect();
    let headers: Vec<String> = header_cells
        .into_iter()
        .filter(|h| !h.is_empty())
        .map(str::to_string)
        .collect();
    if headers.is_empty() {
        return Err(ParseError::NoHeader);
    }

    let rows = lines
        .iter()
        .skip(header_idx + 2)
        .filter(|l| l.contains('|'))
        .map(|l| row_cells(l, policy, &blank_columns))
        .collect();

    RubricTable::from_parts(headers, rows)
}

/// `blank_columns[i]` is true when header cell `i` was empty. Under `Preserve`
/// those positions are dropped from the row so cells stay under their headers.
fn row_cells(line: &str, policy: BlankCellPolicy, blank_columns: &[bool]) -> Vec<String> {
    let cells = split_cells(line);
    match policy {
        BlankCellPolicy::Preserve => cells
            .enumerate()
            .filter(|(i, _)| !blank_columns.get(*i).copied().unwrap_or(false))
            .map(|(_, c)| c.to_string())
            .collect(),
        BlankCellPolicy::Collapse => cells
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect(),
    }
}

/// Splits a pipe-delimited line into trimmed cells, ignoring one outer pipe on each side.
fn split_cells(line: &str) -> impl Iterator<Item = &str> {
    let line = line.trim();
    let line = line.strip_prefix('|').unwrap_or(line);
    let line = line.strip_suffix('|').unwrap_or(line);
    line.split('|').map(str::trim)
}

/// `|---|:---:|` style rows: only dashes, colons and spaces, at least one dash.
fn is_separator_row(line: &str) -> bool {
    line.contains('-')
        && line
            .chars()
            .all(|c| matches!(c, '|' | '-' | ':' | ' ' | '\t'))
}

fn fit_to_width(mut row: Vec<String>, width: usize) -> Vec<String> {
    row.resize(width, String::new());
    row
}

#[cfg(test)]
mod tests {
    use super::*;

    const ECOSYSTEM_TABLE: &str = "\
| Criteria | Exemplary | Proficient | Adequate | Developing | Needs Improvement |
|---|---|---|---|---|---|
| Environmental Literacy (K) | Deep, nuanced understanding | Solid understanding | Basic understanding | Limited understanding | No understanding |";

    fn parse(text: &str) -> Result<RubricTable, ParseError> {
        parse_markdown_table(text, BlankCellPolicy::Preserve)
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_ecosystem_table() {
        let table = parse(ECOSYSTEM_TABLE).unwrap();
        assert_eq!(
            table.headers(),
            ["Criteria", "Exemplary", "Proficient", "Adequate", "Developing", "Needs Improvement"]
        );
        assert_eq!(table.rows().len(), 1);
        assert_eq!(table.get(0, "Criteria"), Some("Environmental Literacy (K)"));
        assert_eq!(table.get(0, "Exemplary"), Some("Deep, nuanced understanding"));
        assert_eq!(table.get(0, "Needs Improvement"), Some("No understanding"));
    }

    #[test]
    fn test_short_row_is_padded() {
        let text = "| Criteria | High | Low |\n|---|---|---|\n| Integrity | Always honest |";
        let table = parse(text).unwrap();
        assert_eq!(table.rows()[0], strings(&["Integrity", "Always honest", ""]));
    }

    #[test]
    fn test_long_row_is_truncated() {
        let text = "| Criteria | High | Low |\n|---|---|---|\n| Integrity | a | b | extra |";
        let table = parse(text).unwrap();
        assert_eq!(table.rows()[0], strings(&["Integrity", "a", "b"]));
    }

    #[test]
    fn test_header_only_is_parse_failure() {
        let text = "| Criteria | High | Low |\n|---|---|---|";
        assert_eq!(parse(text), Err(ParseError::NoRows));
    }

    #[test]
    fn test_prose_only_is_parse_failure() {
        assert_eq!(
            parse("I'm sorry, I cannot help with that."),
            Err(ParseError::NoHeader)
        );
        assert_eq!(parse(""), Err(ParseError::NoHeader));
    }

    #[test]
    fn test_empty_header_cells_are_parse_failure() {
        assert_eq!(parse("| | |\n|---|---|\n| a | b |"), Err(ParseError::NoHeader));
    }

    #[test]
    fn test_parse_is_idempotent() {
        assert_eq!(parse(ECOSYSTEM_TABLE), parse(ECOSYSTEM_TABLE));
    }

    #[test]
    fn test_surrounding_prose_and_fences_are_ignored() {
        let text = format!(
            "Here is your rubric:\n\n```markdown\n{ECOSYSTEM_TABLE}\n```\n\nLet me know if you need changes."
        );
        let table = parse(&text).unwrap();
        assert_eq!(table.headers().len(), 6);
        assert_eq!(table.rows().len(), 1);
    }

    #[test]
    fn test_separator_line_skipped_unconditionally() {
        // the line after the header is dropped even when it looks like data
        let text = "| Criteria | High |\n| Integrity | a |\n| Respect | b |";
        let table = parse(text).unwrap();
        assert_eq!(table.rows().len(), 1);
        assert_eq!(table.get(0, "Criteria"), Some("Respect"));
    }

    #[test]
    fn test_leading_separator_is_not_header() {
        let text = "|---|---|\n| Criteria | High |\n|---|---|\n| Integrity | a |";
        let table = parse(text).unwrap();
        assert_eq!(table.headers(), ["Criteria", "High"]);
    }

    #[test]
    fn test_blank_rows_are_skipped() {
        let text = "| Criteria | High |\n|---|---|\n|  |  |\n| Integrity | a |\n\n| Respect | b |";
        let table = parse(text).unwrap();
        assert_eq!(table.rows().len(), 2);
    }

    #[test]
    fn test_table_without_outer_pipes() {
        let text = "Criteria | High | Low\n---|---|---\nIntegrity | a | b";
        let table = parse(text).unwrap();
        assert_eq!(table.headers(), ["Criteria", "High", "Low"]);
        assert_eq!(table.rows()[0], strings(&["Integrity", "a", "b"]));
    }

    #[test]
    fn test_preserve_keeps_interior_blank_in_place() {
        let text = "| Criteria | High | Mid | Low |\n|---|---|---|---|\n| Integrity | a |  | c |";
        let table = parse_markdown_table(text, BlankCellPolicy::Preserve).unwrap();
        assert_eq!(table.rows()[0], strings(&["Integrity", "a", "", "c"]));
    }

    #[test]
    fn test_preserve_drops_columns_under_blank_header() {
        let text = "| Criteria | | High |\n|---|---|---|\n| Integrity | | Always honest |";
        let table = parse_markdown_table(text, BlankCellPolicy::Preserve).unwrap();
        assert_eq!(table.headers(), ["Criteria", "High"]);
        assert_eq!(table.rows()[0], strings(&["Integrity", "Always honest"]));
        assert_eq!(table.get(0, "High"), Some("Always honest"));
    }

    #[test]
    fn test_preserve_blank_header_keeps_interior_blanks() {
        let text = "| Criteria | | High | Mid | Low |\n|---|---|---|---|---|\n| Integrity | x | a |  | c |";
        let table = parse_markdown_table(text, BlankCellPolicy::Preserve).unwrap();
        assert_eq!(table.headers(), ["Criteria", "High", "Mid", "Low"]);
        assert_eq!(table.rows()[0], strings(&["Integrity", "a", "", "c"]));
    }

    #[test]
    fn test_collapse_shifts_cells_left() {
        let text = "| Criteria | High | Mid | Low |\n|---|---|---|---|\n| Integrity | a |  | c |";
        let table = parse_markdown_table(text, BlankCellPolicy::Collapse).unwrap();
        assert_eq!(table.rows()[0], strings(&["Integrity", "a", "c", ""]));
    }

    #[test]
    fn test_policies_agree_without_blanks() {
        assert_eq!(
            parse_markdown_table(ECOSYSTEM_TABLE, BlankCellPolicy::Preserve),
            parse_markdown_table(ECOSYSTEM_TABLE, BlankCellPolicy::Collapse)
        );
    }

    #[test]
    fn test_blank_cell_policy_from_str() {
        assert_eq!("collapse".parse::<BlankCellPolicy>(), Ok(BlankCellPolicy::Collapse));
        assert_eq!(" Preserve ".parse::<BlankCellPolicy>(), Ok(BlankCellPolicy::Preserve));
        assert!("lossy".parse::<BlankCellPolicy>().is_err());
    }

    #[test]
    fn test_record_pairs_headers_with_cells() {
        let table = parse("| Criteria | High |\n|---|---|\n| Integrity | a |").unwrap();
        assert_eq!(
            table.record(0).unwrap(),
            vec![("Criteria", "Integrity"), ("High", "a")]
        );
        assert!(table.record(1).is_none());
    }

    #[test]
    fn test_serializes_records_by_header() {
        let table = parse("| Criteria | High |\n|---|---|\n| Integrity | a |").unwrap();
        let value = serde_json::to_value(&table).unwrap();
        assert_eq!(value["headers"][1], "High");
        assert_eq!(value["rows"][0][0], "Integrity");
        assert_eq!(value["records"][0]["Criteria"], "Integrity");
        assert_eq!(value["records"][0]["High"], "a");
    }

    #[test]
    fn test_get_unknown_header_is_none() {
        let table = parse(ECOSYSTEM_TABLE).unwrap();
        assert!(table.get(0, "Excellent").is_none());
        assert!(table.get(5, "Criteria").is_none());
    }

    #[test]
    fn test_matches_levels() {
        let table = parse(ECOSYSTEM_TABLE).unwrap();
        let levels = strings(&["Exemplary", "Proficient", "Adequate", "Developing", "Needs Improvement"]);
        assert!(table.matches_levels(&levels));
        assert!(!table.matches_levels(&levels[..4]));
    }

    #[test]
    fn test_from_parts_normalises_rows() {
        let table = RubricTable::from_parts(
            strings(&["Criteria", "High"]),
            vec![strings(&["A"]), strings(&["", ""]), strings(&["B", "x", "y"])],
        )
        .unwrap();
        assert_eq!(table.rows(), [strings(&["A", ""]), strings(&["B", "x"])]);
    }

    #[test]
    fn test_from_parts_rejects_empty() {
        assert_eq!(
            RubricTable::from_parts(vec![], vec![strings(&["A"])]),
            Err(ParseError::NoHeader)
        );
        assert_eq!(
            RubricTable::from_parts(strings(&["Criteria"]), vec![]),
            Err(ParseError::NoRows)
        );
    }
}
