//! CSV export of a parsed rubric.

use crate::rubric::table_parser::RubricTable;

pub const CSV_FILE_NAME: &str = "rubric.csv";
pub const CSV_CONTENT_TYPE: &str = "text/csv";
pub const CSV_CONTENT_DISPOSITION: &str = "attachment; filename=\"rubric.csv\"";

const DELIMITER: char = ',';
const QUOTE: char = '"';

/// Serialises the table as CSV: header line first, then one line per row,
/// each line terminated by `\n`.
pub fn to_csv(table: &RubricTable) -> String {
    let mut out = String::new();
    write_record(&mut out, table.headers());
    for row in table.rows() {
        write_record(&mut out, row);
    }
    out
}

fn write_record(out: &mut String, fields: &[String]) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(DELIMITER);
        }
        write_field(out, field);
    }
    out.push('\n');
}

/// Quotes only when needed; embedded quotes are doubled.
fn write_field(out: &mut String, field: &str) {
    let needs_quotes = field
        .chars()
        .any(|c| c == DELIMITER || c == QUOTE || c == '\n' || c == '\r');
    if !needs_quotes {
        out.push_str(field);
        return;
    }
    out.push(QUOTE);
    for c in field.chars() {
        if c == QUOTE {
            out.push(QUOTE);
        }
        out.push(c);
    }
    out.push(QUOTE);
}
