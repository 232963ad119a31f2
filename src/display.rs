//! Text rendering of result sets and table lists for the REPL.

use crate::record::Record;

/// Renders records as a boxed table with one column per entry of `columns`.
///
/// Cells a record has no value for are left blank. An empty result renders
/// as `No records found.`
///
/// # Example
/// ```
/// # use flatdb::{display::render_rows, Record, Value};
/// let record: Record = [("ID", Value::Int(1)), ("name", Value::from("Alice"))]
///     .into_iter()
///     .collect();
/// let text = render_rows(&["ID".into(), "name".into()], &[&record]);
/// assert_eq!(
///     text,
///     "+----+-------+\n\
///      | ID | name  |\n\
///      +----+-------+\n\
///      | 1  | Alice |\n\
///      +----+-------+"
/// );
/// ```
pub fn render_rows(columns: &[String], rows: &[&Record]) -> String {
    if rows.is_empty() {
        return "No records found.".to_string();
    }

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|column| record.get(column).map(ToString::to_string).unwrap_or_default())
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            cells
                .iter()
                .map(|row| width(&row[i]))
                .chain(std::iter::once(width(column)))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let border = border(&widths);
    let mut out = String::new();

    out.push_str(&border);
    out.push('\n');
    push_line(&mut out, columns, &widths);
    out.push_str(&border);
    out.push('\n');
    for row in &cells {
        push_line(&mut out, row, &widths);
    }
    out.push_str(&border);

    out
}

/// Renders table names as a `- <name>` list, or `No tables.`
pub fn render_tables<S: AsRef<str>>(names: &[S]) -> String {
    if names.is_empty() {
        return "No tables.".to_string();
    }

    names
        .iter()
        .map(|name| format!("- {}", name.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn width(text: &str) -> usize {
    text.chars().count()
}

fn border(widths: &[usize]) -> String {
    let mut line = String::from("+");
    for w in widths {
        line.push_str(&"-".repeat(w + 2));
        line.push('+');
    }
    line
}

fn push_line<S: AsRef<str>>(out: &mut String, cells: &[S], widths: &[usize]) {
    out.push('|');
    for (cell, w) in cells.iter().zip(widths) {
        out.push_str(&format!(" {:<w$} |", cell.as_ref(), w = *w));
    }
    out.push('\n');
}
