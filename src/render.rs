// ABOUTME: Plain-text table rendering for query results
// ABOUTME: Left-justified fixed-width columns with a dashed separator, plus the display buffer

use crate::models::Row;

/// Message shown in place of a table when a query returns nothing
pub const NO_DATA: &str = "No data found.";

/// Width used for any column without a fixed width
pub const DEFAULT_COLUMN_WIDTH: usize = 18;

/// Display width for a column name
pub fn column_width(name: &str) -> usize {
    match name {
        "first_name" | "last_name" => 14,
        "email" => 32,
        "source" | "destination" => 16,
        "col1" => 6,
        "col2" | "col3" => 16,
        "col4" => 10,
        "col5" => 8,
        "col6" => 32,
        _ => DEFAULT_COLUMN_WIDTH,
    }
}

fn pad(value: &str, width: usize) -> String {
    format!("{:<width$}", value, width = width)
}

/// Render `rows` under `columns`.
///
/// Values longer than their column are written in full rather than cut, and
/// a NULL value is rendered as an empty cell.
pub fn render_table(title: Option<&str>, columns: &[&str], rows: &[Row]) -> String {
    let mut out = String::new();

    if let Some(title) = title {
        out.push_str(title);
        out.push_str("\n\n");
    }

    if rows.is_empty() {
        out.push_str(NO_DATA);
        out.push('\n');
        return out;
    }

    let widths: Vec<usize> = columns.iter().map(|c| column_width(c)).collect();

    let header_parts: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(name, &w)| pad(name, w))
        .collect();
    let header_line = header_parts.join(" ");
    let sep_line = "-".repeat(header_line.chars().count());

    out.push_str(&header_line);
    out.push('\n');
    out.push_str(&sep_line);
    out.push('\n');

    for row in rows {
        let row_parts: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(i, &w)| {
                let value = row.get(i).and_then(|v| v.as_deref()).unwrap_or("");
                pad(value, w)
            })
            .collect();
        out.push_str(&row_parts.join(" "));
        out.push('\n');
    }

    out
}

/// The text area whose whole content each render replaces
#[derive(Debug, Clone, Default)]
pub struct DisplayBuffer {
    text: String,
}

impl DisplayBuffer {
    pub fn replace(&mut self, text: String) {
        self.text = text;
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: &[Option<&str>]) -> Row {
        values.iter().map(|v| v.map(str::to_string)).collect()
    }

    #[test]
    fn test_empty_result_shows_only_title_and_message() {
        let text = render_table(Some("IN450a rows (up to 50)"), &["col1"], &[]);
        assert_eq!(text, "IN450a rows (up to 50)\n\nNo data found.\n");

        let text = render_table(None, &["col1"], &[]);
        assert_eq!(text, "No data found.\n");
    }

    #[test]
    fn test_names_table_layout() {
        let rows = vec![
            row(&[Some("Jane"), Some("Doe")]),
            row(&[Some("Al"), Some("Lee")]),
        ];
        let text = render_table(None, &["first_name", "last_name"], &rows);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], format!("{:<14} {:<14}", "first_name", "last_name"));
        assert_eq!(lines[1], "-".repeat(lines[0].len()));
        assert!(lines[1].chars().all(|c| c == '-'));
        assert_eq!(lines[2], format!("{:<14} {:<14}", "Jane", "Doe"));
        assert_eq!(lines[3], format!("{:<14} {:<14}", "Al", "Lee"));
    }

    #[test]
    fn test_title_precedes_table() {
        let rows = vec![row(&[Some("1")])];
        let text = render_table(Some("Title"), &["col1"], &rows);
        assert!(text.starts_with("Title\n\ncol1  \n------\n1     \n"));
    }

    #[test]
    fn test_null_renders_as_empty_cell() {
        let rows = vec![row(&[None, Some("x")])];
        let text = render_table(None, &["col1", "col5"], &rows);
        let last = text.lines().last().unwrap();
        assert_eq!(last, format!("{:<6} {:<8}", "", "x"));
        assert!(!text.contains("None"));
        assert!(!text.contains("null"));
    }

    #[test]
    fn test_long_values_are_not_truncated() {
        let long = "a-value-much-longer-than-six";
        let rows = vec![row(&[Some(long), Some("b")])];
        let text = render_table(None, &["col1", "col2"], &rows);
        assert!(text.contains(&format!("{} {:<16}", long, "b")));
    }

    #[test]
    fn test_widths() {
        assert_eq!(column_width("email"), 32);
        assert_eq!(column_width("col4"), 10);
        assert_eq!(column_width("AppName"), DEFAULT_COLUMN_WIDTH);
    }

    #[test]
    fn test_display_buffer_replaces_content() {
        let mut buffer = DisplayBuffer::default();
        assert!(buffer.is_empty());
        buffer.replace("first".to_string());
        buffer.replace("second".to_string());
        assert_eq!(buffer.text(), "second");
        buffer.clear();
        assert!(buffer.is_empty());
    }
}
