//! Tabular record model
//!
//! A [`RecordTable`] is the in-memory form of a delimited record file: an
//! ordered header row plus string cells. Every row has exactly one cell per
//! header column.

use serde::{Deserialize, Serialize};

/// Ordered columns and rows of a delimited record file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RecordTable {
    /// Creates a table, padding or truncating rows to the header width
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { headers, rows }
    }

    /// Column names in order
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Rows in order
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Mutable rows, used for in-place sorting
    pub(crate) fn rows_mut(&mut self) -> &mut Vec<Vec<String>> {
        &mut self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the table holds no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell value by row index and column name
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| r[idx].as_str())
    }

    /// All values of a column, in row order
    pub fn column_values(&self, column: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(column)?;
        Some(self.rows.iter().map(|r| r[idx].as_str()).collect())
    }

    /// Sets `column` to `value` on every row.
    ///
    /// Appends the column when absent; overwrites its values otherwise.
    pub fn set_column(&mut self, column: &str, value: &str) {
        match self.column_index(column) {
            Some(idx) => {
                for row in &mut self.rows {
                    row[idx] = value.to_string();
                }
            }
            None => {
                self.headers.push(column.to_string());
                for row in &mut self.rows {
                    row.push(value.to_string());
                }
            }
        }
    }

    /// Appends `other` below this table.
    ///
    /// Columns are matched by name, and a repeated name by occurrence: the
    /// n-th `phone` in `other` lands in the n-th `phone` column here. Columns
    /// only present in `other` are added at the end in their order of
    /// appearance; cells missing on either side are left empty.
    pub fn append(&mut self, other: RecordTable) {
        let RecordTable {
            headers: other_headers,
            rows: other_rows,
        } = other;

        let mut mapping = Vec::with_capacity(other_headers.len());
        for (pos, header) in other_headers.iter().enumerate() {
            let occurrence = other_headers[..pos].iter().filter(|h| *h == header).count();
            let existing = self
                .headers
                .iter()
                .enumerate()
                .filter(|(_, h)| *h == header)
                .map(|(idx, _)| idx)
                .nth(occurrence);
            let idx = match existing {
                Some(idx) => idx,
                None => {
                    self.headers.push(header.clone());
                    for row in &mut self.rows {
                        row.push(String::new());
                    }
                    self.headers.len() - 1
                }
            };
            mapping.push(idx);
        }

        let width = self.headers.len();
        self.rows.reserve(other_rows.len());
        for row in other_rows {
            let mut aligned = vec![String::new(); width];
            for (src, cell) in row.into_iter().enumerate() {
                aligned[mapping[src]] = cell;
            }
            self.rows.push(aligned);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RecordTable {
        RecordTable::new(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_new_pads_short_rows() {
        let t = table(&["a", "b", "c"], &[&["1"]]);
        assert_eq!(t.rows()[0], vec!["1", "", ""]);
    }

    #[test]
    fn test_set_column_appends() {
        let mut t = table(&["candidate_id", "name"], &[&["5", "Al"], &["2", "Bo"]]);
        t.set_column("batch_id", "BatchOne");

        assert_eq!(t.headers(), ["candidate_id", "name", "batch_id"]);
        assert_eq!(t.column_values("batch_id").unwrap(), vec!["BatchOne", "BatchOne"]);
    }

    #[test]
    fn test_set_column_overwrites_existing() {
        let mut t = table(&["candidate_id", "batch_id"], &[&["5", "Old"]]);
        t.set_column("batch_id", "New");

        assert_eq!(t.headers().len(), 2);
        assert_eq!(t.value(0, "batch_id"), Some("New"));
    }

    #[test]
    fn test_append_same_schema() {
        let mut a = table(&["candidate_id", "batch_id"], &[&["1", "A"]]);
        let b = table(&["candidate_id", "batch_id"], &[&["2", "B"], &["3", "B"]]);
        a.append(b);

        assert_eq!(a.len(), 3);
        assert_eq!(a.column_values("candidate_id").unwrap(), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_append_unions_columns() {
        let mut a = table(&["candidate_id", "name", "batch_id"], &[&["1", "Al", "A"]]);
        let b = table(&["email", "candidate_id", "batch_id"], &[&["x@y", "2", "B"]]);
        a.append(b);

        assert_eq!(a.headers(), ["candidate_id", "name", "batch_id", "email"]);
        assert_eq!(a.rows()[0], vec!["1", "Al", "A", ""]);
        assert_eq!(a.rows()[1], vec!["2", "", "B", "x@y"]);
    }

    #[test]
    fn test_append_matches_repeated_columns_by_occurrence() {
        let mut a = table(&["candidate_id", "phone", "phone"], &[&["1", "111", "112"]]);
        let b = table(&["candidate_id", "phone", "phone"], &[&["2", "221", "222"]]);
        a.append(b);

        assert_eq!(a.headers(), ["candidate_id", "phone", "phone"]);
        assert_eq!(a.rows()[1], vec!["2", "221", "222"]);
    }

    #[test]
    fn test_append_adds_extra_repeated_column() {
        let mut a = table(&["candidate_id", "phone"], &[&["1", "111"]]);
        let b = table(&["candidate_id", "phone", "phone"], &[&["2", "221", "222"]]);
        a.append(b);

        assert_eq!(a.headers(), ["candidate_id", "phone", "phone"]);
        assert_eq!(a.rows()[0], vec!["1", "111", ""]);
        assert_eq!(a.rows()[1], vec!["2", "221", "222"]);
    }

    #[test]
    fn test_append_into_headerless_table() {
        let mut a = RecordTable::default();
        a.append(table(&["candidate_id"], &[&["7"]]));
        assert_eq!(a.headers(), ["candidate_id"]);
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn test_value_unknown_column() {
        let t = table(&["candidate_id"], &[&["1"]]);
        assert!(t.value(0, "missing").is_none());
        assert!(t.column_values("missing").is_none());
    }
}
