use std::borrow::Cow;

/// Dense 2-D table of text cells plus one header label per column.
///
/// Every row always holds exactly `col_count()` cells, so reads and writes
/// never need to special-case ragged storage. Structural operations take
/// indices the caller has already validated, the same way `Vec::insert` and
/// `Vec::remove` do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    headers: Vec<String>,
    cells: Vec<Vec<String>>,
}

impl Grid {
    /// Blank grid of `rows` x `cols` empty cells with unlabeled columns.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            headers: vec![String::new(); cols],
            cells: vec![vec![String::new(); cols]; rows],
        }
    }

    /// Build a grid from a header row and data rows.
    ///
    /// The column count is the widest of the header and every data row;
    /// shorter records are padded with empty text.
    pub fn from_records(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let cols = rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(headers.len()))
            .max()
            .unwrap_or(0);
        let mut headers = headers;
        headers.resize(cols, String::new());
        let cells = rows
            .into_iter()
            .map(|mut row| {
                row.resize(cols, String::new());
                row
            })
            .collect();
        Self { headers, cells }
    }

    pub fn row_count(&self) -> usize {
        self.cells.len()
    }

    pub fn col_count(&self) -> usize {
        self.headers.len()
    }

    /// Cell text, or `""` when `(row, col)` is out of range.
    pub fn get(&self, row: usize, col: usize) -> &str {
        self.cells
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Write a cell, growing the grid first if `(row, col)` lies outside it.
    ///
    /// # Panics
    ///
    /// Panics if `row` or `col` is `usize::MAX`.
    pub fn set(&mut self, row: usize, col: usize, text: impl Into<String>) {
        let (Some(rows), Some(cols)) = (row.checked_add(1), col.checked_add(1)) else {
            panic!("cell ({row}, {col}) is past the addressable grid");
        };
        self.ensure_size(rows, cols);
        self.cells[row][col] = text.into();
    }

    /// Grow to at least `rows` x `cols`. Never shrinks.
    pub fn ensure_size(&mut self, rows: usize, cols: usize) {
        if cols > self.col_count() {
            self.headers.resize(cols, String::new());
            for row in &mut self.cells {
                row.resize(cols, String::new());
            }
        }
        let cols = self.col_count();
        if rows > self.row_count() {
            self.cells.resize_with(rows, || vec![String::new(); cols]);
        }
    }

    /// Raw header text; empty when the column was never labeled.
    pub fn header(&self, col: usize) -> &str {
        self.headers.get(col).map(String::as_str).unwrap_or("")
    }

    /// Header as shown to the user: the label, or the 1-based column number.
    pub fn display_header(&self, col: usize) -> Cow<'_, str> {
        match self.header(col) {
            "" => Cow::Owned((col + 1).to_string()),
            label => Cow::Borrowed(label),
        }
    }

    pub fn set_header(&mut self, col: usize, text: impl Into<String>) {
        self.ensure_size(self.row_count(), col + 1);
        self.headers[col] = text.into();
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// One row's cells; empty slice when out of range.
    pub fn row(&self, row: usize) -> &[String] {
        self.cells.get(row).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn rows(&self) -> impl Iterator<Item = &[String]> {
        self.cells.iter().map(Vec::as_slice)
    }

    /// Copy of one column's cells, top to bottom.
    pub fn column(&self, col: usize) -> Vec<String> {
        self.cells
            .iter()
            .map(|r| r.get(col).cloned().unwrap_or_default())
            .collect()
    }

    /// Insert an empty row so that it lands at index `row`.
    ///
    /// # Panics
    /// Panics if `row > row_count()`.
    pub fn insert_row_at(&mut self, row: usize) {
        let cols = self.col_count();
        self.cells.insert(row, vec![String::new(); cols]);
    }

    /// Insert an empty, unlabeled column so that it lands at index `col`.
    ///
    /// # Panics
    /// Panics if `col > col_count()`.
    pub fn insert_column_at(&mut self, col: usize) {
        self.headers.insert(col, String::new());
        for row in &mut self.cells {
            row.insert(col, String::new());
        }
    }

    /// Remove a row and hand back its cells.
    ///
    /// # Panics
    /// Panics if `row >= row_count()`.
    pub fn remove_row_at(&mut self, row: usize) -> Vec<String> {
        self.cells.remove(row)
    }

    /// Remove a column and hand back `(header, cells)`.
    ///
    /// # Panics
    /// Panics if `col >= col_count()`.
    pub fn remove_column_at(&mut self, col: usize) -> (String, Vec<String>) {
        let header = self.headers.remove(col);
        let cells = self.cells.iter_mut().map(|row| row.remove(col)).collect();
        (header, cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Grid {
        Grid::from_records(
            vec!["a".into(), "b".into()],
            vec![
                vec!["1".into(), "2".into()],
                vec!["3".into(), "4".into()],
            ],
        )
    }

    #[test]
    fn out_of_range_reads_are_empty() {
        let g = sample();
        assert_eq!(g.get(0, 1), "2");
        assert_eq!(g.get(9, 0), "");
        assert_eq!(g.get(0, 9), "");
        assert_eq!(g.header(7), "");
        assert!(g.row(5).is_empty());
    }

    #[test]
    #[should_panic(expected = "past the addressable grid")]
    fn set_at_max_index_panics_with_message() {
        let mut g = sample();
        g.set(usize::MAX, 0, "x");
    }

    #[test]
    fn set_grows_and_fills_with_empty_text() {
        let mut g = sample();
        g.set(3, 4, "x");
        assert_eq!(g.row_count(), 4);
        assert_eq!(g.col_count(), 5);
        assert_eq!(g.get(3, 4), "x");
        assert_eq!(g.get(2, 0), "");
        assert_eq!(g.get(0, 3), "");
        assert!(g.rows().all(|r| r.len() == 5));
    }

    #[test]
    fn ragged_records_are_padded() {
        let g = Grid::from_records(
            vec!["h".into()],
            vec![vec!["1".into(), "2".into(), "3".into()], vec![]],
        );
        assert_eq!(g.col_count(), 3);
        assert_eq!(g.row(1), ["", "", ""]);
        assert_eq!(g.display_header(2), "3");
        assert_eq!(g.display_header(0), "h");
    }

    #[test]
    fn insert_and_remove_shift_neighbours() {
        let mut g = sample();
        g.insert_row_at(1);
        assert_eq!(g.row(1), ["", ""]);
        assert_eq!(g.get(2, 0), "3");

        g.insert_column_at(0);
        assert_eq!(g.headers(), ["", "a", "b"]);
        assert_eq!(g.get(0, 1), "1");

        let (header, cells) = g.remove_column_at(1);
        assert_eq!(header, "a");
        assert_eq!(cells, ["1", "", "3"]);

        let removed = g.remove_row_at(2);
        assert_eq!(removed, ["", "4"]);
        assert_eq!(g.row_count(), 2);
    }

    #[test]
    fn ensure_size_never_shrinks() {
        let mut g = sample();
        g.ensure_size(1, 1);
        assert_eq!((g.row_count(), g.col_count()), (2, 2));
    }
}
