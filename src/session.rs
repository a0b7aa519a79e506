use crate::command::Command;
use crate::config::SessionConfig;
use crate::error::EditError;
use crate::grid::Grid;
use crate::history::History;
use crate::selection::SelectionOrder;
use crate::tsv::{self, CellRange};

/// One open document: its grid, its undo/redo history, and the order in which
/// the user picked columns.
///
/// This is the only surface UI and I/O layers mutate the grid through. Every
/// structural index is validated here so the store and the commands can treat
/// index validity as a precondition.
#[derive(Debug, Clone)]
pub struct GridSession {
    grid: Grid,
    history: History,
    selection: SelectionOrder,
    revision: u64,
}

impl Default for GridSession {
    fn default() -> Self {
        Self::new(Grid::default())
    }
}

impl GridSession {
    pub fn new(grid: Grid) -> Self {
        Self::with_config(grid, SessionConfig::default())
    }

    pub fn with_config(grid: Grid, config: SessionConfig) -> Self {
        Self {
            grid,
            history: History::new(config.max_history),
            selection: SelectionOrder::new(),
            revision: 0,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Bumped by every mutation, undo, and redo. Compare against a stored
    /// value to tell whether the document changed since then.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Swap in a freshly loaded document. History and selection order belong
    /// to the old document and are dropped.
    pub fn reload(&mut self, grid: Grid) {
        tracing::info!(
            rows = grid.row_count(),
            cols = grid.col_count(),
            "document reloaded"
        );
        self.grid = grid;
        self.history.clear();
        self.selection.clear();
        self.revision += 1;
    }

    fn execute(&mut self, cmd: Command) {
        cmd.apply(&mut self.grid);
        self.history.push(cmd);
        self.revision += 1;
    }

    fn check_row(&self, row: usize) -> Result<(), EditError> {
        let rows = self.grid.row_count();
        if row < rows {
            Ok(())
        } else {
            Err(EditError::RowOutOfRange { row, rows })
        }
    }

    fn check_col(&self, col: usize) -> Result<(), EditError> {
        let cols = self.grid.col_count();
        if col < cols {
            Ok(())
        } else {
            Err(EditError::ColumnOutOfRange { col, cols })
        }
    }

    // ===== Cell edits =====

    /// Write `text` into `(row, col)`, growing the grid if needed.
    /// Returns `false`, recording nothing, when the text is unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `row` or `col` is `usize::MAX`.
    pub fn edit_cell(&mut self, row: usize, col: usize, text: impl Into<String>) -> bool {
        let text = text.into();
        if self.grid.get(row, col) == text {
            return false;
        }
        self.execute(Command::cell_edit(&self.grid, row, col, text));
        true
    }

    /// Clear every non-empty cell inside `range`, one history entry per cell.
    /// Returns how many cells were cleared.
    pub fn clear_range(&mut self, range: CellRange) -> usize {
        let Some(range) = range.clamp_to(self.grid.row_count(), self.grid.col_count()) else {
            return 0;
        };
        let mut cleared = 0;
        for (row, col) in range.cells() {
            if !self.grid.get(row, col).is_empty() {
                self.execute(Command::cell_edit(&self.grid, row, col, ""));
                cleared += 1;
            }
        }
        cleared
    }

    /// `range` as TSV. Cells outside the grid copy as empty text.
    pub fn copy_range(&self, range: CellRange) -> String {
        tsv::format_range(&self.grid, range)
    }

    /// Copy then clear.
    pub fn cut_range(&mut self, range: CellRange) -> String {
        let text = self.copy_range(range);
        self.clear_range(range);
        text
    }

    // ===== Structural edits =====

    /// Insert an empty row at `index`; `index == row_count()` appends.
    pub fn insert_row_at(&mut self, index: usize) -> Result<(), EditError> {
        let rows = self.grid.row_count();
        if index > rows {
            return Err(EditError::RowOutOfRange { row: index, rows });
        }
        self.execute(Command::InsertRow { row: index });
        Ok(())
    }

    /// Insert an empty row immediately below `row`.
    pub fn insert_row_below(&mut self, row: usize) -> Result<(), EditError> {
        self.check_row(row)?;
        self.insert_row_at(row + 1)
    }

    /// Insert an empty column at `index`; `index == col_count()` appends.
    pub fn insert_column_at(&mut self, index: usize) -> Result<(), EditError> {
        let cols = self.grid.col_count();
        if index > cols {
            return Err(EditError::ColumnOutOfRange { col: index, cols });
        }
        self.execute(Command::InsertColumn { col: index });
        Ok(())
    }

    /// Insert an empty column immediately right of `col`.
    pub fn insert_column_right(&mut self, col: usize) -> Result<(), EditError> {
        self.check_col(col)?;
        self.insert_column_at(col + 1)
    }

    pub fn delete_row(&mut self, row: usize) -> Result<(), EditError> {
        self.check_row(row)?;
        self.execute(Command::delete_row(&self.grid, row));
        Ok(())
    }

    pub fn delete_column(&mut self, col: usize) -> Result<(), EditError> {
        self.check_col(col)?;
        self.execute(Command::delete_column(&self.grid, col));
        Ok(())
    }

    /// Rename a column header. Not recorded in history; a later column
    /// delete still snapshots the new name. Returns `false` when unchanged.
    pub fn rename_column(&mut self, col: usize, name: &str) -> Result<bool, EditError> {
        self.check_col(col)?;
        if name.trim().is_empty() {
            return Err(EditError::EmptyHeader);
        }
        if self.grid.header(col) == name {
            return Ok(false);
        }
        self.grid.set_header(col, name);
        self.revision += 1;
        Ok(true)
    }

    // ===== Paste =====

    /// Paste a TSV block with its top-left cell at `(start_row, start_col)`.
    /// The grid grows to fit; undo restores the overwritten cells but keeps
    /// the grown size. Returns the pasted `(rows, widest row)`.
    pub fn paste(
        &mut self,
        start_row: usize,
        start_col: usize,
        text: &str,
    ) -> Result<(usize, usize), EditError> {
        let block = tsv::parse_block(text);
        if block.is_empty() {
            return Err(EditError::EmptyPaste);
        }
        let extent = (
            block.len(),
            block.iter().map(Vec::len).max().unwrap_or(0),
        );
        self.execute(Command::paste_block(&self.grid, start_row, start_col, block));
        Ok(extent)
    }

    // ===== History =====

    /// Revert the newest command. `None` when there is nothing to undo.
    pub fn undo(&mut self) -> Option<&Command> {
        let cmd = self.history.undo(&mut self.grid)?;
        self.revision += 1;
        Some(cmd)
    }

    /// Reapply the newest undone command. `None` when there is nothing to redo.
    pub fn redo(&mut self) -> Option<&Command> {
        let cmd = self.history.redo(&mut self.grid)?;
        self.revision += 1;
        Some(cmd)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ===== Column selection order =====

    pub fn record_column_selection(&mut self, col: usize) {
        self.selection.record(col);
    }

    pub fn record_column_click(&mut self, col: usize, already_selected: bool) {
        self.selection.record_click(col, already_selected);
    }

    pub fn record_drag_selection(&mut self, start: usize, end: usize) {
        self.selection.record_span(start, end);
    }

    pub fn select_all_columns(&mut self) {
        self.selection.record_all(self.grid.col_count());
    }

    pub fn clear_column_selection(&mut self) {
        self.selection.clear();
    }

    /// Picked columns in pick order, minus any that no longer exist.
    pub fn selection_order(&self) -> Vec<usize> {
        self.selection.current_order(self.grid.col_count())
    }

    /// First two picked columns as operands `(A, B)`.
    pub fn operands(&self) -> Option<(usize, usize)> {
        self.selection.operands(self.grid.col_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(rows: &[&[&str]]) -> GridSession {
        let rows = rows
            .iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect();
        GridSession::new(Grid::from_records(Vec::new(), rows))
    }

    #[test]
    fn unchanged_edit_records_nothing() {
        let mut s = session(&[&["a"]]);
        assert!(!s.edit_cell(0, 0, "a"));
        assert!(!s.can_undo());
        assert_eq!(s.revision(), 0);
        assert!(s.edit_cell(0, 0, "b"));
        assert!(s.can_undo());
        assert_eq!(s.revision(), 1);
    }

    #[test]
    fn structural_indices_are_validated() {
        let mut s = session(&[&["a", "b"]]);
        assert_eq!(
            s.delete_row(1),
            Err(EditError::RowOutOfRange { row: 1, rows: 1 })
        );
        assert_eq!(
            s.insert_column_right(2),
            Err(EditError::ColumnOutOfRange { col: 2, cols: 2 })
        );
        assert!(s.insert_row_at(2).is_err());
        assert!(!s.can_undo());

        s.insert_row_at(0).unwrap();
        assert_eq!(s.grid().row(0), ["", ""]);
        s.insert_column_at(2).unwrap();
        assert_eq!(s.grid().col_count(), 3);
    }

    #[test]
    fn insert_below_and_right_land_after_the_anchor() {
        let mut s = session(&[&["a", "b"], &["c", "d"]]);
        s.insert_row_below(0).unwrap();
        assert_eq!(s.grid().column(0), ["a", "", "c"]);
        s.insert_column_right(0).unwrap();
        assert_eq!(s.grid().row(0), ["a", "", "b"]);
    }

    #[test]
    fn clear_range_records_one_entry_per_non_empty_cell() {
        let mut s = session(&[&["a", ""], &["c", "d"]]);
        let cleared = s.clear_range(CellRange::new((0, 0), (5, 5)));
        assert_eq!(cleared, 3);
        assert_eq!(s.history().undo_len(), 3);
        s.undo();
        assert_eq!(s.grid().get(1, 1), "d");
        assert_eq!(s.grid().get(1, 0), "");
    }

    #[test]
    fn cut_copies_then_clears() {
        let mut s = session(&[&["a", "b"], &["c", "d"]]);
        let text = s.cut_range(CellRange::new((0, 1), (1, 1)));
        assert_eq!(text, "b\nd");
        assert_eq!(s.grid().column(1), ["", ""]);
        assert_eq!(s.copy_range(CellRange::single(1, 0)), "c");
    }

    #[test]
    fn rename_is_validated_and_not_undoable() {
        let mut s = session(&[&["a"]]);
        assert_eq!(s.rename_column(0, "  "), Err(EditError::EmptyHeader));
        assert_eq!(s.rename_column(3, "x"), Err(EditError::ColumnOutOfRange { col: 3, cols: 1 }));
        assert_eq!(s.rename_column(0, "speed"), Ok(true));
        assert_eq!(s.rename_column(0, "speed"), Ok(false));
        assert!(!s.can_undo());

        s.delete_column(0).unwrap();
        s.undo();
        assert_eq!(s.grid().header(0), "speed");
    }

    #[test]
    fn empty_paste_is_rejected() {
        let mut s = session(&[&["a"]]);
        assert_eq!(s.paste(0, 0, ""), Err(EditError::EmptyPaste));
        assert_eq!(s.paste(0, 0, "x\ty\nz\n"), Ok((2, 2)));
        assert_eq!(s.grid().get(1, 0), "z");
        assert_eq!(s.grid().get(1, 1), "");
    }

    #[test]
    fn newline_paste_clears_one_cell_undoably() {
        let mut s = session(&[&["a", "b"]]);
        assert_eq!(s.paste(0, 1, "\n"), Ok((1, 1)));
        assert_eq!(s.grid().row(0), ["a", ""]);
        assert_eq!(s.history().undo_len(), 1);
        s.undo();
        assert_eq!(s.grid().row(0), ["a", "b"]);
    }

    #[test]
    fn reload_drops_history_and_selection() {
        let mut s = session(&[&["a", "b"]]);
        s.edit_cell(0, 0, "x");
        s.record_column_selection(1);
        s.reload(Grid::new(1, 1));
        assert!(!s.can_undo());
        assert!(s.selection_order().is_empty());
        assert_eq!(s.grid().get(0, 0), "");
    }

    #[test]
    fn selection_order_tracks_deleted_columns() {
        let mut s = session(&[&["a", "b", "c"]]);
        s.record_column_selection(2);
        s.record_column_selection(0);
        assert_eq!(s.operands(), Some((2, 0)));
        s.delete_column(1).unwrap();
        assert_eq!(s.selection_order(), [0]);
        s.select_all_columns();
        assert_eq!(s.selection_order(), [0, 1]);
        s.record_drag_selection(1, 0);
        assert_eq!(s.selection_order(), [0, 1]);
        s.clear_column_selection();
        assert_eq!(s.operands(), None);
    }
}
