use std::fmt;

use crate::grid::Grid;

/// Rectangular-ish block of cell text, row-major. Rows may be ragged.
pub type Block = Vec<Vec<String>>;

/// One reversible grid mutation.
///
/// Every variant carries the value snapshots it needs to replay in either
/// direction, so replay never reads the grid to recompute anything. Indices
/// stay valid because commands only ever leave a history stack in LIFO order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CellEdit {
        row: usize,
        col: usize,
        old: String,
        new: String,
    },
    /// `row` is the index the inserted row occupies.
    InsertRow { row: usize },
    /// `col` is the index the inserted column occupies.
    InsertColumn { col: usize },
    DeleteRow { row: usize, snapshot: Vec<String> },
    DeleteColumn {
        col: usize,
        snapshot: Vec<String>,
        header: String,
    },
    PasteBlock {
        start_row: usize,
        start_col: usize,
        old_block: Block,
        new_block: Block,
    },
}

impl Command {
    /// Capture an edit of `(row, col)` to `new`, recording the current text.
    pub fn cell_edit(grid: &Grid, row: usize, col: usize, new: impl Into<String>) -> Self {
        Command::CellEdit {
            row,
            col,
            old: grid.get(row, col).to_string(),
            new: new.into(),
        }
    }

    /// Snapshot a row before it is removed.
    pub fn delete_row(grid: &Grid, row: usize) -> Self {
        Command::DeleteRow {
            row,
            snapshot: grid.row(row).to_vec(),
        }
    }

    /// Snapshot a column and its header before it is removed.
    pub fn delete_column(grid: &Grid, col: usize) -> Self {
        Command::DeleteColumn {
            col,
            snapshot: grid.column(col),
            header: grid.header(col).to_string(),
        }
    }

    /// Capture the cells `new_block` will overwrite. Cells outside the current
    /// grid read as empty text.
    pub fn paste_block(grid: &Grid, start_row: usize, start_col: usize, new_block: Block) -> Self {
        let old_block = new_block
            .iter()
            .enumerate()
            .map(|(r, row)| {
                (0..row.len())
                    .map(|c| grid.get(start_row + r, start_col + c).to_string())
                    .collect()
            })
            .collect();
        Command::PasteBlock {
            start_row,
            start_col,
            old_block,
            new_block,
        }
    }

    /// Forward replay.
    pub fn apply(&self, grid: &mut Grid) {
        match self {
            Command::CellEdit { row, col, new, .. } => grid.set(*row, *col, new.as_str()),
            Command::InsertRow { row } => grid.insert_row_at(*row),
            Command::InsertColumn { col } => grid.insert_column_at(*col),
            Command::DeleteRow { row, .. } => {
                grid.remove_row_at(*row);
            }
            Command::DeleteColumn { col, .. } => {
                grid.remove_column_at(*col);
            }
            Command::PasteBlock {
                start_row,
                start_col,
                new_block,
                ..
            } => write_block(grid, *start_row, *start_col, new_block, true),
        }
    }

    /// Backward replay: restores every cell the forward replay touched.
    ///
    /// Undoing a paste that grew the grid leaves the grid at its grown size;
    /// only the overwritten cells get their old text back.
    pub fn revert(&self, grid: &mut Grid) {
        match self {
            Command::CellEdit { row, col, old, .. } => grid.set(*row, *col, old.as_str()),
            Command::InsertRow { row } => {
                grid.remove_row_at(*row);
            }
            Command::InsertColumn { col } => {
                grid.remove_column_at(*col);
            }
            Command::DeleteRow { row, snapshot } => {
                grid.insert_row_at(*row);
                let cols = grid.col_count();
                for (col, text) in snapshot.iter().enumerate().take(cols) {
                    grid.set(*row, col, text.as_str());
                }
            }
            Command::DeleteColumn {
                col,
                snapshot,
                header,
            } => {
                grid.insert_column_at(*col);
                grid.set_header(*col, header.as_str());
                let rows = grid.row_count();
                for (row, text) in snapshot.iter().enumerate().take(rows) {
                    grid.set(row, *col, text.as_str());
                }
            }
            Command::PasteBlock {
                start_row,
                start_col,
                old_block,
                ..
            } => write_block(grid, *start_row, *start_col, old_block, false),
        }
    }

    /// Short lowercase name of the variant, for logs and status lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Command::CellEdit { .. } => "cell edit",
            Command::InsertRow { .. } => "insert row",
            Command::InsertColumn { .. } => "insert column",
            Command::DeleteRow { .. } => "delete row",
            Command::DeleteColumn { .. } => "delete column",
            Command::PasteBlock { .. } => "paste",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 1-based coordinates, as the user sees them
        match self {
            Command::CellEdit { row, col, .. } => write!(f, "cell edit R{}C{}", row + 1, col + 1),
            Command::InsertRow { row } | Command::DeleteRow { row, .. } => {
                write!(f, "{} {}", self.kind(), row + 1)
            }
            Command::InsertColumn { col } | Command::DeleteColumn { col, .. } => {
                write!(f, "{} {}", self.kind(), col + 1)
            }
            Command::PasteBlock {
                start_row,
                start_col,
                new_block,
                ..
            } => {
                let width = new_block.iter().map(Vec::len).max().unwrap_or(0);
                write!(
                    f,
                    "paste {}x{} at R{}C{}",
                    new_block.len(),
                    width,
                    start_row + 1,
                    start_col + 1
                )
            }
        }
    }
}

fn write_block(grid: &mut Grid, start_row: usize, start_col: usize, block: &Block, grow: bool) {
    for (r, cells) in block.iter().enumerate() {
        for (c, text) in cells.iter().enumerate() {
            let (row, col) = (start_row + r, start_col + c);
            if grow || (row < grid.row_count() && col < grid.col_count()) {
                grid.set(row, col, text.as_str());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> Grid {
        Grid::from_records(
            vec!["x".into(), "y".into()],
            vec![
                vec!["a".into(), "a2".into()],
                vec!["b".into(), "b2".into()],
                vec!["c".into(), "c2".into()],
            ],
        )
    }

    fn block(rows: &[&[&str]]) -> Block {
        rows.iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn cell_edit_replays_exact_text() {
        let mut g = Grid::new(3, 4);
        let cmd = Command::cell_edit(&g, 2, 3, "5");
        cmd.apply(&mut g);
        assert_eq!(g.get(2, 3), "5");
        cmd.revert(&mut g);
        assert_eq!(g.get(2, 3), "");
        cmd.apply(&mut g);
        assert_eq!(g.get(2, 3), "5");
    }

    #[test]
    fn delete_row_restores_snapshot() {
        let mut g = abc();
        let before = g.clone();
        let cmd = Command::delete_row(&g, 1);
        cmd.apply(&mut g);
        assert_eq!(g.column(0), ["a", "c"]);
        cmd.revert(&mut g);
        assert_eq!(g, before);
    }

    #[test]
    fn delete_column_restores_header_and_cells() {
        let mut g = abc();
        let before = g.clone();
        let cmd = Command::delete_column(&g, 0);
        cmd.apply(&mut g);
        assert_eq!(g.headers(), ["y"]);
        cmd.revert(&mut g);
        assert_eq!(g, before);
    }

    #[test]
    fn insert_revert_removes_same_index() {
        let mut g = abc();
        let before = g.clone();
        for cmd in [Command::InsertRow { row: 3 }, Command::InsertColumn { col: 1 }] {
            cmd.apply(&mut g);
            assert_ne!(g, before);
            cmd.revert(&mut g);
            assert_eq!(g, before);
        }
    }

    #[test]
    fn paste_grows_but_revert_keeps_size() {
        let mut g = Grid::new(2, 2);
        g.set(0, 0, "keep");
        let cmd = Command::paste_block(&g, 1, 1, block(&[&["p", "q"], &["r"]]));
        cmd.apply(&mut g);
        assert_eq!((g.row_count(), g.col_count()), (3, 3));
        assert_eq!(g.get(1, 2), "q");
        assert_eq!(g.get(2, 1), "r");

        cmd.revert(&mut g);
        assert_eq!((g.row_count(), g.col_count()), (3, 3));
        assert_eq!(g.get(1, 1), "");
        assert_eq!(g.get(1, 2), "");
        assert_eq!(g.get(0, 0), "keep");
    }

    #[test]
    fn paste_old_block_mirrors_ragged_shape() {
        let g = abc();
        let cmd = Command::paste_block(&g, 0, 1, block(&[&["1", "2"], &["3"]]));
        let Command::PasteBlock { old_block, .. } = cmd else {
            panic!("expected paste block");
        };
        assert_eq!(old_block, block(&[&["a2", ""], &["b2"]]));
    }

    #[test]
    fn display_uses_one_based_coordinates() {
        let g = Grid::new(1, 1);
        assert_eq!(Command::cell_edit(&g, 0, 0, "v").to_string(), "cell edit R1C1");
        assert_eq!(Command::InsertColumn { col: 2 }.to_string(), "insert column 3");
        let paste = Command::paste_block(&g, 0, 0, block(&[&["a", "b", "c"], &["d"]]));
        assert_eq!(paste.to_string(), "paste 2x3 at R1C1");
    }
}
