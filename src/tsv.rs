use crate::command::Block;
use crate::grid::Grid;

/// Split clipboard text into rows of cells: newline-delimited rows,
/// tab-delimited cells. One trailing empty line is dropped and a trailing
/// `\r` is stripped from each line. Ragged rows stay ragged.
pub fn parse_block(text: &str) -> Block {
    let mut lines: Vec<&str> = text.split('\n').collect();
    if lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
        .into_iter()
        .map(|line| {
            line.strip_suffix('\r')
                .unwrap_or(line)
                .split('\t')
                .map(str::to_string)
                .collect()
        })
        .collect()
}

/// Inclusive rectangle of cells, normalized so `top <= bottom` and
/// `left <= right`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub top: usize,
    pub left: usize,
    pub bottom: usize,
    pub right: usize,
}

impl CellRange {
    pub fn new(a: (usize, usize), b: (usize, usize)) -> Self {
        Self {
            top: a.0.min(b.0),
            left: a.1.min(b.1),
            bottom: a.0.max(b.0),
            right: a.1.max(b.1),
        }
    }

    pub fn single(row: usize, col: usize) -> Self {
        Self::new((row, col), (row, col))
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        (self.top..=self.bottom).contains(&row) && (self.left..=self.right).contains(&col)
    }

    /// Same rectangle with both corners pulled inside a `rows` x `cols` grid.
    /// `None` when the grid has no cells.
    pub fn clamp_to(&self, rows: usize, cols: usize) -> Option<Self> {
        if rows == 0 || cols == 0 || self.top >= rows || self.left >= cols {
            return None;
        }
        Some(Self {
            top: self.top,
            left: self.left,
            bottom: self.bottom.min(rows - 1),
            right: self.right.min(cols - 1),
        })
    }

    /// Cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (self.top..=self.bottom).flat_map(move |r| (self.left..=self.right).map(move |c| (r, c)))
    }
}

/// Render a range as TSV: cells joined by `\t`, rows by `\n`, no trailing
/// newline.
pub fn format_range(grid: &Grid, range: CellRange) -> String {
    (range.top..=range.bottom)
        .map(|r| {
            (range.left..=range.right)
                .map(|c| grid.get(r, c))
                .collect::<Vec<_>>()
                .join("\t")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
