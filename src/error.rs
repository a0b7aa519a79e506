use thiserror::Error;

/// Rejections raised by `GridSession` before anything is mutated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("row {row} is out of range ({rows} rows)")]
    RowOutOfRange { row: usize, rows: usize },

    #[error("column {col} is out of range ({cols} columns)")]
    ColumnOutOfRange { col: usize, cols: usize },

    #[error("nothing to paste")]
    EmptyPaste,

    #[error("column name cannot be empty")]
    EmptyHeader,

    #[error("select two columns first ({selected} selected)")]
    NeedTwoColumns { selected: usize },
}
