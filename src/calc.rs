//! Order-sensitive column arithmetic built on top of [`GridSession`].

use crate::error::EditError;
use crate::grid::Grid;
use crate::session::GridSession;

/// `a - b` for one row, or empty text when either side is blank or not a
/// number.
pub fn difference(a: &str, b: &str) -> String {
    match (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
        (Ok(x), Ok(y)) => format_number(x - y),
        _ => String::new(),
    }
}

/// Shortest round-trip text for `x`. Whole numbers keep a trailing `.0`.
fn format_number(x: f64) -> String {
    if x.is_nan() {
        "nan".into()
    } else if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e16 {
        format!("{x:.1}")
    } else {
        x.to_string()
    }
}

/// Per-row `A - B` over two columns of `grid`.
pub fn difference_column(grid: &Grid, a: usize, b: usize) -> Vec<String> {
    (0..grid.row_count())
        .map(|row| difference(grid.get(row, a), grid.get(row, b)))
        .collect()
}

/// Append a rightmost column holding `A - B`, where A and B are the first two
/// columns in the session's selection order. Returns the new column's index.
///
/// The column is created through an undoable insert followed by an undoable
/// paste of the values, so two undos remove it again.
pub fn append_difference_column(session: &mut GridSession) -> Result<usize, EditError> {
    let (a, b) = session.operands().ok_or(EditError::NeedTwoColumns {
        selected: session.selection_order().len(),
    })?;
    let grid = session.grid();
    let header = format!("{}-{}", grid.display_header(a), grid.display_header(b));
    let values = difference_column(grid, a, b);

    let col = grid.col_count();
    session.insert_column_at(col)?;
    session.rename_column(col, &header)?;
    if values.iter().any(|v| !v.is_empty()) {
        // trailing newline keeps a final empty value from being dropped
        let mut text = values.join("\n");
        text.push('\n');
        session.paste(0, col, &text)?;
    }
    tracing::debug!(a, b, col, "difference column appended");
    Ok(col)
}
