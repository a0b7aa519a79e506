/// Order in which the user picked columns, independent of where they sit.
///
/// Order-sensitive binary operations read the first two entries as operand A
/// and operand B. No index ever appears twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionOrder {
    order: Vec<usize>,
}

impl SelectionOrder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `col`, or move it to the tail if it was already recorded.
    pub fn record(&mut self, col: usize) {
        self.order.retain(|&c| c != col);
        self.order.push(col);
    }

    /// A click on a column that is not part of the current selection starts
    /// a fresh order; a click on an already-selected column re-records it.
    pub fn record_click(&mut self, col: usize, already_selected: bool) {
        if !already_selected {
            self.order.clear();
        }
        self.record(col);
    }

    /// Replace the order with every column spanned by a drag, left to right,
    /// whichever direction the drag went.
    pub fn record_span(&mut self, start: usize, end: usize) {
        let (first, last) = if start <= end { (start, end) } else { (end, start) };
        self.order.clear();
        self.order.extend(first..=last);
    }

    /// Select-all: every column in spatial order.
    pub fn record_all(&mut self, col_count: usize) {
        self.order.clear();
        self.order.extend(0..col_count);
    }

    pub fn clear(&mut self) {
        self.order.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Recorded order with indices no longer inside `[0, col_count)` left out.
    pub fn current_order(&self, col_count: usize) -> Vec<usize> {
        self.order.iter().copied().filter(|&c| c < col_count).collect()
    }

    /// Operands `(A, B)` for an order-sensitive binary operation.
    pub fn operands(&self, col_count: usize) -> Option<(usize, usize)> {
        let mut valid = self.order.iter().copied().filter(|&c| c < col_count);
        Some((valid.next()?, valid.next()?))
    }
}
