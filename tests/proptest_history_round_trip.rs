//! Property-based tests for undo/redo replay.
//!
//! 1. **Round trip**: after any sequence of edits that fits in history,
//!    undoing everything and redoing everything reproduces the final grid.
//!
//! 2. **Full rewind**: without pastes (the only command whose undo may leave
//!    the grid larger), undoing everything reproduces the starting grid.
//!
//! 3. **Bounded stacks**: neither stack ever holds more than `max_history`
//!    entries, however many edits are made.

use csv_editor::{EditError, Grid, GridSession, SessionConfig};
use proptest::prelude::*;

// ── Abstract operations ─────────────────────────────────────────────────
//
// Indices are raw and get reduced modulo the grid size at the time the
// operation runs, so every generated sequence stays meaningful as the grid
// changes shape.

#[derive(Debug, Clone)]
enum Op {
    Edit { row: u8, col: u8, text: String },
    InsertRow(u8),
    InsertColumn(u8),
    DeleteRow(u8),
    DeleteColumn(u8),
    Paste { row: u8, col: u8, text: String },
}

fn cell_text() -> impl Strategy<Value = String> {
    "[a-z0-9.]{0,4}"
}

fn tsv_block() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::collection::vec(cell_text(), 1..4), 1..4).prop_map(|rows| {
        rows.iter()
            .map(|r| r.join("\t"))
            .collect::<Vec<_>>()
            .join("\n")
    })
}

fn op(with_paste: bool) -> BoxedStrategy<Op> {
    let base = prop_oneof![
        (any::<u8>(), any::<u8>(), cell_text())
            .prop_map(|(row, col, text)| Op::Edit { row, col, text }),
        any::<u8>().prop_map(Op::InsertRow),
        any::<u8>().prop_map(Op::InsertColumn),
        any::<u8>().prop_map(Op::DeleteRow),
        any::<u8>().prop_map(Op::DeleteColumn),
    ];
    if with_paste {
        prop_oneof![
            4 => base,
            1 => (any::<u8>(), any::<u8>(), tsv_block())
                .prop_map(|(row, col, text)| Op::Paste { row, col, text }),
        ]
        .boxed()
    } else {
        base.boxed()
    }
}

fn start_grid() -> impl Strategy<Value = Grid> {
    (1usize..5, 1usize..5).prop_map(|(rows, cols)| {
        let mut grid = Grid::new(rows, cols);
        for r in 0..rows {
            for c in 0..cols {
                grid.set(r, c, format!("{r}:{c}"));
            }
        }
        grid
    })
}

fn pick(raw: u8, len: usize) -> Option<usize> {
    (len > 0).then(|| raw as usize % len)
}

/// Run `op` against the session. Operations that do not fit the current
/// shape are skipped.
fn run(session: &mut GridSession, op: &Op) {
    let rows = session.grid().row_count();
    let cols = session.grid().col_count();
    match op {
        Op::Edit { row, col, text } => {
            if let (Some(r), Some(c)) = (pick(*row, rows), pick(*col, cols)) {
                session.edit_cell(r, c, text.as_str());
            }
        }
        Op::InsertRow(raw) => {
            let index = *raw as usize % (rows + 1);
            session.insert_row_at(index).unwrap();
        }
        Op::InsertColumn(raw) => {
            let index = *raw as usize % (cols + 1);
            session.insert_column_at(index).unwrap();
        }
        Op::DeleteRow(raw) => {
            if let Some(r) = pick(*raw, rows) {
                session.delete_row(r).unwrap();
            }
        }
        Op::DeleteColumn(raw) => {
            if let Some(c) = pick(*raw, cols) {
                session.delete_column(c).unwrap();
            }
        }
        Op::Paste { row, col, text } => {
            let r = *row as usize % (rows + 1);
            let c = *col as usize % (cols + 1);
            // an all-blank single cell parses to nothing and is refused
            match session.paste(r, c, text) {
                Ok(_) | Err(EditError::EmptyPaste) => {}
                Err(e) => panic!("unexpected paste error: {e}"),
            }
        }
    }
}

fn undo_all(session: &mut GridSession) -> usize {
    let mut n = 0;
    while session.undo().is_some() {
        n += 1;
    }
    n
}

#[test]
fn blank_single_cell_paste_is_skipped() {
    let mut session = GridSession::new(Grid::new(1, 1));
    run(
        &mut session,
        &Op::Paste {
            row: 0,
            col: 0,
            text: String::new(),
        },
    );
    assert!(!session.can_undo());
    assert_eq!(session.grid(), &Grid::new(1, 1));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn undo_all_redo_all_reproduces_final_grid(
        grid in start_grid(),
        ops in prop::collection::vec(op(true), 0..40),
    ) {
        let config = SessionConfig { max_history: 50 };
        let mut session = GridSession::with_config(grid, config);
        for op in &ops {
            run(&mut session, op);
        }
        let end = session.grid().clone();
        let recorded = session.history().undo_len();

        prop_assert_eq!(undo_all(&mut session), recorded);
        let mut redone = 0;
        while session.redo().is_some() {
            redone += 1;
        }
        prop_assert_eq!(redone, recorded);
        prop_assert_eq!(session.grid(), &end);
    }

    #[test]
    fn undo_all_without_paste_restores_start(
        grid in start_grid(),
        ops in prop::collection::vec(op(false), 0..40),
    ) {
        let start = grid.clone();
        let mut session = GridSession::with_config(grid, SessionConfig { max_history: 50 });
        for op in &ops {
            run(&mut session, op);
        }
        undo_all(&mut session);
        prop_assert_eq!(session.grid(), &start);
        prop_assert!(!session.can_undo());
    }

    #[test]
    fn stacks_never_exceed_capacity(
        max_history in 1usize..6,
        ops in prop::collection::vec(op(true), 0..30),
    ) {
        let config = SessionConfig { max_history };
        let mut session = GridSession::with_config(Grid::new(2, 2), config);
        for op in &ops {
            run(&mut session, op);
            prop_assert!(session.history().undo_len() <= max_history);
        }
        undo_all(&mut session);
        prop_assert!(session.history().redo_len() <= max_history);
    }
}
