use std::cmp::min;

use crossbeam_channel::{Receiver, Sender};
use csv_editor::{CellRange, GridSession, calc};

use crate::worker::{IoRequest, IoResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    SaveAs,
    RenameColumn { col: usize },
}

#[derive(Debug, Clone, Copy)]
pub enum AppMode {
    Normal,
    Editing {
        row: usize,
        col: usize,
        cursor: usize, // byte offset into the edit buffer
    },
    Prompt(Prompt),
}

pub struct App {
    pub should_quit: bool,

    // UI state
    pub mode: AppMode,
    pub status: String,

    // Document
    pub session: GridSession,
    pub path: Option<String>,
    /// Session revision at the last successful load or save
    pub saved_revision: u64,
    quit_armed: bool,

    // Cursor and range anchor (None = single-cell selection)
    pub sel_row: usize,
    pub sel_col: usize,
    pub anchor: Option<(usize, usize)>,

    // Viewport, sized by the UI layer on every draw
    pub scroll_row: usize,
    pub scroll_col: usize,
    pub visible_rows: usize,
    pub visible_cols: usize,

    // Editing / prompt input
    pub edit_buffer: String,
    pub prompt_buffer: String,

    // Last copied text; used when no system clipboard can be read
    pub clipboard: Option<String>,

    pub show_cell_viewer: bool,
    pub show_help: bool,

    // Channels
    pub req_tx: Sender<IoRequest>,
    pub resp_rx: Receiver<IoResponse>,
}

impl App {
    pub fn new(
        session: GridSession,
        path: Option<String>,
        req_tx: Sender<IoRequest>,
        resp_rx: Receiver<IoResponse>,
    ) -> Self {
        let saved_revision = session.revision();
        Self {
            should_quit: false,
            mode: AppMode::Normal,
            status: "Press ? for help. e edit | o/O insert | d/D delete | u/Ctrl-r undo/redo | Ctrl-s save"
                .into(),
            session,
            path,
            saved_revision,
            quit_armed: false,
            sel_row: 0,
            sel_col: 0,
            anchor: None,
            scroll_row: 0,
            scroll_col: 0,
            visible_rows: 1,
            visible_cols: 1,
            edit_buffer: String::new(),
            prompt_buffer: String::new(),
            clipboard: None,
            show_cell_viewer: false,
            show_help: false,
            req_tx,
            resp_rx,
        }
    }

    pub fn is_modified(&self) -> bool {
        self.session.revision() != self.saved_revision
    }

    pub fn request_load(&mut self, path: String) {
        let _ = self.req_tx.send(IoRequest::Load { path: path.clone() });
        self.status = format!("Loading {path}...");
    }

    pub fn handle_io_response(&mut self, resp: IoResponse) {
        match resp {
            IoResponse::Loaded { path, grid } => {
                let (rows, cols) = (grid.row_count(), grid.col_count());
                self.session.reload(grid);
                self.saved_revision = self.session.revision();
                self.path = Some(path.clone());
                self.sel_row = 0;
                self.sel_col = 0;
                self.anchor = None;
                self.scroll_row = 0;
                self.scroll_col = 0;
                self.status = format!("Opened {path} ({rows} rows x {cols} columns)");
            }
            IoResponse::Saved {
                path,
                rows,
                revision,
            } => {
                self.saved_revision = revision;
                self.path = Some(path.clone());
                self.status = format!("Saved {rows} rows to {path}");
            }
            IoResponse::Error(msg) => {
                self.status = format!("Error: {msg}");
            }
        }
    }

    // ===== Cursor and selection =====

    pub fn selection_range(&self) -> CellRange {
        match self.anchor {
            Some(anchor) => CellRange::new(anchor, (self.sel_row, self.sel_col)),
            None => CellRange::single(self.sel_row, self.sel_col),
        }
    }

    /// Move the cursor; with `extend` the range anchor stays put. Extending
    /// across columns records the spanned columns as the pick order, left to
    /// right.
    pub fn move_cursor(&mut self, d_row: isize, d_col: isize, extend: bool) {
        let grid = self.session.grid();
        let (rows, cols) = (grid.row_count(), grid.col_count());
        if rows == 0 || cols == 0 {
            return;
        }
        if !extend {
            self.anchor = None;
        } else if self.anchor.is_none() {
            self.anchor = Some((self.sel_row, self.sel_col));
        }
        self.sel_row = step(self.sel_row, d_row, rows);
        self.sel_col = step(self.sel_col, d_col, cols);

        if let Some((_, anchor_col)) = self.anchor
            && d_col != 0
            && anchor_col != self.sel_col
        {
            self.session.record_drag_selection(anchor_col, self.sel_col);
        }
        self.scroll_into_view();
    }

    pub fn page_down(&mut self) {
        self.move_cursor(self.visible_rows.max(1) as isize, 0, false);
    }

    pub fn page_up(&mut self) {
        self.move_cursor(-(self.visible_rows.max(1) as isize), 0, false);
    }

    /// Keep the cursor inside the grid after structural changes.
    fn clamp_cursor(&mut self) {
        let grid = self.session.grid();
        self.sel_row = min(self.sel_row, grid.row_count().saturating_sub(1));
        self.sel_col = min(self.sel_col, grid.col_count().saturating_sub(1));
        self.anchor = None;
        self.scroll_into_view();
    }

    pub fn scroll_into_view(&mut self) {
        let rows = self.visible_rows.max(1);
        if self.sel_row < self.scroll_row {
            self.scroll_row = self.sel_row;
        } else if self.sel_row >= self.scroll_row + rows {
            self.scroll_row = self.sel_row + 1 - rows;
        }
        let cols = self.visible_cols.max(1);
        if self.sel_col < self.scroll_col {
            self.scroll_col = self.sel_col;
        } else if self.sel_col >= self.scroll_col + cols {
            self.scroll_col = self.sel_col + 1 - cols;
        }
    }

    /// Space: add the current column to the pick order (or move it last).
    pub fn pick_current_column(&mut self) {
        if self.session.grid().col_count() == 0 {
            return;
        }
        self.session.record_column_selection(self.sel_col);
        self.status = self.operands_status();
    }

    pub fn select_all(&mut self) {
        let grid = self.session.grid();
        if grid.row_count() == 0 || grid.col_count() == 0 {
            return;
        }
        self.anchor = Some((0, 0));
        self.sel_row = grid.row_count() - 1;
        self.sel_col = grid.col_count() - 1;
        self.session.select_all_columns();
        self.scroll_into_view();
        self.status = "Selected all".into();
    }

    pub fn clear_picks(&mut self) {
        self.anchor = None;
        self.session.clear_column_selection();
        self.status = "Selection cleared".into();
    }

    pub fn operands_status(&self) -> String {
        let order = self.session.selection_order();
        let grid = self.session.grid();
        if order.is_empty() {
            return "No columns picked".into();
        }
        let names: Vec<String> = order
            .iter()
            .map(|&c| grid.display_header(c).into_owned())
            .collect();
        match self.session.operands() {
            Some((a, b)) => format!(
                "Picked {} (A = {}, B = {})",
                names.join(", "),
                grid.display_header(a),
                grid.display_header(b)
            ),
            None => format!("Picked {}", names.join(", ")),
        }
    }

    // ===== Structural edits =====

    pub fn insert_row_below(&mut self) {
        let result = if self.session.grid().row_count() == 0 {
            self.session.insert_row_at(0)
        } else {
            self.session.insert_row_below(self.sel_row)
        };
        match result {
            Ok(()) => {
                if self.session.grid().row_count() > 1 {
                    self.sel_row += 1;
                }
                self.clamp_cursor();
                self.status = "Inserted row".into();
            }
            Err(e) => self.status = format!("Insert row failed: {e}"),
        }
    }

    pub fn insert_column_right(&mut self) {
        let result = if self.session.grid().col_count() == 0 {
            self.session.insert_column_at(0)
        } else {
            self.session.insert_column_right(self.sel_col)
        };
        match result {
            Ok(()) => {
                if self.session.grid().col_count() > 1 {
                    self.sel_col += 1;
                }
                self.clamp_cursor();
                self.status = "Inserted column".into();
            }
            Err(e) => self.status = format!("Insert column failed: {e}"),
        }
    }

    pub fn delete_row(&mut self) {
        let row = self.sel_row;
        match self.session.delete_row(row) {
            Ok(()) => {
                self.clamp_cursor();
                self.status = format!("Deleted row {}", row + 1);
            }
            Err(e) => self.status = format!("Delete row failed: {e}"),
        }
    }

    pub fn delete_column(&mut self) {
        let name = self
            .session
            .grid()
            .display_header(self.sel_col)
            .into_owned();
        match self.session.delete_column(self.sel_col) {
            Ok(()) => {
                self.clamp_cursor();
                self.status = format!("Deleted column {name}");
            }
            Err(e) => self.status = format!("Delete column failed: {e}"),
        }
    }

    pub fn append_difference_column(&mut self) {
        match calc::append_difference_column(&mut self.session) {
            Ok(col) => {
                self.sel_col = col;
                self.clamp_cursor();
                self.status = format!(
                    "Added column {}",
                    self.session.grid().display_header(col)
                );
            }
            Err(e) => self.status = format!("Difference failed: {e}"),
        }
    }

    // ===== History =====

    pub fn undo(&mut self) {
        self.status = match self.session.undo() {
            Some(cmd) => format!("Undo: {cmd}"),
            None => "Nothing to undo".into(),
        };
        self.clamp_cursor();
    }

    pub fn redo(&mut self) {
        self.status = match self.session.redo() {
            Some(cmd) => format!("Redo: {cmd}"),
            None => "Nothing to redo".into(),
        };
        self.clamp_cursor();
    }

    // ===== Cell editing =====

    pub fn begin_edit_cell(&mut self) {
        let grid = self.session.grid();
        if grid.row_count() == 0 || grid.col_count() == 0 {
            self.status = "Nothing to edit (empty grid)".into();
            return;
        }
        let (row, col) = (self.sel_row, self.sel_col);
        self.edit_buffer = grid.get(row, col).to_string();
        self.anchor = None;
        self.mode = AppMode::Editing {
            row,
            col,
            cursor: self.edit_buffer.len(),
        };
        self.status = "Editing: Enter to save, Esc to cancel".into();
    }

    pub fn cancel_edit_cell(&mut self) {
        self.mode = AppMode::Normal;
        self.status = "Edit cancelled".into();
    }

    pub fn submit_cell_edit(&mut self) {
        let AppMode::Editing { row, col, .. } = self.mode else {
            return;
        };
        self.mode = AppMode::Normal;
        let text = std::mem::take(&mut self.edit_buffer);
        self.status = if self.session.edit_cell(row, col, text) {
            format!("Updated R{}C{}", row + 1, col + 1)
        } else {
            "Unchanged".into()
        };
    }

    pub fn edit_input_insert(&mut self, ch: char) {
        if let AppMode::Editing { ref mut cursor, .. } = self.mode {
            self.edit_buffer.insert(*cursor, ch);
            *cursor += ch.len_utf8();
        }
    }
    pub fn edit_input_backspace(&mut self) {
        if let AppMode::Editing { ref mut cursor, .. } = self.mode
            && *cursor > 0
        {
            let new_cursor = prev_char_boundary(&self.edit_buffer, *cursor);
            self.edit_buffer.drain(new_cursor..*cursor);
            *cursor = new_cursor;
        }
    }
    pub fn edit_input_delete(&mut self) {
        if let AppMode::Editing { cursor, .. } = self.mode
            && cursor < self.edit_buffer.len()
        {
            let next = next_char_boundary(&self.edit_buffer, cursor);
            self.edit_buffer.drain(cursor..next);
        }
    }
    pub fn edit_input_left(&mut self) {
        if let AppMode::Editing { ref mut cursor, .. } = self.mode {
            *cursor = prev_char_boundary(&self.edit_buffer, *cursor);
        }
    }
    pub fn edit_input_right(&mut self) {
        if let AppMode::Editing { ref mut cursor, .. } = self.mode {
            *cursor = next_char_boundary(&self.edit_buffer, *cursor);
        }
    }
    pub fn edit_input_home(&mut self) {
        if let AppMode::Editing { ref mut cursor, .. } = self.mode {
            *cursor = 0;
        }
    }
    pub fn edit_input_end(&mut self) {
        if let AppMode::Editing { ref mut cursor, .. } = self.mode {
            *cursor = self.edit_buffer.len();
        }
    }

    // ===== Prompts (save as, rename column) =====

    pub fn begin_save_as(&mut self) {
        self.prompt_buffer = self.path.clone().unwrap_or_default();
        self.mode = AppMode::Prompt(Prompt::SaveAs);
        self.status = "Save as: type a path and Enter (Esc to cancel)".into();
    }

    pub fn begin_rename_column(&mut self) {
        let grid = self.session.grid();
        if grid.col_count() == 0 {
            return;
        }
        let col = self.sel_col;
        self.prompt_buffer = grid.header(col).to_string();
        self.mode = AppMode::Prompt(Prompt::RenameColumn { col });
        self.status = "Rename column: Enter to apply (Esc to cancel)".into();
    }

    pub fn prompt_push(&mut self, c: char) {
        self.prompt_buffer.push(c);
    }

    pub fn prompt_backspace(&mut self) {
        self.prompt_buffer.pop();
    }

    pub fn cancel_prompt(&mut self) {
        self.mode = AppMode::Normal;
        self.prompt_buffer.clear();
        self.status = "Cancelled".into();
    }

    pub fn submit_prompt(&mut self) {
        let AppMode::Prompt(prompt) = self.mode else {
            return;
        };
        self.mode = AppMode::Normal;
        let input = std::mem::take(&mut self.prompt_buffer);
        match prompt {
            Prompt::SaveAs => {
                if input.trim().is_empty() {
                    self.status = "Save cancelled".into();
                } else {
                    self.save_to(input);
                }
            }
            Prompt::RenameColumn { col } => {
                self.status = match self.session.rename_column(col, &input) {
                    Ok(true) => format!("Renamed column {} to {input}", col + 1),
                    Ok(false) => "Column name unchanged".into(),
                    Err(e) => format!("Rename failed: {e}"),
                };
            }
        }
    }

    // ===== Save / quit =====

    pub fn save(&mut self) {
        match self.path.clone() {
            Some(path) => self.save_to(path),
            None => self.begin_save_as(),
        }
    }

    fn save_to(&mut self, path: String) {
        let _ = self.req_tx.send(IoRequest::Save {
            path: path.clone(),
            grid: self.session.grid().clone(),
            revision: self.session.revision(),
        });
        self.status = format!("Saving {path}...");
    }

    /// First `q` with unsaved changes only warns; a second `q` quits.
    pub fn request_quit(&mut self) {
        if self.is_modified() && !self.quit_armed {
            self.quit_armed = true;
            self.status = "Unsaved changes: press q again to quit, Ctrl-s to save".into();
            return;
        }
        self.should_quit = true;
    }

    pub fn disarm_quit(&mut self) {
        self.quit_armed = false;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn toggle_cell_viewer(&mut self) {
        self.show_cell_viewer = !self.show_cell_viewer;
    }

    pub fn current_cell_text(&self) -> &str {
        self.session.grid().get(self.sel_row, self.sel_col)
    }

    // ===== Clipboard (TSV) =====

    pub fn copy_selection(&mut self) {
        let range = self.selection_range();
        let text = self.session.copy_range(range);
        self.copy_to_clipboard_or_file(text, "selection");
    }

    pub fn cut_selection(&mut self) {
        let range = self.selection_range();
        let text = self.session.cut_range(range);
        self.copy_to_clipboard_or_file(text, "selection");
        self.status.push_str(" (cut)");
    }

    pub fn clear_selection_cells(&mut self) {
        let cleared = self.session.clear_range(self.selection_range());
        self.status = format!("Cleared {cleared} cells");
    }

    /// Paste at the top-left of the current selection.
    pub fn paste(&mut self) {
        let Some(text) = read_clipboard().or_else(|| self.clipboard.clone()) else {
            self.status = "Clipboard is empty".into();
            return;
        };
        let range = self.selection_range();
        match self.session.paste(range.top, range.left, &text) {
            Ok((rows, cols)) => {
                self.status = format!("Pasted {rows}x{cols} block");
            }
            Err(e) => self.status = format!("Paste failed: {e}"),
        }
    }

    /// Best-effort clipboard copy; falls back to writing a temp .tsv file on failure.
    fn copy_to_clipboard_or_file(&mut self, content: String, label: &str) {
        self.clipboard = Some(content.clone());
        let candidates: &[(&str, &[&str])] = &[
            // macOS
            ("pbcopy", &[]),
            // Wayland
            ("wl-copy", &[]),
            // X11
            ("xclip", &["-selection", "clipboard"]),
            ("xsel", &["--clipboard", "--input"]),
            // Windows
            ("clip", &[]),
        ];
        for (prog, args) in candidates {
            if try_clipboard_prog(prog, args, &content) {
                self.status = format!("Copied {label} to clipboard via {prog}");
                return;
            }
        }
        let mut file_path = std::env::temp_dir();
        let ts = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        file_path.push(format!("csv-editor-{ts}.tsv"));
        match std::fs::write(&file_path, content.as_bytes()) {
            Ok(_) => {
                self.status = format!(
                    "Wrote {label} TSV to {} (no clipboard tool found)",
                    file_path.display()
                );
            }
            Err(e) => {
                self.status = format!("Failed to write {label} TSV: {e}");
            }
        }
    }
}

fn try_clipboard_prog(prog: &str, args: &[&str], content: &str) -> bool {
    match std::process::Command::new(prog)
        .args(args)
        .stdin(std::process::Stdio::piped())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
    {
        Ok(mut child) => {
            if let Some(mut stdin) = child.stdin.take() {
                use std::io::Write;
                let _ = stdin.write_all(content.as_bytes());
            }
            child.wait().map(|s| s.success()).unwrap_or(false)
        }
        Err(_) => false,
    }
}

/// First clipboard reader that succeeds with non-empty text.
fn read_clipboard() -> Option<String> {
    let candidates: &[(&str, &[&str])] = &[
        ("pbpaste", &[]),
        ("wl-paste", &["--no-newline"]),
        ("xclip", &["-selection", "clipboard", "-o"]),
        ("xsel", &["--clipboard", "--output"]),
        ("powershell", &["-NoProfile", "-Command", "Get-Clipboard"]),
    ];
    candidates.iter().find_map(|(prog, args)| {
        let out = std::process::Command::new(prog)
            .args(*args)
            .stdin(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .output()
            .ok()?;
        if !out.status.success() || out.stdout.is_empty() {
            return None;
        }
        Some(String::from_utf8_lossy(&out.stdout).into_owned())
    })
}

fn step(pos: usize, delta: isize, len: usize) -> usize {
    pos.saturating_add_signed(delta).min(len.saturating_sub(1))
}

fn prev_char_boundary(s: &str, idx: usize) -> usize {
    s[..idx].char_indices().next_back().map_or(0, |(i, _)| i)
}

fn next_char_boundary(s: &str, idx: usize) -> usize {
    s[idx..].chars().next().map_or(idx, |c| idx + c.len_utf8())
}
