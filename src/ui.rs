use crate::app::{App, AppMode, Prompt};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap},
};

const COL_WIDTH: u16 = 14;

const HELP: &[(&str, &str)] = &[
    ("arrows / hjkl", "move cursor"),
    ("Shift+arrows", "extend selection (columns spanned become picks)"),
    ("PgUp / PgDn", "scroll a page"),
    ("e / Enter", "edit cell (Enter saves, Esc cancels)"),
    ("Del", "clear selected cells"),
    ("o / O", "insert row below / column right"),
    ("d / D", "delete row / column"),
    ("R", "rename column"),
    ("Space", "pick column (first = A, second = B)"),
    ("m", "append difference column A - B"),
    ("Ctrl-a / Esc", "select all / clear selection"),
    ("c / x / p", "copy / cut / paste (TSV)"),
    ("u / Ctrl-z", "undo"),
    ("Ctrl-r / Ctrl-y", "redo"),
    ("Ctrl-s / W", "save / save as"),
    ("v", "toggle cell viewer"),
    ("q", "quit"),
];

pub fn draw(f: &mut Frame, app: &mut App) {
    let viewer_height = if app.show_cell_viewer { 5 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Min(3),
                Constraint::Length(viewer_height),
                Constraint::Length(2),
            ]
            .as_ref(),
        )
        .split(f.size());

    draw_grid(f, chunks[0], app);
    if app.show_cell_viewer {
        draw_cell_viewer(f, chunks[1], app);
    }
    draw_status(f, chunks[2], app);
    if app.show_help {
        draw_help(f, f.size());
    }
}

fn title(app: &App) -> String {
    let name = app.path.as_deref().unwrap_or("[untitled]");
    let marker = if app.is_modified() { " [+]" } else { "" };
    format!("{name}{marker}")
}

fn draw_grid(f: &mut Frame, area: Rect, app: &mut App) {
    let block = Block::default().borders(Borders::ALL).title(title(app));
    let (rows, cols) = {
        let grid = app.session.grid();
        (grid.row_count(), grid.col_count())
    };
    if rows == 0 || cols == 0 {
        let p = Paragraph::new("Empty grid: press o to add a row, O to add a column").block(block);
        f.render_widget(p, area);
        return;
    }

    // Row-number gutter wide enough for the last row label
    let gutter = (rows.to_string().len() as u16 + 1).max(4);
    let inner_w = area.width.saturating_sub(2 + gutter + 1);
    app.visible_cols = ((inner_w / (COL_WIDTH + 1)).max(1) as usize).min(cols);
    app.visible_rows = area.height.saturating_sub(3).max(1) as usize; // borders + header
    app.scroll_into_view();

    let order = app.session.selection_order();
    let grid = app.session.grid();
    let range = app.selection_range();
    let first_col = app.scroll_col;
    let last_col = (first_col + app.visible_cols).min(cols);

    let header_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let mut header_cells = vec![Cell::from("")];
    for c in first_col..last_col {
        let mut label = grid.display_header(c).into_owned();
        if let Some(pos) = order.iter().position(|&o| o == c) {
            let tag = match pos {
                0 => "A".to_string(),
                1 => "B".to_string(),
                n => (n + 1).to_string(),
            };
            label = format!("{label} [{tag}]");
        }
        header_cells.push(Cell::from(label));
    }
    let header = Row::new(header_cells).style(header_style);

    let editing = match app.mode {
        AppMode::Editing { row, col, .. } => Some((row, col)),
        _ => None,
    };
    let first_row = app.scroll_row;
    let last_row = (first_row + app.visible_rows).min(rows);
    let mut table_rows = Vec::with_capacity(last_row - first_row);
    for r in first_row..last_row {
        let mut cells = Vec::with_capacity(last_col - first_col + 1);
        cells.push(Cell::from((r + 1).to_string()).style(Style::default().fg(Color::DarkGray)));
        for c in first_col..last_col {
            let text = if editing == Some((r, c)) {
                app.edit_buffer.as_str()
            } else {
                grid.get(r, c)
            };
            let mut cell = Cell::from(text);
            if r == app.sel_row && c == app.sel_col {
                cell = cell.style(Style::default().bg(Color::Blue).fg(Color::Black));
            } else if range.contains(r, c) {
                cell = cell.style(Style::default().bg(Color::DarkGray));
            }
            cells.push(cell);
        }
        table_rows.push(Row::new(cells));
    }

    let mut widths = vec![Constraint::Length(gutter)];
    widths.extend((first_col..last_col).map(|_| Constraint::Length(COL_WIDTH)));
    let table = Table::new(table_rows, widths)
        .header(header)
        .block(block)
        .column_spacing(1);

    f.render_widget(table, area);
}

fn draw_cell_viewer(f: &mut Frame, area: Rect, app: &App) {
    let title = format!("R{}C{}", app.sel_row + 1, app.sel_col + 1);
    let p = Paragraph::new(app.current_cell_text())
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false });
    f.render_widget(p, area);
}

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    let mode = match app.mode {
        AppMode::Normal => "NORMAL",
        AppMode::Editing { .. } => "EDIT",
        AppMode::Prompt(Prompt::SaveAs) => "SAVE AS",
        AppMode::Prompt(Prompt::RenameColumn { .. }) => "RENAME",
    };
    let history = app.session.history();
    let input = match app.mode {
        AppMode::Editing { .. } => Span::raw(format!(" | {}", app.edit_buffer)),
        AppMode::Prompt(_) => Span::raw(format!(" | {}_", app.prompt_buffer)),
        AppMode::Normal => Span::raw(""),
    };
    let text = Line::from(vec![
        Span::styled(
            format!("[{mode}] "),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("undo {} redo {} ", history.undo_len(), history.redo_len()),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw(app.status.as_str()),
        input,
    ]);
    let p = Paragraph::new(text).block(Block::default().borders(Borders::TOP));
    f.render_widget(p, area);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let width = 64.min(area.width);
    let height = (HELP.len() as u16 + 2).min(area.height);
    let popup = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };
    let lines: Vec<Line> = HELP
        .iter()
        .map(|(keys, what)| {
            Line::from(vec![
                Span::styled(
                    format!("{keys:<16}"),
                    Style::default().fg(Color::Yellow),
                ),
                Span::raw(*what),
            ])
        })
        .collect();
    let p = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Keys (? to close)"),
    );
    f.render_widget(Clear, popup);
    f.render_widget(p, popup);
}
