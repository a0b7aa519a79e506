use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use csv_editor::{Grid, GridSession, SessionConfig};
use ratatui::{backend::CrosstermBackend, prelude::*};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod ui;
mod worker;

use app::{App, AppMode};
use worker::{IoRequest, IoResponse, start_io_worker};

#[derive(Parser, Debug)]
#[command(author, version, about = "CSV TUI Editor")]
struct Args {
    /// Path to the CSV file (created on first save if it does not exist)
    #[arg(value_name = "CSV_PATH")]
    csv_path: Option<String>,

    /// Undo/redo steps kept per stack; older steps are dropped silently
    #[arg(long, default_value_t = csv_editor::DEFAULT_MAX_HISTORY, value_parser = parse_history)]
    max_history: usize,

    /// Rows of the blank grid used for a new file
    #[arg(long, default_value_t = 20)]
    rows: usize,

    /// Columns of the blank grid used for a new file
    #[arg(long, default_value_t = 5)]
    cols: usize,

    /// Write tracing output to this file (RUST_LOG filters, default info)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

fn parse_history(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be at least 1".into()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

fn init_logging(path: &Path) -> Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "csv_editor=info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false),
        )
        .init();
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    // CSV worker channels
    let (req_tx, req_rx) = crossbeam_channel::unbounded::<IoRequest>();
    let (resp_tx, resp_rx) = crossbeam_channel::unbounded::<IoResponse>();
    std::thread::spawn(move || start_io_worker(req_rx, resp_tx));

    let config = SessionConfig {
        max_history: args.max_history,
    };
    let session = GridSession::with_config(Grid::new(args.rows, args.cols), config);
    let mut app = App::new(session, args.csv_path.clone(), req_tx, resp_rx);
    match &args.csv_path {
        Some(path) if Path::new(path).exists() => app.request_load(path.clone()),
        Some(path) => app.status = format!("New file {path} (Ctrl-s to create it)"),
        None => {}
    }
    tracing::info!(path = ?args.csv_path, max_history = args.max_history, "starting");

    let mut terminal = setup_terminal()?;
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(100);

    let res = run_app(&mut terminal, &mut app, tick_rate, &mut last_tick);

    restore_terminal(terminal)?;
    if let Err(e) = res {
        tracing::error!("{e:?}");
        eprintln!("Error: {e:?}");
    }
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    tick_rate: Duration,
    last_tick: &mut Instant,
) -> Result<()> {
    // Redraw only when state changes or on tick
    let mut dirty = true;
    loop {
        // Process any worker responses without blocking
        while let Ok(msg) = app.resp_rx.try_recv() {
            app.handle_io_response(msg);
            dirty = true;
        }

        let tick_due = last_tick.elapsed() >= tick_rate;
        if dirty || tick_due {
            terminal.draw(|f| ui::draw(f, app))?;
            dirty = false;
            if tick_due {
                *last_tick = Instant::now();
            }
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::from_secs(0));

        if crossterm::event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            match app.mode {
                AppMode::Normal => handle_key_normal(app, key),
                AppMode::Editing { .. } => handle_key_editing(app, key),
                AppMode::Prompt(_) => handle_key_prompt(app, key),
            }
            dirty = true;
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key_normal(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);
    if key.code != KeyCode::Char('q') {
        app.disarm_quit();
    }

    if ctrl {
        match key.code {
            KeyCode::Char('z') => app.undo(),
            KeyCode::Char('r') | KeyCode::Char('y') => app.redo(),
            KeyCode::Char('s') => app.save(),
            KeyCode::Char('a') => app.select_all(),
            KeyCode::Char('c') => app.copy_selection(),
            KeyCode::Char('x') => app.cut_selection(),
            KeyCode::Char('v') => app.paste(),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.request_quit(),
        KeyCode::Char('?') => {
            app.toggle_help();
            app.status = if app.show_help {
                "Showing keybinds (press ? to close)".into()
            } else {
                "Closed keybinds".into()
            };
        }
        KeyCode::Up | KeyCode::Char('k') => app.move_cursor(-1, 0, shift),
        KeyCode::Down | KeyCode::Char('j') => app.move_cursor(1, 0, shift),
        KeyCode::Left | KeyCode::Char('h') => app.move_cursor(0, -1, shift),
        KeyCode::Right | KeyCode::Char('l') => app.move_cursor(0, 1, shift),
        KeyCode::PageDown => app.page_down(),
        KeyCode::PageUp => app.page_up(),
        KeyCode::Enter | KeyCode::Char('e') => app.begin_edit_cell(),
        KeyCode::Delete => app.clear_selection_cells(),
        KeyCode::Char('o') => app.insert_row_below(),
        KeyCode::Char('O') => app.insert_column_right(),
        KeyCode::Char('d') => app.delete_row(),
        KeyCode::Char('D') => app.delete_column(),
        KeyCode::Char('R') => app.begin_rename_column(),
        KeyCode::Char(' ') => app.pick_current_column(),
        KeyCode::Char('m') => app.append_difference_column(),
        KeyCode::Char('u') => app.undo(),
        KeyCode::Char('c') => app.copy_selection(),
        KeyCode::Char('x') => app.cut_selection(),
        KeyCode::Char('p') => app.paste(),
        KeyCode::Char('W') => app.begin_save_as(),
        KeyCode::Char('v') => {
            app.toggle_cell_viewer();
            app.status = if app.show_cell_viewer {
                "Cell viewer: ON".into()
            } else {
                "Cell viewer: OFF".into()
            };
        }
        KeyCode::Esc => app.clear_picks(),
        _ => {}
    }
}

fn handle_key_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.submit_cell_edit(),
        KeyCode::Esc => app.cancel_edit_cell(),
        KeyCode::Backspace => app.edit_input_backspace(),
        KeyCode::Delete => app.edit_input_delete(),
        KeyCode::Left => app.edit_input_left(),
        KeyCode::Right => app.edit_input_right(),
        KeyCode::Home => app.edit_input_home(),
        KeyCode::End => app.edit_input_end(),
        // ignore control chars in insert
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.edit_input_insert(c)
        }
        _ => {}
    }
}

fn handle_key_prompt(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.submit_prompt(),
        KeyCode::Esc => app.cancel_prompt(),
        KeyCode::Backspace => app.prompt_backspace(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => app.prompt_push(c),
        _ => {}
    }
}
