//! Editable-grid mutation engine for the CSV editor: a text grid, reversible
//! commands over it, a bounded linear undo/redo history, and a tracker for
//! the order in which columns were picked.

pub mod calc;
pub mod command;
pub mod config;
pub mod error;
pub mod grid;
pub mod history;
pub mod selection;
pub mod session;
pub mod tsv;

pub use command::{Block, Command};
pub use config::SessionConfig;
pub use error::EditError;
pub use grid::Grid;
pub use history::{DEFAULT_MAX_HISTORY, History};
pub use selection::SelectionOrder;
pub use session::GridSession;
pub use tsv::CellRange;
