use std::collections::VecDeque;

use crate::command::Command;
use crate::grid::Grid;

pub const DEFAULT_MAX_HISTORY: usize = 50;

/// Linear undo/redo history over two bounded LIFO stacks.
///
/// The back of each deque is the top of the stack; the front holds the oldest
/// entry and is what gets evicted once a stack grows past `max_history`.
/// Eviction is permanent and deliberately silent.
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: VecDeque<Command>,
    redo_stack: VecDeque<Command>,
    max_history: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

impl History {
    /// `max_history` is clamped to at least 1.
    pub fn new(max_history: usize) -> Self {
        let max_history = max_history.max(1);
        Self {
            undo_stack: VecDeque::with_capacity(max_history),
            redo_stack: VecDeque::new(),
            max_history,
        }
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    /// Record a command whose forward effect the caller has already applied.
    /// Any redoable commands become unreachable.
    pub fn push(&mut self, cmd: Command) {
        tracing::debug!(command = %cmd, "push");
        push_bounded(&mut self.undo_stack, cmd, self.max_history, "undo");
        if !self.redo_stack.is_empty() {
            tracing::debug!(dropped = self.redo_stack.len(), "redo stack cleared");
            self.redo_stack.clear();
        }
    }

    /// Pop the newest undoable command, replay it backward on `grid`, and
    /// move it to the redo stack. `None` when there is nothing to undo.
    pub fn undo(&mut self, grid: &mut Grid) -> Option<&Command> {
        let cmd = self.undo_stack.pop_back()?;
        tracing::debug!(command = %cmd, "undo");
        cmd.revert(grid);
        push_bounded(&mut self.redo_stack, cmd, self.max_history, "redo");
        self.redo_stack.back()
    }

    /// Pop the newest redoable command, replay it forward on `grid`, and move
    /// it back to the undo stack. `None` when there is nothing to redo.
    pub fn redo(&mut self, grid: &mut Grid) -> Option<&Command> {
        let cmd = self.redo_stack.pop_back()?;
        tracing::debug!(command = %cmd, "redo");
        cmd.apply(grid);
        push_bounded(&mut self.undo_stack, cmd, self.max_history, "undo");
        self.undo_stack.back()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Command the next `undo` would revert.
    pub fn peek_undo(&self) -> Option<&Command> {
        self.undo_stack.back()
    }

    /// Command the next `redo` would reapply.
    pub fn peek_redo(&self) -> Option<&Command> {
        self.redo_stack.back()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

fn push_bounded(stack: &mut VecDeque<Command>, cmd: Command, cap: usize, which: &str) {
    stack.push_back(cmd);
    while stack.len() > cap {
        if let Some(evicted) = stack.pop_front() {
            tracing::debug!(stack = which, command = %evicted, "history full, evicted oldest");
        }
    }
}
