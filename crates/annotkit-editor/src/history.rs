//! Bounded undo/redo history of document commands.

use crate::commands::DocumentCommand;
use crate::document::Document;
use annotkit_core::{EditorResult, HISTORY_LIMIT};
use std::collections::VecDeque;
use tracing::{debug, warn};

/// Whether an interactive gesture is currently accumulating.
///
/// While `Recording`, the gesture's intermediate state lives in a draft held
/// by the interaction controller; nothing reaches the history until the
/// gesture commits. Undo and redo are refused during that time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HistoryState {
    #[default]
    Idle,
    Recording {
        label: String,
    },
}

/// Undo and redo stacks over [`DocumentCommand`]s.
///
/// The undo stack is a ring buffer: once it holds `max_depth` entries the
/// oldest one is dropped for each new command.
#[derive(Debug, Clone)]
pub struct CommandHistory {
    undo_stack: VecDeque<DocumentCommand>,
    redo_stack: Vec<DocumentCommand>,
    max_depth: usize,
    state: HistoryState,
    revision: u64,
}

impl CommandHistory {
    /// Create a history with the default depth (100)
    pub fn new() -> Self {
        Self::with_depth(HISTORY_LIMIT)
    }

    /// Create with custom maximum undo depth
    pub fn with_depth(max_depth: usize) -> Self {
        let max_depth = max_depth.max(1);
        Self {
            undo_stack: VecDeque::with_capacity(max_depth),
            redo_stack: Vec::new(),
            max_depth,
            state: HistoryState::Idle,
            revision: 0,
        }
    }

    /// Apply `command` and record it.
    ///
    /// On success the redo stack is cleared and the pushed command is returned
    /// so callers can read what it created. On failure nothing is recorded and
    /// the document is unchanged.
    pub fn execute(
        &mut self,
        mut command: DocumentCommand,
        doc: &mut Document,
    ) -> EditorResult<&DocumentCommand> {
        if let Err(err) = command.apply(doc) {
            warn!("Command '{}' rejected: {}", command.name(), err);
            return Err(err);
        }
        debug!("Executed '{}'", command.name());

        self.redo_stack.clear();
        self.undo_stack.push_back(command);
        while self.undo_stack.len() > self.max_depth {
            self.undo_stack.pop_front();
        }
        self.revision += 1;
        Ok(&self.undo_stack[self.undo_stack.len() - 1])
    }

    /// Undo the most recent command.
    ///
    /// Returns `Ok(false)` when there is nothing to undo or a gesture is being
    /// recorded. A failing inverse leaves both the document and the stacks as
    /// they were.
    pub fn undo(&mut self, doc: &mut Document) -> EditorResult<bool> {
        if self.is_recording() {
            return Ok(false);
        }
        let Some(mut command) = self.undo_stack.pop_back() else {
            return Ok(false);
        };
        if let Err(err) = command.undo(doc) {
            warn!("Undo of '{}' failed: {}", command.name(), err);
            self.undo_stack.push_back(command);
            return Err(err);
        }
        debug!("Undid '{}'", command.name());
        self.redo_stack.push(command);
        self.revision += 1;
        Ok(true)
    }

    /// Redo the most recently undone command.
    pub fn redo(&mut self, doc: &mut Document) -> EditorResult<bool> {
        if self.is_recording() {
            return Ok(false);
        }
        let Some(mut command) = self.redo_stack.pop() else {
            return Ok(false);
        };
        if let Err(err) = command.apply(doc) {
            warn!("Redo of '{}' failed: {}", command.name(), err);
            self.redo_stack.push(command);
            return Err(err);
        }
        debug!("Redid '{}'", command.name());
        self.undo_stack.push_back(command);
        self.revision += 1;
        Ok(true)
    }

    /// Mark the start of an interactive gesture.
    pub fn begin_recording(&mut self, label: impl Into<String>) {
        self.state = HistoryState::Recording {
            label: label.into(),
        };
    }

    /// Mark the end of the gesture (committed or cancelled).
    pub fn end_recording(&mut self) {
        self.state = HistoryState::Idle;
    }

    pub fn state(&self) -> &HistoryState {
        &self.state
    }

    pub fn is_recording(&self) -> bool {
        matches!(self.state, HistoryState::Recording { .. })
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.is_recording() && !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.is_recording() && !self.redo_stack.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Label of the command `undo` would revert.
    pub fn undo_label(&self) -> Option<&str> {
        self.undo_stack.back().map(DocumentCommand::name)
    }

    /// Label of the command `redo` would re-apply.
    pub fn redo_label(&self) -> Option<&str> {
        self.redo_stack.last().map(DocumentCommand::name)
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Counts every executed, undone or redone command.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Drop all history (for example after loading a different document).
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.state = HistoryState::Idle;
    }

    /// Count a document change made outside the command stack.
    pub(crate) fn bump_revision(&mut self) {
        self.revision += 1;
    }
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new()
    }
}
