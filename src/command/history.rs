use log::{debug, warn};

use super::{Command, CommandResult};
use crate::document::DocumentState;

/// Linear undo history.
///
/// `commands[..applied]` are reflected in the document; the rest form the
/// redo branch, which the next [`push`](Self::push) throws away.
#[derive(Debug, Default, Clone)]
pub struct CommandHistory {
    commands: Vec<Command>,
    applied: usize,
}

impl CommandHistory {
    /// Creates a new empty command history
    pub fn new() -> Self {
        Self::default()
    }

    /// Execute a command against `doc` and record it if it succeeded.
    pub fn execute(&mut self, command: Command, doc: &mut DocumentState) -> CommandResult {
        command.execute(doc)?;
        self.push(command);
        Ok(())
    }

    /// Record a command whose effect is already in the document.
    pub fn push(&mut self, command: Command) {
        if self.commands.len() > self.applied {
            debug!("Discarding {} redoable command(s)", self.commands.len() - self.applied);
            self.commands.truncate(self.applied);
        }
        debug!("Recorded {:?}", command);
        self.commands.push(command);
        self.applied += 1;
    }

    /// Revert the command at the cursor. Returns `Ok(false)` when there is
    /// nothing to undo.
    pub fn undo(&mut self, doc: &mut DocumentState) -> CommandResult<bool> {
        let Some(index) = self.applied.checked_sub(1) else {
            return Ok(false);
        };
        if let Err(err) = self.commands[index].undo(doc) {
            warn!("Undo of {:?} failed: {}", self.commands[index], err);
            return Err(err);
        }
        self.applied = index;
        Ok(true)
    }

    /// Re-apply the command after the cursor. Returns `Ok(false)` when there is
    /// nothing to redo.
    pub fn redo(&mut self, doc: &mut DocumentState) -> CommandResult<bool> {
        let Some(command) = self.commands.get(self.applied) else {
            return Ok(false);
        };
        if let Err(err) = command.execute(doc) {
            warn!("Redo of {:?} failed: {}", command, err);
            return Err(err);
        }
        self.applied += 1;
        Ok(true)
    }

    /// Index of the last applied command, if any.
    pub fn cursor(&self) -> Option<usize> {
        self.applied.checked_sub(1)
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Returns true if there are commands that can be undone
    pub fn can_undo(&self) -> bool {
        self.applied > 0
    }

    /// Returns true if there are commands that can be redone
    pub fn can_redo(&self) -> bool {
        self.applied < self.commands.len()
    }

    /// Clear the command history
    pub fn clear(&mut self) {
        self.commands.clear();
        self.applied = 0;
    }
}
