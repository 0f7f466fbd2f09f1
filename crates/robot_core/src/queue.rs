use serde::{Deserialize, Serialize};

use crate::Command;

/// The player's staged move plan. Insertion order is execution order.
///
/// The queue itself is unconditional; gating edits on session status is the
/// session's job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandQueue {
    commands: Vec<Command>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Removes the command at `index`, keeping the rest in order.
    /// Out-of-range indices leave the queue untouched.
    pub fn remove_at(&mut self, index: usize) -> Option<Command> {
        (index < self.commands.len()).then(|| self.commands.remove(index))
    }

    pub fn pop(&mut self) -> Option<Command> {
        self.commands.pop()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Command> {
        self.commands.get(index).copied()
    }

    pub fn as_slice(&self) -> &[Command] {
        &self.commands
    }

    /// Private copy for a run, detached from later edits.
    pub fn snapshot(&self) -> Vec<Command> {
        self.commands.clone()
    }
}

impl FromIterator<Command> for CommandQueue {
    fn from_iter<I: IntoIterator<Item = Command>>(iter: I) -> Self {
        Self {
            commands: iter.into_iter().collect(),
        }
    }
}

impl Extend<Command> for CommandQueue {
    fn extend<I: IntoIterator<Item = Command>>(&mut self, iter: I) {
        self.commands.extend(iter);
    }
}
