//! Pending command queue
//!
//! Two producers and one consumer. Fix-driven commands are appended to the
//! tail, host commands are inserted at the head, and the consumer always
//! takes from the tail. Host commands therefore wait behind any fix updates
//! queued after them.

use super::protocol::CommandKind;
use std::collections::VecDeque;

/// Ordered queue of pending commands
#[derive(Debug, Clone, Default)]
pub struct CommandQueue {
    items: VecDeque<CommandKind>,
}

impl CommandQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Append at the tail (fix-received events)
    pub fn enqueue_fix_driven(&mut self, kind: CommandKind) {
        self.items.push_back(kind);
    }

    /// Insert at the head (host command events)
    pub fn enqueue_priority(&mut self, kind: CommandKind) {
        self.items.push_front(kind);
    }

    /// Tail element, the next one to be serviced
    pub fn peek_next(&self) -> Option<CommandKind> {
        self.items.back().copied()
    }

    /// Remove the tail element. Does nothing on an empty queue.
    pub fn dequeue(&mut self) -> Option<CommandKind> {
        self.items.pop_back()
    }

    /// Number of pending commands
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is pending
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Pending commands from head to tail
    pub fn iter(&self) -> impl Iterator<Item = &CommandKind> {
        self.items.iter()
    }
}
