use std::collections::VecDeque;

use crate::completer::Completer;
use crate::model::{CommandRequest, CommandResponse};

/// A request that has been sent and is waiting for its response.
#[derive(Debug)]
pub struct PendingCommand {
    pub request: CommandRequest,
    pub response: Completer<CommandResponse>,
}

impl PendingCommand {
    pub fn new(request: CommandRequest) -> Self {
        Self {
            request,
            response: Completer::new(),
        }
    }
}

/// First-in first-out queue of outstanding requests.
///
/// Correlation is purely positional: the head is always the request the next
/// assembled response belongs to.
#[derive(Debug)]
pub struct PendingQueue<T = PendingCommand> {
    items: VecDeque<T>,
}

impl<T> PendingQueue<T> {
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    pub fn enqueue(&mut self, item: T) {
        self.items.push_back(item);
    }

    pub fn dequeue(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Remove every queued item, oldest first.
    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.items.drain(..)
    }
}

impl<T> Default for PendingQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
