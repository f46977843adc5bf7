//! In-memory message log shared by every connection.
//!
//! The store is the only mutable state in the server. It lives for the
//! lifetime of the process and is never persisted: restarting the server
//! discards every message.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Append-only, ordered log of posted messages.
///
/// Messages are kept in arrival order, where "arrival" means the order in
/// which `append` calls acquire the lock. Nothing is ever removed, so the log
/// grows without bound; callers that need a capacity limit must layer one on
/// top.
///
/// All access is serialized through a single `Mutex`. Every critical section
/// is one `push` or one slice clone, so readers never see a half-written
/// entry and a poisoned lock still guards a consistent `Vec`.
#[derive(Default)]
pub struct MessageStore {
    messages: Mutex<Vec<String>>,
}

impl MessageStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
        }
    }

    /// Appends `text` as the newest message. Empty strings are accepted.
    pub fn append(&self, text: String) {
        self.lock().push(text);
    }

    /// Returns the last `count` messages, oldest first.
    ///
    /// A count larger than the log returns the whole log; zero or a negative
    /// count returns nothing.
    pub fn read_recent(&self, count: i32) -> Vec<String> {
        let Ok(count) = usize::try_from(count) else {
            return Vec::new();
        };

        let messages = self.lock();
        let start = messages.len().saturating_sub(count);
        messages[start..].to_vec()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.messages.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
