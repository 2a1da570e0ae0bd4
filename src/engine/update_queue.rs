//! Update Queue - Pending state changes of one node.
//!
//! Updates form a circular singly-linked list anchored at its *tail*:
//! `pending` points at the most recently enqueued update and `pending.next`
//! is always the oldest one. Appending is O(1) and traversal still starts at
//! the head.
//!
//! ```text
//! enqueue a:  pending = a -> a
//! enqueue b:  pending = b -> a -> b
//! enqueue c:  pending = c -> a -> b -> c
//! ```
//!
//! Links are indices into a backing `Vec`, so the ring never needs shared
//! ownership of its cells.

use std::fmt;
use std::rc::Rc;

// =============================================================================
// Action
// =============================================================================

/// What an update does to the state it is applied to.
pub enum Action<S> {
    /// Replace the state outright.
    Replace(S),
    /// Compute the next state from the running one.
    Update(Rc<dyn Fn(&S) -> S>),
}

impl<S> Action<S> {
    /// Build an updater action.
    pub fn updater(f: impl Fn(&S) -> S + 'static) -> Self {
        Action::Update(Rc::new(f))
    }

    fn apply(self, state: S) -> S {
        match self {
            Action::Replace(next) => next,
            Action::Update(f) => f(&state),
        }
    }
}

impl<S: Clone> Clone for Action<S> {
    fn clone(&self) -> Self {
        match self {
            Action::Replace(v) => Action::Replace(v.clone()),
            Action::Update(f) => Action::Update(f.clone()),
        }
    }
}

impl<S: fmt::Debug> fmt::Debug for Action<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Replace(v) => f.debug_tuple("Replace").field(v).finish(),
            Action::Update(_) => f.write_str("Update(<fn>)"),
        }
    }
}

// =============================================================================
// Update Queue
// =============================================================================

struct Update<S> {
    action: Option<Action<S>>,
    next: usize,
}

/// Per-node list of pending updates.
pub struct UpdateQueue<S> {
    updates: Vec<Update<S>>,
    /// Tail of the ring.
    pending: Option<usize>,
}

impl<S> UpdateQueue<S> {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            updates: Vec::new(),
            pending: None,
        }
    }

    /// Append an update in O(1).
    pub fn enqueue(&mut self, action: Action<S>) {
        let index = self.updates.len();
        let next = match self.pending {
            None => index,
            Some(tail) => {
                let head = self.updates[tail].next;
                self.updates[tail].next = index;
                head
            }
        };
        self.updates.push(Update {
            action: Some(action),
            next,
        });
        self.pending = Some(index);
    }

    /// True when no update is waiting.
    pub fn is_empty(&self) -> bool {
        self.pending.is_none()
    }

    /// Number of pending updates.
    pub fn len(&self) -> usize {
        if self.pending.is_some() {
            self.updates.len()
        } else {
            0
        }
    }

    /// Apply every pending update to `base_state`, oldest first.
    ///
    /// The queue is cleared before returning, so a second drain with no
    /// enqueue in between returns its input unchanged.
    pub fn drain(&mut self, base_state: S) -> S {
        let Some(tail) = self.pending.take() else {
            return base_state;
        };
        let mut updates = std::mem::take(&mut self.updates);

        let first = updates[tail].next;
        let mut cursor = first;
        let mut state = base_state;
        loop {
            let update = &mut updates[cursor];
            if let Some(action) = update.action.take() {
                state = action.apply(state);
            }
            cursor = update.next;
            if cursor == first {
                break;
            }
        }
        state
    }
}

impl<S> Default for UpdateQueue<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for UpdateQueue<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateQueue")
            .field("pending", &self.len())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
