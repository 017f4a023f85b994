//! Progress reporting module
//!
//! A [`Progress`] counts completed units of a multi-entry operation. It can be
//! attached to a parent with a declared weight, in which case advancing the
//! child credits the parent proportionally. Observers either poll the handle
//! from another thread or register a [`ProgressCallback`].

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// What one progress unit stands for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressUnit {
    /// One unit per archive entry
    #[default]
    Entries,
    /// Entries weighted by their byte size (at least one unit each)
    Bytes,
}

impl ProgressUnit {
    /// Units contributed by an entry of `size` bytes
    pub fn weight(self, size: u64) -> u64 {
        match self {
            ProgressUnit::Entries => 1,
            ProgressUnit::Bytes => size.max(1),
        }
    }
}

/// Callback invoked synchronously as an operation makes progress
pub trait ProgressCallback: Send + Sync {
    /// Called after the completed count changes or the total is set
    fn on_progress(&self, completed: u64, total: u64);

    /// Called when work on a new entry starts
    fn on_entry(&self, _name: &str) {}
}

#[derive(Debug, Default)]
struct State {
    total: u64,
    completed: u64,
    begun: bool,
    /// Units already credited to the parent
    credited: u64,
}

struct ParentLink {
    parent: Progress,
    weight: u64,
}

#[derive(Default)]
struct Inner {
    state: Mutex<State>,
    parent: Option<ParentLink>,
    callback: RwLock<Option<Arc<dyn ProgressCallback>>>,
}

/// Shared handle to the progress of one operation
#[derive(Clone, Default)]
pub struct Progress {
    inner: Arc<Inner>,
}

impl Progress {
    /// Create a tracker with no total yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tracker that already knows its total
    pub fn with_total(total: u64) -> Self {
        let progress = Self::new();
        progress.begin(total);
        progress
    }

    /// Attach a callback, replacing any previous one
    pub fn with_callback(self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.set_callback(callback);
        self
    }

    pub fn set_callback(&self, callback: Arc<dyn ProgressCallback>) {
        *self.inner.callback.write() = Some(callback);
    }

    /// Create a child tracker that accounts for `weight` units of this one.
    ///
    /// The child's own total may be set later with [`begin`](Self::begin).
    pub fn child(&self, weight: u64) -> Progress {
        Progress {
            inner: Arc::new(Inner {
                parent: Some(ParentLink {
                    parent: self.clone(),
                    weight,
                }),
                ..Inner::default()
            }),
        }
    }

    /// Set the total number of units. Only the first call has an effect.
    pub fn begin(&self, total: u64) {
        let credit = {
            let mut state = self.inner.state.lock();
            if state.begun {
                warn!(
                    current = state.total,
                    requested = total,
                    "Progress total already set, ignoring"
                );
                return;
            }
            state.begun = true;
            state.total = total;
            state.completed = state.completed.min(total);
            self.take_parent_credit(&mut state)
        };
        self.propagate(credit);
    }

    /// Mark `units` more units as done, clamped to the total
    pub fn advance(&self, units: u64) {
        let credit = {
            let mut state = self.inner.state.lock();
            state.completed = state.completed.saturating_add(units).min(state.total);
            self.take_parent_credit(&mut state)
        };
        self.propagate(credit);
    }

    /// Mark all remaining units as done
    pub fn finish(&self) {
        let remaining = {
            let state = self.inner.state.lock();
            state.total - state.completed
        };
        self.advance(remaining);
    }

    /// Completed fraction in `[0, 1]`.
    ///
    /// A tracker that began with a zero total counts as complete.
    pub fn fraction(&self) -> f64 {
        let state = self.inner.state.lock();
        if state.total == 0 {
            if state.begun {
                1.0
            } else {
                0.0
            }
        } else {
            state.completed as f64 / state.total as f64
        }
    }

    pub fn completed_units(&self) -> u64 {
        self.inner.state.lock().completed
    }

    pub fn total_units(&self) -> u64 {
        self.inner.state.lock().total
    }

    /// Whether the total is known and fully completed
    pub fn is_finished(&self) -> bool {
        let state = self.inner.state.lock();
        state.begun && state.completed == state.total
    }

    pub(crate) fn report_entry(&self, name: &str) {
        if let Some(callback) = self.callback() {
            callback.on_entry(name);
        }
    }

    fn callback(&self) -> Option<Arc<dyn ProgressCallback>> {
        self.inner.callback.read().clone()
    }

    /// Compute how many new units the parent is owed, and record them as paid
    fn take_parent_credit(&self, state: &mut State) -> (u64, u64, u64) {
        let owed = match &self.inner.parent {
            Some(link) if state.begun => {
                let target = if state.total == 0 {
                    link.weight
                } else {
                    (link.weight as u128 * state.completed as u128 / state.total as u128) as u64
                };
                let owed = target.saturating_sub(state.credited);
                state.credited = state.credited.max(target);
                owed
            }
            _ => 0,
        };
        (owed, state.completed, state.total)
    }

    fn propagate(&self, (owed, completed, total): (u64, u64, u64)) {
        if owed > 0 {
            if let Some(link) = &self.inner.parent {
                link.parent.advance(owed);
            }
        }
        if let Some(callback) = self.callback() {
            callback.on_progress(completed, total);
        }
    }
}

impl fmt::Debug for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("Progress")
            .field("completed", &state.completed)
            .field("total", &state.total)
            .field("begun", &state.begun)
            .field("has_parent", &self.inner.parent.is_some())
            .finish()
    }
}
