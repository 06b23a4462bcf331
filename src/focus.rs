//! In-process audio focus arbitration.
//!
//! Stand-in for a platform focus system: holders request focus and are
//! notified through an event channel when another holder displaces
//! them. The playback controller reacts with pause/stop/duck.

use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};

/// Focus transitions delivered to a holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusChange {
    /// Focus returned to this holder.
    Gained,
    /// Permanent loss; stop and release output.
    Loss,
    /// Temporary loss; pause.
    LossTransient,
    /// Temporary loss where quiet output is acceptable.
    LossTransientCanDuck,
}

/// What a new request claims, which decides what current holders see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusKind {
    Permanent,
    Transient,
    TransientDuck,
}

/// Proof of a granted request; abandon it to give focus back.
#[derive(Debug)]
pub struct FocusToken {
    id: u64,
}

struct Holder {
    id: u64,
    events: Sender<FocusChange>,
}

struct Inner {
    accepting: bool,
    holders: Vec<Holder>,
    next_id: u64,
}

#[derive(Clone)]
pub struct FocusArbiter {
    inner: Arc<Mutex<Inner>>,
}

impl FocusArbiter {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                accepting: true,
                holders: Vec::new(),
                next_id: 0,
            })),
        }
    }

    /// While not accepting, every request is denied. Lets tests and
    /// callers exercise the denial path.
    pub fn set_accepting(&self, accepting: bool) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.accepting = accepting;
        }
    }

    /// Request focus. Current holders are notified according to `kind`:
    /// a permanent request revokes them all, transient kinds suspend
    /// the most recent holder. Returns `None` when denied.
    pub fn request(&self, kind: FocusKind, events: Sender<FocusChange>) -> Option<FocusToken> {
        let Ok(mut inner) = self.inner.lock() else {
            return None;
        };
        if !inner.accepting {
            return None;
        }

        match kind {
            FocusKind::Permanent => {
                for holder in inner.holders.drain(..) {
                    let _ = holder.events.send(FocusChange::Loss);
                }
            }
            FocusKind::Transient => {
                if let Some(top) = inner.holders.last() {
                    let _ = top.events.send(FocusChange::LossTransient);
                }
            }
            FocusKind::TransientDuck => {
                if let Some(top) = inner.holders.last() {
                    let _ = top.events.send(FocusChange::LossTransientCanDuck);
                }
            }
        }

        let id = inner.next_id;
        inner.next_id += 1;
        inner.holders.push(Holder { id, events });
        Some(FocusToken { id })
    }

    pub fn holder_count(&self) -> usize {
        self.inner.lock().map(|inner| inner.holders.len()).unwrap_or(0)
    }

    /// Give focus back. If the abandoning holder was on top, the next
    /// holder down regains focus.
    pub fn abandon(&self, token: FocusToken) {
        let Ok(mut inner) = self.inner.lock() else {
            return;
        };
        let was_top = inner.holders.last().map(|h| h.id) == Some(token.id);
        inner.holders.retain(|h| h.id != token.id);
        if was_top {
            if let Some(top) = inner.holders.last() {
                let _ = top.events.send(FocusChange::Gained);
            }
        }
    }
}

impl Default for FocusArbiter {
    fn default() -> Self {
        Self::new()
    }
}
