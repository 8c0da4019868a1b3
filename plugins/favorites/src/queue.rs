//! Persist scheduling
//!
//! Every mutation wants the full collection written to storage. Writing is
//! asynchronous, so the queue keeps at most one write in flight and folds
//! every request that arrives meanwhile into a single follow-up write of
//! whatever the collection looks like when the in-flight one finishes.

/// Single in-flight, coalescing write scheduler
///
/// The queue never touches the data; each method answers "start a write of
/// the current collection now?".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct WriteQueue {
    in_flight: bool,
    pending: bool,
    held: bool,
}

impl WriteQueue {
    /// A queue that defers writes until [`release`](Self::release)
    pub fn held() -> Self {
        Self {
            held: true,
            ..Self::default()
        }
    }

    /// Ask for a write of the current state
    pub fn request(&mut self) -> bool {
        if self.held || self.in_flight {
            self.pending = true;
            return false;
        }
        self.in_flight = true;
        true
    }

    /// Mark the in-flight write finished, successful or not
    pub fn complete(&mut self) -> bool {
        self.in_flight = false;
        self.start_pending()
    }

    /// Stop holding writes.
    ///
    /// With `flush` false, requests made while held are dropped; otherwise
    /// they collapse into one write.
    pub fn release(&mut self, flush: bool) -> bool {
        self.held = false;
        if !flush {
            self.pending = false;
        }
        self.start_pending()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn has_pending(&self) -> bool {
        self.pending
    }

    fn start_pending(&mut self) -> bool {
        if self.pending && !self.held && !self.in_flight {
            self.pending = false;
            self.in_flight = true;
            return true;
        }
        false
    }
}
