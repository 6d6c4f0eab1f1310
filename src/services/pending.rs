/// Identifies one outstanding request for a [`PendingResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

/// Holds the latest answer for one input field while newer requests may be
/// in flight.
///
/// Only the most recently issued request may deliver a value; answers to
/// older requests are dropped. `discard` throws away whatever is pending.
#[derive(Debug)]
pub struct PendingResult<T> {
    latest: u64,
    value: Option<T>,
}

impl<T> Default for PendingResult<T> {
    fn default() -> Self {
        Self {
            latest: 0,
            value: None,
        }
    }
}

impl<T> PendingResult<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request. Any earlier request becomes stale and an applied
    /// value from it is cleared.
    pub fn begin(&mut self) -> RequestToken {
        self.latest += 1;
        self.value = None;
        RequestToken(self.latest)
    }

    /// Deliver the answer for `token`. Returns false and drops `value` when
    /// a newer request was started or the pending state was discarded.
    pub fn resolve(&mut self, token: RequestToken, value: T) -> bool {
        if token.0 != self.latest {
            tracing::debug!(
                request = token.0,
                latest = self.latest,
                "dropping superseded result"
            );
            return false;
        }
        self.value = Some(value);
        true
    }

    pub fn peek(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Consume the applied value.
    pub fn take(&mut self) -> Option<T> {
        self.value.take()
    }

    /// Drop the applied value and invalidate outstanding requests.
    pub fn discard(&mut self) {
        if self.value.is_some() {
            tracing::debug!("discarding pending result");
        }
        self.latest += 1;
        self.value = None;
    }
}
