//! Error aggregation for stop-on-error and collect-all copies

use parking_lot::Mutex;
use tracing::{debug, warn};
use treecp_types::Error;

/// What the engine should do after an error has been recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Keep copying
    Continue,
    /// End the copy now
    Abort,
}

#[derive(Debug, Default)]
struct State {
    errors: Vec<Error>,
    aborted: bool,
}

/// Ordered record of every error reported by the entries of one copy
#[derive(Debug, Default)]
pub struct ErrorAggregator {
    stop_on_error: bool,
    state: Mutex<State>,
}

impl ErrorAggregator {
    /// Create an aggregator for the given policy
    pub fn new(stop_on_error: bool) -> Self {
        Self {
            stop_on_error,
            state: Mutex::new(State::default()),
        }
    }

    /// Record an error.
    ///
    /// Under stop-on-error the first fatal error yields [`Verdict::Abort`], and
    /// everything reported after that is dropped.
    pub fn record(&self, error: Error) -> Verdict {
        let mut state = self.state.lock();
        if state.aborted {
            debug!("Discarding error after abort: {}", error);
            return Verdict::Continue;
        }

        warn!("{}", error);
        let abort = self.stop_on_error && error.is_fatal();
        state.errors.push(error);
        if abort {
            state.aborted = true;
            Verdict::Abort
        } else {
            Verdict::Continue
        }
    }

    /// Number of errors recorded so far
    pub fn len(&self) -> usize {
        self.state.lock().errors.len()
    }

    /// Whether no error has been recorded
    pub fn is_empty(&self) -> bool {
        self.state.lock().errors.is_empty()
    }

    /// Take the final error of the copy, if any.
    ///
    /// Stop-on-error yields the first fatal error, or the first error at all
    /// when only non-fatal ones were seen. Collect-all yields an
    /// [`Error::Aggregate`] holding every error in recording order.
    pub fn finish(&self) -> Option<Error> {
        let errors = std::mem::take(&mut self.state.lock().errors);
        if errors.is_empty() {
            return None;
        }

        if self.stop_on_error {
            let index = errors.iter().position(Error::is_fatal).unwrap_or(0);
            errors.into_iter().nth(index)
        } else {
            Some(Error::Aggregate { errors })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use treecp_types::ErrorKind;

    fn denied() -> io::Error {
        io::Error::new(io::ErrorKind::PermissionDenied, "denied")
    }

    #[test]
    fn test_no_errors_is_success() {
        let aggregator = ErrorAggregator::new(false);
        assert!(aggregator.is_empty());
        assert!(aggregator.finish().is_none());
    }

    #[test]
    fn test_collect_all_keeps_order() {
        let aggregator = ErrorAggregator::new(false);
        assert_eq!(aggregator.record(Error::stat("/a", denied())), Verdict::Continue);
        assert_eq!(aggregator.record(Error::mkdir("/b", denied())), Verdict::Continue);
        assert_eq!(aggregator.record(Error::chmod("/c", denied())), Verdict::Continue);
        assert_eq!(aggregator.len(), 3);

        let error = aggregator.finish().unwrap();
        assert_eq!(error.kind(), ErrorKind::Aggregate);
        let kinds: Vec<_> = error.errors().iter().map(Error::kind).collect();
        assert_eq!(kinds, vec![ErrorKind::Stat, ErrorKind::Mkdir, ErrorKind::Chmod]);
    }

    #[test]
    fn test_stop_on_error_aborts_on_first_fatal() {
        let aggregator = ErrorAggregator::new(true);
        assert_eq!(aggregator.record(Error::chmod("/a", denied())), Verdict::Continue);
        assert_eq!(aggregator.record(Error::copy("/b", "/x", denied())), Verdict::Abort);
        assert_eq!(aggregator.record(Error::stat("/c", denied())), Verdict::Continue);
        assert_eq!(aggregator.len(), 2);

        let error = aggregator.finish().unwrap();
        assert_eq!(error.kind(), ErrorKind::Copy);
        assert_eq!(error.path(), Some(std::path::Path::new("/b")));
    }

    #[test]
    fn test_stop_on_error_with_only_non_fatal_errors() {
        let aggregator = ErrorAggregator::new(true);
        aggregator.record(Error::chmod("/a", denied()));
        aggregator.record(Error::chmod("/b", denied()));

        let error = aggregator.finish().unwrap();
        assert_eq!(error.kind(), ErrorKind::Chmod);
        assert_eq!(error.path(), Some(std::path::Path::new("/a")));
    }
}
