//! Scripted progress source for testing the scheduler without a server.
//!
//! Each kind has a queue of one-shot responses and a steady response used
//! once the queue runs dry. Unscripted kinds return an empty batch.

use std::collections::{HashMap, VecDeque};

use super::{FetchError, ProgressSource};
use crate::models::{ProgressKind, ProgressRecord};

type Response = Result<Vec<ProgressRecord>, FetchError>;

#[derive(Debug, Clone, Default)]
pub struct MockSource {
    queued: HashMap<ProgressKind, VecDeque<Response>>,
    steady: HashMap<ProgressKind, Response>,
    calls: Vec<ProgressKind>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every future fetch of `kind` return `records`.
    pub fn set_rows(&mut self, kind: ProgressKind, records: Vec<ProgressRecord>) {
        self.steady.insert(kind, Ok(records));
    }

    /// Makes every future fetch of `kind` fail with `error`.
    pub fn set_error(&mut self, kind: ProgressKind, error: FetchError) {
        self.steady.insert(kind, Err(error));
    }

    /// Queues a single response for the next fetch of `kind`.
    pub fn push(&mut self, kind: ProgressKind, response: Response) {
        self.queued.entry(kind).or_default().push_back(response);
    }

    /// Kinds fetched so far, in call order.
    pub fn calls(&self) -> &[ProgressKind] {
        &self.calls
    }

    /// Number of times `kind` was fetched.
    pub fn call_count(&self, kind: ProgressKind) -> usize {
        self.calls.iter().filter(|k| **k == kind).count()
    }
}

impl ProgressSource for MockSource {
    fn fetch(&mut self, kind: ProgressKind) -> Response {
        self.calls.push(kind);
        if let Some(response) = self.queued.get_mut(&kind).and_then(|q| q.pop_front()) {
            return response;
        }
        self.steady.get(&kind).cloned().unwrap_or_else(|| Ok(Vec::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProgressInfo, ProgressVacuum};

    fn vacuum(pid: i32) -> ProgressRecord {
        ProgressVacuum {
            pid,
            ..ProgressVacuum::default()
        }
        .into()
    }

    #[test]
    fn unscripted_kind_is_empty() {
        let mut src = MockSource::new();
        assert_eq!(src.fetch(ProgressKind::Analyze), Ok(Vec::new()));
        assert_eq!(src.call_count(ProgressKind::Analyze), 1);
    }

    #[test]
    fn queued_responses_come_before_steady() {
        let mut src = MockSource::new();
        src.set_rows(ProgressKind::Vacuum, vec![vacuum(1)]);
        src.push(
            ProgressKind::Vacuum,
            Err(FetchError::Connection("refused".into())),
        );

        assert!(src.fetch(ProgressKind::Vacuum).is_err());
        let rows = src.fetch(ProgressKind::Vacuum).unwrap();
        assert_eq!(rows[0].pid(), 1);
        let rows = src.fetch(ProgressKind::Vacuum).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(src.calls(), &[ProgressKind::Vacuum; 3]);
    }

    #[test]
    fn steady_error_repeats() {
        let mut src = MockSource::new();
        src.set_error(
            ProgressKind::Copy,
            FetchError::Unavailable("relation does not exist".into()),
        );
        assert!(src.fetch(ProgressKind::Copy).is_err());
        assert!(src.fetch(ProgressKind::Copy).is_err());
    }
}
