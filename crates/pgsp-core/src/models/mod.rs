//! Progress records: one typed row per `pg_stat_progress_*` view.
//!
//! Every kind implements [`ProgressInfo`]; [`ProgressRecord`] wraps the
//! concrete rows so the registry and renderer work with a single type.

mod analyze;
mod basebackup;
mod cluster;
mod copy;
mod create_index;
mod kind;
mod vacuum;

pub use analyze::ProgressAnalyze;
pub use basebackup::ProgressBaseBackup;
pub use cluster::ProgressCluster;
pub use copy::ProgressCopy;
pub use create_index::ProgressCreateIndex;
pub use kind::{KindSet, ProgressKind};
pub use vacuum::ProgressVacuum;

use crate::fmt::{Field, render_split_table, render_vertical};

/// Identity of one in-flight operation: `(kind, backend pid)`.
///
/// PostgreSQL does not reuse a pid while the backend is alive, so the pair
/// is unique among currently running operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identity {
    pub kind: ProgressKind,
    pub pid: i32,
}

/// Capability shared by all progress rows.
pub trait ProgressInfo {
    /// Kind of operation this row describes.
    fn kind(&self) -> ProgressKind;

    /// Backend process ID running the operation.
    fn pid(&self) -> i32;

    /// Fraction of work done, or `None` when the view gives no usable total.
    ///
    /// The value is not clamped; callers decide what to do with values
    /// outside `(0, 1]`.
    fn completion_ratio(&self) -> Option<f64>;

    /// Column names and values in display order.
    fn fields(&self) -> Vec<Field>;

    /// Column index where the wide form starts a second table.
    fn wide_split(&self) -> Option<usize> {
        None
    }

    fn identity(&self) -> Identity {
        Identity {
            kind: self.kind(),
            pid: self.pid(),
        }
    }

    fn display_color(&self) -> (&'static str, &'static str) {
        self.kind().gradient()
    }

    /// Multi-field tabular rendering.
    fn wide_form(&self) -> String {
        render_split_table(&self.fields(), self.wide_split())
    }

    /// One `label | value` line per field.
    fn compact_form(&self) -> String {
        render_vertical(&self.fields())
    }
}

/// Returns the first `done / total` ratio whose total is nonzero.
///
/// `pairs` are `(done, total)` in priority order. All-zero totals give `None`.
pub(crate) fn first_ratio(pairs: &[(i64, i64)]) -> Option<f64> {
    pairs
        .iter()
        .find(|(_, total)| *total != 0)
        .map(|(done, total)| *done as f64 / *total as f64)
}

/// A progress row of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressRecord {
    Analyze(ProgressAnalyze),
    BaseBackup(ProgressBaseBackup),
    Cluster(ProgressCluster),
    Copy(ProgressCopy),
    CreateIndex(ProgressCreateIndex),
    Vacuum(ProgressVacuum),
}

impl ProgressRecord {
    fn inner(&self) -> &dyn ProgressInfo {
        match self {
            ProgressRecord::Analyze(r) => r,
            ProgressRecord::BaseBackup(r) => r,
            ProgressRecord::Cluster(r) => r,
            ProgressRecord::Copy(r) => r,
            ProgressRecord::CreateIndex(r) => r,
            ProgressRecord::Vacuum(r) => r,
        }
    }
}

impl ProgressInfo for ProgressRecord {
    fn kind(&self) -> ProgressKind {
        self.inner().kind()
    }

    fn pid(&self) -> i32 {
        self.inner().pid()
    }

    fn completion_ratio(&self) -> Option<f64> {
        self.inner().completion_ratio()
    }

    fn fields(&self) -> Vec<Field> {
        self.inner().fields()
    }

    fn wide_split(&self) -> Option<usize> {
        self.inner().wide_split()
    }
}

impl From<ProgressAnalyze> for ProgressRecord {
    fn from(r: ProgressAnalyze) -> Self {
        ProgressRecord::Analyze(r)
    }
}

impl From<ProgressBaseBackup> for ProgressRecord {
    fn from(r: ProgressBaseBackup) -> Self {
        ProgressRecord::BaseBackup(r)
    }
}

impl From<ProgressCluster> for ProgressRecord {
    fn from(r: ProgressCluster) -> Self {
        ProgressRecord::Cluster(r)
    }
}

impl From<ProgressCopy> for ProgressRecord {
    fn from(r: ProgressCopy) -> Self {
        ProgressRecord::Copy(r)
    }
}

impl From<ProgressCreateIndex> for ProgressRecord {
    fn from(r: ProgressCreateIndex) -> Self {
        ProgressRecord::CreateIndex(r)
    }
}

impl From<ProgressVacuum> for ProgressRecord {
    fn from(r: ProgressVacuum) -> Self {
        ProgressRecord::Vacuum(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_ratio_skips_zero_totals() {
        assert_eq!(first_ratio(&[(5, 0), (1, 4)]), Some(0.25));
        assert_eq!(first_ratio(&[(0, 0), (3, 0)]), None);
        assert_eq!(first_ratio(&[]), None);
    }

    #[test]
    fn record_delegates_to_variant() {
        let record = ProgressRecord::from(ProgressVacuum {
            pid: 77,
            heap_blks_total: 10,
            heap_blks_scanned: 5,
            ..ProgressVacuum::default()
        });
        assert_eq!(
            record.identity(),
            Identity {
                kind: ProgressKind::Vacuum,
                pid: 77
            }
        );
        assert_eq!(record.completion_ratio(), Some(0.5));
        assert_eq!(record.display_color(), ("#5A56E0", "#FF7CCB"));
        assert!(record.compact_form().starts_with(" pid "));
    }

    #[test]
    fn ratio_is_pure() {
        let record = ProgressRecord::from(ProgressCreateIndex {
            blocks_total: 3,
            blocks_done: 1,
            ..ProgressCreateIndex::default()
        });
        let first = record.completion_ratio();
        let _ = record.wide_form();
        assert_eq!(record.completion_ratio(), first);
        assert_eq!(record.clone().completion_ratio(), first);
    }
}
