//! `pg_stat_progress_analyze` rows (PG 13+).

use crate::fmt::{Field, FieldValue};

use super::{ProgressInfo, ProgressKind, first_ratio};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressAnalyze {
    pub pid: i32,
    pub datid: i64,
    pub datname: String,
    pub relid: i64,
    pub phase: String,
    pub sample_blks_total: i64,
    pub sample_blks_scanned: i64,
    pub ext_stats_total: i64,
    pub ext_stats_computed: i64,
    pub child_tables_total: i64,
    pub child_tables_done: i64,
    /// OID of the child table being scanned, 0 when not on a partition.
    pub current_child_table_relid: i64,
}

impl ProgressInfo for ProgressAnalyze {
    fn kind(&self) -> ProgressKind {
        ProgressKind::Analyze
    }

    fn pid(&self) -> i32 {
        self.pid
    }

    /// Child tables first (partitioned parents), then extended statistics,
    /// then sampled blocks.
    fn completion_ratio(&self) -> Option<f64> {
        first_ratio(&[
            (self.child_tables_done, self.child_tables_total),
            (self.ext_stats_computed, self.ext_stats_total),
            (self.sample_blks_scanned, self.sample_blks_total),
        ])
    }

    fn fields(&self) -> Vec<Field> {
        vec![
            ("pid", self.pid.into()),
            ("datid", self.datid.into()),
            ("datname", (&self.datname).into()),
            ("relid", self.relid.into()),
            ("phase", (&self.phase).into()),
            ("sample_blks_total", self.sample_blks_total.into()),
            ("sample_blks_scanned", self.sample_blks_scanned.into()),
            ("ext_stats_total", self.ext_stats_total.into()),
            ("ext_stats_computed", self.ext_stats_computed.into()),
            ("child_tables_total", self.child_tables_total.into()),
            ("child_tables_done", self.child_tables_done.into()),
            (
                "current_child_table_relid",
                FieldValue::Int(self.current_child_table_relid),
            ),
        ]
    }

    fn wide_split(&self) -> Option<usize> {
        Some(7)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_tables_take_priority() {
        let a = ProgressAnalyze {
            child_tables_total: 4,
            child_tables_done: 1,
            sample_blks_total: 100,
            sample_blks_scanned: 90,
            ..ProgressAnalyze::default()
        };
        assert_eq!(a.completion_ratio(), Some(0.25));
    }

    #[test]
    fn falls_back_to_ext_stats_then_sample_blocks() {
        let ext = ProgressAnalyze {
            ext_stats_total: 2,
            ext_stats_computed: 1,
            sample_blks_total: 100,
            sample_blks_scanned: 10,
            ..ProgressAnalyze::default()
        };
        assert_eq!(ext.completion_ratio(), Some(0.5));

        let blocks = ProgressAnalyze {
            sample_blks_total: 100,
            sample_blks_scanned: 10,
            ..ProgressAnalyze::default()
        };
        assert_eq!(blocks.completion_ratio(), Some(0.1));
    }

    #[test]
    fn all_zero_totals_are_undefined() {
        assert_eq!(ProgressAnalyze::default().completion_ratio(), None);
    }
}
