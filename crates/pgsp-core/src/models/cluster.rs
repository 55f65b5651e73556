//! `pg_stat_progress_cluster` rows (CLUSTER and VACUUM FULL, PG 12+).

use crate::fmt::Field;

use super::{ProgressInfo, ProgressKind, first_ratio};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressCluster {
    pub pid: i32,
    pub datid: i64,
    pub datname: String,
    pub relid: i64,
    pub command: String,
    pub phase: String,
    pub cluster_index_relid: i64,
    pub heap_tuples_scanned: i64,
    pub heap_tuples_written: i64,
    pub heap_blks_total: i64,
    pub heap_blks_scanned: i64,
    pub index_rebuild_count: i64,
}

impl ProgressInfo for ProgressCluster {
    fn kind(&self) -> ProgressKind {
        ProgressKind::Cluster
    }

    fn pid(&self) -> i32 {
        self.pid
    }

    fn completion_ratio(&self) -> Option<f64> {
        first_ratio(&[(self.heap_blks_scanned, self.heap_blks_total)])
    }

    fn fields(&self) -> Vec<Field> {
        vec![
            ("pid", self.pid.into()),
            ("datid", self.datid.into()),
            ("datname", (&self.datname).into()),
            ("relid", self.relid.into()),
            ("command", (&self.command).into()),
            ("phase", (&self.phase).into()),
            ("cluster_index_relid", self.cluster_index_relid.into()),
            ("heap_tuples_scanned", self.heap_tuples_scanned.into()),
            ("heap_tuples_written", self.heap_tuples_written.into()),
            ("heap_blks_total", self.heap_blks_total.into()),
            ("heap_blks_scanned", self.heap_blks_scanned.into()),
            ("index_rebuild_count", self.index_rebuild_count.into()),
        ]
    }

    fn wide_split(&self) -> Option<usize> {
        Some(7)
    }
}
