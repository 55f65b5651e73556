//! `pg_stat_progress_create_index` rows (CREATE INDEX / REINDEX, PG 12+).

use crate::fmt::Field;

use super::{ProgressInfo, ProgressKind, first_ratio};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressCreateIndex {
    pub pid: i32,
    pub datid: i64,
    pub datname: String,
    pub relid: i64,
    pub index_relid: i64,
    pub command: String,
    pub phase: String,
    pub lockers_total: i64,
    pub lockers_done: i64,
    pub current_locker_pid: i64,
    pub blocks_total: i64,
    pub blocks_done: i64,
    pub tuples_total: i64,
    pub tuples_done: i64,
    pub partitions_total: i64,
    pub partitions_done: i64,
}

impl ProgressInfo for ProgressCreateIndex {
    fn kind(&self) -> ProgressKind {
        ProgressKind::CreateIndex
    }

    fn pid(&self) -> i32 {
        self.pid
    }

    fn completion_ratio(&self) -> Option<f64> {
        first_ratio(&[
            (self.blocks_done, self.blocks_total),
            (self.partitions_done, self.partitions_total),
            (self.tuples_done, self.tuples_total),
        ])
    }

    fn fields(&self) -> Vec<Field> {
        vec![
            ("pid", self.pid.into()),
            ("datid", self.datid.into()),
            ("datname", (&self.datname).into()),
            ("relid", self.relid.into()),
            ("index_relid", self.index_relid.into()),
            ("command", (&self.command).into()),
            ("phase", (&self.phase).into()),
            ("lockers_total", self.lockers_total.into()),
            ("lockers_done", self.lockers_done.into()),
            ("current_locker_pid", self.current_locker_pid.into()),
            ("blocks_total", self.blocks_total.into()),
            ("blocks_done", self.blocks_done.into()),
            ("tuples_total", self.tuples_total.into()),
            ("tuples_done", self.tuples_done.into()),
            ("partitions_total", self.partitions_total.into()),
            ("partitions_done", self.partitions_done.into()),
        ]
    }

    fn wide_split(&self) -> Option<usize> {
        Some(9)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_win_over_tuples() {
        let ci = ProgressCreateIndex {
            blocks_done: 50,
            blocks_total: 100,
            tuples_done: 0,
            tuples_total: 0,
            ..ProgressCreateIndex::default()
        };
        assert_eq!(ci.completion_ratio(), Some(0.5));
    }

    #[test]
    fn partitions_before_tuples() {
        let ci = ProgressCreateIndex {
            partitions_total: 10,
            partitions_done: 3,
            tuples_total: 100,
            tuples_done: 99,
            ..ProgressCreateIndex::default()
        };
        assert_eq!(ci.completion_ratio(), Some(0.3));
    }

    #[test]
    fn tuples_as_last_resort() {
        let ci = ProgressCreateIndex {
            tuples_total: 4,
            tuples_done: 1,
            ..ProgressCreateIndex::default()
        };
        assert_eq!(ci.completion_ratio(), Some(0.25));
    }

    #[test]
    fn waiting_for_lockers_is_undefined() {
        let ci = ProgressCreateIndex {
            phase: "waiting for writers before build".to_string(),
            lockers_total: 3,
            lockers_done: 1,
            ..ProgressCreateIndex::default()
        };
        assert_eq!(ci.completion_ratio(), None);
    }

    #[test]
    fn wide_form_renders_two_tables() {
        let want = "\
+-----+-------+---------+-------+-------------+---------+-------+---------------+--------------+
| PID | DATID | DATNAME | RELID | INDEX RELID | COMMAND | PHASE | LOCKERS TOTAL | LOCKERS DONE |
+-----+-------+---------+-------+-------------+---------+-------+---------------+--------------+
|   0 |     0 |         |     0 |           0 |         |       |             0 |            0 |
+-----+-------+---------+-------+-------------+---------+-------+---------------+--------------+
+--------------------+--------------+-------------+--------------+-------------+------------------+-----------------+
| CURRENT LOCKER PID | BLOCKS TOTAL | BLOCKS DONE | TUPLES TOTAL | TUPLES DONE | PARTITIONS TOTAL | PARTITIONS DONE |
+--------------------+--------------+-------------+--------------+-------------+------------------+-----------------+
|                  0 |            0 |           0 |            0 |           0 |                0 |               0 |
+--------------------+--------------+-------------+--------------+-------------+------------------+-----------------+
";
        assert_eq!(ProgressCreateIndex::default().wide_form(), want);
    }
}
