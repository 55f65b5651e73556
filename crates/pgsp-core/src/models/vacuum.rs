//! `pg_stat_progress_vacuum` rows (PG 9.6+).

use crate::fmt::Field;

use super::{ProgressInfo, ProgressKind, first_ratio};

/// One running (auto)vacuum.
///
/// On PG 17+ `max_dead_tuples` holds `max_dead_tuple_bytes` and
/// `num_dead_tuples` holds `num_dead_item_ids`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressVacuum {
    pub pid: i32,
    pub datid: i64,
    pub datname: String,
    pub relid: i64,
    pub phase: String,
    pub heap_blks_total: i64,
    pub heap_blks_scanned: i64,
    pub heap_blks_vacuumed: i64,
    pub index_vacuum_count: i64,
    pub max_dead_tuples: i64,
    pub num_dead_tuples: i64,
}

impl ProgressInfo for ProgressVacuum {
    fn kind(&self) -> ProgressKind {
        ProgressKind::Vacuum
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
            ("phase", (&self.phase).into()),
            ("heap_blks_total", self.heap_blks_total.into()),
            ("heap_blks_scanned", self.heap_blks_scanned.into()),
            ("heap_blks_vacuumed", self.heap_blks_vacuumed.into()),
            ("index_vacuum_count", self.index_vacuum_count.into()),
            ("max_dead_tuples", self.max_dead_tuples.into()),
            ("num_dead_tuples", self.num_dead_tuples.into()),
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
    fn scanned_over_total() {
        let v = ProgressVacuum {
            heap_blks_total: 200,
            heap_blks_scanned: 50,
            heap_blks_vacuumed: 10,
            ..ProgressVacuum::default()
        };
        assert_eq!(v.completion_ratio(), Some(0.25));
    }

    #[test]
    fn zero_total_is_undefined() {
        let v = ProgressVacuum {
            heap_blks_scanned: 10,
            ..ProgressVacuum::default()
        };
        assert_eq!(v.completion_ratio(), None);
    }

    #[test]
    fn wide_form_splits_after_seven_columns() {
        let wide = ProgressVacuum::default().wide_form();
        let header_lines: Vec<&str> = wide.lines().filter(|l| l.starts_with("| ")).collect();
        // header + row for each of the two tables
        assert_eq!(header_lines.len(), 4);
        assert!(header_lines[0].ends_with("| HEAP BLKS SCANNED |"));
        assert!(header_lines[2].starts_with("| HEAP BLKS VACUUMED |"));
    }
}
