//! `pg_stat_progress_basebackup` rows (PG 13+).

use crate::fmt::Field;

use super::{ProgressInfo, ProgressKind, first_ratio};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressBaseBackup {
    pub pid: i32,
    pub phase: String,
    /// Estimated bytes to stream; 0 when estimation is disabled.
    pub backup_total: i64,
    pub backup_streamed: i64,
    pub tablespaces_total: i64,
    pub tablespaces_streamed: i64,
}

impl ProgressInfo for ProgressBaseBackup {
    fn kind(&self) -> ProgressKind {
        ProgressKind::BaseBackup
    }

    fn pid(&self) -> i32 {
        self.pid
    }

    fn completion_ratio(&self) -> Option<f64> {
        first_ratio(&[
            (self.backup_streamed, self.backup_total),
            (self.tablespaces_streamed, self.tablespaces_total),
        ])
    }

    fn fields(&self) -> Vec<Field> {
        vec![
            ("pid", self.pid.into()),
            ("phase", (&self.phase).into()),
            ("backup_total", self.backup_total.into()),
            ("backup_streamed", self.backup_streamed.into()),
            ("tablespaces_total", self.tablespaces_total.into()),
            ("tablespaces_streamed", self.tablespaces_streamed.into()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_first_then_tablespaces() {
        let by_bytes = ProgressBaseBackup {
            backup_total: 1000,
            backup_streamed: 250,
            tablespaces_total: 2,
            tablespaces_streamed: 2,
            ..ProgressBaseBackup::default()
        };
        assert_eq!(by_bytes.completion_ratio(), Some(0.25));

        let by_tablespaces = ProgressBaseBackup {
            tablespaces_total: 4,
            tablespaces_streamed: 3,
            ..ProgressBaseBackup::default()
        };
        assert_eq!(by_tablespaces.completion_ratio(), Some(0.75));
    }

    #[test]
    fn unknown_totals_are_undefined() {
        assert_eq!(ProgressBaseBackup::default().completion_ratio(), None);
    }

    #[test]
    fn wide_form_is_a_single_table() {
        let wide = ProgressBaseBackup::default().wide_form();
        assert_eq!(wide.lines().count(), 5);
        assert!(wide.contains("| PID | PHASE |"));
    }
}
