//! `pg_stat_progress_copy` rows (PG 14+).

use crate::fmt::Field;

use super::{ProgressInfo, ProgressKind};

/// Ratio shown for a COPY whose total size is unknown (e.g. `COPY FROM STDIN`).
pub const COPY_UNKNOWN_TOTAL_RATIO: f64 = 0.5;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressCopy {
    pub pid: i32,
    pub datid: i64,
    pub datname: String,
    pub relid: i64,
    pub command: String,
    /// `FILE`, `PROGRAM`, `PIPE` or `CALLBACK`.
    pub copy_type: String,
    pub bytes_processed: i64,
    pub bytes_total: i64,
    pub tuples_processed: i64,
    pub tuples_excluded: i64,
}

impl ProgressInfo for ProgressCopy {
    fn kind(&self) -> ProgressKind {
        ProgressKind::Copy
    }

    fn pid(&self) -> i32 {
        self.pid
    }

    /// `bytes_processed / bytes_total`, or exactly 0.5 when the total is unknown.
    fn completion_ratio(&self) -> Option<f64> {
        if self.bytes_total == 0 {
            return Some(COPY_UNKNOWN_TOTAL_RATIO);
        }
        Some(self.bytes_processed as f64 / self.bytes_total as f64)
    }

    fn fields(&self) -> Vec<Field> {
        vec![
            ("pid", self.pid.into()),
            ("datid", self.datid.into()),
            ("datname", (&self.datname).into()),
            ("relid", self.relid.into()),
            ("command", (&self.command).into()),
            ("type", (&self.copy_type).into()),
            ("bytes_processed", self.bytes_processed.into()),
            ("bytes_total", self.bytes_total.into()),
            ("tuples_processed", self.tuples_processed.into()),
            ("tuples_excluded", self.tuples_excluded.into()),
        ]
    }

    fn wide_split(&self) -> Option<usize> {
        Some(7)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ProgressCopy {
        ProgressCopy {
            pid: 1,
            datid: 1,
            datname: "name".to_string(),
            relid: 1,
            command: "command".to_string(),
            copy_type: "ctype".to_string(),
            bytes_processed: 1,
            bytes_total: 10,
            tuples_processed: 1,
            tuples_excluded: 10,
        }
    }

    #[test]
    fn zero_total_is_half_done() {
        let c = ProgressCopy {
            bytes_processed: 123_456,
            ..ProgressCopy::default()
        };
        assert_eq!(c.completion_ratio(), Some(0.5));
    }

    #[test]
    fn bytes_ratio() {
        assert_eq!(sample().completion_ratio(), Some(0.1));
    }

    #[test]
    fn compact_form_lists_fields_in_order() {
        assert_eq!(
            sample().compact_form(),
            " pid              | 1
 datid            | 1
 datname          | name
 relid            | 1
 command          | command
 type             | ctype
 bytes_processed  | 1
 bytes_total      | 10
 tuples_processed | 1
 tuples_excluded  | 10
"
        );
    }
}
