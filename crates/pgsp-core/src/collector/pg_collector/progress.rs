//! `ProgressSource` implementation over `pg_stat_progress_*`.

use postgres::Row;
use postgres::error::SqlState;
use tracing::{debug, warn};

use super::queries::build_progress_query;
use super::{PostgresCollector, format_postgres_error};
use crate::collector::{FetchError, ProgressSource};
use crate::models::{
    ProgressAnalyze, ProgressBaseBackup, ProgressCluster, ProgressCopy, ProgressCreateIndex,
    ProgressKind, ProgressRecord, ProgressVacuum,
};

impl ProgressSource for PostgresCollector {
    fn fetch(&mut self, kind: ProgressKind) -> Result<Vec<ProgressRecord>, FetchError> {
        if let Err(e) = self.ensure_connected() {
            return Err(FetchError::Connection(e.to_string()));
        }

        let Some(version) = self.server_version_num else {
            // SHOW failed right after connect; start over next tick.
            self.disconnect();
            return Err(FetchError::Query("server version unknown".to_string()));
        };
        let Some(query) = build_progress_query(kind, version) else {
            return Err(FetchError::Unsupported {
                kind,
                server_version_num: version,
            });
        };

        let Some(client) = self.client.as_mut() else {
            return Err(FetchError::Connection("not connected".to_string()));
        };

        let rows = match client.query(&query, &[]) {
            Ok(rows) => rows,
            Err(e) => {
                let msg = format_postgres_error(&e);
                self.last_error = Some(msg.clone());
                warn!(kind = %kind, error = %msg, "progress query failed");
                return Err(self.classify_query_error(&e, msg));
            }
        };

        self.last_error = None;
        debug!(kind = %kind, rows = rows.len(), "progress rows fetched");
        rows.iter()
            .map(|row| decode_row(kind, row))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| FetchError::Unavailable(format!("{}: {}", kind.view_name(), e)))
    }
}

impl PostgresCollector {
    /// Maps a query failure to a fetch error, dropping the client when the
    /// failure was not reported by the server.
    fn classify_query_error(&mut self, e: &postgres::Error, msg: String) -> FetchError {
        match e.as_db_error() {
            Some(db_error) if is_persistent_sqlstate(db_error.code()) => {
                FetchError::Unavailable(msg)
            }
            Some(_) => {
                if self.client.as_ref().is_some_and(|c| c.is_closed()) {
                    self.disconnect();
                }
                FetchError::Query(msg)
            }
            None => {
                self.disconnect();
                FetchError::Connection(msg)
            }
        }
    }
}

/// Errors that will not go away by retrying against the same server.
fn is_persistent_sqlstate(code: &SqlState) -> bool {
    *code == SqlState::UNDEFINED_TABLE
        || *code == SqlState::UNDEFINED_COLUMN
        || *code == SqlState::INSUFFICIENT_PRIVILEGE
}

fn decode_row(kind: ProgressKind, row: &Row) -> Result<ProgressRecord, postgres::Error> {
    let record = match kind {
        ProgressKind::Analyze => ProgressAnalyze {
            pid: row.try_get("pid")?,
            datid: row.try_get("datid")?,
            datname: row.try_get("datname")?,
            relid: row.try_get("relid")?,
            phase: row.try_get("phase")?,
            sample_blks_total: row.try_get("sample_blks_total")?,
            sample_blks_scanned: row.try_get("sample_blks_scanned")?,
            ext_stats_total: row.try_get("ext_stats_total")?,
            ext_stats_computed: row.try_get("ext_stats_computed")?,
            child_tables_total: row.try_get("child_tables_total")?,
            child_tables_done: row.try_get("child_tables_done")?,
            current_child_table_relid: row.try_get("current_child_table_relid")?,
        }
        .into(),
        ProgressKind::BaseBackup => ProgressBaseBackup {
            pid: row.try_get("pid")?,
            phase: row.try_get("phase")?,
            backup_total: row.try_get("backup_total")?,
            backup_streamed: row.try_get("backup_streamed")?,
            tablespaces_total: row.try_get("tablespaces_total")?,
            tablespaces_streamed: row.try_get("tablespaces_streamed")?,
        }
        .into(),
        ProgressKind::Cluster => ProgressCluster {
            pid: row.try_get("pid")?,
            datid: row.try_get("datid")?,
            datname: row.try_get("datname")?,
            relid: row.try_get("relid")?,
            command: row.try_get("command")?,
            phase: row.try_get("phase")?,
            cluster_index_relid: row.try_get("cluster_index_relid")?,
            heap_tuples_scanned: row.try_get("heap_tuples_scanned")?,
            heap_tuples_written: row.try_get("heap_tuples_written")?,
            heap_blks_total: row.try_get("heap_blks_total")?,
            heap_blks_scanned: row.try_get("heap_blks_scanned")?,
            index_rebuild_count: row.try_get("index_rebuild_count")?,
        }
        .into(),
        ProgressKind::Copy => ProgressCopy {
            pid: row.try_get("pid")?,
            datid: row.try_get("datid")?,
            datname: row.try_get("datname")?,
            relid: row.try_get("relid")?,
            command: row.try_get("command")?,
            copy_type: row.try_get("copy_type")?,
            bytes_processed: row.try_get("bytes_processed")?,
            bytes_total: row.try_get("bytes_total")?,
            tuples_processed: row.try_get("tuples_processed")?,
            tuples_excluded: row.try_get("tuples_excluded")?,
        }
        .into(),
        ProgressKind::CreateIndex => ProgressCreateIndex {
            pid: row.try_get("pid")?,
            datid: row.try_get("datid")?,
            datname: row.try_get("datname")?,
            relid: row.try_get("relid")?,
            index_relid: row.try_get("index_relid")?,
            command: row.try_get("command")?,
            phase: row.try_get("phase")?,
            lockers_total: row.try_get("lockers_total")?,
            lockers_done: row.try_get("lockers_done")?,
            current_locker_pid: row.try_get("current_locker_pid")?,
            blocks_total: row.try_get("blocks_total")?,
            blocks_done: row.try_get("blocks_done")?,
            tuples_total: row.try_get("tuples_total")?,
            tuples_done: row.try_get("tuples_done")?,
            partitions_total: row.try_get("partitions_total")?,
            partitions_done: row.try_get("partitions_done")?,
        }
        .into(),
        ProgressKind::Vacuum => ProgressVacuum {
            pid: row.try_get("pid")?,
            datid: row.try_get("datid")?,
            datname: row.try_get("datname")?,
            relid: row.try_get("relid")?,
            phase: row.try_get("phase")?,
            heap_blks_total: row.try_get("heap_blks_total")?,
            heap_blks_scanned: row.try_get("heap_blks_scanned")?,
            heap_blks_vacuumed: row.try_get("heap_blks_vacuumed")?,
            index_vacuum_count: row.try_get("index_vacuum_count")?,
            max_dead_tuples: row.try_get("max_dead_tuples")?,
            num_dead_tuples: row.try_get("num_dead_tuples")?,
        }
        .into(),
    };
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_view_and_privileges_are_persistent() {
        assert!(is_persistent_sqlstate(&SqlState::UNDEFINED_TABLE));
        assert!(is_persistent_sqlstate(&SqlState::UNDEFINED_COLUMN));
        assert!(is_persistent_sqlstate(&SqlState::INSUFFICIENT_PRIVILEGE));
        assert!(!is_persistent_sqlstate(&SqlState::QUERY_CANCELED));
        assert!(!is_persistent_sqlstate(&SqlState::ADMIN_SHUTDOWN));
    }

    #[test]
    fn unreachable_server_is_a_connection_error() {
        // Port 1 on localhost is never a PostgreSQL server.
        let mut c = PostgresCollector::with_connection_string(
            "host=127.0.0.1 port=1 user=nobody dbname=nobody connect_timeout=1".into(),
        );
        match c.fetch(ProgressKind::Vacuum) {
            Err(FetchError::Connection(_)) => {}
            other => panic!("expected connection error, got {:?}", other),
        }
        assert!(c.last_error().is_some());
        assert!(c.client.is_none());
    }
}
