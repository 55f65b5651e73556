//! SQL query builders for `pg_stat_progress_*` views.

use crate::models::ProgressKind;

/// Builds the query for one progress view.
///
/// Returns `None` when the view does not exist on `server_version_num`.
pub(super) fn build_progress_query(kind: ProgressKind, server_version_num: i32) -> Option<String> {
    if server_version_num < kind.min_server_version() {
        return None;
    }
    let query = match kind {
        ProgressKind::Analyze => build_progress_analyze_query(),
        ProgressKind::BaseBackup => build_progress_basebackup_query(),
        ProgressKind::Cluster => build_progress_cluster_query(),
        ProgressKind::Copy => build_progress_copy_query(),
        ProgressKind::CreateIndex => build_progress_create_index_query(),
        ProgressKind::Vacuum => build_progress_vacuum_query(server_version_num),
    };
    Some(query)
}

/// pg_stat_progress_analyze (PG 13+).
fn build_progress_analyze_query() -> String {
    r#"
        SELECT
            pid,
            COALESCE(datid, 0)::bigint as datid,
            COALESCE(datname, '') as datname,
            COALESCE(relid, 0)::bigint as relid,
            COALESCE(phase, '') as phase,
            COALESCE(sample_blks_total, 0) as sample_blks_total,
            COALESCE(sample_blks_scanned, 0) as sample_blks_scanned,
            COALESCE(ext_stats_total, 0) as ext_stats_total,
            COALESCE(ext_stats_computed, 0) as ext_stats_computed,
            COALESCE(child_tables_total, 0) as child_tables_total,
            COALESCE(child_tables_done, 0) as child_tables_done,
            COALESCE(current_child_table_relid, 0)::bigint as current_child_table_relid
        FROM pg_stat_progress_analyze
    "#
    .to_string()
}

/// pg_stat_progress_basebackup (PG 13+).
///
/// `backup_total` is NULL when `--no-estimate-size` is used.
fn build_progress_basebackup_query() -> String {
    r#"
        SELECT
            pid,
            COALESCE(phase, '') as phase,
            COALESCE(backup_total, 0) as backup_total,
            COALESCE(backup_streamed, 0) as backup_streamed,
            COALESCE(tablespaces_total, 0) as tablespaces_total,
            COALESCE(tablespaces_streamed, 0) as tablespaces_streamed
        FROM pg_stat_progress_basebackup
    "#
    .to_string()
}

/// pg_stat_progress_cluster (PG 12+).
fn build_progress_cluster_query() -> String {
    r#"
        SELECT
            pid,
            COALESCE(datid, 0)::bigint as datid,
            COALESCE(datname, '') as datname,
            COALESCE(relid, 0)::bigint as relid,
            COALESCE(command, '') as command,
            COALESCE(phase, '') as phase,
            COALESCE(cluster_index_relid, 0)::bigint as cluster_index_relid,
            COALESCE(heap_tuples_scanned, 0) as heap_tuples_scanned,
            COALESCE(heap_tuples_written, 0) as heap_tuples_written,
            COALESCE(heap_blks_total, 0) as heap_blks_total,
            COALESCE(heap_blks_scanned, 0) as heap_blks_scanned,
            COALESCE(index_rebuild_count, 0) as index_rebuild_count
        FROM pg_stat_progress_cluster
    "#
    .to_string()
}

/// pg_stat_progress_copy (PG 14+).
fn build_progress_copy_query() -> String {
    r#"
        SELECT
            pid,
            COALESCE(datid, 0)::bigint as datid,
            COALESCE(datname, '') as datname,
            COALESCE(relid, 0)::bigint as relid,
            COALESCE(command, '') as command,
            COALESCE("type", '') as copy_type,
            COALESCE(bytes_processed, 0) as bytes_processed,
            COALESCE(bytes_total, 0) as bytes_total,
            COALESCE(tuples_processed, 0) as tuples_processed,
            COALESCE(tuples_excluded, 0) as tuples_excluded
        FROM pg_stat_progress_copy
    "#
    .to_string()
}

/// pg_stat_progress_create_index (PG 12+).
fn build_progress_create_index_query() -> String {
    r#"
        SELECT
            pid,
            COALESCE(datid, 0)::bigint as datid,
            COALESCE(datname, '') as datname,
            COALESCE(relid, 0)::bigint as relid,
            COALESCE(index_relid, 0)::bigint as index_relid,
            COALESCE(command, '') as command,
            COALESCE(phase, '') as phase,
            COALESCE(lockers_total, 0) as lockers_total,
            COALESCE(lockers_done, 0) as lockers_done,
            COALESCE(current_locker_pid, 0)::bigint as current_locker_pid,
            COALESCE(blocks_total, 0) as blocks_total,
            COALESCE(blocks_done, 0) as blocks_done,
            COALESCE(tuples_total, 0) as tuples_total,
            COALESCE(tuples_done, 0) as tuples_done,
            COALESCE(partitions_total, 0) as partitions_total,
            COALESCE(partitions_done, 0) as partitions_done
        FROM pg_stat_progress_create_index
    "#
    .to_string()
}

/// pg_stat_progress_vacuum (PG 9.6+).
///
/// PG 17 renamed `max_dead_tuples` and `num_dead_tuples` to
/// `max_dead_tuple_bytes` and `num_dead_item_ids`; both are aliased back.
fn build_progress_vacuum_query(server_version_num: i32) -> String {
    let (max_dead_expr, num_dead_expr) = if server_version_num >= 170000 {
        ("max_dead_tuple_bytes", "num_dead_item_ids")
    } else {
        ("max_dead_tuples", "num_dead_tuples")
    };

    format!(
        r#"
        SELECT
            pid,
            COALESCE(datid, 0)::bigint as datid,
            COALESCE(datname, '') as datname,
            COALESCE(relid, 0)::bigint as relid,
            COALESCE(phase, '') as phase,
            COALESCE(heap_blks_total, 0) as heap_blks_total,
            COALESCE(heap_blks_scanned, 0) as heap_blks_scanned,
            COALESCE(heap_blks_vacuumed, 0) as heap_blks_vacuumed,
            COALESCE(index_vacuum_count, 0) as index_vacuum_count,
            COALESCE({max_dead_expr}, 0) as max_dead_tuples,
            COALESCE({num_dead_expr}, 0) as num_dead_tuples
        FROM pg_stat_progress_vacuum
    "#
    )
}
