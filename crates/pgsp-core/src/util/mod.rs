//! Utility helpers for pgsp.

const RED: &str = "\x1b[1;31m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// Prints a PostgreSQL connection warning to stderr with ANSI colors.
pub fn print_pg_warning(error: &str) {
    eprint!("{}", pg_warning(error));
}

fn pg_warning(error: &str) -> String {
    let mut out = format!("{RED}PostgreSQL: {error}{RESET}\n\n");
    out.push_str(YELLOW);
    out.push_str("  Configure connection with --dsn, `dsn:` in ~/.pgsp.yaml\n");
    out.push_str("  or environment variables:\n");
    for line in [
        "export PGHOST=localhost",
        "export PGPORT=5432",
        "export PGUSER=postgres",
        "export PGPASSWORD=secret",
        "export PGDATABASE=postgres",
    ] {
        out.push_str("    ");
        out.push_str(line);
        out.push('\n');
    }
    out.push('\n');
    out.push_str("  Monitoring starts once the server is reachable.");
    out.push_str(RESET);
    out.push('\n');
    out
}
