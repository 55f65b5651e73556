//! pgsp - live monitor for PostgreSQL `pg_stat_progress_*` views.
//!
//! Polls the progress views on a fixed interval and shows a bar per
//! running operation (CREATE INDEX, VACUUM, CLUSTER, ANALYZE, COPY,
//! BASE_BACKUP). Finished operations stay on screen for a few seconds.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use pgsp_core::collector::PostgresCollector;
use pgsp_core::config::Config;
use pgsp_core::models::{KindSet, ProgressKind};
use pgsp_core::scheduler::Scheduler;
use pgsp_core::tui::{App, Viewport};
use pgsp_core::util::print_pg_warning;

/// pg_stat_progress monitor.
#[derive(Parser, Debug)]
#[command(name = "pgsp", about = "Monitors PostgreSQL's pg_stat_progress_* views", version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Kinds to monitor, comma-separated (e.g. "vacuum,createindex"). Default: all.
    #[arg(short, long, value_delimiter = ',', env = "PGSP_TARGETS", global = true)]
    targets: Vec<String>,

    /// Seconds to keep a finished operation on screen.
    #[arg(short = 'a', long, env = "PGSP_AFTER_COMPLETION", global = true)]
    after_completion: Option<u64>,

    /// Refresh interval in milliseconds.
    #[arg(short, long, env = "PGSP_INTERVAL", global = true)]
    interval: Option<u64>,

    /// libpq connection string. Default: PGHOST, PGPORT, PGUSER, PGPASSWORD, PGDATABASE.
    #[arg(long, env = "PGSP_DSN", global = true)]
    dsn: Option<String>,

    /// Connect over TLS.
    #[arg(long, global = true)]
    tls: bool,

    /// Config file (default: ~/.pgsp.yaml).
    #[arg(short, long, env = "PGSP_CONFIG", value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Write logs to this file. The terminal is owned by the UI, so logs are
    /// discarded without it.
    #[arg(long, env = "PGSP_LOG_FILE", value_name = "PATH", global = true)]
    log_file: Option<PathBuf>,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode - only log errors.
    #[arg(short, long, global = true)]
    quiet: bool,
}

/// Monitors a single kind.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// pg_stat_progress_analyze
    Analyze,
    /// pg_stat_progress_basebackup
    #[command(name = "basebackup")]
    BaseBackup,
    /// pg_stat_progress_cluster
    Cluster,
    /// pg_stat_progress_copy
    Copy,
    /// pg_stat_progress_create_index
    #[command(name = "createindex")]
    CreateIndex,
    /// pg_stat_progress_vacuum
    Vacuum,
}

impl Command {
    fn kind(self) -> ProgressKind {
        match self {
            Command::Analyze => ProgressKind::Analyze,
            Command::BaseBackup => ProgressKind::BaseBackup,
            Command::Cluster => ProgressKind::Cluster,
            Command::Copy => ProgressKind::Copy,
            Command::CreateIndex => ProgressKind::CreateIndex,
            Command::Vacuum => ProgressKind::Vacuum,
        }
    }
}

/// Applies command-line values on top of the config file.
fn apply_args(config: &mut Config, args: &Args) {
    if let Some(command) = args.command {
        config.targets = vec![command.kind().target_name().to_string()];
    } else if !args.targets.is_empty() {
        config.targets = args.targets.clone();
    }
    if let Some(secs) = args.after_completion {
        config.after_completion_secs = secs;
    }
    if let Some(ms) = args.interval {
        config.interval_ms = ms;
    }
    if let Some(dsn) = &args.dsn {
        config.dsn = Some(dsn.clone());
    }
    if args.tls {
        config.tls = true;
    }
}

/// Initializes the tracing subscriber writing to `log_file`.
/// Default level is INFO. Use -q for errors only.
fn init_logging(verbose: u8, quiet: bool, log_file: Option<&Path>) -> io::Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let level = if quiet {
        LevelFilter::ERROR
    } else {
        match verbose {
            0 => LevelFilter::INFO,
            1 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn main() {
    let args = Args::parse();

    if let Err(e) = init_logging(args.verbose, args.quiet, args.log_file.as_deref()) {
        eprintln!("Error: cannot open log file: {}", e);
        std::process::exit(1);
    }

    let mut config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    apply_args(&mut config, &args);
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let collector = match &config.dsn {
        Some(dsn) => PostgresCollector::with_connection_string(dsn.clone()),
        None => match PostgresCollector::from_env() {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
    };
    let mut collector = collector.with_tls(config.tls);

    if let Err(e) = collector.try_connect() {
        print_pg_warning(&e.to_string());
    }

    let kinds = KindSet::from_targets(&config.targets);
    info!(
        targets = %kinds.describe(),
        interval_ms = config.interval_ms,
        after_completion_secs = config.after_completion_secs,
        "starting pgsp"
    );

    // The host sets the real size before the first tick.
    let viewport = Viewport {
        width: 80,
        height: 24,
    };
    let scheduler = Scheduler::new(collector, kinds, config.scheduler_config(), viewport);

    if let Err(e) = App::new(scheduler).run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
