//! pgsp-core — live monitor for PostgreSQL `pg_stat_progress_*` views.
//!
//! Provides:
//! - `collector` — progress sources (PostgreSQL, scripted mock)
//! - `models` — typed progress rows, kinds and completion ratios
//! - `registry` — reconciliation of per-tick snapshots into tracked entries
//! - `scheduler` — fetch → reconcile → render driver
//! - `tui` — frame rendering and the full-screen host
//! - `config` — YAML configuration file
//! - `fmt` — text tables and vertical field lists
//! - `util` — helper utilities

pub mod collector;
pub mod config;
pub mod fmt;
pub mod models;
pub mod registry;
pub mod scheduler;
pub mod tui;
pub mod util;
