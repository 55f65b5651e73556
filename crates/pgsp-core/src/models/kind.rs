//! Operation kinds and the set of kinds enabled for monitoring.

use std::collections::BTreeMap;
use std::fmt;

use tracing::warn;

/// One category of long-running operation reported by a `pg_stat_progress_*` view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProgressKind {
    Analyze,
    BaseBackup,
    Cluster,
    Copy,
    CreateIndex,
    Vacuum,
}

impl ProgressKind {
    /// Returns all kinds in display order.
    pub fn all() -> &'static [ProgressKind] {
        &[
            ProgressKind::Analyze,
            ProgressKind::BaseBackup,
            ProgressKind::Cluster,
            ProgressKind::Copy,
            ProgressKind::CreateIndex,
            ProgressKind::Vacuum,
        ]
    }

    /// Target name used on the command line and in the config file.
    pub fn target_name(&self) -> &'static str {
        match self {
            ProgressKind::Analyze => "Analyze",
            ProgressKind::BaseBackup => "BaseBackup",
            ProgressKind::Cluster => "Cluster",
            ProgressKind::Copy => "Copy",
            ProgressKind::CreateIndex => "CreateIndex",
            ProgressKind::Vacuum => "Vacuum",
        }
    }

    /// Name of the statistics view this kind is read from.
    pub fn view_name(&self) -> &'static str {
        match self {
            ProgressKind::Analyze => "pg_stat_progress_analyze",
            ProgressKind::BaseBackup => "pg_stat_progress_basebackup",
            ProgressKind::Cluster => "pg_stat_progress_cluster",
            ProgressKind::Copy => "pg_stat_progress_copy",
            ProgressKind::CreateIndex => "pg_stat_progress_create_index",
            ProgressKind::Vacuum => "pg_stat_progress_vacuum",
        }
    }

    /// Minimum `server_version_num` that provides the view.
    pub fn min_server_version(&self) -> i32 {
        match self {
            ProgressKind::Vacuum => 90600,
            ProgressKind::Cluster | ProgressKind::CreateIndex => 120000,
            ProgressKind::Analyze | ProgressKind::BaseBackup => 130000,
            ProgressKind::Copy => 140000,
        }
    }

    /// Two-colour gradient (start, end) for the completion bar.
    pub fn gradient(&self) -> (&'static str, &'static str) {
        match self {
            ProgressKind::Analyze => ("#FF7CCB", "#FDFF8C"),
            ProgressKind::BaseBackup => ("#FDFF8C", "#FF7CCB"),
            ProgressKind::Cluster => ("#5A56E0", "#EE6FF8"),
            ProgressKind::Copy => ("#FF7CCB", "#5A56E0"),
            ProgressKind::CreateIndex => ("#EE6FF8", "#5A56E0"),
            ProgressKind::Vacuum => ("#5A56E0", "#FF7CCB"),
        }
    }

    /// Parses a kind from its target name, subcommand name or view name.
    ///
    /// Matching is case-insensitive: `CreateIndex`, `createindex` and
    /// `pg_stat_progress_create_index` all name the same kind.
    pub fn from_name(name: &str) -> Option<ProgressKind> {
        let name = name.trim();
        ProgressKind::all().iter().copied().find(|kind| {
            kind.target_name().eq_ignore_ascii_case(name)
                || kind.view_name().eq_ignore_ascii_case(name)
        })
    }
}

impl fmt::Display for ProgressKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.target_name())
    }
}

/// Enabled/disabled state for every known kind.
///
/// Built once at startup from the requested targets; kinds are disabled at
/// runtime when their source reports a persistent failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindSet {
    enabled: BTreeMap<ProgressKind, bool>,
    disabled_reasons: BTreeMap<ProgressKind, String>,
}

impl KindSet {
    /// Every kind enabled.
    pub fn all() -> Self {
        Self {
            enabled: ProgressKind::all().iter().map(|k| (*k, true)).collect(),
            disabled_reasons: BTreeMap::new(),
        }
    }

    /// Enables only the named kinds.
    ///
    /// Unknown names are ignored. An empty list, or a list where no name
    /// matches a known kind, enables everything.
    pub fn from_targets<S: AsRef<str>>(targets: &[S]) -> Self {
        let mut enabled: BTreeMap<ProgressKind, bool> =
            ProgressKind::all().iter().map(|k| (*k, false)).collect();
        let mut matched = false;

        for target in targets {
            match ProgressKind::from_name(target.as_ref()) {
                Some(kind) => {
                    enabled.insert(kind, true);
                    matched = true;
                }
                None => warn!(target = target.as_ref(), "unknown progress target ignored"),
            }
        }

        if !matched {
            return Self::all();
        }

        Self {
            enabled,
            disabled_reasons: BTreeMap::new(),
        }
    }

    pub fn is_enabled(&self, kind: ProgressKind) -> bool {
        self.enabled.get(&kind).copied().unwrap_or(false)
    }

    /// Enabled kinds in display order.
    pub fn enabled(&self) -> Vec<ProgressKind> {
        self.enabled
            .iter()
            .filter(|(_, on)| **on)
            .map(|(kind, _)| *kind)
            .collect()
    }

    /// Disables a kind for the rest of the session, remembering why.
    pub fn disable(&mut self, kind: ProgressKind, reason: impl Into<String>) {
        self.enabled.insert(kind, false);
        self.disabled_reasons.insert(kind, reason.into());
    }

    /// Kinds disabled at runtime, with the reason.
    pub fn disabled_reasons(&self) -> impl Iterator<Item = (ProgressKind, &str)> {
        self.disabled_reasons
            .iter()
            .map(|(kind, reason)| (*kind, reason.as_str()))
    }

    /// Enabled target names, sorted and space-separated.
    pub fn describe(&self) -> String {
        let mut names: Vec<&str> = self.enabled().iter().map(|k| k.target_name()).collect();
        names.sort_unstable();
        names.join(" ")
    }
}

impl Default for KindSet {
    fn default() -> Self {
        Self::all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_name_accepts_target_view_and_subcommand_names() {
        assert_eq!(
            ProgressKind::from_name("CreateIndex"),
            Some(ProgressKind::CreateIndex)
        );
        assert_eq!(
            ProgressKind::from_name("createindex"),
            Some(ProgressKind::CreateIndex)
        );
        assert_eq!(
            ProgressKind::from_name("pg_stat_progress_basebackup"),
            Some(ProgressKind::BaseBackup)
        );
        assert_eq!(ProgressKind::from_name("reindex"), None);
    }

    #[test]
    fn empty_targets_enable_everything() {
        let set = KindSet::from_targets::<&str>(&[]);
        assert_eq!(set.enabled().len(), ProgressKind::all().len());
    }

    #[test]
    fn unknown_targets_fall_back_to_everything() {
        let set = KindSet::from_targets(&["nope", "also-nope"]);
        assert_eq!(set, KindSet::all());
    }

    #[test]
    fn known_targets_restrict_the_set() {
        let set = KindSet::from_targets(&["vacuum", "nope", "Copy"]);
        assert_eq!(
            set.enabled(),
            vec![ProgressKind::Copy, ProgressKind::Vacuum]
        );
        assert!(!set.is_enabled(ProgressKind::Analyze));
    }

    #[test]
    fn describe_is_sorted() {
        let set = KindSet::from_targets(&["Vacuum", "Analyze", "CreateIndex"]);
        assert_eq!(set.describe(), "Analyze CreateIndex Vacuum");
    }

    #[test]
    fn disable_records_reason() {
        let mut set = KindSet::all();
        set.disable(ProgressKind::Copy, "requires PostgreSQL 14+");
        assert!(!set.is_enabled(ProgressKind::Copy));
        let reasons: Vec<_> = set.disabled_reasons().collect();
        assert_eq!(reasons, vec![(ProgressKind::Copy, "requires PostgreSQL 14+")]);
    }
}
