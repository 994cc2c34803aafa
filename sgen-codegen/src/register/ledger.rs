//! Ownership ledger: which owner generated which files

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Files recorded against one owner
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Module the owner's declaration lives in
    #[serde(default)]
    pub package: String,

    /// Generated paths, unique and ordered
    #[serde(default)]
    pub paths: BTreeSet<PathBuf>,
}

/// Mapping from owner name to the files it produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnershipLedger {
    entries: BTreeMap<String, LedgerEntry>,
}

impl OwnershipLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `paths` for `owner`, replacing whatever was recorded before
    pub fn add_object<I, P>(&mut self, owner: &str, package: &str, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let entry = LedgerEntry {
            package: package.to_string(),
            paths: paths.into_iter().map(Into::into).collect(),
        };
        self.entries.insert(owner.to_string(), entry);
    }

    pub fn get(&self, owner: &str) -> Option<&LedgerEntry> {
        self.entries.get(owner)
    }

    /// Paths recorded for `owner`, empty when the owner is unknown
    pub fn paths_of(&self, owner: &str) -> impl Iterator<Item = &Path> {
        self.entries
            .get(owner)
            .into_iter()
            .flat_map(|entry| entry.paths.iter().map(PathBuf::as_path))
    }

    pub fn owners(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &LedgerEntry)> {
        self.entries.iter().map(|(owner, entry)| (owner.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Paths this ledger had under an owner that `current` no longer has
    /// under the same owner.
    ///
    /// An owner missing from `current` gives up all of its paths; owners that
    /// only exist in `current` contribute nothing. A path another owner claims
    /// in `current` is live and never an orphan.
    pub fn orphans_in(&self, current: &OwnershipLedger) -> Vec<PathBuf> {
        let claimed: BTreeSet<&PathBuf> = current
            .entries
            .values()
            .flat_map(|entry| entry.paths.iter())
            .collect();

        let mut orphans = BTreeSet::new();
        for (owner, entry) in &self.entries {
            let kept = current.entries.get(owner).map(|e| &e.paths);
            for path in &entry.paths {
                let still_owned = kept.is_some_and(|paths| paths.contains(path));
                if !still_owned && !claimed.contains(path) {
                    orphans.insert(path.clone());
                }
            }
        }
        orphans.into_iter().collect()
    }
}

impl FromIterator<(String, LedgerEntry)> for OwnershipLedger {
    fn from_iter<T: IntoIterator<Item = (String, LedgerEntry)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
