//! Run-scoped ownership bookkeeping on top of a [`LedgerStore`]

use std::path::PathBuf;

use tracing::{debug, info};

use super::ledger::OwnershipLedger;
use super::store::LedgerStore;
use crate::error::Result;

/// Ledger of the previous run plus the ledger being built by this one
#[derive(Debug)]
pub struct ArtifactRegister<S> {
    store: S,
    baseline: OwnershipLedger,
    current: OwnershipLedger,
}

impl<S: LedgerStore> ArtifactRegister<S> {
    /// Read the previous run's ledger from `store`
    pub fn load(store: S) -> Result<Self> {
        let baseline = store.load()?;
        debug!("Loaded ledger with {} owner(s)", baseline.len());
        Ok(Self {
            store,
            baseline,
            current: OwnershipLedger::new(),
        })
    }

    /// Record the files `owner` produced in this run, replacing an earlier
    /// record for the same owner
    pub fn add_object<I, P>(&mut self, owner: &str, package: &str, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.current.add_object(owner, package, paths);
    }

    /// Persist this run's ledger and return the paths it orphaned.
    ///
    /// Orphans are only handed out once the new ledger is stored; on failure
    /// the baseline stays as loaded.
    pub fn save(&mut self) -> Result<Vec<PathBuf>> {
        let orphans = self.baseline.orphans_in(&self.current);
        self.store.save(&self.current)?;
        self.baseline = self.current.clone();

        info!(
            "Saved ledger with {} owner(s), {} orphaned path(s)",
            self.current.len(),
            orphans.len()
        );
        Ok(orphans)
    }

    /// Ledger loaded at the start of the run (or last saved)
    pub fn baseline(&self) -> &OwnershipLedger {
        &self.baseline
    }
}
