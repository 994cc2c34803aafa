//! Ledger persistence

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::ledger::{LedgerEntry, OwnershipLedger};
use crate::error::{CodegenError, Result};
use crate::files::write_atomic;

/// Current on-disk ledger format
pub const LEDGER_VERSION: u32 = 1;

/// Where the ownership ledger lives between runs
pub trait LedgerStore {
    /// Read the persisted ledger; a ledger that was never saved is empty
    fn load(&self) -> Result<OwnershipLedger>;

    /// Durably replace the persisted ledger
    fn save(&self, ledger: &OwnershipLedger) -> Result<()>;
}

/// TOML representation of the ledger
///
/// Keyed by owner so adding an owner never rewrites the others; unknown keys
/// are ignored on load.
#[derive(Debug, Serialize, Deserialize)]
struct TomlLedger {
    version: u32,
    #[serde(default)]
    owners: BTreeMap<String, LedgerEntry>,
}

/// Ledger stored as a TOML file
#[derive(Debug, Clone)]
pub struct TomlLedgerStore {
    path: PathBuf,
}

impl TomlLedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LedgerStore for TomlLedgerStore {
    fn load(&self) -> Result<OwnershipLedger> {
        if !self.path.exists() {
            return Ok(OwnershipLedger::new());
        }

        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            CodegenError::PersistenceError(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            ))
        })?;
        let ledger: TomlLedger = toml::from_str(&content).map_err(|e| {
            CodegenError::PersistenceError(format!(
                "Corrupt ledger {}: {}",
                self.path.display(),
                e
            ))
        })?;

        if ledger.version > LEDGER_VERSION {
            return Err(CodegenError::PersistenceError(format!(
                "Ledger {} has version {}, newest supported is {}",
                self.path.display(),
                ledger.version,
                LEDGER_VERSION
            )));
        }

        Ok(ledger.owners.into_iter().collect())
    }

    fn save(&self, ledger: &OwnershipLedger) -> Result<()> {
        let document = TomlLedger {
            version: LEDGER_VERSION,
            owners: ledger
                .entries()
                .map(|(owner, entry)| (owner.to_string(), entry.clone()))
                .collect(),
        };
        let content = toml::to_string_pretty(&document)
            .map_err(|e| CodegenError::PersistenceError(e.to_string()))?;

        write_atomic(&self.path, &content).map_err(|e| {
            CodegenError::PersistenceError(format!(
                "Failed to write {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

/// In-memory store for runs that must not touch the disk
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    ledger: RefCell<Option<OwnershipLedger>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an already persisted ledger
    pub fn with_ledger(ledger: OwnershipLedger) -> Self {
        Self {
            ledger: RefCell::new(Some(ledger)),
        }
    }

    /// The last saved ledger, if any
    pub fn snapshot(&self) -> Option<OwnershipLedger> {
        self.ledger.borrow().clone()
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn load(&self) -> Result<OwnershipLedger> {
        Ok(self.ledger.borrow().clone().unwrap_or_default())
    }

    fn save(&self, ledger: &OwnershipLedger) -> Result<()> {
        *self.ledger.borrow_mut() = Some(ledger.clone());
        Ok(())
    }
}

impl<S: LedgerStore + ?Sized> LedgerStore for &S {
    fn load(&self) -> Result<OwnershipLedger> {
        (**self).load()
    }

    fn save(&self, ledger: &OwnershipLedger) -> Result<()> {
        (**self).save(ledger)
    }
}
