//! Writes a rendered file set to disk and reconciles file ownership

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::copier::{copy_dir, copy_file};
use crate::codegen::{GeneratedFile, GENERAL_DIR, STORAGES_DIR};
use crate::config::GeneratorConfig;
use crate::error::{CodegenError, GenerationErrors, Result, Stage};
use crate::files::{ensure_dir, prune_empty_dir, remove_path, write_atomic};
use crate::formatter::{format_best_effort, SourceFormatter};
use crate::register::{ArtifactRegister, LedgerStore};

/// Query builder tree under the template directory
pub const QUERY_BUILDER_DIR: &str = "query_builder";

/// Outcome of a deployment
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeployReport {
    /// Template files copied into the output base
    pub staged: usize,
    /// Generated files written, in write order
    pub written: Vec<PathBuf>,
    /// Paths the previous run owned that this run does not
    pub orphans: Vec<PathBuf>,
    /// Orphans actually deleted
    pub removed: Vec<PathBuf>,
}

/// Deploys rendered files under `database_dir`
pub struct Deployer<'a> {
    config: &'a GeneratorConfig,
    formatter: &'a dyn SourceFormatter,
}

impl<'a> Deployer<'a> {
    pub fn new(config: &'a GeneratorConfig, formatter: &'a dyn SourceFormatter) -> Self {
        Self { config, formatter }
    }

    fn base(&self) -> &Path {
        &self.config.database_dir
    }

    /// Bootstrap the layout, stage the template modules, write `files` and
    /// record them against their owners in `register`.
    ///
    /// The first failure while preparing or writing stops the deployment;
    /// files written up to that point stay on disk but ownership is not
    /// reconciled.
    pub fn deploy<S: LedgerStore>(
        &self,
        package: &str,
        files: &[GeneratedFile],
        register: &mut ArtifactRegister<S>,
    ) -> std::result::Result<DeployReport, GenerationErrors> {
        let mut errors = GenerationErrors::new();
        let mut report = DeployReport::default();

        let materialized = self
            .create_base_directories()
            .and_then(|()| self.stage_modules())
            .and_then(|staged| {
                report.staged = staged;
                self.write_files(files, &mut report.written)
            });
        if let Err(e) = materialized {
            errors.push(Stage::Templating, e);
            warn!(
                "Deployment stopped after {} file(s); ownership left unchanged",
                report.written.len()
            );
            return Err(errors);
        }

        self.reconcile(package, files, register, &mut report, &mut errors);

        errors.into_result().map(|()| report)
    }

    fn create_base_directories(&self) -> Result<()> {
        let base = self.base();
        std::fs::create_dir_all(base).map_err(|e| CodegenError::file(base, e))?;

        for dir in [
            base.join(GENERAL_DIR),
            base.join(STORAGES_DIR),
            base.join(GENERAL_DIR).join("db"),
        ] {
            ensure_dir(&dir)?;
        }
        Ok(())
    }

    /// Copy the query builder tree and the driver matching the dialect
    fn stage_modules(&self) -> Result<usize> {
        let general = self.base().join(GENERAL_DIR);

        let mut staged = copy_dir(
            &self.config.template_dir.join(QUERY_BUILDER_DIR),
            &general.join(QUERY_BUILDER_DIR),
        )?;

        match self.config.sql_dialect.driver_template() {
            Some(template) => {
                let src = self.config.template_dir.join(GENERAL_DIR).join(template);
                copy_file(&src, &general.join("db").join("db.rs"))?;
                staged += 1;
            }
            None => warn!(
                "Unrecognized SQL dialect, no database driver staged in {}",
                general.join("db").display()
            ),
        }

        debug!("Staged {} template file(s)", staged);
        Ok(staged)
    }

    fn write_files(&self, files: &[GeneratedFile], written: &mut Vec<PathBuf>) -> Result<()> {
        for file in files {
            let dir = self.base().join(&file.directory);
            std::fs::create_dir_all(&dir).map_err(|e| CodegenError::file(&dir, e))?;

            let path = file.path_in(self.base());
            write_atomic(&path, &file.source)?;
            debug!("Wrote {}", path.display());
            written.push(path);

            if self.config.format_generated {
                format_best_effort(self.formatter, &dir);
            }
        }
        Ok(())
    }

    fn reconcile<S: LedgerStore>(
        &self,
        package: &str,
        files: &[GeneratedFile],
        register: &mut ArtifactRegister<S>,
        report: &mut DeployReport,
        errors: &mut GenerationErrors,
    ) {
        let mut owned: BTreeMap<&str, Vec<PathBuf>> = BTreeMap::new();
        for file in files {
            owned
                .entry(file.owner.as_str())
                .or_default()
                .push(file.path_in(self.base()));
        }
        for (owner, paths) in owned {
            register.add_object(owner, package, paths);
        }

        report.orphans = match register.save() {
            Ok(orphans) => orphans,
            Err(e) => {
                errors.push(Stage::Reconciliation, e);
                return;
            }
        };

        if !self.config.auto_delete {
            if !report.orphans.is_empty() {
                info!(
                    "{} orphaned file(s) kept (auto_delete is off)",
                    report.orphans.len()
                );
            }
            return;
        }

        for orphan in &report.orphans {
            match remove_path(orphan) {
                Ok(()) => {
                    info!("Removed orphan {}", orphan.display());
                    report.removed.push(orphan.clone());
                    if let Some(parent) = orphan.parent() {
                        self.prune_owner_dir(parent);
                    }
                }
                Err(e) => errors.push(Stage::Reconciliation, e),
            }
        }
    }

    /// Drop an emptied storage directory, never the layout directories
    fn prune_owner_dir(&self, dir: &Path) {
        let storages = self.base().join(STORAGES_DIR);
        if dir.starts_with(&storages) && dir != storages && prune_empty_dir(dir) {
            debug!("Pruned empty {}", dir.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SqlDialect;
    use crate::formatter::NoopFormatter;
    use crate::register::MemoryLedgerStore;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    struct Fixture {
        _dir: TempDir,
        config: GeneratorConfig,
    }

    fn fixture() -> Fixture {
        let dir = tempdir().unwrap();
        let templates = dir.path().join("templates");
        fs::create_dir_all(templates.join("query_builder")).unwrap();
        fs::create_dir_all(templates.join("general")).unwrap();
        fs::write(templates.join("query_builder/mod.rs"), "// qb").unwrap();
        fs::write(templates.join("general/mysql.rs.tmpl"), "// mysql").unwrap();
        fs::write(templates.join("general/postgresql.rs.tmpl"), "// pg").unwrap();

        let config = GeneratorConfig {
            database_dir: dir.path().join("out/database"),
            template_dir: templates,
            format_generated: false,
            ..GeneratorConfig::default()
        };
        Fixture { _dir: dir, config }
    }

    fn storage(owner: &str) -> GeneratedFile {
        let module = owner.to_lowercase();
        GeneratedFile::new(
            owner,
            format!("storages/{}", module),
            format!("{}.rs", module),
            format!("// {}", owner),
        )
    }

    #[test]
    fn test_deploy_layout() {
        let f = fixture();
        let store = MemoryLedgerStore::new();
        let mut register = ArtifactRegister::load(&store).unwrap();

        let report = Deployer::new(&f.config, &NoopFormatter)
            .deploy("models", &[storage("User")], &mut register)
            .unwrap();

        let base = &f.config.database_dir;
        assert_eq!(report.staged, 2);
        assert_eq!(report.written, vec![base.join("storages/user/user.rs")]);
        assert!(report.orphans.is_empty());
        assert_eq!(fs::read_to_string(base.join("general/db/db.rs")).unwrap(), "// mysql");
        assert!(base.join("general/query_builder/mod.rs").is_file());

        let ledger = store.snapshot().unwrap();
        assert_eq!(ledger.get("User").unwrap().package, "models");
    }

    #[test]
    fn test_postgres_driver() {
        let mut f = fixture();
        f.config.sql_dialect = SqlDialect::Postgresql;
        let mut register = ArtifactRegister::load(MemoryLedgerStore::new()).unwrap();

        Deployer::new(&f.config, &NoopFormatter)
            .deploy("models", &[], &mut register)
            .unwrap();
        let db = f.config.database_dir.join("general/db/db.rs");
        assert_eq!(fs::read_to_string(db).unwrap(), "// pg");
    }

    #[test]
    fn test_unrecognized_dialect_stages_no_driver() {
        let mut f = fixture();
        f.config.sql_dialect = SqlDialect::Unrecognized;
        let mut register = ArtifactRegister::load(MemoryLedgerStore::new()).unwrap();

        let report = Deployer::new(&f.config, &NoopFormatter)
            .deploy("models", &[storage("User")], &mut register)
            .unwrap();
        assert_eq!(report.staged, 1);
        assert!(!f.config.database_dir.join("general/db/db.rs").exists());
        assert!(f.config.database_dir.join("general/db").is_dir());
    }

    #[test]
    fn test_removed_owner_is_deleted_with_auto_delete() {
        let mut f = fixture();
        f.config.auto_delete = true;
        let store = MemoryLedgerStore::new();
        let deployer = Deployer::new(&f.config, &NoopFormatter);

        let mut register = ArtifactRegister::load(&store).unwrap();
        deployer
            .deploy("models", &[storage("User"), storage("Order")], &mut register)
            .unwrap();

        let mut register = ArtifactRegister::load(&store).unwrap();
        let report = deployer
            .deploy("models", &[storage("User")], &mut register)
            .unwrap();

        let base = &f.config.database_dir;
        assert_eq!(report.orphans, vec![base.join("storages/order/order.rs")]);
        assert_eq!(report.removed, report.orphans);
        assert!(!base.join("storages/order").exists());
        assert!(base.join("storages/user/user.rs").is_file());
        assert!(base.join("storages").is_dir());
    }

    #[test]
    fn test_orphans_kept_without_auto_delete() {
        let f = fixture();
        let store = MemoryLedgerStore::new();
        let deployer = Deployer::new(&f.config, &NoopFormatter);

        let mut register = ArtifactRegister::load(&store).unwrap();
        deployer
            .deploy("models", &[storage("User"), storage("Order")], &mut register)
            .unwrap();
        let mut register = ArtifactRegister::load(&store).unwrap();
        let report = deployer
            .deploy("models", &[storage("User")], &mut register)
            .unwrap();

        assert_eq!(report.orphans.len(), 1);
        assert!(report.removed.is_empty());
        assert!(report.orphans[0].is_file());
    }

    #[test]
    fn test_missing_templates_abort_before_writing() {
        let mut f = fixture();
        f.config.template_dir = f.config.template_dir.join("missing");
        let store = MemoryLedgerStore::new();
        let mut register = ArtifactRegister::load(&store).unwrap();

        let errors = Deployer::new(&f.config, &NoopFormatter)
            .deploy("models", &[storage("User")], &mut register)
            .unwrap_err();

        assert_eq!(errors.get(Stage::Templating).len(), 1);
        assert!(!f.config.database_dir.join("storages/user").exists());
        assert!(store.snapshot().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_partial_write_skips_reconciliation() {
        let mut f = fixture();
        f.config.auto_delete = true;
        let store = MemoryLedgerStore::new();
        let deployer = Deployer::new(&f.config, &NoopFormatter);

        let mut register = ArtifactRegister::load(&store).unwrap();
        deployer
            .deploy("models", &[storage("User"), storage("Order")], &mut register)
            .unwrap();

        // A file where a storage directory has to go makes the second write fail
        let blocker = f.config.database_dir.join("storages/post");
        fs::write(&blocker, "").unwrap();

        let mut register = ArtifactRegister::load(&store).unwrap();
        let errors = deployer
            .deploy("models", &[storage("User"), storage("Post")], &mut register)
            .unwrap_err();

        assert!(errors.has(Stage::Templating));
        assert!(!errors.has(Stage::Reconciliation));
        // Order survives: its removal would have come from a partial ledger
        assert!(f.config.database_dir.join("storages/order/order.rs").is_file());
        assert!(store.snapshot().unwrap().get("Order").is_some());
    }

    #[test]
    fn test_failed_ledger_save_deletes_nothing() {
        use crate::register::OwnershipLedger;

        struct ReadOnlyStore(OwnershipLedger);
        impl LedgerStore for ReadOnlyStore {
            fn load(&self) -> Result<OwnershipLedger> {
                Ok(self.0.clone())
            }
            fn save(&self, _ledger: &OwnershipLedger) -> Result<()> {
                Err(CodegenError::PersistenceError("read-only".into()))
            }
        }

        let mut f = fixture();
        f.config.auto_delete = true;
        let deployer = Deployer::new(&f.config, &NoopFormatter);

        let store = MemoryLedgerStore::new();
        let mut register = ArtifactRegister::load(&store).unwrap();
        deployer
            .deploy("models", &[storage("User"), storage("Order")], &mut register)
            .unwrap();

        let mut register = ArtifactRegister::load(ReadOnlyStore(store.snapshot().unwrap())).unwrap();
        let errors = deployer
            .deploy("models", &[storage("User")], &mut register)
            .unwrap_err();

        assert_eq!(errors.get(Stage::Reconciliation).len(), 1);
        assert!(!errors.has(Stage::Templating));
        assert!(f.config.database_dir.join("storages/order/order.rs").is_file());
        assert!(f.config.database_dir.join("storages/user/user.rs").is_file());
    }

    #[test]
    fn test_formatter_runs_per_directory() {
        use std::cell::RefCell;

        struct Recording(RefCell<Vec<PathBuf>>);
        impl SourceFormatter for Recording {
            fn format(&self, path: &Path) -> Result<()> {
                self.0.borrow_mut().push(path.to_path_buf());
                Err(CodegenError::FormatWarning("not installed".into()))
            }
        }

        let mut f = fixture();
        f.config.format_generated = true;
        let formatter = Recording(RefCell::new(Vec::new()));
        let mut register = ArtifactRegister::load(MemoryLedgerStore::new()).unwrap();

        let report = Deployer::new(&f.config, &formatter)
            .deploy("models", &[storage("User")], &mut register)
            .unwrap();

        assert_eq!(report.written.len(), 1);
        assert_eq!(
            formatter.0.borrow().as_slice(),
            &[f.config.database_dir.join("storages/user")]
        );
    }
}
