use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::io::recovery::{RecoveryCategory, RecoveryEntry, log_recovery};
use crate::io::storage::{FileStorage, ListSource, Storage};
use crate::model::config::Config;
use crate::ops::project_ops::{ProjectStore, StoreError};

/// Name of the directory holding config, storage files and logs
pub const DATA_DIR_NAME: &str = ".taskdesk";

/// Error type for workspace discovery and loading
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("not a taskdesk workspace: no .taskdesk/ directory found (run `td init`)")]
    NotAWorkspace,
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("could not edit config.toml: {0}")]
    ConfigEditError(#[from] toml_edit::TomlError),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// A discovered workspace: a directory containing `.taskdesk/config.toml`
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Directory containing `.taskdesk/`
    pub root: PathBuf,
    /// The `.taskdesk/` directory itself
    pub data_dir: PathBuf,
    pub config: Config,
}

/// Walk up from `start` looking for a `.taskdesk/` directory with a config.
pub fn discover_workspace(start: &Path) -> Result<PathBuf, WorkspaceError> {
    let mut current = start.to_path_buf();
    loop {
        let data_dir = current.join(DATA_DIR_NAME);
        if data_dir.is_dir() && data_dir.join("config.toml").exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(WorkspaceError::NotAWorkspace);
        }
    }
}

/// Load the workspace rooted at `root`.
pub fn load_workspace(root: &Path) -> Result<Workspace, WorkspaceError> {
    let data_dir = root.join(DATA_DIR_NAME);
    if !data_dir.is_dir() {
        return Err(WorkspaceError::NotAWorkspace);
    }
    let (config, _doc) = crate::io::config_io::read_config(&data_dir)?;
    Ok(Workspace {
        root: root.to_path_buf(),
        data_dir,
        config,
    })
}

impl Workspace {
    pub fn storage(&self) -> FileStorage {
        FileStorage::new(&self.data_dir)
    }

    pub fn storage_key(&self) -> &str {
        &self.config.storage.key
    }

    /// Open the project store on `project_index`.
    ///
    /// A malformed stored value is kept in the recovery log before the seed
    /// list replaces it. A list storage does not hold yet (seed, malformed,
    /// or tasks without ids) is written once here so task ids survive to the
    /// next run. A failed write is logged and the store still opens.
    pub fn open_store(&self, project_index: usize) -> Result<ProjectStore<FileStorage>, StoreError> {
        self.open_store_with(self.storage(), project_index)
    }

    /// Same as [`Workspace::open_store`], over a caller-supplied storage.
    pub fn open_store_with<S: Storage>(
        &self,
        storage: S,
        project_index: usize,
    ) -> Result<ProjectStore<S>, StoreError> {
        let mut store = ProjectStore::load(storage, self.storage_key(), project_index)?;
        match store.source() {
            ListSource::Malformed { raw, reason } => {
                warn!(
                    "event=storage_recovered key={} status=seeded",
                    self.storage_key()
                );
                log_recovery(
                    &self.data_dir,
                    RecoveryEntry::now(RecoveryCategory::Storage, "malformed project list")
                        .field("Key", self.storage_key())
                        .field("Reason", reason.as_str())
                        .body(raw.as_str()),
                );
            }
            ListSource::Seed => info!(
                "event=storage_seed key={} status=ok",
                self.storage_key()
            ),
            ListSource::IdsAssigned { count } => info!(
                "event=storage_ids_assigned key={} count={}",
                self.storage_key(),
                count
            ),
            ListSource::Stored => {}
        }
        if let Err(e) = store.persist_unsaved() {
            warn!(
                "event=store_persist key={} status=failed error={}",
                self.storage_key(),
                e
            );
        }
        Ok(store)
    }
}

/// Create `.taskdesk/` under `root` with the given config text.
/// Returns the data dir path.
pub fn create_data_dir(root: &Path, config_text: &str) -> Result<PathBuf, WorkspaceError> {
    let data_dir = root.join(DATA_DIR_NAME);
    fs::create_dir_all(&data_dir).map_err(|e| WorkspaceError::ReadError {
        path: data_dir.clone(),
        source: e,
    })?;
    fs::write(data_dir.join("config.toml"), config_text)?;
    Ok(data_dir)
}
