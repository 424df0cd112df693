use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Mutex,
};

use color_eyre::eyre::eyre;

use super::Vault;
use crate::{errors::VaultError, model::ActiveDocument};

/// A mutating operation performed on a [MemoryVault]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VaultOp {
    CreateFolder(String),
    CreateFile(String),
}

#[derive(Default)]
struct State {
    folders: BTreeSet<String>,
    files: BTreeMap<String, String>,
    ops: Vec<VaultOp>,
}

/// In-memory [Vault] recording every mutation, for tests
#[derive(Default)]
pub struct MemoryVault {
    state: Mutex<State>,
    active: Option<ActiveDocument>,
    read_only: bool,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_active_document(mut self, path: &str) -> Self {
        self.active = Some(ActiveDocument::from_path(path));
        self
    }

    pub fn with_folder(self, path: &str) -> Self {
        self.state.lock().unwrap().folders.insert(path.to_string());
        self
    }

    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .files
            .insert(path.to_string(), content.to_string());
        self
    }

    /// Rejects every creation with an unexpected error
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn ops(&self) -> Vec<VaultOp> {
        self.state.lock().unwrap().ops.clone()
    }

    pub fn file(&self, path: &str) -> Option<String> {
        self.state.lock().unwrap().files.get(path).cloned()
    }
}

impl Vault for MemoryVault {
    async fn exists(&self, path: &str) -> Result<bool, VaultError> {
        let state = self.state.lock().unwrap();
        Ok(state.folders.contains(path) || state.files.contains_key(path))
    }

    async fn create_folder(&self, path: &str) -> Result<(), VaultError> {
        if self.read_only {
            return Err(eyre!("read-only vault").into());
        }
        let mut state = self.state.lock().unwrap();
        if state.folders.contains(path) || state.files.contains_key(path) {
            return Err(VaultError::AlreadyExists);
        }
        state.folders.insert(path.to_string());
        state.ops.push(VaultOp::CreateFolder(path.to_string()));
        Ok(())
    }

    async fn create_file(&self, path: &str, content: &str) -> Result<(), VaultError> {
        if self.read_only {
            return Err(eyre!("read-only vault").into());
        }
        let mut state = self.state.lock().unwrap();
        if state.folders.contains(path) || state.files.contains_key(path) {
            return Err(VaultError::AlreadyExists);
        }
        state.files.insert(path.to_string(), content.to_string());
        state.ops.push(VaultOp::CreateFile(path.to_string()));
        Ok(())
    }

    fn active_document(&self) -> Option<ActiveDocument> {
        self.active.clone()
    }
}
