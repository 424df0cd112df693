//! The document tree where definition notes are written

use crate::{errors::VaultError, model::ActiveDocument};

mod fs;
#[cfg(test)]
pub(crate) mod memory;

pub use fs::FsVault;

/// Storage of the documents, addressed with `/`-separated paths relative to the vault root
#[trait_variant::make(Send)]
pub trait Vault {
    /// Whether a file or folder exists at the given path
    async fn exists(&self, path: &str) -> Result<bool, VaultError>;

    /// Creates a single folder, whose parent must exist.
    ///
    /// Fails with [VaultError::AlreadyExists] if there's already something at the path.
    async fn create_folder(&self, path: &str) -> Result<(), VaultError>;

    /// Creates a new file with the given content, never overwriting.
    ///
    /// Fails with [VaultError::AlreadyExists] if there's already something at the path.
    async fn create_file(&self, path: &str, content: &str) -> Result<(), VaultError>;

    /// The document the user is currently editing, if any
    fn active_document(&self) -> Option<ActiveDocument>;
}
