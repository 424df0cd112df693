use std::{
    io::ErrorKind,
    path::{Component, Path, PathBuf},
};

use color_eyre::{
    Report,
    eyre::{Context, eyre},
};
use tokio::{fs, io::AsyncWriteExt};
use tracing::instrument;

use super::Vault;
use crate::{errors::VaultError, model::ActiveDocument};

/// A [Vault] backed by a directory on the local filesystem
#[derive(Clone, Debug)]
pub struct FsVault {
    root: PathBuf,
    active: Option<ActiveDocument>,
}

impl FsVault {
    /// Creates a new vault rooted at the given dir, with no active document.
    ///
    /// A relative root is made absolute against the current dir, so absolute documents can be located within it.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            root: std::path::absolute(&root).unwrap_or(root),
            active: None,
        }
    }

    /// Sets the document the user is editing
    pub fn with_active_document(mut self, active: Option<ActiveDocument>) -> Self {
        self.active = active;
        self
    }

    /// Root dir of the vault
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Converts a filesystem path into a `/`-separated path relative to the vault root.
    ///
    /// Relative paths are considered relative to the vault root already.
    pub fn relative_path(&self, path: impl AsRef<Path>) -> color_eyre::Result<String> {
        let path = path.as_ref();
        let relative = if path.is_absolute() {
            path.strip_prefix(&self.root)
                .wrap_err_with(|| format!("{} is not inside the vault {}", path.display(), self.root.display()))?
        } else {
            path
        };
        let mut segments = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(segment) => segments.push(segment.to_string_lossy().into_owned()),
                Component::CurDir => (),
                _ => return Err(eyre!("Invalid vault path: {}", path.display())),
            }
        }
        Ok(segments.join("/"))
    }

    /// Resolves a vault path into a filesystem path
    fn resolve(&self, path: &str) -> PathBuf {
        path.split('/')
            .filter(|s| !s.is_empty())
            .fold(self.root.clone(), |acc, segment| acc.join(segment))
    }
}

impl Vault for FsVault {
    async fn exists(&self, path: &str) -> Result<bool, VaultError> {
        let full_path = self.resolve(path);
        Ok(fs::try_exists(&full_path)
            .await
            .wrap_err_with(|| format!("Couldn't check {}", full_path.display()))?)
    }

    #[instrument(skip(self))]
    async fn create_folder(&self, path: &str) -> Result<(), VaultError> {
        let full_path = self.resolve(path);
        match fs::create_dir(&full_path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => Err(VaultError::AlreadyExists),
            Err(err) => Err(Report::new(err)
                .wrap_err(format!("Couldn't create folder {}", full_path.display()))
                .into()),
        }
    }

    #[instrument(skip(self, content))]
    async fn create_file(&self, path: &str, content: &str) -> Result<(), VaultError> {
        let full_path = self.resolve(path);
        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&full_path)
            .await
        {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::AlreadyExists => return Err(VaultError::AlreadyExists),
            Err(err) => {
                return Err(Report::new(err)
                    .wrap_err(format!("Couldn't create file {}", full_path.display()))
                    .into());
            }
        };
        file.write_all(content.as_bytes())
            .await
            .wrap_err_with(|| format!("Couldn't write file {}", full_path.display()))?;
        file.flush()
            .await
            .wrap_err_with(|| format!("Couldn't write file {}", full_path.display()))?;
        Ok(())
    }

    fn active_document(&self) -> Option<ActiveDocument> {
        self.active.clone()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[tokio::test]
    async fn test_create_folder_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let vault = FsVault::new(dir.path());

        assert!(!vault.exists("Glossary").await.unwrap());
        vault.create_folder("Glossary").await.unwrap();
        assert!(vault.exists("Glossary").await.unwrap());
        assert!(matches!(
            vault.create_folder("Glossary").await,
            Err(VaultError::AlreadyExists)
        ));

        vault.create_file("Glossary/gpu.md", "A processor\n").await.unwrap();
        assert_eq!(
            std::fs::read_to_string(dir.path().join("Glossary").join("gpu.md")).unwrap(),
            "A processor\n"
        );
    }

    #[tokio::test]
    async fn test_create_file_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("gpu.md"), "original").unwrap();
        let vault = FsVault::new(dir.path());

        assert!(matches!(
            vault.create_file("gpu.md", "replacement").await,
            Err(VaultError::AlreadyExists)
        ));
        assert_eq!(std::fs::read_to_string(dir.path().join("gpu.md")).unwrap(), "original");
    }

    #[tokio::test]
    async fn test_create_folder_without_parent_fails() {
        let dir = tempfile::tempdir().unwrap();
        let vault = FsVault::new(dir.path());

        assert!(matches!(
            vault.create_folder("A/B").await,
            Err(VaultError::Unexpected(_))
        ));
    }

    #[test]
    fn test_relative_path() {
        let dir = tempfile::tempdir().unwrap();
        let vault = FsVault::new(dir.path());

        assert_eq!(
            vault.relative_path(dir.path().join("Projects").join("a.md")).unwrap(),
            "Projects/a.md"
        );
        assert_eq!(vault.relative_path("./Projects/a.md").unwrap(), "Projects/a.md");
        assert!(vault.relative_path("../outside.md").is_err());
        assert!(vault.relative_path("/somewhere/else.md").is_err());
    }

    #[test]
    fn test_relative_root_locates_absolute_documents() {
        let cwd = std::env::current_dir().unwrap();
        let vault = FsVault::new(".");

        assert!(vault.root().is_absolute());
        assert_eq!(
            vault.relative_path(cwd.join("Projects").join("a.md")).unwrap(),
            "Projects/a.md"
        );
        assert_eq!(vault.relative_path("Projects/a.md").unwrap(), "Projects/a.md");
    }
}
