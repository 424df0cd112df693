use heck::ToKebabCase;
use itertools::Itertools;
use tracing::instrument;

use crate::{
    errors::{AppError, Result, UserFacingError, VaultError},
    model::{ActiveDocument, NOTE_EXTENSION, NoteRef, NoteWriteRequest, TermDefinition},
    storage::Vault,
    utils::{path_segments, sanitize_file_stem},
};

/// Builds the request to write the note for the given definition into the folder.
///
/// Fails with [UserFacingError::MalformedResponse] if the term can't be used as a file name.
pub fn note_write_request(
    folder: &str,
    definition: &TermDefinition,
    source: Option<&ActiveDocument>,
    tag_category: bool,
) -> Result<NoteWriteRequest> {
    let Some(file_stem) = sanitize_file_stem(&definition.term) else {
        tracing::error!("The term '{}' can't be used as a note name", definition.term);
        let reason = format!("'{}' is not a valid note name", definition.term);
        return Err(UserFacingError::MalformedResponse(reason).into());
    };
    if file_stem != definition.term {
        tracing::info!("Term '{}' will be written as '{file_stem}'", definition.term);
    }
    Ok(NoteWriteRequest {
        folder_path: path_segments(folder).join("/"),
        file_stem,
        body: compose_note_body(definition, source, tag_category),
    })
}

/// Composes the content of a definition note
fn compose_note_body(definition: &TermDefinition, source: Option<&ActiveDocument>, tag_category: bool) -> String {
    let mut body = String::new();
    if tag_category
        && let Some(tag) = definition.category.as_deref().map(|c| c.to_kebab_case()).filter(|t| !t.is_empty())
    {
        body.push_str(&format!("---\ntags:\n  - {tag}\n---\n\n"));
    }
    body.push_str(&definition.definition);
    body.push_str("\n\n");
    if let Some(source) = source {
        body.push_str(&format!("- Source: [[{}]]\n", source.name));
    }
    body
}

/// Writes a new note to the vault, creating every missing folder of its path first.
///
/// Folders created before a failure are kept on the vault.
#[instrument(skip_all, fields(folder = %req.folder_path, stem = %req.file_stem))]
pub async fn materialize_note<V: Vault>(vault: &V, req: &NoteWriteRequest) -> Result<NoteRef> {
    // Walk the folder chain, creating each missing level
    let mut current = String::new();
    for segment in path_segments(&req.folder_path) {
        if !current.is_empty() {
            current.push('/');
        }
        current.push_str(segment);
        if vault.exists(&current).await.map_err(|err| filesystem_failure(&current, err))? {
            continue;
        }
        tracing::debug!("Creating folder {current}");
        match vault.create_folder(&current).await {
            // Someone else created it in the meantime
            Ok(()) | Err(VaultError::AlreadyExists) => (),
            Err(err) => return Err(filesystem_failure(&current, err)),
        }
    }

    let note_path = req.note_path();
    if vault.exists(&note_path).await.map_err(|err| filesystem_failure(&note_path, err))? {
        tracing::warn!("Note {note_path} already exists");
        return Err(UserFacingError::NoteAlreadyExists(note_path).into());
    }
    match vault.create_file(&note_path, &req.body).await {
        Ok(()) => (),
        Err(VaultError::AlreadyExists) => {
            tracing::warn!("Note {note_path} was created by someone else");
            return Err(UserFacingError::NoteAlreadyExists(note_path).into());
        }
        Err(err) => return Err(filesystem_failure(&note_path, err)),
    }
    tracing::info!("Created note {note_path}");

    let id = note_path
        .strip_suffix(&format!(".{NOTE_EXTENSION}"))
        .unwrap_or(&note_path)
        .to_string();
    Ok(NoteRef {
        id,
        stem: req.file_stem.clone(),
    })
}

fn filesystem_failure(path: &str, err: VaultError) -> AppError {
    match err {
        VaultError::AlreadyExists => UserFacingError::FilesystemFailure(format!("{path} already exists")).into(),
        VaultError::Unexpected(report) => {
            tracing::error!("Vault operation on {path} failed: {report:?}");
            UserFacingError::FilesystemFailure(format!("couldn't create {path}")).into()
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::storage::memory::{MemoryVault, VaultOp};

    fn definition(term: &str) -> TermDefinition {
        TermDefinition {
            term: term.to_string(),
            definition: String::from("A processor for [[Graphics]]"),
            category: Some(String::from("Computer Hardware")),
        }
    }

    #[test]
    fn test_note_body() {
        let def = definition("gpu");
        let source = ActiveDocument::from_path("Projects/Notes/hardware.md");

        let req = note_write_request("Glossary", &def, Some(&source), false).unwrap();
        assert_eq!(req.body, "A processor for [[Graphics]]\n\n- Source: [[hardware]]\n");

        let req = note_write_request("Glossary", &def, None, false).unwrap();
        assert_eq!(req.body, "A processor for [[Graphics]]\n\n");

        let req = note_write_request("Glossary", &def, None, true).unwrap();
        assert_eq!(
            req.body,
            "---\ntags:\n  - computer-hardware\n---\n\nA processor for [[Graphics]]\n\n"
        );
    }

    #[test]
    fn test_note_request_sanitizes_term() {
        let req = note_write_request("/A//B/", &definition("TCP/IP"), None, false).unwrap();
        assert_eq!(req.folder_path, "A/B");
        assert_eq!(req.file_stem, "TCP-IP");
        assert_eq!(req.note_path(), "A/B/TCP-IP.md");

        assert!(matches!(
            note_write_request("Glossary", &definition(".."), None, false),
            Err(AppError::UserFacing(UserFacingError::MalformedResponse(_)))
        ));
    }

    #[tokio::test]
    async fn test_creates_folder_chain_in_order() {
        let vault = MemoryVault::new();
        let req = note_write_request("A/B/C", &definition("gpu"), None, false).unwrap();

        let note = materialize_note(&vault, &req).await.unwrap();

        assert_eq!(
            note,
            NoteRef {
                id: String::from("A/B/C/gpu"),
                stem: String::from("gpu"),
            }
        );
        assert_eq!(
            vault.ops(),
            vec![
                VaultOp::CreateFolder(String::from("A")),
                VaultOp::CreateFolder(String::from("A/B")),
                VaultOp::CreateFolder(String::from("A/B/C")),
                VaultOp::CreateFile(String::from("A/B/C/gpu.md")),
            ]
        );
        assert_eq!(vault.file("A/B/C/gpu.md").as_deref(), Some("A processor for [[Graphics]]\n\n"));
    }

    #[tokio::test]
    async fn test_existing_folders_are_kept() {
        let vault = MemoryVault::new().with_folder("A").with_folder("A/B");
        let req = note_write_request("A/B/C", &definition("gpu"), None, false).unwrap();

        materialize_note(&vault, &req).await.unwrap();

        assert_eq!(
            vault.ops(),
            vec![
                VaultOp::CreateFolder(String::from("A/B/C")),
                VaultOp::CreateFile(String::from("A/B/C/gpu.md")),
            ]
        );
    }

    #[tokio::test]
    async fn test_existing_note_is_not_overwritten() {
        let vault = MemoryVault::new()
            .with_folder("Glossary")
            .with_file("Glossary/gpu.md", "original");
        let req = note_write_request("Glossary", &definition("gpu"), None, false).unwrap();

        let res = materialize_note(&vault, &req).await;

        assert!(matches!(
            res,
            Err(AppError::UserFacing(UserFacingError::NoteAlreadyExists(ref path))) if path == "Glossary/gpu.md"
        ));
        assert_eq!(vault.ops(), Vec::new());
        assert_eq!(vault.file("Glossary/gpu.md").as_deref(), Some("original"));
    }

    #[tokio::test]
    async fn test_note_at_vault_root() {
        let vault = MemoryVault::new();
        let req = note_write_request("", &definition("gpu"), None, false).unwrap();

        let note = materialize_note(&vault, &req).await.unwrap();

        assert_eq!(note.id, "gpu");
        assert_eq!(vault.ops(), vec![VaultOp::CreateFile(String::from("gpu.md"))]);
    }

    #[tokio::test]
    async fn test_rejected_write_is_a_filesystem_failure() {
        let vault = MemoryVault::new().read_only();
        let req = note_write_request("Glossary", &definition("gpu"), None, false).unwrap();

        assert!(matches!(
            materialize_note(&vault, &req).await,
            Err(AppError::UserFacing(UserFacingError::FilesystemFailure(_)))
        ));
    }
}
