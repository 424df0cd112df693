//! Domain types flowing through a define run

use serde::{Deserialize, Serialize};

/// Extension of every note file written to the vault
pub const NOTE_EXTENSION: &str = "md";

/// A term and its definition, as extracted by the language model
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TermDefinition {
    /// The trimmed term, never empty
    pub term: String,
    /// The definition, never empty. It may contain `[[...]]` links
    pub definition: String,
    /// Optional category of the term
    pub category: Option<String>,
}

/// Routes notes coming from documents under `source_path` to the `target_path` folder
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderMapping {
    /// Prefix tested against the full path of the source document
    pub source_path: String,
    /// Folder where the notes are written
    pub target_path: String,
}

impl FolderMapping {
    pub fn new(source_path: impl Into<String>, target_path: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            target_path: target_path.into(),
        }
    }
}

/// Everything needed to resolve the destination folder of a note
#[derive(Clone, Copy, Debug)]
pub struct RoutingContext<'a> {
    /// Vault path of the document the selection came from, if any
    pub active_document_path: Option<&'a str>,
    /// Ordered mappings, the first match wins
    pub mappings: &'a [FolderMapping],
    /// Folder used when there's no document or no mapping matches
    pub default_folder: &'a str,
}

/// The document the user was editing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActiveDocument {
    /// Path relative to the vault root, using `/` as separator
    pub path: String,
    /// Name of the document, without its extension
    pub name: String,
}

impl ActiveDocument {
    /// Builds a document from its vault path, deriving the name from the last segment
    pub fn from_path(path: impl Into<String>) -> Self {
        let path = path.into();
        let file_name = path.rsplit('/').next().unwrap_or(&path);
        let name = file_name
            .strip_suffix(&format!(".{NOTE_EXTENSION}"))
            .unwrap_or(file_name)
            .to_string();
        Self { path, name }
    }
}

/// A note to be created on the vault
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoteWriteRequest {
    /// Destination folder, possibly multi-segment
    pub folder_path: String,
    /// Name of the file, without extension
    pub file_stem: String,
    /// Content of the note
    pub body: String,
}

impl NoteWriteRequest {
    /// Vault path of the note file
    pub fn note_path(&self) -> String {
        let folder = self.folder_path.trim_matches('/');
        if folder.is_empty() {
            format!("{}.{NOTE_EXTENSION}", self.file_stem)
        } else {
            format!("{folder}/{}.{NOTE_EXTENSION}", self.file_stem)
        }
    }
}

/// A note already written to the vault
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoteRef {
    /// Vault path of the note, without extension
    pub id: String,
    /// File name of the note, without extension
    pub stem: String,
}
