use std::path::PathBuf;

use crate::{
    ai::LanguageModel,
    config::GlossaryConfig,
    model::RoutingContext,
    notify::Notifier,
    storage::Vault,
};

mod define;
mod link;
mod note;
mod prompt;
mod response;
mod router;

pub use define::{DefineAborted, DefineStage, DefinedTerm};
pub use link::link_first_occurrence;
pub use note::{materialize_note, note_write_request};
pub use prompt::build_define_prompt;
pub use response::parse_term_definition;
pub use router::resolve_folder;

/// Service turning selected text into glossary notes.
///
/// Each run only reads the service, so concurrent runs are independent. They share the vault, with no locking: two
/// runs defining the same term race, and the later one fails because the note already exists.
pub struct GlossaryService<M, V, N> {
    glossary: GlossaryConfig,
    sys_prompt: String,
    model: M,
    vault: V,
    notifier: N,
    log_path: Option<PathBuf>,
}

impl<M, V, N> GlossaryService<M, V, N>
where
    M: LanguageModel + Sync,
    V: Vault + Sync,
    N: Notifier,
{
    /// Creates a new instance of `GlossaryService`
    pub fn new(glossary: GlossaryConfig, sys_prompt: impl Into<String>, model: M, vault: V, notifier: N) -> Self {
        Self {
            glossary,
            sys_prompt: sys_prompt.into(),
            model,
            vault,
            notifier,
            log_path: None,
        }
    }

    /// Sets the file where the logs of the runs are written, to point the user at it on unexpected failures
    pub fn with_log_path(mut self, log_path: Option<PathBuf>) -> Self {
        self.log_path = log_path;
        self
    }

    /// The vault where notes are written
    pub fn vault(&self) -> &V {
        &self.vault
    }

    /// Resolves the folder where a note for a term defined on the given document would be written
    pub fn resolve_folder<'a>(&'a self, document_path: Option<&'a str>) -> &'a str {
        resolve_folder(&RoutingContext {
            active_document_path: document_path,
            mappings: &self.glossary.folder_mappings,
            default_folder: &self.glossary.default_folder,
        })
    }
}
