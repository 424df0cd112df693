use std::fmt;

use tracing::instrument;

use super::{
    GlossaryService, build_define_prompt, link_first_occurrence, materialize_note, note_write_request,
    parse_term_definition,
};
use crate::{
    ai::LanguageModel,
    editor::Editor,
    errors::{AppError, Result, UserFacingError},
    model::{NoteRef, TermDefinition},
    notify::{NotificationKind, Notifier},
    storage::Vault,
};

/// Stages of a define run, in the order they're reached
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum DefineStage {
    Start,
    PromptBuilt,
    ResponseReceived,
    Parsed,
    NoteWritten,
    Linked,
    Replaced,
    Done,
}

/// Outcome of a successful define run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DefinedTerm {
    /// The definition replied by the language model
    pub definition: TermDefinition,
    /// The note written to the vault
    pub note: NoteRef,
    /// The folder the note was routed to
    pub folder: String,
    /// The text that replaced the selection
    pub text: String,
    /// Whether the term was found and linked on the selection
    pub linked: bool,
}

/// A define run that didn't reach [DefineStage::Done]
#[derive(Debug)]
pub struct DefineAborted {
    /// The stage whose step failed
    pub stage: DefineStage,
    /// The reason of the failure
    pub error: AppError,
}

impl fmt::Display for DefineAborted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Aborted at {}: {}", self.stage, self.error)
    }
}

impl<M, V, N> GlossaryService<M, V, N>
where
    M: LanguageModel + Sync,
    V: Vault + Sync,
    N: Notifier,
{
    /// Defines the term described by the editor's selection.
    ///
    /// A note with the definition is written to the vault and the selection is replaced with the same text, where the
    /// first occurrence of the term links to the new note. Exactly one notification is sent to the user, either on
    /// success or failure. Partial effects of a failed run (like created folders or notes) are not rolled back.
    #[instrument(skip_all)]
    pub async fn define_term<E: Editor>(&self, editor: &mut E) -> Result<DefinedTerm, DefineAborted> {
        let mut stage = DefineStage::Start;
        match self.run_define(editor, &mut stage).await {
            Ok(defined) => {
                let message = if defined.linked {
                    format!("Defined '{}' on {}", defined.definition.term, defined.note.id)
                } else {
                    format!(
                        "Defined '{}' on {}, but the term couldn't be linked on the selected text",
                        defined.definition.term, defined.note.id
                    )
                };
                self.notifier.notify(NotificationKind::Success, &message);
                Ok(defined)
            }
            Err(error) => {
                let message = match &error {
                    AppError::UserFacing(err) => {
                        tracing::warn!("Define aborted at {stage}: {err}");
                        err.to_string()
                    }
                    AppError::Unexpected(report) => {
                        tracing::error!("Define aborted at {stage}: {report:?}");
                        match &self.log_path {
                            Some(log_path) => format!(
                                "Couldn't define the term: {report}\nDetails were logged to {}",
                                log_path.display()
                            ),
                            None => format!("Couldn't define the term: {report}"),
                        }
                    }
                };
                self.notifier.notify(NotificationKind::Failure, &message);
                Err(DefineAborted { stage, error })
            }
        }
    }

    /// Runs every step of a define run, leaving on `stage` the last stage attempted
    async fn run_define<E: Editor>(&self, editor: &mut E, stage: &mut DefineStage) -> Result<DefinedTerm> {
        let selection = editor.selected_text().await?;
        if selection.trim().is_empty() {
            return Err(UserFacingError::EmptySelection.into());
        }
        let source = self.vault.active_document();

        advance(stage, DefineStage::PromptBuilt);
        let prompt = build_define_prompt(&self.sys_prompt, &selection, source.as_ref())?;
        tracing::trace!("Prompt:\n{}", prompt.system);

        advance(stage, DefineStage::ResponseReceived);
        let raw = self.model.complete(&prompt).await?;
        tracing::trace!("Response:\n{raw}");

        advance(stage, DefineStage::Parsed);
        let definition = parse_term_definition(&raw)?;
        tracing::debug!("Parsed definition for '{}'", definition.term);

        advance(stage, DefineStage::NoteWritten);
        let folder = self
            .resolve_folder(source.as_ref().map(|doc| doc.path.as_str()))
            .to_string();
        let req = note_write_request(&folder, &definition, source.as_ref(), self.glossary.tag_category)?;
        let note = materialize_note(&self.vault, &req).await?;

        advance(stage, DefineStage::Linked);
        let text = link_first_occurrence(&selection, &definition.term, &note.stem);
        let linked = text != selection.as_str();
        let text = text.into_owned();

        advance(stage, DefineStage::Replaced);
        editor.replace_selected_text(text.clone()).await?;

        advance(stage, DefineStage::Done);
        tracing::info!("Term '{}' defined on {}", definition.term, note.id);
        Ok(DefinedTerm {
            definition,
            note,
            folder,
            text,
            linked,
        })
    }
}

fn advance(stage: &mut DefineStage, next: DefineStage) {
    tracing::debug!("{stage} -> {next}");
    *stage = next;
}
