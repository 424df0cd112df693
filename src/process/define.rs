use color_eyre::Result;

use super::{Process, ProcessOutput};
use crate::{
    cli::DefineProcess,
    config::Config,
    editor::{BufferEditor, DocumentRangeEditor},
    errors::AppError,
    logging,
    model::ActiveDocument,
    notify::StderrNotifier,
    service::{DefineAborted, DefinedTerm, GlossaryService},
    storage::FsVault,
};

impl Process for DefineProcess {
    async fn execute(self, config: Config) -> Result<ProcessOutput> {
        let vault = FsVault::new(self.vault.unwrap_or_else(|| config.vault_dir.clone()));
        let active = match &self.document {
            Some(document) => match vault.relative_path(document) {
                Ok(path) => Some(ActiveDocument::from_path(path)),
                Err(err) => return Ok(ProcessOutput::fail().stderr(format!("[Error] {err}"))),
            },
            None => None,
        };
        // Relative documents are relative to the vault root
        let document_file = self.document.as_ref().map(|document| vault.root().join(document));
        let vault = vault.with_active_document(active);

        let (logs_path, logs_filter) = logging::resolve_path_and_filter(&config);
        let model = config.ai.client().map_err(AppError::into_report)?;
        let service = GlossaryService::new(
            config.glossary.clone(),
            config.ai.prompt.as_str(),
            model,
            vault,
            StderrNotifier,
        )
        .with_log_path(logs_filter.map(|_| logs_path));

        match (self.range, document_file, self.selection) {
            (Some(range), Some(document_file), _) => {
                let mut editor = DocumentRangeEditor::new(document_file, range);
                let res = service.define_term(&mut editor).await;
                Ok(into_output(res, None))
            }
            (None, _, Some(selection)) => {
                let mut editor = BufferEditor::new(selection.into_inner());
                let res = service.define_term(&mut editor).await;
                Ok(into_output(res, Some(editor)))
            }
            _ => Ok(ProcessOutput::fail()
                .stderr("[Error] Either the text to define or a document range must be provided")),
        }
    }
}

/// Converts the outcome of a define run into the process output.
///
/// The user was already notified by the service and failures were logged, so an aborted run is just a failed output.
/// Only the replaced text of a buffer is written out.
fn into_output(res: Result<DefinedTerm, DefineAborted>, buffer: Option<BufferEditor>) -> ProcessOutput {
    match (res, buffer) {
        (Ok(_), Some(buffer)) => ProcessOutput::success().stdout(buffer.into_text()),
        (Ok(_), None) => ProcessOutput::success(),
        (Err(DefineAborted { stage, .. }), _) => {
            tracing::debug!("Define process failed at {stage}");
            ProcessOutput::fail()
        }
    }
}

#[cfg(test)]
mod tests {
    use color_eyre::eyre::eyre;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        ai::scripted::ScriptedModel,
        config::GlossaryConfig,
        errors::UserFacingError,
        notify::{NotificationKind, RecordingNotifier},
        storage::memory::MemoryVault,
    };

    const GPU_REPLY: &str = r#"{"term":"gpu","definition":"A graphics processor"}"#;

    fn service(
        model: ScriptedModel,
        notifier: &RecordingNotifier,
    ) -> GlossaryService<ScriptedModel, MemoryVault, RecordingNotifier> {
        GlossaryService::new(
            GlossaryConfig::default(),
            "Define the term",
            model,
            MemoryVault::new(),
            notifier.clone(),
        )
    }

    #[tokio::test]
    async fn test_invalid_range_is_notified_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.md");
        std::fs::write(&path, "A GPU").unwrap();
        let notifier = RecordingNotifier::default();
        let service = service(ScriptedModel::replying([GPU_REPLY]), &notifier);

        let mut editor = DocumentRangeEditor::new(&path, 2..50);
        let out = into_output(service.define_term(&mut editor).await, None);

        assert_eq!(out, ProcessOutput::fail());
        let notifications = notifier.notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].0, NotificationKind::Failure);
        assert!(
            notifications[0].1.starts_with("Couldn't define the term: Range 2..50 is not valid"),
            "{}",
            notifications[0].1
        );
        assert!(!notifications[0].1.contains("Details were logged"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "A GPU");
    }

    #[tokio::test]
    async fn test_aborted_runs_are_failed_outputs() {
        for model in [
            ScriptedModel::failing(UserFacingError::NetworkFailure(String::from("timeout")).into()),
            ScriptedModel::failing(eyre!("boom").into()),
        ] {
            let notifier = RecordingNotifier::default();
            let service = service(model, &notifier);

            let mut editor = BufferEditor::new("A GPU is a graphics processor");
            let res = service.define_term(&mut editor).await;
            let out = into_output(res, Some(editor));

            assert_eq!(out, ProcessOutput::fail());
            assert_eq!(notifier.notifications().len(), 1);
        }
    }

    #[tokio::test]
    async fn test_linked_buffer_is_written_out() {
        let notifier = RecordingNotifier::default();
        let service = service(ScriptedModel::replying([GPU_REPLY]), &notifier);

        let mut editor = BufferEditor::new("A GPU is a graphics processor");
        let res = service.define_term(&mut editor).await;
        let out = into_output(res, Some(editor));

        assert_eq!(
            out,
            ProcessOutput::success().stdout("A [[gpu|GPU]] is a graphics processor")
        );
        assert_eq!(notifier.notifications().len(), 1);
    }
}
