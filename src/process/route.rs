use color_eyre::Result;

use super::{Process, ProcessOutput};
use crate::{cli::RouteProcess, config::Config, model::RoutingContext, service::resolve_folder, storage::FsVault};

impl Process for RouteProcess {
    async fn execute(self, config: Config) -> Result<ProcessOutput> {
        let vault = FsVault::new(self.vault.unwrap_or(config.vault_dir));
        let document_path = match &self.document {
            Some(document) => match vault.relative_path(document) {
                Ok(path) => Some(path),
                Err(err) => return Ok(ProcessOutput::fail().stderr(format!("[Error] {err}"))),
            },
            None => None,
        };
        let folder = resolve_folder(&RoutingContext {
            active_document_path: document_path.as_deref(),
            mappings: &config.glossary.folder_mappings,
            default_folder: &config.glossary.default_folder,
        });
        tracing::info!("Routed {document_path:?} to {folder}");
        Ok(ProcessOutput::success().stdout(format!("{folder}\n")))
    }
}
