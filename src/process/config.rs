use color_eyre::Result;

use super::{Process, ProcessOutput};
use crate::{cli::ConfigProcess, config::Config};

impl Process for ConfigProcess {
    async fn execute(self, config: Config) -> Result<ProcessOutput> {
        let path = Config::path(self.config_file)?;
        let mut out = format!("{}\n", path.display());
        if self.verbose {
            out += &format!("data dir: {}\n", config.data_dir.display());
            out += &format!("vault dir: {}\n", config.vault_dir.display());
            out += &format!("model: {} ({})\n", config.ai.model, config.ai.endpoint);
        }
        Ok(ProcessOutput::success().stdout(out))
    }
}
