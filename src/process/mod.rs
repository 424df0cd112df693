use color_eyre::Result;

use crate::config::Config;

mod config;
mod define;
mod route;

/// Represents the final outcome of a [Process] execution
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Whether the process succeeded
    pub success: bool,
    /// Text to be written to the standard output
    pub stdout: Option<String>,
    /// Text to be written to the standard error
    pub stderr: Option<String>,
}

impl ProcessOutput {
    /// A successful output, with nothing to print
    pub fn success() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    /// A failed output, with nothing to print
    pub fn fail() -> Self {
        Self::default()
    }

    /// Sets the text to be written to the standard output
    pub fn stdout(mut self, text: impl Into<String>) -> Self {
        self.stdout = Some(text.into());
        self
    }

    /// Sets the text to be written to the standard error
    pub fn stderr(mut self, text: impl Into<String>) -> Self {
        self.stderr = Some(text.into());
        self
    }
}

/// A process of the command line, that can be executed given the config
#[trait_variant::make(Send)]
pub trait Process {
    /// Executes the process.
    ///
    /// Errors expected by the user are part of the output, an `Err` is only returned for unexpected ones.
    async fn execute(self, config: Config) -> Result<ProcessOutput>;
}
