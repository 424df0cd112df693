use std::{env, fs, path::PathBuf};

use color_eyre::{
    Result,
    eyre::{Context, ContextCompat, eyre},
};
use directories::ProjectDirs;
use itertools::Itertools;
use serde::Deserialize;

use crate::{ai::AiClient, model::FolderMapping};

/// Name of the environment variable pointing to a custom config file
pub const CONFIG_ENV_VAR: &str = "GLOSSARY_CONFIG";

/// Main configuration struct for the application
#[derive(Clone, Deserialize)]
#[cfg_attr(test, derive(Debug, PartialEq))]
#[cfg_attr(not(test), serde(default))]
pub struct Config {
    /// Directory where the data (logs) must be stored
    pub data_dir: PathBuf,
    /// Root of the document tree where notes are written. Defaults to the current working dir
    pub vault_dir: PathBuf,
    /// Configuration settings for application logging
    pub logs: LogsConfig,
    /// Configuration of where and how definition notes are written
    pub glossary: GlossaryConfig,
    /// Configuration for the language model
    pub ai: AiConfig,
}

/// Configuration settings for application logging
#[derive(Clone, Deserialize)]
#[cfg_attr(test, derive(Debug, PartialEq))]
#[cfg_attr(not(test), serde(default))]
pub struct LogsConfig {
    /// Whether application logging is enabled
    pub enabled: bool,
    /// The log filter to apply, controlling which logs are recorded.
    ///
    /// This string supports the `tracing-subscriber`'s environment filter syntax.
    pub filter: String,
}

/// Configuration of the glossary notes
#[derive(Clone, Deserialize)]
#[cfg_attr(test, derive(Debug, PartialEq))]
#[cfg_attr(not(test), serde(default))]
pub struct GlossaryConfig {
    /// Folder where notes are written when no mapping applies
    pub default_folder: String,
    /// Ordered list of mappings from source document prefixes to glossary folders, the first match wins
    pub folder_mappings: Vec<FolderMapping>,
    /// Whether to add the category of the term as a tag on the note frontmatter
    pub tag_category: bool,
}

/// Which structured response mode is requested from the model
#[derive(Clone, Copy, Deserialize, PartialEq, Eq, Debug, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResponseFormat {
    /// Any single JSON object
    JsonObject,
    /// A JSON object conforming to the term definition schema
    JsonSchema,
}

/// Configuration for the language model
#[derive(Clone, Deserialize)]
#[cfg_attr(test, derive(Debug, PartialEq))]
#[cfg_attr(not(test), serde(default))]
pub struct AiConfig {
    /// Full URL of an OpenAI-compatible chat completions endpoint
    pub endpoint: String,
    /// The model identifier (e.g. "gpt-4o-mini")
    pub model: String,
    /// The API key. When empty, it's read from the `api_key_env` environment variable
    pub api_key: String,
    /// Name of the environment variable with the API key, used when `api_key` is empty
    pub api_key_env: String,
    /// Structured output mode requested to the model
    pub response_format: ResponseFormat,
    /// System prompt used to extract the term definition
    pub prompt: String,
}

impl Config {
    /// Initializes the application configuration.
    ///
    /// Attempts to load the configuration from the given file, the `GLOSSARY_CONFIG` environment variable or the
    /// user's config directory (`config.toml`). If the file does not exist or has missing fields, it falls back to
    /// default values.
    pub fn init(config_file: Option<PathBuf>) -> Result<Self> {
        let config_path = Self::path(config_file)?;
        let proj_dirs = project_dirs()?;

        let mut config = if config_path.exists() {
            let config_str = fs::read_to_string(&config_path)
                .wrap_err_with(|| format!("Couldn't read config file {}", config_path.display()))?;
            toml::from_str(&config_str)
                .wrap_err_with(|| format!("Couldn't parse config file {}", config_path.display()))?
        } else {
            Config::default()
        };
        if config.data_dir.as_os_str().is_empty() {
            config.data_dir = proj_dirs.data_dir().to_path_buf();
        }
        if config.vault_dir.as_os_str().is_empty() {
            config.vault_dir = env::current_dir().wrap_err("Couldn't read the current working dir")?;
        }

        let problems = config.validate();
        if !problems.is_empty() {
            return Err(eyre!(
                "Couldn't parse config file {}\n\nThere are some invalid values:\n{}",
                config_path.display(),
                problems.into_iter().map(|p| format!("- {p}")).join("\n")
            ));
        }

        fs::create_dir_all(&config.data_dir)
            .wrap_err_with(|| format!("Could't create data dir {}", config.data_dir.display()))?;

        Ok(config)
    }

    /// Resolves the path of the config file
    pub fn path(config_file: Option<PathBuf>) -> Result<PathBuf> {
        if let Some(path) = config_file {
            return Ok(path);
        }
        if let Some(path) = env::var_os(CONFIG_ENV_VAR).filter(|p| !p.is_empty()) {
            return Ok(PathBuf::from(path));
        }
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Returns the list of problems found on the config values
    fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.glossary.default_folder.trim().is_empty() {
            problems.push(String::from("glossary.default_folder can't be empty"));
        }
        problems.extend(
            self.glossary
                .folder_mappings
                .iter()
                .positions(|m| m.target_path.trim().is_empty())
                .map(|idx| format!("glossary.folder_mappings[{idx}].target_path can't be empty")),
        );
        if self.ai.endpoint.trim().is_empty() {
            problems.push(String::from("ai.endpoint can't be empty"));
        }
        if self.ai.model.trim().is_empty() {
            problems.push(String::from("ai.model can't be empty"));
        }
        problems
    }
}

impl AiConfig {
    /// Retrieves a client for the configured model
    pub fn client(&self) -> crate::errors::Result<AiClient<'_>> {
        AiClient::new(self)
    }

    /// Resolves the api key, from the config or the environment
    pub fn resolve_api_key(&self) -> Option<String> {
        if !self.api_key.trim().is_empty() {
            Some(self.api_key.trim().to_string())
        } else {
            env::var(&self.api_key_env).ok().filter(|k| !k.trim().is_empty())
        }
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("org", "GlossaryLinker", "Glossary-Linker").wrap_err("Couldn't initialize project directory")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::new(),
            vault_dir: PathBuf::new(),
            logs: LogsConfig::default(),
            glossary: GlossaryConfig::default(),
            ai: AiConfig::default(),
        }
    }
}
impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            filter: String::from("info"),
        }
    }
}
impl Default for GlossaryConfig {
    fn default() -> Self {
        Self {
            default_folder: String::from("Glossary"),
            folder_mappings: Vec::new(),
            tag_category: false,
        }
    }
}
impl Default for AiConfig {
    fn default() -> Self {
        Self {
            endpoint: String::from("https://api.openai.com/v1/chat/completions"),
            model: String::from("gpt-4o-mini"),
            api_key: String::new(),
            api_key_env: String::from("OPENAI_API_KEY"),
            response_format: ResponseFormat::JsonObject,
            prompt: String::from(
                r#"##SOURCE_DOCUMENT##
### Instructions
You are an expert glossary writer. The user will send you a piece of text taken from one of their notes. Your task
is to identify the single main term being described in that text and extract a concise definition for it.

Your entire response MUST be a single, valid JSON object and nothing else, with these fields:
- `term`: the term being defined
- `definition`: a clear, self-contained definition of the term
- `category`: a short, broad category for the term (e.g. "hardware", "biology"), or an empty string if none fits

### Rules
1. Write the `term` in lower case, unless it is an acronym (e.g. "GPU", "HTTP"), which keeps its upper case.
2. The text may contain links written as `[[...]]`. Keep every one of them exactly as written, brackets included,
   when they are part of the definition.
3. The `term` is used as a file name: if it contains a `/` or `\` character, replace it with a hyphen (`-`).
4. Do not wrap the JSON in code blocks or add any explanatory text.
"#,
            ),
        }
    }
}
