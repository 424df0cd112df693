use std::time::Duration;

use color_eyre::eyre::{Context, ContextCompat};
use reqwest::{
    Client, ClientBuilder, StatusCode,
    header::{self, HeaderMap, HeaderValue},
};
use schemars::{JsonSchema, Schema, schema_for};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    config::AiConfig,
    errors::{Result, UserFacingError},
};

mod openai;
#[cfg(test)]
pub(crate) mod scripted;

/// The system and user messages sent to the language model
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prompt {
    /// Instructions describing the extraction contract
    pub system: String,
    /// The selected text, verbatim
    pub user: String,
}

/// A language model able to answer a prompt with a single JSON object
#[trait_variant::make(Send)]
pub trait LanguageModel {
    /// Sends the prompt and returns the raw textual payload of the reply
    async fn complete(&self, prompt: &Prompt) -> Result<String>;
}

/// The object the model is asked to reply with
#[derive(Debug, Deserialize, JsonSchema)]
pub struct TermDefinitionReply {
    /// The term being defined: lower case unless it's an acronym, without `/` or `\` characters
    pub term: String,
    /// A self-contained definition of the term, keeping any `[[...]]` link verbatim
    pub definition: String,
    /// A short, broad category for the term, or an empty string
    pub category: String,
}

/// A client to communicate with OpenAI-compatible chat completion APIs
pub struct AiClient<'a> {
    inner: Client,
    config: &'a AiConfig,
}
impl<'a> AiClient<'a> {
    /// Creates a new AI client for the given configuration
    pub fn new(config: &'a AiConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.append(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let inner = ClientBuilder::new()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(5 * 60))
            .user_agent(env!("CARGO_PKG_NAME"))
            .default_headers(headers)
            .build()
            .wrap_err("Couldn't build AI client")?;

        Ok(AiClient { inner, config })
    }

    /// Executes a single chat completion request, returning the message content
    #[instrument(skip_all, fields(model = %self.config.model))]
    async fn execute_request(&self, prompt: &Prompt) -> Result<String> {
        let json_schema = build_json_schema_for::<TermDefinitionReply>()?;
        let mut req_builder = openai::build_request(&self.inner, self.config, prompt, &json_schema);

        let Some(api_key) = self.config.resolve_api_key() else {
            tracing::warn!("No api key found on the config nor '{}'", self.config.api_key_env);
            return Err(missing_api_key(&self.config.api_key_env).into());
        };
        let mut header_value = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .wrap_err_with(|| format!("Invalid '{}' value", self.config.api_key_env))?;
        header_value.set_sensitive(true);
        req_builder = req_builder.header(header::AUTHORIZATION, header_value);

        let req = req_builder.build().wrap_err("Couldn't build api request")?;

        tracing::debug!("Calling chat completions API: {}", req.url());
        let res = self.inner.execute(req).await.map_err(|err| {
            if err.is_timeout() {
                tracing::error!("Request timeout: {err:?}");
                UserFacingError::NetworkFailure(String::from("request timed out"))
            } else if err.is_connect() {
                tracing::error!("Couldn't connect to the API: {err:?}");
                UserFacingError::NetworkFailure(String::from("error connecting to the provider"))
            } else {
                tracing::error!("Couldn't perform the request: {err:?}");
                UserFacingError::NetworkFailure(err.to_string())
            }
        })?;

        let status = res.status();
        if !status.is_success() {
            let status_str = status.as_str();
            let body = res.text().await.unwrap_or_default();
            let reason = match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    tracing::warn!("Got response [{status_str}] {}", status.canonical_reason().unwrap_or_default());
                    tracing::debug!("{body}");
                    return Err(missing_api_key(&self.config.api_key_env).into());
                }
                StatusCode::TOO_MANY_REQUESTS => String::from("rate limited, try again later"),
                StatusCode::SERVICE_UNAVAILABLE => String::from("service unavailable, try again later"),
                _ => match status.canonical_reason() {
                    Some(reason) => format!("received {status_str} {reason} response"),
                    None => format!("received {status_str} response"),
                },
            };
            tracing::error!("Got response [{status_str}]:\n{body}");
            return Err(UserFacingError::NetworkFailure(reason).into());
        }

        openai::parse_response(res).await
    }
}

impl LanguageModel for AiClient<'_> {
    async fn complete(&self, prompt: &Prompt) -> Result<String> {
        self.execute_request(prompt).await
    }
}

fn missing_api_key(env_var: &str) -> UserFacingError {
    UserFacingError::NetworkFailure(format!(
        "missing or invalid api key, set it on the config or the '{env_var}' env variable"
    ))
}

/// Build the json schema for the given type, including `additionalProperties: false`
fn build_json_schema_for<T: JsonSchema>() -> Result<Schema> {
    let mut schema = schema_for!(T);

    // The schema must be an object, for most LLMs to support it
    let root = schema.as_object_mut().wrap_err("The type must be an object")?;
    root.insert("additionalProperties".into(), false.into());

    Ok(schema)
}
