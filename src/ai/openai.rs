use reqwest::{Client, RequestBuilder, Response};
use schemars::Schema;
use serde::Deserialize;
use serde_json::{Value as Json, json};

use super::Prompt;
use crate::{
    config::{AiConfig, ResponseFormat},
    errors::{Result, UserFacingError},
};

/// Builds the chat completions request
///
/// https://platform.openai.com/docs/api-reference/chat/create
pub(super) fn build_request(
    client: &Client,
    config: &AiConfig,
    prompt: &Prompt,
    json_schema: &Schema,
) -> RequestBuilder {
    let request_body = build_request_body(config, prompt, json_schema);

    tracing::trace!("Request:\n{request_body:#}");

    client.post(config.endpoint.as_str()).json(&request_body)
}

fn build_request_body(config: &AiConfig, prompt: &Prompt, json_schema: &Schema) -> Json {
    let response_format = match config.response_format {
        ResponseFormat::JsonObject => json!({ "type": "json_object" }),
        ResponseFormat::JsonSchema => json!({
            "type": "json_schema",
            "json_schema": {
                "name": "term_definition",
                "strict": true,
                "schema": json_schema
            }
        }),
    };
    json!({
        "model": config.model,
        "messages": [
            {
                "role": "system",
                "content": prompt.system
            },
            {
                "role": "user",
                "content": prompt.user
            }
        ],
        "stream": false,
        "response_format": response_format
    })
}

/// Extracts the message content out of a successful response
pub(super) async fn parse_response(res: Response) -> Result<String> {
    let res: Json = res.json().await.map_err(|err| {
        tracing::error!("Response is not a json: {err:?}");
        UserFacingError::NetworkFailure(String::from("received a response that is not a json"))
    })?;
    tracing::trace!("Response:\n{res:#}");
    extract_payload(res)
}

/// Parses the chat completions envelope, returning the message content
fn extract_payload(res: Json) -> Result<String> {
    if let Some(error) = res.get("error").filter(|e| !e.is_null()) {
        tracing::error!("The provider replied with an error: {error}");
        let reason = match error.get("message").and_then(Json::as_str) {
            Some(message) => format!("the provider replied with an error: {message}"),
            None => String::from("the provider replied with an error"),
        };
        return Err(UserFacingError::NetworkFailure(reason).into());
    }
    let res: OpenAiResponse = serde_json::from_value(res).map_err(|err| {
        tracing::error!("Couldn't parse chat completions response: {err}");
        UserFacingError::NetworkFailure(String::from("received an unexpected response"))
    })?;
    extract_content(res)
}

fn extract_content(mut res: OpenAiResponse) -> Result<String> {
    if res.choices.is_empty() {
        tracing::error!("Response got no choices: {res:?}");
        return Err(UserFacingError::NetworkFailure(String::from("received response with no choices")).into());
    } else if res.choices.len() > 1 {
        tracing::warn!("Response got {} choices", res.choices.len());
    }

    let choice = res.choices.remove(0);
    if let Some(finish_reason) = &choice.finish_reason
        && finish_reason != "stop"
    {
        tracing::error!("Response got an invalid finish reason: {finish_reason}");
        return Err(UserFacingError::NetworkFailure(format!(
            "couldn't generate a complete response: {finish_reason}"
        ))
        .into());
    }

    if let Some(refusal) = choice.message.refusal
        && !refusal.is_empty()
    {
        tracing::error!("The model refused to answer: {refusal}");
        return Err(UserFacingError::NetworkFailure(format!("response refused: {refusal}")).into());
    }

    match choice.message.content.filter(|c| !c.trim().is_empty()) {
        Some(content) => Ok(content),
        None => {
            tracing::error!("The model returned an empty response");
            Err(UserFacingError::NetworkFailure(String::from("received an empty response")).into())
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    #[serde(default)]
    refusal: Option<String>,
    #[serde(default)]
    content: Option<String>,
}
