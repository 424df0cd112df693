use serde_json::Value as Json;

use crate::{
    errors::{Result, UserFacingError},
    model::TermDefinition,
};

/// Parses the raw payload replied by the language model into a [TermDefinition].
///
/// The payload must be a JSON object with non-empty `term` and `definition` strings, `category` is optional.
pub fn parse_term_definition(raw: &str) -> Result<TermDefinition> {
    let json: Json = serde_json::from_str(raw.trim()).map_err(|err| {
        tracing::error!("Couldn't parse the response as json: {err}\nPayload:\n{raw}");
        UserFacingError::MalformedResponse(String::from("it's not a valid json"))
    })?;
    let Json::Object(fields) = json else {
        tracing::error!("The response is not a json object:\n{raw}");
        return Err(UserFacingError::MalformedResponse(String::from("it's not a json object")).into());
    };

    let term = required_field(&fields, "term")?;
    let definition = required_field(&fields, "definition")?;
    let category = fields
        .get("category")
        .and_then(Json::as_str)
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(String::from);

    Ok(TermDefinition {
        term,
        definition,
        category,
    })
}

fn required_field(fields: &serde_json::Map<String, Json>, name: &str) -> Result<String> {
    match fields.get(name) {
        Some(Json::String(value)) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        Some(Json::String(_)) => {
            tracing::error!("The response has an empty '{name}'");
            Err(UserFacingError::MalformedResponse(format!("'{name}' is empty")).into())
        }
        Some(other) => {
            tracing::error!("The response has a non-string '{name}': {other}");
            Err(UserFacingError::MalformedResponse(format!("'{name}' is not a string")).into())
        }
        None => {
            tracing::error!("The response is missing '{name}'");
            Err(UserFacingError::MalformedResponse(format!("'{name}' is missing")).into())
        }
    }
}
