use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::{
    ai::Prompt,
    errors::{Result, UserFacingError},
    model::ActiveDocument,
};

// Regex to find placeholders like ##VAR_NAME##
static PROMPT_PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"##([A-Z_]+)##").unwrap());

/// Builds the prompt to extract the definition of the term described by the selected text.
///
/// The selection is sent verbatim as the user message, it fails with [UserFacingError::EmptySelection] if it's blank.
pub fn build_define_prompt(sys_prompt: &str, selection: &str, source: Option<&ActiveDocument>) -> Result<Prompt> {
    if selection.trim().is_empty() {
        return Err(UserFacingError::EmptySelection.into());
    }
    Ok(Prompt {
        system: replace_prompt_placeholders(sys_prompt, source),
        user: selection.to_string(),
    })
}

/// Replace placeholders present on the prompt for its value
fn replace_prompt_placeholders(prompt: &str, source: Option<&ActiveDocument>) -> String {
    PROMPT_PLACEHOLDER_RE
        .replace_all(prompt, |caps: &Captures| match &caps[1] {
            "SOURCE_DOCUMENT" => source
                .map(|doc| format!("### Context:\n- The text was taken from a note named \"{}\"\n", doc.name))
                .unwrap_or_default(),
            _ => {
                tracing::warn!("Prompt placeholder '{}' not recognized", &caps[0]);
                String::default()
            }
        })
        .to_string()
}
