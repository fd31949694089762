//! Extraction of a JSON object embedded in free-form model output.

use serde::de::DeserializeOwned;

use super::LlmError;

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

/// Returns the first balanced top-level `{...}` in `text`, after stripping code fences.
///
/// Braces inside string literals (including escaped quotes) do not count toward nesting.
/// Leading prose such as "Here is the result:" is skipped.
pub fn extract_json_object(text: &str) -> Result<&str, LlmError> {
    let text = strip_json_fences(text);
    let start = text
        .find('{')
        .ok_or_else(|| LlmError::Malformed("no JSON object in response".to_string()))?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    Err(LlmError::Malformed(
        "unterminated JSON object in response".to_string(),
    ))
}

/// Extracts and deserializes the embedded JSON object.
pub fn parse_embedded<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    let object = extract_json_object(text)?;
    serde_json::from_str(object).map_err(LlmError::Parse)
}
