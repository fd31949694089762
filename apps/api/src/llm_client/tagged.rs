//! Tagged replies: a proceed flag plus a free-text payload.
//!
//! Grammar (after trimming surrounding whitespace and code fences):
//!
//! ```text
//! reply   := json | flagged
//! json    := {"proceed": <bool>, "payload": <string>}
//! flagged := ("0" | "1") ws* "," ws* payload
//! ```
//!
//! A non-empty payload is required. Anything else is rejected; the caller picks the fallback.

use serde::{Deserialize, Serialize};

use super::json::{extract_json_object, strip_json_fences};
use super::LlmError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedReply {
    pub proceed: bool,
    pub payload: String,
}

pub fn parse_tagged_reply(text: &str) -> Result<TaggedReply, LlmError> {
    let text = strip_json_fences(text);

    if text.starts_with('{') {
        let object = extract_json_object(text)?;
        let reply: TaggedReply = serde_json::from_str(object)?;
        return non_empty(reply);
    }

    let mut chars = text.chars();
    let proceed = match chars.next() {
        Some('1') => true,
        Some('0') => false,
        _ => {
            return Err(LlmError::Malformed(
                "reply does not start with a 0/1 flag".to_string(),
            ))
        }
    };

    let rest = chars.as_str().trim_start();
    let payload = rest.strip_prefix(',').ok_or_else(|| {
        LlmError::Malformed("flag is not followed by a comma".to_string())
    })?;

    non_empty(TaggedReply {
        proceed,
        payload: payload.trim().to_string(),
    })
}

fn non_empty(reply: TaggedReply) -> Result<TaggedReply, LlmError> {
    if reply.payload.trim().is_empty() {
        Err(LlmError::Malformed("tagged reply has empty payload".to_string()))
    } else {
        Ok(reply)
    }
}
