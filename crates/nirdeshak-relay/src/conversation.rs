//! Translation of caller input into the conversation sent upstream.
//!
//! Callers either send one prompt string or the full chat history kept by
//! the frontend.  History arrives as loosely shaped JSON records; each one is
//! validated into a [`HistoryTurn`] here, and anything that does not fit is
//! dropped with a diagnostic instead of failing the request.

use serde::Deserialize;
use serde_json::Value;

use crate::llm::Message;
use crate::prompt::SYSTEM_PROMPT;

/// A validated entry from the caller's conversation history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryTurn {
    /// Something the user said.
    User(String),
    /// A successful earlier reply from the assistant.
    Assistant(String),
}

impl HistoryTurn {
    fn into_message(self) -> Message {
        match self {
            Self::User(text) => Message::user(text),
            Self::Assistant(text) => Message::assistant(text),
        }
    }
}

/// Why a history entry was left out of the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// An entry the frontend marked as an error bubble.
    ErrorReply,
    /// The entry does not have the expected shape.
    Malformed(&'static str),
}

/// Body of a JSON `/query` request.
#[derive(Debug, Deserialize)]
pub struct HistoryPayload {
    /// Raw entries; validated one by one so a bad entry cannot reject the
    /// whole payload.
    pub conversation_history: Vec<Value>,
}

/// The wire shape we expect for a history entry.
#[derive(Deserialize)]
struct RawEntry {
    #[serde(rename = "type")]
    kind: String,
    content: String,
    #[serde(rename = "isError", default)]
    is_error: Option<bool>,
}

/// Validate one raw history entry.
pub fn classify_entry(entry: &Value) -> Result<HistoryTurn, SkipReason> {
    if !entry.is_object() {
        return Err(SkipReason::Malformed("entry is not an object"));
    }
    if entry.get("type").and_then(Value::as_str).is_none() {
        return Err(SkipReason::Malformed("missing or non-string `type`"));
    }
    if entry.get("content").and_then(Value::as_str).is_none() {
        return Err(SkipReason::Malformed("missing or non-string `content`"));
    }

    let raw = RawEntry::deserialize(entry)
        .map_err(|_| SkipReason::Malformed("`isError` is not a boolean"))?;

    match raw.kind.as_str() {
        "user" | "ai" if raw.is_error == Some(true) => Err(SkipReason::ErrorReply),
        "user" => Ok(HistoryTurn::User(raw.content)),
        "ai" => Ok(HistoryTurn::Assistant(raw.content)),
        _ => Err(SkipReason::Malformed("unknown `type`")),
    }
}

/// Validate every entry in order, keeping the ones that translate.
pub fn history_turns(entries: &[Value]) -> Vec<HistoryTurn> {
    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| match classify_entry(entry) {
            Ok(turn) => Some(turn),
            Err(SkipReason::ErrorReply) => {
                tracing::debug!(index, "skipping error entry");
                None
            }
            Err(SkipReason::Malformed(reason)) => {
                tracing::warn!(index, reason, "skipping malformed history entry");
                None
            }
        })
        .collect()
}

/// Conversation for a single prompt: the system turn followed by one user turn.
pub fn from_prompt(prompt: impl Into<String>) -> Vec<Message> {
    vec![Message::system(SYSTEM_PROMPT), Message::user(prompt)]
}

/// Conversation for a caller-supplied history.
///
/// An empty (or fully filtered) history still yields the system turn.
pub fn from_history(entries: &[Value]) -> Vec<Message> {
    std::iter::once(Message::system(SYSTEM_PROMPT))
        .chain(history_turns(entries).into_iter().map(HistoryTurn::into_message))
        .collect()
}
