//! Core of the Nirdeshak relay.
//!
//! The relay forwards frontend requests to hosted AI providers and turns
//! their answers, or their failures, into something the frontend can show.
//!
//! ```text
//! caller input ──> conversation ──> ChatClient / SpeechClient ──> Ok(reply)
//!   (prompt,        (system turn      (one call, fixed             Err(UpstreamFailure)
//!    history,        + validated       timeout, no retry)
//!    audio)          history)
//! ```
//!
//! ## Modules
//!
//! - [`config`] -- Immutable configuration loaded once at startup.
//! - [`conversation`] -- Prompt and history translation.
//! - [`prompt`] -- The fixed system prompt.
//! - [`llm`] -- Chat-completion wire types and client.
//! - [`speech`] -- Speech-to-text and text-to-speech client.
//! - [`audio`] -- Temporary audio staging.
//! - [`error`] -- Local errors and the upstream failure taxonomy.

pub mod audio;
pub mod config;
pub mod conversation;
pub mod error;
pub mod llm;
pub mod prompt;
pub mod speech;

pub use audio::{AudioAsset, AudioFormat};
pub use config::{ChatConfig, RelayConfig, SpeechConfig};
pub use conversation::{HistoryPayload, HistoryTurn};
pub use error::{MalformedKind, RelayError, Result, UpstreamFailure, UpstreamResult};
pub use llm::{ChatClient, ChatRequest, Message, Role};
pub use prompt::SYSTEM_PROMPT;
pub use speech::SpeechClient;
