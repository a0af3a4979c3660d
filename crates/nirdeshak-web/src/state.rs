//! Shared application state for the web server.
//!
//! [`AppState`] is wrapped in an `Arc` and shared by every handler.  All of
//! it is read-only after startup.

use nirdeshak_relay::{ChatClient, SpeechClient};

use crate::WebConfig;

/// Shared state accessible from every axum handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Client for the chat-completion deployment.
    pub chat: ChatClient,

    /// Client for the speech provider, absent when no credential is set.
    pub speech: Option<SpeechClient>,

    /// Web server configuration.
    pub config: WebConfig,
}
