//! HTTP surface of the Nirdeshak relay.
//!
//! This crate exposes the relay over HTTP with axum:
//!
//! - `POST /query` -- chat completion from a prompt or a conversation history.
//! - `POST /transcribe` -- speech-to-text for an uploaded audio file.
//! - `POST /tts` -- text-to-speech, returning mp3 bytes.
//! - `GET /` -- static health page; `GET /health` -- JSON probe.
//!
//! Upstream failures are turned into HTTP responses by [`error::ApiError`].

pub mod api;
pub mod error;
pub mod frontend;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use server::WebServer;
pub use state::AppState;

use std::path::PathBuf;

/// Web server configuration.
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// The address to bind the HTTP server to.
    pub bind_addr: String,
    /// The port to listen on.
    pub port: u16,
    /// Directory holding `index.html` for the health page.
    pub static_dir: PathBuf,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".into(),
            port: 8000,
            static_dir: PathBuf::from("static"),
        }
    }
}
