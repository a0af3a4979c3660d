//! Chat-completion integration.
//!
//! - [`types`] -- Wire types (messages, request envelope).
//! - [`client`] -- HTTP client for the Azure OpenAI deployment.

pub mod client;
pub mod types;

pub use client::{ChatClient, parse_completion};
pub use types::{ChatRequest, Message, Role, TEMPERATURE};
