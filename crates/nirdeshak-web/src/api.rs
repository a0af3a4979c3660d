//! REST API route handlers.
//!
//! Each handler runs inside a span carrying a fresh `request_id` so the log
//! lines of one request can be followed across the upstream call.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::FormRejection;
use axum::extract::{Form, FromRequest, Multipart, Request, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;

use nirdeshak_relay::conversation::{self, HistoryPayload};
use nirdeshak_relay::speech::TTS_OUTPUT;
use nirdeshak_relay::{AudioAsset, AudioFormat, SpeechClient};

use crate::error::ApiError;
use crate::state::AppState;

/// Name of the form field carrying a single prompt.
const PROMPT_FIELD: &str = "user_prompt";

/// Name of the multipart field carrying uploaded audio.
const AUDIO_FIELD: &str = "file";

// ---------------------------------------------------------------------------
// POST /query
// ---------------------------------------------------------------------------

/// The two accepted `/query` input shapes.
#[derive(Debug)]
pub enum QueryInput {
    /// Form field `user_prompt` (urlencoded or multipart).
    Prompt(String),
    /// JSON body `{"conversation_history": [...]}`.
    History(Vec<Value>),
}

#[derive(Deserialize)]
struct PromptForm {
    user_prompt: String,
}

impl<S> FromRequest<S> for QueryInput
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("application/json") {
            let Json(payload) = Json::<HistoryPayload>::from_request(req, state)
                .await
                .map_err(|e| ApiError::InvalidInput(e.body_text()))?;
            return Ok(Self::History(payload.conversation_history));
        }

        if content_type.starts_with("multipart/form-data") {
            let mut multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ApiError::InvalidInput(e.body_text()))?;
            while let Some(field) = multipart
                .next_field()
                .await
                .map_err(|e| ApiError::InvalidInput(e.body_text()))?
            {
                if field.name() == Some(PROMPT_FIELD) {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| ApiError::InvalidInput(e.body_text()))?;
                    return Ok(Self::Prompt(text));
                }
            }
            return Err(ApiError::InvalidInput(format!(
                "missing form field `{PROMPT_FIELD}`"
            )));
        }

        let Form(form) = Form::<PromptForm>::from_request(req, state)
            .await
            .map_err(|e| ApiError::InvalidInput(e.body_text()))?;
        Ok(Self::Prompt(form.user_prompt))
    }
}

/// Answer a prompt or continue a conversation with one chat completion.
///
/// Replies with the model's text as a JSON string.
pub async fn query(
    State(state): State<Arc<AppState>>,
    input: QueryInput,
) -> Result<Json<String>, ApiError> {
    let span = tracing::info_span!("query", request_id = %Uuid::now_v7());
    answer_query(&state, input).instrument(span).await
}

async fn answer_query(state: &AppState, input: QueryInput) -> Result<Json<String>, ApiError> {
    let messages = match input {
        QueryInput::Prompt(prompt) => {
            tracing::info!(chars = prompt.chars().count(), "received prompt");
            conversation::from_prompt(prompt)
        }
        QueryInput::History(entries) => {
            tracing::info!(entries = entries.len(), "received conversation history");
            conversation::from_history(&entries)
        }
    };

    let request = state.chat.request(messages);
    let reply = state.chat.complete(&request).await?;

    tracing::info!(chars = reply.chars().count(), "query answered");
    Ok(Json(reply))
}

// ---------------------------------------------------------------------------
// POST /transcribe
// ---------------------------------------------------------------------------

/// Response payload for `/transcribe`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptResponse {
    pub transcript: String,
}

/// Transcribe an uploaded audio file.
pub async fn transcribe(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<TranscriptResponse>, ApiError> {
    let span = tracing::info_span!("transcribe", request_id = %Uuid::now_v7());
    run_transcription(&state, multipart).instrument(span).await
}

async fn run_transcription(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<TranscriptResponse>, ApiError> {
    let speech = speech_client(state)?;
    let mut multipart = multipart.map_err(|e| ApiError::InvalidInput(e.body_text()))?;

    let (bytes, format) = read_audio_field(&mut multipart).await?;
    tracing::info!(bytes = bytes.len(), %format, "received audio upload");

    // Dropping the asset removes the staged file on every path below.
    let asset = AudioAsset::stage(&bytes, format).await.map_err(|e| {
        tracing::error!(error = %e, "failed to stage audio");
        ApiError::Internal
    })?;
    drop(bytes);

    let transcript = speech
        .transcribe(&asset)
        .await
        .map_err(|f| ApiError::speech(&f))?;

    tracing::info!(chars = transcript.chars().count(), "transcription complete");
    Ok(Json(TranscriptResponse { transcript }))
}

/// Pull the `file` field out of a multipart upload.
async fn read_audio_field(multipart: &mut Multipart) -> Result<(Bytes, AudioFormat), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidInput(e.body_text()))?
    {
        if field.name() != Some(AUDIO_FIELD) {
            continue;
        }
        let format = guess_format(field.file_name(), field.content_type());
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::InvalidInput(e.body_text()))?;
        return Ok((bytes, format));
    }
    Err(ApiError::InvalidInput(format!(
        "missing multipart field `{AUDIO_FIELD}`"
    )))
}

/// Pick a format tag from upload metadata; anything not clearly mp3 is
/// treated as wav.
fn guess_format(file_name: Option<&str>, content_type: Option<&str>) -> AudioFormat {
    let is_mp3_name = file_name
        .map(|n| n.to_ascii_lowercase().ends_with(".mp3"))
        .unwrap_or(false);
    let is_mp3_type = matches!(content_type, Some("audio/mpeg" | "audio/mp3"));
    if is_mp3_name || is_mp3_type {
        AudioFormat::Mp3
    } else {
        AudioFormat::Wav
    }
}

// ---------------------------------------------------------------------------
// POST /tts
// ---------------------------------------------------------------------------

/// Form body for `/tts`.
#[derive(Debug, Deserialize)]
pub struct TtsForm {
    pub text: String,
}

/// Synthesize speech for `text` and stream back mp3 bytes.
pub async fn tts(
    State(state): State<Arc<AppState>>,
    form: Result<Form<TtsForm>, FormRejection>,
) -> Result<Response, ApiError> {
    let span = tracing::info_span!("tts", request_id = %Uuid::now_v7());
    run_synthesis(&state, form).instrument(span).await
}

async fn run_synthesis(
    state: &AppState,
    form: Result<Form<TtsForm>, FormRejection>,
) -> Result<Response, ApiError> {
    let speech = speech_client(state)?;
    let Form(form) = form.map_err(|e| ApiError::InvalidInput(e.body_text()))?;
    tracing::info!(chars = form.text.chars().count(), "received text for synthesis");

    let audio = speech
        .synthesize(&form.text)
        .await
        .map_err(|f| ApiError::speech(&f))?;

    tracing::info!(bytes = audio.len(), "synthesis complete");
    let disposition = format!("attachment; filename=\"speech.{}\"", TTS_OUTPUT.extension());
    Ok((
        [
            (CONTENT_TYPE, TTS_OUTPUT.mime().to_owned()),
            (CONTENT_DISPOSITION, disposition),
        ],
        audio,
    )
        .into_response())
}

fn speech_client(state: &AppState) -> Result<&SpeechClient, ApiError> {
    state.speech.as_ref().ok_or_else(|| {
        tracing::error!("speech request received but SARVAM_API_KEY is not configured");
        ApiError::Speech("Speech service is not configured".into())
    })
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

/// Response payload for the `/health` probe.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub speech_enabled: bool,
}

/// Liveness probe; does not call any upstream.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        speech_enabled: state.speech.is_some(),
    })
}
