//! Sarvam speech client (speech-to-text and text-to-speech).
//!
//! Both operations use the same transport classification as the chat
//! client.  Language and model selectors are fixed constants.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Body, RequestBuilder};
use reqwest::header::HeaderMap;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde_json::Value;

use crate::audio::{AudioAsset, AudioFormat};
use crate::config::{SpeechConfig, key_header};
use crate::error::{MalformedKind, RelayError, Result, UpstreamFailure, UpstreamResult};

/// Header carrying the Sarvam subscription key.
const SUBSCRIPTION_KEY_HEADER: &str = "api-subscription-key";

/// Speech-to-text model.
pub const STT_MODEL: &str = "saarika:v2.5";

/// Text-to-speech model.
pub const TTS_MODEL: &str = "bulbul:v2";

/// Language used for both directions.
pub const LANGUAGE_CODE: &str = "en-IN";

/// Format of synthesized audio returned to callers.
pub const TTS_OUTPUT: AudioFormat = AudioFormat::Mp3;

#[derive(Serialize)]
struct SynthesizeBody<'a> {
    text: &'a str,
    target_language_code: &'static str,
    model: &'static str,
    output_audio_codec: &'static str,
}

/// Client for the Sarvam speech endpoints.
#[derive(Clone)]
pub struct SpeechClient {
    config: Arc<SpeechConfig>,
    http: reqwest::Client,
}

impl std::fmt::Debug for SpeechClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechClient")
            .field("base_url", &self.config.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl SpeechClient {
    /// Create a client whose every call is bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Fails if the subscription key cannot be sent as a header or the HTTP
    /// client cannot be built.
    pub fn new(config: SpeechConfig, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            SUBSCRIPTION_KEY_HEADER,
            key_header("SARVAM_API_KEY", &config.api_key)?,
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(RelayError::HttpClient)?;

        Ok(Self {
            config: Arc::new(config),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.as_str().trim_end_matches('/'))
    }

    /// Transcribe a staged audio asset, forwarding its bytes unchanged.
    pub async fn transcribe(&self, asset: &AudioAsset) -> UpstreamResult<String> {
        // Streamed from the staged file.
        let (file, len) = asset.open().await?;
        let part = Part::stream_with_length(Body::from(file), len)
            .file_name(asset.file_name())
            .mime_str(asset.format().mime())
            .map_err(|e| {
                tracing::error!(error = %e, "invalid audio mime type");
                UpstreamFailure::Internal
            })?;
        let form = Form::new()
            .text("model", STT_MODEL)
            .text("language_code", LANGUAGE_CODE)
            .part("file", part);

        let builder = self.http.post(self.url("speech-to-text")).multipart(form);
        let v = self.execute(builder, "speech-to-text").await?;

        parse_transcript(&v)
    }

    /// Synthesize `text` and return the decoded audio bytes.
    pub async fn synthesize(&self, text: &str) -> UpstreamResult<Vec<u8>> {
        let body = SynthesizeBody {
            text,
            target_language_code: LANGUAGE_CODE,
            model: TTS_MODEL,
            output_audio_codec: TTS_OUTPUT.extension(),
        };

        let builder = self.http.post(self.url("text-to-speech")).json(&body);
        let v = self.execute(builder, "text-to-speech").await?;

        parse_audio(&v)
    }

    /// Send one request and turn the outcome into JSON or a classified failure.
    async fn execute(
        &self,
        builder: RequestBuilder,
        operation: &'static str,
    ) -> UpstreamResult<Value> {
        tracing::debug!(operation, "sending speech request");

        let resp = builder.send().await.map_err(|e| {
            let failure = UpstreamFailure::from_transport(&e);
            tracing::warn!(
                operation,
                error = %e,
                class = failure.tag(),
                "speech request did not complete"
            );
            failure
        })?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| UpstreamFailure::from_transport(&e))?;

        if !status.is_success() {
            let failure = UpstreamFailure::from_status(status.as_u16());
            tracing::warn!(
                operation,
                status = status.as_u16(),
                class = failure.tag(),
                "speech API returned an error"
            );
            tracing::debug!(operation, body = %text, "speech API error body");
            return Err(failure);
        }

        serde_json::from_str(&text)
            .map_err(|_| UpstreamFailure::MalformedResponse(MalformedKind::InvalidFormat))
    }
}

/// Extract `transcript` from a speech-to-text response.
pub fn parse_transcript(v: &Value) -> UpstreamResult<String> {
    v.get("transcript")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or(UpstreamFailure::MalformedResponse(MalformedKind::MissingChoice))
}

/// Decode `audios[0]` from a text-to-speech response.
pub fn parse_audio(v: &Value) -> UpstreamResult<Vec<u8>> {
    let encoded = v
        .get("audios")
        .and_then(Value::as_array)
        .and_then(|audios| audios.first())
        .and_then(Value::as_str)
        .ok_or(UpstreamFailure::MalformedResponse(MalformedKind::MissingChoice))?;

    let bytes = STANDARD
        .decode(encoded)
        .map_err(|_| UpstreamFailure::MalformedResponse(MalformedKind::InvalidFormat))?;

    if bytes.is_empty() {
        return Err(UpstreamFailure::MalformedResponse(MalformedKind::MissingChoice));
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use url::Url;

    use super::*;

    #[test]
    fn transcript_is_extracted() {
        let v = json!({"request_id": "r1", "transcript": "hello there", "language_code": "en-IN"});
        assert_eq!(parse_transcript(&v).unwrap(), "hello there");
    }

    #[test]
    fn missing_transcript_is_malformed() {
        let err = parse_transcript(&json!({"request_id": "r1"})).unwrap_err();
        assert_eq!(err, UpstreamFailure::MalformedResponse(MalformedKind::MissingChoice));
    }

    #[test]
    fn audio_is_decoded() {
        let v = json!({"audios": [STANDARD.encode(b"ID3fake-mp3")]});
        assert_eq!(parse_audio(&v).unwrap(), b"ID3fake-mp3");
    }

    #[test]
    fn bad_audio_payloads_are_malformed() {
        assert_eq!(
            parse_audio(&json!({"audios": []})).unwrap_err(),
            UpstreamFailure::MalformedResponse(MalformedKind::MissingChoice)
        );
        assert_eq!(
            parse_audio(&json!({"audios": ["%%%not base64"]})).unwrap_err(),
            UpstreamFailure::MalformedResponse(MalformedKind::InvalidFormat)
        );
        assert_eq!(
            parse_audio(&json!({"audios": [""]})).unwrap_err(),
            UpstreamFailure::MalformedResponse(MalformedKind::MissingChoice)
        );
    }

    #[test]
    fn urls_join_without_double_slash() {
        let client = SpeechClient::new(
            SpeechConfig {
                api_key: "k".into(),
                base_url: Url::parse("https://api.sarvam.ai/").unwrap(),
            },
            Duration::from_secs(30),
        )
        .unwrap();
        assert_eq!(client.url("text-to-speech"), "https://api.sarvam.ai/text-to-speech");
    }

    #[test]
    fn invalid_key_fails_at_construction() {
        let err = SpeechClient::new(
            SpeechConfig {
                api_key: "bad\nkey".into(),
                base_url: Url::parse("https://api.sarvam.ai").unwrap(),
            },
            Duration::from_secs(30),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            RelayError::InvalidConfig {
                name: "SARVAM_API_KEY",
                ..
            }
        ));
    }

    #[test]
    fn synthesize_body_shape() {
        let body = SynthesizeBody {
            text: "namaste",
            target_language_code: LANGUAGE_CODE,
            model: TTS_MODEL,
            output_audio_codec: TTS_OUTPUT.extension(),
        };
        let v = serde_json::to_value(body).unwrap();
        assert_eq!(v["text"], "namaste");
        assert_eq!(v["target_language_code"], "en-IN");
        assert_eq!(v["output_audio_codec"], "mp3");
    }
}
