//! Transient audio staging.
//!
//! An [`AudioAsset`] owns a uniquely named temporary file.  The file is
//! removed when the asset is dropped, so every exit path of a request
//! (success, upstream failure, early return, panic unwinding) cleans up.

use std::fmt;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::Result;

/// Container format of an audio blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Wav,
    Mp3,
}

impl AudioFormat {
    /// File extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Mp3 => "mp3",
        }
    }

    /// MIME type used in uploads and responses.
    pub fn mime(self) -> &'static str {
        match self {
            Self::Wav => "audio/wav",
            Self::Mp3 => "audio/mpeg",
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A blob of audio staged on disk for the lifetime of one request.
pub struct AudioAsset {
    format: AudioFormat,
    file: NamedTempFile,
}

impl AudioAsset {
    /// Write `bytes` to a fresh temporary file tagged with `format`.
    pub async fn stage(bytes: &[u8], format: AudioFormat) -> Result<Self> {
        let file = tempfile::Builder::new()
            .prefix("nirdeshak-")
            .suffix(&format!(".{}", format.extension()))
            .tempfile()?;
        tokio::fs::write(file.path(), bytes).await?;

        tracing::debug!(
            path = %file.path().display(),
            bytes = bytes.len(),
            %format,
            "staged audio"
        );
        Ok(Self { format, file })
    }

    /// Open the staged file for streaming, returning it with its length.
    pub async fn open(&self) -> Result<(tokio::fs::File, u64)> {
        let file = tokio::fs::File::open(self.file.path()).await?;
        let len = file.metadata().await?.len();
        Ok((file, len))
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Suggested upload file name, e.g. `audio.wav`.
    pub fn file_name(&self) -> String {
        format!("audio.{}", self.format.extension())
    }
}

impl fmt::Debug for AudioAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioAsset")
            .field("format", &self.format)
            .field("path", &self.file.path())
            .finish()
    }
}
