//! Health-check landing page served at `/`.
//!
//! The page is read from `<static_dir>/index.html` on each request so it can
//! be edited without a restart.  When the file does not exist a minimal
//! inline page is served instead.

use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use crate::error::{INTERNAL_MESSAGE, error_body};
use crate::state::AppState;

/// Served when no `index.html` is present.
pub const FALLBACK_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>NirdeshakAI API</title>
</head>
<body>
<h1>NirdeshakAI API is running</h1>
<p>POST /query, POST /transcribe and POST /tts are available.</p>
</body>
</html>
"##;

/// GET / -- the health page.
pub async fn index(State(state): State<Arc<AppState>>) -> Response {
    match load_page(&state.config.static_dir).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to read health page");
            error_body(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE)
        }
    }
}

/// Read `index.html` from `dir`, falling back to [`FALLBACK_HTML`] only when
/// the file is missing.
pub async fn load_page(dir: &Path) -> std::io::Result<String> {
    let path = dir.join("index.html");
    match tokio::fs::read_to_string(&path).await {
        Ok(html) => Ok(html),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "index.html not found, serving inline page");
            Ok(FALLBACK_HTML.to_owned())
        }
        Err(e) => Err(e),
    }
}
