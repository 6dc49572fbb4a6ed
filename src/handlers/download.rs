use crate::models::errors::AppError;
use crate::AppState;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::Response,
};
use tokio_util::io::ReaderStream;

/// Stream a stored file back to the client as an attachment
pub async fn download_file(
    State(app_state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response<Body>, AppError> {
    let (file, size) = app_state.storage.open_file(&name).await?;

    let content_type = mime_guess::from_path(&name).first_or_octet_stream();
    let disposition = content_disposition(&name)?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type.to_string())
        .header(header::CONTENT_LENGTH, size.to_string())
        .header(header::CONTENT_DISPOSITION, disposition)
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| AppError::internal_error(format!("Failed to build response: {}", e)))?;

    tracing::info!("Serving download: {} ({} bytes)", name, size);

    Ok(response)
}

/// `attachment; filename="..."`, plus an RFC 5987 `filename*` when the
/// name is not plain printable ASCII. The quoted `filename` then carries an
/// ASCII-only fallback.
fn content_disposition(name: &str) -> Result<HeaderValue, AppError> {
    let is_plain = name.chars().all(|c| c.is_ascii() && !c.is_ascii_control());

    let fallback: String = name
        .chars()
        .filter(|c| c.is_ascii() && !c.is_ascii_control())
        .collect::<String>()
        .replace('\\', "\\\\")
        .replace('"', "\\\"");

    let value = if is_plain {
        format!("attachment; filename=\"{}\"", fallback)
    } else {
        format!(
            "attachment; filename=\"{}\"; filename*=UTF-8''{}",
            fallback,
            urlencoding::encode(name)
        )
    };

    HeaderValue::from_str(&value)
        .map_err(|e| AppError::internal_error(format!("Invalid download name {:?}: {}", name, e)))
}
