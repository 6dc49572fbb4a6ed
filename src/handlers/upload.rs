use crate::models::errors::AppError;
use crate::AppState;
use axum::{
    body::Body,
    extract::{Request, State},
    http::header,
    response::Html,
};
use futures_util::TryStreamExt;
use multer::Multipart;

/// Multipart field that carries the uploaded file
const FILE_FIELD: &str = "file";

pub const UPLOAD_FORM: &str = r#"<!doctype html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Upload File</title>
</head>
<body>
    <h2>Upload a File from Phone</h2>
    <form method="post" enctype="multipart/form-data">
        <input type="file" name="file" required>
        <input type="submit" value="Upload">
    </form>
    <p><a href="/files">View uploaded files</a></p>
    <p><img src="/qr" alt="QR code for this page" width="200" height="200"></p>
</body>
</html>
"#;

/// Render the upload form
pub async fn upload_form() -> Html<&'static str> {
    Html(UPLOAD_FORM)
}

/// Accept one multipart file and store it under its client-supplied name.
///
/// A request without a usable `file` field gets the form back, the same as
/// a GET.
pub async fn upload_file(
    State(app_state): State<AppState>,
    request: Request<Body>,
) -> Result<Html<String>, AppError> {
    let boundary = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|ct| ct.to_str().ok())
        .and_then(|ct| multer::parse_boundary(ct).ok());

    let Some(boundary) = boundary else {
        tracing::debug!("Upload without a multipart body, rendering form");
        return Ok(Html(UPLOAD_FORM.to_string()));
    };

    // Convert the request body to a stream
    let stream = request
        .into_body()
        .into_data_stream()
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err));

    let mut multipart = Multipart::new(stream, boundary);

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::file_upload_failed(format!("Failed to read multipart field: {}", e))
    })? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        // An empty file input still submits the field, with an empty name
        let filename = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => break,
        };

        tracing::debug!(
            "Processing upload: {} (content_type: {:?})",
            filename,
            field.content_type().map(|m| m.to_string())
        );

        let size = app_state.storage.save_stream(&filename, field).await?;

        tracing::info!("Saved upload: {} ({} bytes)", filename, size);

        return Ok(Html(format!(
            "<p>✅ File saved: {}</p><a href='/'>Back</a>",
            html_escape::encode_text(&filename)
        )));
    }

    tracing::debug!("No file in upload request, rendering form");
    Ok(Html(UPLOAD_FORM.to_string()))
}
