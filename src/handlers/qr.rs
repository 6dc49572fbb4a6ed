use crate::models::errors::AppError;
use crate::services::qr_generator::qr_target_url;
use crate::AppState;
use axum::{
    extract::{Host, State},
    http::{header, Uri},
    response::IntoResponse,
};

/// Serve a PNG QR code of the server's externally reachable URL.
///
/// Uses the tunnel URL when one was discovered, otherwise the host this
/// request came in on.
pub async fn qr_code(
    State(app_state): State<AppState>,
    host: Option<Host>,
    uri: Uri,
) -> Result<impl IntoResponse, AppError> {
    let base_url = match app_state.public_url.get() {
        Some(url) => url.to_string(),
        None => {
            let host = host
                .map(|Host(host)| host)
                .unwrap_or_else(|| format!("localhost:{}", app_state.config.port));
            format!("http://{}/", host)
        }
    };

    let target = qr_target_url(&base_url, uri.path());
    let png = app_state.qr.generate_png(&target)?;

    tracing::debug!("Serving QR code for {}", target);

    Ok(([(header::CONTENT_TYPE, mime::IMAGE_PNG.to_string())], png))
}
