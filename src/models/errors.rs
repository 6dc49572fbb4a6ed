use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Storage error: {message}")]
    StorageError { message: String },

    #[error("File upload error: {message}")]
    FileUploadError { message: String },

    #[error("File not found: {name}")]
    FileNotFound { name: String, reason: String },

    #[error("QR code generation failed: {message}")]
    QrCodeError { message: String },

    #[error("Tunnel error: {message}")]
    TunnelError { message: String },

    #[error("Internal server error: {message}")]
    InternalError { message: String },
}

/// What a client gets to see about a failed request
#[derive(Debug, Clone)]
pub struct ErrorResponse {
    pub status: StatusCode,
    pub message: String,
}

pub struct ErrorHandler;

impl ErrorHandler {
    /// Converts an AppError into the response shown to the client
    pub fn handle_error(error: AppError) -> ErrorResponse {
        match error {
            AppError::StorageError { .. } => ErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: "Storage operation failed".to_string(),
            },

            AppError::FileUploadError { .. } => ErrorResponse {
                status: StatusCode::BAD_REQUEST,
                message: "File upload failed".to_string(),
            },

            AppError::FileNotFound { reason, .. } => ErrorResponse {
                status: StatusCode::NOT_FOUND,
                message: format!("Error downloading file: {}", reason),
            },

            AppError::QrCodeError { .. } => ErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: "Failed to generate QR code".to_string(),
            },

            // Tunnel failures never reach a client; they only degrade the QR URL.
            AppError::TunnelError { .. } | AppError::InternalError { .. } => ErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: "An unexpected error occurred".to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if matches!(self, AppError::FileNotFound { .. }) {
            tracing::warn!("{}", self);
            let error = ErrorHandler::handle_error(self);
            return (error.status, error.message).into_response();
        }

        tracing::error!("Request failed: {}", self);
        let error = ErrorHandler::handle_error(self);
        let page = format!(
            "<!doctype html>\n<title>{code} {reason}</title>\n<h1>{reason}</h1>\n<p>{message}</p>\n",
            code = error.status.as_u16(),
            reason = error.status.canonical_reason().unwrap_or("Error"),
            message = html_escape::encode_text(&error.message),
        );
        (error.status, Html(page)).into_response()
    }
}

// Convenience functions for creating specific errors
impl AppError {
    pub fn storage_failed(message: impl Into<String>) -> Self {
        AppError::StorageError { message: message.into() }
    }

    pub fn file_upload_failed(message: impl Into<String>) -> Self {
        AppError::FileUploadError { message: message.into() }
    }

    pub fn file_not_found(name: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::FileNotFound {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn qr_code_failed(message: impl Into<String>) -> Self {
        AppError::QrCodeError { message: message.into() }
    }

    pub fn tunnel_failed(message: impl Into<String>) -> Self {
        AppError::TunnelError { message: message.into() }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        AppError::InternalError { message: message.into() }
    }
}
