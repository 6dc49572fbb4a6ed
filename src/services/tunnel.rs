use crate::models::{errors::AppError, public_url::PublicUrl};
use crate::services::qr_generator::QrGenerator;
use crate::utils::config::AppConfig;
use serde::Deserialize;
use std::{io::ErrorKind, process::Stdio, time::Duration};
use tokio::process::{Child, Command};

/// How long to wait on the tunnel's admin API before giving up
const ADMIN_API_TIMEOUT: Duration = Duration::from_secs(5);

/// One entry of the admin API's tunnel list
#[derive(Debug, Clone, Deserialize)]
pub struct TunnelInfo {
    pub public_url: String,
}

#[derive(Debug, Deserialize)]
struct TunnelsResponse {
    tunnels: Vec<TunnelInfo>,
}

/// Start `{binary} http {port}` in the background.
///
/// The child is detached from our stdio and never stopped by this process.
pub fn launch_tunnel(binary: &str, port: u16) -> Result<Child, AppError> {
    tracing::info!("Starting tunnel: {} http {}", binary, port);

    Command::new(binary)
        .arg("http")
        .arg(port.to_string())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => AppError::tunnel_failed(format!(
                "'{}' not found. Install it and add it to PATH",
                binary
            )),
            _ => AppError::tunnel_failed(format!("Failed to start '{}': {}", binary, e)),
        })
}

/// Pull the first tunnel's public URL out of an admin API response body
pub fn parse_public_url(body: &[u8]) -> Result<String, AppError> {
    let response: TunnelsResponse = serde_json::from_slice(body)
        .map_err(|e| AppError::tunnel_failed(format!("Malformed tunnel metadata: {}", e)))?;

    response
        .tunnels
        .into_iter()
        .next()
        .map(|tunnel| tunnel.public_url)
        .ok_or_else(|| AppError::tunnel_failed("Tunnel admin API reported no tunnels"))
}

/// Client for the tunnel's local admin API
#[derive(Debug, Clone)]
pub struct TunnelClient {
    http: reqwest::Client,
    api_url: String,
}

impl TunnelClient {
    pub fn new(api_url: impl Into<String>) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(ADMIN_API_TIMEOUT)
            .build()
            .map_err(|e| AppError::tunnel_failed(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_url: api_url.into(),
        })
    }

    /// Query the admin API once for the first published public URL
    pub async fn discover_public_url(&self) -> Result<String, AppError> {
        let response = self
            .http
            .get(&self.api_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                AppError::tunnel_failed(format!("Tunnel admin API unreachable: {}", e))
            })?;

        let body = response.bytes().await.map_err(|e| {
            AppError::tunnel_failed(format!("Failed to read tunnel metadata: {}", e))
        })?;

        parse_public_url(&body)
    }
}

/// Discover the tunnel's public URL after the init delay and publish it.
///
/// On success the URL is stored in `public_url` and its QR code is written
/// to the configured path. Every failure is logged and swallowed; the QR
/// endpoint then keeps using request-derived URLs.
pub async fn publish_public_url(config: &AppConfig, public_url: &PublicUrl) -> Option<String> {
    tokio::time::sleep(config.tunnel_init_delay).await;

    let discovered = match TunnelClient::new(config.tunnel_api_url.as_str()) {
        Ok(client) => client.discover_public_url().await,
        Err(e) => Err(e),
    };

    let url = match discovered {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!("Failed to get tunnel URL: {}", e);
            tracing::warn!("Failed to generate public URL");
            return None;
        }
    };

    if !public_url.set(url.as_str()) {
        tracing::debug!("Public URL already set, keeping the existing value");
    }

    tracing::info!("Scan this QR code to upload a file: {}", url);
    match QrGenerator::new().save_png(&url, &config.qr_output_path).await {
        Ok(()) => tracing::info!("QR code saved to {}", config.qr_output_path.display()),
        Err(e) => tracing::warn!("Failed to save QR code: {}", e),
    }
    tracing::info!(
        "Files will be saved to the '{}' folder",
        config.upload_dir.display()
    );

    Some(url)
}
