use std::{env, path::PathBuf, time::Duration};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub tunnel_enabled: bool,
    pub tunnel_binary: String,
    pub tunnel_api_url: String,
    pub tunnel_init_delay: Duration,
    pub server_ready_delay: Duration,
    pub qr_output_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            upload_dir: PathBuf::from("uploads"),
            tunnel_enabled: true,
            tunnel_binary: "ngrok".to_string(),
            tunnel_api_url: "http://localhost:4040/api/tunnels".to_string(),
            tunnel_init_delay: Duration::from_secs(2),
            server_ready_delay: Duration::from_secs(3),
            qr_output_path: PathBuf::from("upload_qr.png"),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Values that fail to
    /// parse leave the default in place.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(host) = lookup("HOST") {
            config.host = host;
        }

        if let Some(port) = lookup("PORT") {
            if let Ok(port_num) = port.parse::<u16>() {
                config.port = port_num;
            }
        }

        if let Some(upload_dir) = lookup("UPLOAD_DIR") {
            config.upload_dir = PathBuf::from(upload_dir);
        }

        if let Some(enabled) = lookup("TUNNEL_ENABLED") {
            match enabled.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => config.tunnel_enabled = true,
                "0" | "false" | "no" | "off" => config.tunnel_enabled = false,
                _ => {}
            }
        }

        if let Some(binary) = lookup("TUNNEL_BINARY") {
            config.tunnel_binary = binary;
        }

        if let Some(api_url) = lookup("TUNNEL_API_URL") {
            config.tunnel_api_url = api_url;
        }

        if let Some(delay) = lookup("TUNNEL_INIT_DELAY_MS") {
            if let Ok(ms) = delay.parse::<u64>() {
                config.tunnel_init_delay = Duration::from_millis(ms);
            }
        }

        if let Some(delay) = lookup("SERVER_READY_DELAY_MS") {
            if let Ok(ms) = delay.parse::<u64>() {
                config.server_ready_delay = Duration::from_millis(ms);
            }
        }

        if let Some(path) = lookup("QR_OUTPUT_PATH") {
            config.qr_output_path = PathBuf::from(path);
        }

        config
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
