//! API configuration.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Max request body size
    pub max_body_size: usize,
    /// Where uploads are stored
    pub upload_dir: PathBuf,
    /// Where the annotated video and snapshot are written
    pub processed_dir: PathBuf,
    /// Externally reachable base URL for artifact links
    pub public_base_url: Option<String>,
    /// JSON file with an `ngrok_url` key, consulted when no base URL is set
    pub ngrok_config_path: PathBuf,
    /// Expose Prometheus metrics at /metrics
    pub metrics_enabled: bool,
    /// Environment (development/production)
    pub environment: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            cors_origins: vec!["*".to_string()],
            max_body_size: 512 * 1024 * 1024, // 512MB
            upload_dir: PathBuf::from("uploads"),
            processed_dir: PathBuf::from("processed"),
            public_base_url: None,
            ngrok_config_path: PathBuf::from("ngrok_config.json"),
            metrics_enabled: true,
            environment: "development".to_string(),
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5000),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(|_| vec!["*".to_string()]),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(512 * 1024 * 1024),
            upload_dir: std::env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("uploads")),
            processed_dir: std::env::var("PROCESSED_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("processed")),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .ok()
                .map(|s| s.trim().trim_end_matches('/').to_string())
                .filter(|s| !s.is_empty()),
            ngrok_config_path: std::env::var("NGROK_CONFIG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("ngrok_config.json")),
            metrics_enabled: std::env::var("METRICS_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }

    /// Path the uploaded video is saved to.
    pub fn input_path(&self) -> PathBuf {
        self.upload_dir.join("input.mp4")
    }

    /// Public tunnel URL from the ngrok config file, empty if unavailable.
    pub async fn tunnel_url(&self) -> String {
        load_tunnel_url(&self.ngrok_config_path).await
    }

    /// Base URL used in artifact links.
    ///
    /// `PUBLIC_BASE_URL` wins, then the tunnel URL, then localhost.
    pub async fn artifact_base_url(&self) -> String {
        if let Some(url) = &self.public_base_url {
            return url.clone();
        }
        let tunnel = self.tunnel_url().await;
        if !tunnel.is_empty() {
            return tunnel;
        }
        format!("http://localhost:{}", self.port)
    }
}

#[derive(Debug, Deserialize)]
struct TunnelConfig {
    #[serde(default)]
    ngrok_url: String,
}

async fn load_tunnel_url(path: &Path) -> String {
    let contents = match tokio::fs::read(path).await {
        Ok(contents) => contents,
        Err(_) => return String::new(),
    };
    match serde_json::from_slice::<TunnelConfig>(&contents) {
        Ok(config) => config.ngrok_url.trim_end_matches('/').to_string(),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Ignoring unreadable tunnel config");
            String::new()
        }
    }
}
