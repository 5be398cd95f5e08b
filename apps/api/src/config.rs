use anyhow::{Context, Result};

use crate::sanitizer::triage::TriageThresholds;

/// Application configuration loaded from environment variables.
/// Panics at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub anthropic_api_key: String,
    /// Endpoint of the high-fidelity HTML-to-PDF render service.
    pub render_service_url: String,
    pub port: u16,
    pub rust_log: String,
    /// Health triage cutoff; above this many anomaly signatures a document
    /// is considered critical and skips high-fidelity rendering.
    pub triage: TriageThresholds,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let triage = TriageThresholds {
            warning_max: std::env::var("TRIAGE_WARNING_MAX")
                .ok()
                .map(|v| v.parse::<u32>())
                .transpose()
                .context("TRIAGE_WARNING_MAX must be a non-negative integer")?
                .unwrap_or_else(|| TriageThresholds::default().warning_max),
        };

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            render_service_url: require_env("RENDER_SERVICE_URL")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            triage,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
