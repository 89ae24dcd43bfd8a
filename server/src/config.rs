use anyhow::{Context, Result, anyhow};
use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::auth::AuthConfig;

const MIN_SECRET_BYTES: usize = 32;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub auth: AuthConfig,
    pub cors_allowed_origins: Vec<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let secret =
            std::env::var("AUTH_SECRET_BASE64").context("AUTH_SECRET_BASE64 missing")?;
        let secret_bytes = decode_secret(&secret)?;

        let token_ttl_minutes = match std::env::var("TOKEN_TTL_MINUTES") {
            Ok(raw) => raw
                .trim()
                .parse::<i64>()
                .context("TOKEN_TTL_MINUTES must be an integer")?,
            Err(_) => 60,
        };

        let cors_allowed_origins = parse_origins(
            &std::env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:5173".into()),
        );

        Ok(Self {
            auth: AuthConfig::new(secret_bytes, token_ttl_minutes),
            cors_allowed_origins,
        })
    }
}

fn decode_secret(raw: &str) -> Result<Vec<u8>> {
    let bytes = STANDARD
        .decode(raw.trim())
        .context("invalid AUTH_SECRET_BASE64")?;
    if bytes.len() < MIN_SECRET_BYTES {
        return Err(anyhow!(
            "AUTH_SECRET_BASE64 must decode to at least {MIN_SECRET_BYTES} bytes"
        ));
    }
    Ok(bytes)
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
