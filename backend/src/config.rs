//! Server configuration from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `VALENTINE_BIND_ADDR` | `127.0.0.1:3000` |
//! | `DATABASE_URL` | `sqlite:valentine.db` |
//! | `VALENTINE_UPLOAD_DIR` | `uploads` |
//! | `VALENTINE_SIGNING_SECRET` | random per process |
//! | `VALENTINE_PUBLIC_URL` | `http://<bind addr>` |
//! | `VALENTINE_FRONTEND_DIST` | `../frontend/dist` |
//! | `VALENTINE_CORS_ORIGIN` | any origin |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::warn;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub upload_dir: PathBuf,
    pub signing_secret: String,
    pub public_url: String,
    pub frontend_dist: PathBuf,
    pub cors_origin: Option<String>,
    /// Lifetime of links to uploaded images
    pub signed_url_ttl: Duration,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let bind_addr = SocketAddr::from(([127, 0, 0, 1], 3000));
        Self {
            bind_addr,
            database_url: "sqlite:valentine.db".to_string(),
            upload_dir: PathBuf::from("uploads"),
            signing_secret: uuid::Uuid::new_v4().to_string(),
            public_url: format!("http://{}", bind_addr),
            frontend_dist: PathBuf::from("../frontend/dist"),
            cors_origin: None,
            signed_url_ttl: Duration::from_secs(3600),
            max_upload_bytes: shared::CardLimits::default().max_upload_bytes,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(addr) = lookup("VALENTINE_BIND_ADDR") {
            config.bind_addr = addr
                .parse()
                .with_context(|| format!("Invalid VALENTINE_BIND_ADDR: {}", addr))?;
            config.public_url = format!("http://{}", config.bind_addr);
        }
        if let Some(url) = lookup("DATABASE_URL") {
            config.database_url = url;
        }
        if let Some(dir) = lookup("VALENTINE_UPLOAD_DIR") {
            config.upload_dir = PathBuf::from(dir);
        }
        match lookup("VALENTINE_SIGNING_SECRET").filter(|s| !s.is_empty()) {
            Some(secret) => config.signing_secret = secret,
            None => warn!("VALENTINE_SIGNING_SECRET not set, image links will not survive a restart"),
        }
        if let Some(url) = lookup("VALENTINE_PUBLIC_URL") {
            config.public_url = url.trim_end_matches('/').to_string();
        }
        if let Some(dist) = lookup("VALENTINE_FRONTEND_DIST") {
            config.frontend_dist = PathBuf::from(dist);
        }
        config.cors_origin = lookup("VALENTINE_CORS_ORIGIN").filter(|s| !s.is_empty() && s != "*");

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:3000");
        assert_eq!(config.public_url, "http://127.0.0.1:3000");
        assert_eq!(config.database_url, "sqlite:valentine.db");
        assert_eq!(config.max_upload_bytes, 5 * 1024 * 1024);
        assert!(config.cors_origin.is_none());
        assert!(!config.signing_secret.is_empty());
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("VALENTINE_BIND_ADDR", "0.0.0.0:8080"),
            ("VALENTINE_PUBLIC_URL", "https://cards.example.com/"),
            ("VALENTINE_SIGNING_SECRET", "s3cret"),
            ("VALENTINE_CORS_ORIGIN", "*"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.public_url, "https://cards.example.com");
        assert_eq!(config.signing_secret, "s3cret");
        assert!(config.cors_origin.is_none());
    }

    #[test]
    fn test_bad_bind_addr() {
        assert!(ServerConfig::from_lookup(lookup_from(&[("VALENTINE_BIND_ADDR", "nope")])).is_err());
    }
}
