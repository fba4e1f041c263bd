use serde::Deserialize;

/// Client configuration. Loaded from environment variables with the
/// prefix `STREAMPASS__`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Backend base URL. An empty string means same-origin deployments
    /// where the reverse proxy fills in the host.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// File the bearer token is mirrored to across restarts.
    #[serde(default = "default_token_path")]
    pub token_path: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Fixed page size for admin user listings.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_base_url() -> String {
    "https://api.streampass.io".to_string()
}

fn default_token_path() -> String {
    ".streampass/access_token".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_page_size() -> u32 {
    50
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token_path: default_token_path(),
            request_timeout_secs: default_request_timeout_secs(),
            page_size: default_page_size(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("STREAMPASS")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.page_size, 50);
        assert_eq!(cfg.request_timeout_secs, 30);
        assert!(cfg.base_url.starts_with("https://"));
    }
}
