//! Server configuration

use std::env;

const DEFAULT_ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";
const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";

/// Server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string; `None` selects the in-memory store
    pub database_url: Option<String>,
    pub bind_address: String,
    /// HS256 secret shared with the identity provider
    pub jwt_secret: Option<String>,
    pub cors_origins: Vec<String>,
    pub rate_limit_rps: u32,
    pub anthropic_api_key: Option<String>,
    pub anthropic_api_url: String,
    pub anthropic_model: String,
    pub anthropic_max_tokens: u32,
    pub llm_imaging_extraction: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            bind_address: "0.0.0.0:8080".into(),
            jwt_secret: None,
            cors_origins: vec!["*".into()],
            rate_limit_rps: 100,
            anthropic_api_key: None,
            anthropic_api_url: DEFAULT_ANTHROPIC_URL.into(),
            anthropic_model: DEFAULT_MODEL.into(),
            anthropic_max_tokens: 4096,
            llm_imaging_extraction: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is read first when present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let defaults = Self::default();

        Self {
            database_url: non_empty("DATABASE_URL"),
            bind_address: env::var("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            jwt_secret: non_empty("AUTH_JWT_SECRET"),
            cors_origins: non_empty("CORS_ORIGINS")
                .map(|v| v.split(',').map(|o| o.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            rate_limit_rps: parsed("RATE_LIMIT_RPS")
                .filter(|rps| *rps > 0)
                .unwrap_or(defaults.rate_limit_rps),
            anthropic_api_key: non_empty("ANTHROPIC_API_KEY"),
            anthropic_api_url: non_empty("ANTHROPIC_API_URL").unwrap_or(defaults.anthropic_api_url),
            anthropic_model: non_empty("ANTHROPIC_MODEL").unwrap_or(defaults.anthropic_model),
            anthropic_max_tokens: parsed("ANTHROPIC_MAX_TOKENS")
                .unwrap_or(defaults.anthropic_max_tokens),
            llm_imaging_extraction: parsed("LLM_IMAGING_EXTRACTION")
                .unwrap_or(defaults.llm_imaging_extraction),
        }
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    non_empty(key).and_then(|v| v.trim().parse().ok())
}
