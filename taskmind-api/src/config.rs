/// Configuration management for the API server
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct. It is built once at startup and shared
/// read-only through the application state.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8000)
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `SECRET_KEY`: Secret key for token signing (required)
/// - `ALGORITHM`: Token algorithm, HS256/HS384/HS512 (default: HS256)
/// - `ACCESS_TOKEN_EXPIRE_MINUTES`: Token lifetime (default: 30)
/// - `AI_PROVIDER`: `remote` or `mock` (default: remote)
/// - `GROQ_API_KEY` / `GROQ_MODEL`: Summarization provider
/// - `GEMINI_API_KEY` / `GEMINI_EMBEDDING_MODEL`: Embedding provider
/// - `FRONTEND_URL`: Extra allowed CORS origin, `*` for any
/// - `PRODUCTION`: Enables HSTS (default: false)
/// - `RUST_LOG`: Log filter
///
/// # Example
///
/// ```no_run
/// use taskmind_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use jsonwebtoken::Algorithm;
use std::env;
use std::str::FromStr;
use taskmind_shared::ai::gemini::DEFAULT_GEMINI_MODEL;
use taskmind_shared::ai::groq::DEFAULT_GROQ_MODEL;
use taskmind_shared::auth::jwt::{is_hmac, DEFAULT_TOKEN_LIFETIME_MINUTES};

/// Origin of the development frontend, always allowed
pub const DEV_FRONTEND_ORIGIN: &str = "http://localhost:5173";

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Token configuration
    pub jwt: JwtConfig,

    /// AI provider configuration
    pub ai: AiConfig,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; empty means any origin
    pub cors_origins: Vec<String>,

    /// Production mode (HSTS)
    pub production: bool,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Longest accepted token lifetime: one year
pub const MAX_TOKEN_LIFETIME_MINUTES: i64 = 525_600;

/// Token configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for token signing
    ///
    /// Should be at least 32 bytes. Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// HMAC signing algorithm
    pub algorithm: Algorithm,

    /// Token lifetime in minutes
    pub expire_minutes: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[REDACTED]")
            .field("algorithm", &self.algorithm)
            .field("expire_minutes", &self.expire_minutes)
            .finish()
    }
}

/// Which AI providers to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiMode {
    /// Groq summaries and Gemini embeddings
    Remote,

    /// Deterministic offline providers
    Mock,
}

impl FromStr for AiMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "remote" => Ok(AiMode::Remote),
            "mock" => Ok(AiMode::Mock),
            other => anyhow::bail!("AI_PROVIDER must be 'remote' or 'mock', got '{}'", other),
        }
    }
}

/// AI provider configuration
#[derive(Clone)]
pub struct AiConfig {
    pub mode: AiMode,
    pub groq_api_key: Option<String>,
    pub groq_model: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
}

impl std::fmt::Debug for AiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiConfig")
            .field("mode", &self.mode)
            .field("groq_api_key", &self.groq_api_key.as_ref().map(|_| "[REDACTED]"))
            .field("groq_model", &self.groq_model)
            .field("gemini_api_key", &self.gemini_api_key.as_ref().map(|_| "[REDACTED]"))
            .field("gemini_model", &self.gemini_model)
            .finish()
    }
}

/// Reads an optional variable, treating empty values as unset
fn var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Parses a boolean flag (`true`/`1`/`yes`, case-insensitive)
fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}

/// Parses an HMAC algorithm name
pub fn parse_algorithm(value: &str) -> anyhow::Result<Algorithm> {
    let algorithm = Algorithm::from_str(value.trim())
        .map_err(|_| anyhow::anyhow!("ALGORITHM '{}' is not a known algorithm", value))?;

    if !is_hmac(algorithm) {
        anyhow::bail!("ALGORITHM must be HS256, HS384 or HS512, got {:?}", algorithm);
    }

    Ok(algorithm)
}

/// Builds the CORS origin list; `*` anywhere means any origin
pub fn cors_origins(frontend_url: Option<&str>) -> Vec<String> {
    let mut origins = vec![DEV_FRONTEND_ORIGIN.to_string()];

    if let Some(url) = frontend_url {
        let url = url.trim().trim_end_matches('/');
        if url == "*" {
            return Vec::new();
        }
        if !url.is_empty() && !origins.iter().any(|o| o == url) {
            origins.push(url.to_string());
        }
    }

    origins
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing
    /// - Environment variables have invalid values
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let api_host = var("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let api_port = var("API_PORT")
            .unwrap_or_else(|| "8000".to_string())
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("API_PORT is invalid: {}", e))?;

        let database_url = var("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "10".to_string())
            .parse::<u32>()
            .map_err(|e| anyhow::anyhow!("DATABASE_MAX_CONNECTIONS is invalid: {}", e))?;

        let secret = var("SECRET_KEY")
            .ok_or_else(|| anyhow::anyhow!("SECRET_KEY environment variable is required"))?;

        if secret.len() < 32 {
            tracing::warn!("SECRET_KEY is shorter than 32 bytes; use a longer random secret");
        }

        let algorithm = parse_algorithm(&var("ALGORITHM").unwrap_or_else(|| "HS256".to_string()))?;

        let expire_minutes = match var("ACCESS_TOKEN_EXPIRE_MINUTES") {
            Some(v) => v
                .trim()
                .parse::<i64>()
                .map_err(|e| anyhow::anyhow!("ACCESS_TOKEN_EXPIRE_MINUTES is invalid: {}", e))?,
            None => DEFAULT_TOKEN_LIFETIME_MINUTES,
        };

        let config = Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins: cors_origins(var("FRONTEND_URL").as_deref()),
                production: var("PRODUCTION").map(|v| parse_flag(&v)).unwrap_or(false),
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            jwt: JwtConfig {
                secret,
                algorithm,
                expire_minutes,
            },
            ai: AiConfig {
                mode: var("AI_PROVIDER")
                    .map(|v| v.parse())
                    .transpose()?
                    .unwrap_or(AiMode::Remote),
                groq_api_key: var("GROQ_API_KEY"),
                groq_model: var("GROQ_MODEL").unwrap_or_else(|| DEFAULT_GROQ_MODEL.to_string()),
                gemini_api_key: var("GEMINI_API_KEY"),
                gemini_model: var("GEMINI_EMBEDDING_MODEL")
                    .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field constraints
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.jwt.expire_minutes <= 0 {
            anyhow::bail!("ACCESS_TOKEN_EXPIRE_MINUTES must be greater than zero");
        }
        if self.jwt.expire_minutes > MAX_TOKEN_LIFETIME_MINUTES {
            anyhow::bail!(
                "ACCESS_TOKEN_EXPIRE_MINUTES must be at most {} (one year)",
                MAX_TOKEN_LIFETIME_MINUTES
            );
        }

        if self.database.max_connections == 0 {
            anyhow::bail!("DATABASE_MAX_CONNECTIONS must be greater than zero");
        }

        if self.ai.mode == AiMode::Remote {
            if self.ai.groq_api_key.is_none() {
                anyhow::bail!("GROQ_API_KEY is required when AI_PROVIDER=remote");
            }
            if self.ai.gemini_api_key.is_none() {
                anyhow::bail!("GEMINI_API_KEY is required when AI_PROVIDER=remote");
            }
        }

        Ok(())
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}
