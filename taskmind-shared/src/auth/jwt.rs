/// Session token issuance and validation
///
/// Login hands out a signed, self-contained JWT. The token carries the user
/// id as the `sub` claim, the username as an extra claim, and an `exp`
/// timestamp derived from the configured lifetime.
///
/// # Security
///
/// - **Algorithm**: HMAC family (HS256 by default), chosen at startup
/// - **Expiration**: Configurable lifetime (30 minutes by default)
/// - **Validation**: Signature, expiration, not-before and issuer checks
/// - **Secret Management**: Secrets should be at least 32 bytes (256 bits)
///
/// # Example
///
/// ```
/// use taskmind_shared::auth::jwt::TokenSigner;
/// use chrono::Duration;
/// use jsonwebtoken::Algorithm;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let signer = TokenSigner::new(
///     "your-secret-key-at-least-32-bytes",
///     Algorithm::HS256,
///     Duration::minutes(30),
/// );
///
/// let user_id = Uuid::new_v4();
/// let token = signer.issue(user_id, "benny")?;
///
/// let claims = signer.validate(&token)?;
/// assert_eq!(claims.sub, user_id);
/// assert_eq!(claims.username, "benny");
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer written into and required from every token
pub const ISSUER: &str = "taskmind";

/// Default token lifetime
pub const DEFAULT_TOKEN_LIFETIME_MINUTES: i64 = 30;

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Invalid issuer
    #[error("Invalid issuer: expected {expected}")]
    InvalidIssuer { expected: String },

    /// Algorithm is not usable with a shared secret
    #[error("Unsupported signing algorithm: {0:?}")]
    UnsupportedAlgorithm(Algorithm),
}

/// JWT claims structure
///
/// # Standard Claims
///
/// - `sub`: Subject (user ID)
/// - `iss`: Issuer (always "taskmind")
/// - `iat`: Issued at timestamp
/// - `exp`: Expiration timestamp
/// - `nbf`: Not before timestamp
///
/// # Custom Claims
///
/// - `username`: Username at the time the token was issued
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - User ID
    pub sub: Uuid,

    /// Username (custom claim)
    pub username: String,

    /// Issuer - Always "taskmind"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,
}

impl Claims {
    /// Creates claims that expire `expires_in` from now
    ///
    /// A negative duration produces already-expired claims, which is useful
    /// in tests.
    pub fn new(user_id: Uuid, username: impl Into<String>, expires_in: Duration) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            sub: user_id,
            username: username.into(),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
        }
    }

    /// Checks if token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Gets time until expiration
    pub fn time_until_expiration(&self) -> Option<Duration> {
        let now = Utc::now().timestamp();
        if self.exp > now {
            Some(Duration::seconds(self.exp - now))
        } else {
            None
        }
    }
}

/// Returns true for algorithms that sign with a shared secret
pub fn is_hmac(algorithm: Algorithm) -> bool {
    matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)
}

/// Creates a signed JWT from claims
///
/// # Errors
///
/// Returns `JwtError::UnsupportedAlgorithm` for non-HMAC algorithms and
/// `JwtError::CreateError` if encoding fails
pub fn create_token(claims: &Claims, secret: &str, algorithm: Algorithm) -> Result<String, JwtError> {
    if !is_hmac(algorithm) {
        return Err(JwtError::UnsupportedAlgorithm(algorithm));
    }

    let header = Header::new(algorithm);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a JWT and extracts its claims
///
/// Verifies the signature, `exp`, `nbf` and that the issuer is "taskmind".
/// Tokens signed with any other algorithm are rejected.
pub fn validate_token(token: &str, secret: &str, algorithm: Algorithm) -> Result<Claims, JwtError> {
    if !is_hmac(algorithm) {
        return Err(JwtError::UnsupportedAlgorithm(algorithm));
    }

    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(algorithm);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer {
            expected: ISSUER.to_string(),
        },
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

/// Process-wide token signer
///
/// Bundles the signing secret, algorithm and token lifetime that are loaded
/// once at startup.
#[derive(Clone)]
pub struct TokenSigner {
    secret: String,
    algorithm: Algorithm,
    lifetime: Duration,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("algorithm", &self.algorithm)
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

impl TokenSigner {
    /// Creates a signer
    pub fn new(secret: impl Into<String>, algorithm: Algorithm, lifetime: Duration) -> Self {
        Self {
            secret: secret.into(),
            algorithm,
            lifetime,
        }
    }

    /// Signing algorithm
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Token lifetime
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Issues a token for a user, valid for the configured lifetime
    pub fn issue(&self, user_id: Uuid, username: &str) -> Result<String, JwtError> {
        let claims = Claims::new(user_id, username, self.lifetime);
        self.sign(&claims)
    }

    /// Signs arbitrary claims with this signer's secret and algorithm
    pub fn sign(&self, claims: &Claims) -> Result<String, JwtError> {
        create_token(claims, &self.secret, self.algorithm)
    }

    /// Validates a token and returns its claims
    pub fn validate(&self, token: &str) -> Result<Claims, JwtError> {
        validate_token(token, &self.secret, self.algorithm)
    }
}
