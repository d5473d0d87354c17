/// Credential service
///
/// This module provides the authentication primitives for TaskMind:
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: Signed, time-limited session tokens
/// - [`middleware`]: Bearer token extraction and the authenticated user context
///
/// # Example
///
/// ```no_run
/// use taskmind_shared::auth::password::{hash_password, verify_password};
/// use taskmind_shared::auth::jwt::TokenSigner;
/// use chrono::Duration;
/// use jsonwebtoken::Algorithm;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// // Password authentication
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// // Session token
/// let signer = TokenSigner::new("secret-key", Algorithm::HS256, Duration::minutes(30));
/// let token = signer.issue(Uuid::new_v4(), "benny")?;
/// let claims = signer.validate(&token)?;
/// assert_eq!(claims.username, "benny");
/// # Ok(())
/// # }
/// ```

pub mod password;
pub mod jwt;
pub mod middleware;
