/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and registration rules
/// - [`session`]: Signed session tokens carried in the session cookie
/// - [`authorization`]: Permission predicates returning [`authorization::Access`]
///
/// # Example
///
/// ```no_run
/// use taskhub_shared::auth::password::{hash_password, verify_password};
/// use taskhub_shared::auth::session::{create_token, SessionClaims};
/// use chrono::Duration;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let token = create_token(&SessionClaims::new(1, Duration::days(14))?, "secret-key")?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod password;
pub mod session;
