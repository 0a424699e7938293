/// Configuration management for the web server
///
/// Configuration is read from environment variables once at startup. A `.env`
/// file in the working directory is loaded first if present.
///
/// # Environment Variables
///
/// - `HOST`: Host to bind to (default: 0.0.0.0)
/// - `PORT`: Port to bind to (default: 8000)
/// - `DATABASE_URL`: SQLite connection string (default: sqlite://taskhub.db?mode=rwc)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 5)
/// - `SECRET_KEY`: Key for signing session cookies (required, 32+ characters)
/// - `SESSION_TTL_HOURS`: Session lifetime (default: 336, two weeks; at most 100 years)
/// - `PRODUCTION`: Enables secure cookies and HSTS (default: false)
/// - `RUST_LOG`: Log filter (default: taskhub_web=debug,tower_http=debug)
///
/// # Example
///
/// ```no_run
/// use taskhub_web::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::env;

/// Minimum length of `SECRET_KEY`
pub const MIN_SECRET_LENGTH: usize = 32;

/// Upper bound for `SESSION_TTL_HOURS` (100 years)
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365 * 100;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,

    /// Production mode: `Secure` cookies and HSTS
    pub production: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Session cookie configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Key used to sign session tokens
    ///
    /// Must stay stable across restarts or every user is signed out.
    #[serde(skip_serializing)]
    pub secret: String,

    pub ttl_hours: i64,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if `SECRET_KEY` is missing or too short, or if a
    /// numeric or boolean variable can't be parsed.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse::<u16>()?;
        let production = parse_flag(&env::var("PRODUCTION").unwrap_or_default())?;

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://taskhub.db?mode=rwc".to_string());
        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()?;

        let secret = env::var("SECRET_KEY")
            .map_err(|_| anyhow::anyhow!("SECRET_KEY environment variable is required"))?;
        if secret.len() < MIN_SECRET_LENGTH {
            anyhow::bail!("SECRET_KEY must be at least {} characters long", MIN_SECRET_LENGTH);
        }

        let ttl_hours =
            parse_ttl_hours(&env::var("SESSION_TTL_HOURS").unwrap_or_else(|_| "336".to_string()))?;

        Ok(Self {
            server: ServerConfig {
                host,
                port,
                production,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            session: SessionConfig { secret, ttl_hours },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_ttl_hours(value: &str) -> anyhow::Result<i64> {
    let hours = value.trim().parse::<i64>()?;
    if hours <= 0 {
        anyhow::bail!("SESSION_TTL_HOURS must be positive");
    }
    if hours > MAX_SESSION_TTL_HOURS {
        anyhow::bail!("SESSION_TTL_HOURS must not exceed {}", MAX_SESSION_TTL_HOURS);
    }
    Ok(hours)
}

fn parse_flag(value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" | "off" => Ok(false),
        "1" | "true" | "yes" | "on" => Ok(true),
        other => anyhow::bail!("Invalid boolean value: {other}"),
    }
}
