//! Server configuration, loaded from environment variables at startup.

use std::net::SocketAddr;

/// Runtime configuration for chats-server.
///
/// Every field has a sensible default so the server works out-of-the-box
/// without any environment variables set.
#[derive(Debug, Clone)]
pub struct Config {
    /// Host to bind (default: `"0.0.0.0"`).
    pub host: String,

    /// TCP port to listen on (default: `8080`).
    pub port: u16,

    /// SQLite database URL (default: `"sqlite://chats.db"`).
    pub database_url: String,

    /// Directory served for any path no route claims (default: `"public"`).
    pub static_dir: String,

    /// `tracing` filter string, e.g. `"info"` or `"debug,sqlx=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build [`Config`] from an arbitrary key lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let env_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_owned());
        Self {
            host: env_or("CHATS_HOST", "0.0.0.0"),
            port: lookup("CHATS_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
            database_url: env_or("CHATS_DATABASE_URL", "sqlite://chats.db"),
            static_dir: env_or("CHATS_STATIC_DIR", "public"),
            log_level: env_or("CHATS_LOG", "info"),
            log_json: lookup("CHATS_LOG_JSON")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }

    /// The `host:port` pair the HTTP listener binds to.
    pub fn bind_address(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}
