use crate::error::AppError;

/// Listen address and CORS origin, read from `HOST`, `PORT` and
/// `CORS_ORIGIN`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let port = match lookup("PORT") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| AppError::Config(format!("PORT must be a port number, got {value:?}")))?,
            None => defaults.port,
        };
        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
            cors_origin: lookup("CORS_ORIGIN").unwrap_or(defaults.cors_origin),
        })
    }

    /// Listen address in a form `TcpListener::bind` resolves, so `HOST` may
    /// be a hostname as well as an IP address.
    pub fn addr(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            cors_origin: "http://localhost:3000".to_string(),
        }
    }
}
