//! Engine configuration from the environment.

use std::path::Path;
use std::str::FromStr;

/// Where characters are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreKind {
    #[default]
    Memory,
    Sqlite,
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => Ok(StoreKind::Memory),
            "sqlite" => Ok(StoreKind::Sqlite),
            other => Err(format!("Unknown store kind: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub server_host: String,
    pub server_port: u16,
    pub store: StoreKind,
    pub db_path: String,
    /// Comma separated origins, or `*`. CORS is off when unset.
    pub cors_allowed_origins: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".into(),
            server_port: 3000,
            store: StoreKind::Memory,
            db_path: "characters.db".into(),
            cors_allowed_origins: None,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unparseable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let server_port = lookup("SERVER_PORT")
            .or_else(|| lookup("PORT"))
            .and_then(|raw| match raw.trim().parse() {
                Ok(port) => Some(port),
                Err(_) => {
                    tracing::warn!(value = %raw, "Invalid SERVER_PORT, using default");
                    None
                }
            })
            .unwrap_or(defaults.server_port);

        let store = lookup("SHEETWRIGHT_STORE")
            .and_then(|raw| match raw.parse() {
                Ok(kind) => Some(kind),
                Err(e) => {
                    tracing::warn!(error = %e, "Invalid SHEETWRIGHT_STORE, using memory");
                    None
                }
            })
            .unwrap_or(defaults.store);

        Self {
            server_host: lookup("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port,
            store,
            db_path: lookup("SHEETWRIGHT_DB").unwrap_or(defaults.db_path),
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

/// Load `.env.local` then `.env` from the repository root, if present.
pub fn load_dotenv_from_repo_root() {
    let repo_root = Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = EngineConfig::from_lookup(lookup(&[]));
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
    }

    #[test]
    fn reads_every_variable() {
        let config = EngineConfig::from_lookup(lookup(&[
            ("SERVER_HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("SHEETWRIGHT_STORE", "SQLite"),
            ("SHEETWRIGHT_DB", "/var/lib/sheetwright.db"),
            ("CORS_ALLOWED_ORIGINS", " http://localhost:5173 "),
        ]));

        assert_eq!(config.server_host, "127.0.0.1");
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.store, StoreKind::Sqlite);
        assert_eq!(config.db_path, "/var/lib/sheetwright.db");
        assert_eq!(
            config.cors_allowed_origins.as_deref(),
            Some("http://localhost:5173")
        );
    }

    #[test]
    fn server_port_wins_over_port() {
        let config =
            EngineConfig::from_lookup(lookup(&[("SERVER_PORT", "4000"), ("PORT", "5000")]));
        assert_eq!(config.server_port, 4000);
    }

    #[test]
    fn bad_values_fall_back() {
        let config = EngineConfig::from_lookup(lookup(&[
            ("SERVER_PORT", "not-a-port"),
            ("SHEETWRIGHT_STORE", "postgres"),
            ("CORS_ALLOWED_ORIGINS", "  "),
        ]));
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.store, StoreKind::Memory);
        assert_eq!(config.cors_allowed_origins, None);
    }
}
