use miette::{IntoDiagnostic, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    pub server: Server,
    pub database: Database,
    #[serde(default)]
    pub api: Api,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Database {
    /// SeaORM/SQLx connection string, e.g. sqlite://chika.db?mode=rwc
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Api {
    /// Page size used when a list request carries no `limit`
    #[serde(default = "default_limit")]
    pub default_limit: i64,
    /// Upper bound on `limit`. Unbounded when unset.
    #[serde(default)]
    pub max_limit: Option<i64>,
}

fn default_limit() -> i64 {
    10
}

impl Default for Server {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for Database {
    fn default() -> Self {
        Self {
            url: "sqlite://chika.db?mode=rwc".to_string(),
        }
    }
}

impl Default for Api {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: None,
        }
    }
}

impl Settings {
    pub fn load(path: &str) -> Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("server.host", Server::default().host)
            .into_diagnostic()?
            .set_default("server.port", Server::default().port)
            .into_diagnostic()?
            .set_default("database.url", Database::default().url)
            .into_diagnostic()?
            .set_default("api.default_limit", Api::default().default_limit)
            .into_diagnostic()?;

        // Optional file
        if Path::new(path).exists() {
            builder = builder.add_source(config::File::with_name(path));
        }

        // Environment overrides: CHIKA__SERVER__PORT=9090, etc.
        builder = builder.add_source(config::Environment::with_prefix("CHIKA").separator("__"));

        let cfg = builder.build().into_diagnostic()?;
        let s: Settings = cfg.try_deserialize().into_diagnostic()?;

        if s.api.default_limit <= 0 {
            return Err(miette::miette!(
                "api.default_limit must be positive, got {}",
                s.api.default_limit
            ));
        }
        if let Some(max) = s.api.max_limit {
            if max < s.api.default_limit {
                return Err(miette::miette!(
                    "api.max_limit ({max}) is below api.default_limit ({})",
                    s.api.default_limit
                ));
            }
        }

        Ok(s)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_settings_load_defaults() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("nonexistent.toml");

        let settings = Settings::load(config_path.to_str().unwrap())
            .expect("Failed to load settings");

        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 8080);
        assert_eq!(Database::default().url, "sqlite://chika.db?mode=rwc");
        assert_eq!(settings.api.default_limit, 10);
    }

    #[test]
    fn test_settings_load_from_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("test_config.toml");

        let config_content = r#"
[server]
host = "127.0.0.1"
port = 9090

[api]
default_limit = 25
max_limit = 100
"#;
        fs::write(&config_path, config_content).expect("Failed to write config");

        let settings = Settings::load(config_path.to_str().unwrap())
            .expect("Failed to load settings");

        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.server.port, 9090);
        assert_eq!(settings.api.default_limit, 25);
        assert_eq!(settings.api.max_limit, Some(100));
        assert_eq!(settings.listen_addr(), "127.0.0.1:9090");
    }

    #[test]
    fn test_settings_env_override() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("test_config.toml");

        let config_content = r#"
[database]
url = "sqlite://from-file.db?mode=rwc"
"#;
        fs::write(&config_path, config_content).expect("Failed to write config");

        // Environment should win over the file
        env::set_var("CHIKA__DATABASE__URL", "sqlite://from-env.db?mode=rwc");

        let settings = Settings::load(config_path.to_str().unwrap())
            .expect("Failed to load settings");

        assert_eq!(settings.database.url, "sqlite://from-env.db?mode=rwc");

        env::remove_var("CHIKA__DATABASE__URL");
    }

    #[test]
    fn test_settings_reject_max_below_default() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("bad.toml");

        fs::write(
            &config_path,
            "[api]\ndefault_limit = 50\nmax_limit = 10\n",
        )
        .expect("Failed to write config");

        assert!(Settings::load(config_path.to_str().unwrap()).is_err());
    }
}
