use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// SQLite connection URL, e.g. "sqlite:points.db" or "sqlite::memory:"
    pub url: String,
    /// Insert sample members on first start (empty members table)
    pub seed_sample_data: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:points.db".to_string(),
            seed_sample_data: true,
        }
    }
}

impl AppConfig {
    pub fn load(env: &str) -> Self {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .unwrap_or_else(|_| panic!("Failed to read config file: {}", config_path));
        serde_yaml::from_str(&content).expect("Failed to parse config yaml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_config_default() {
        let cfg = DatabaseConfig::default();
        assert!(cfg.url.starts_with("sqlite:"));
        assert!(cfg.seed_sample_data);
    }

    #[test]
    fn test_parse_config_yaml() {
        let yaml = r#"
log_level: info
log_dir: logs
log_file: points_ledger.log
use_json: false
rotation: daily
server:
  host: 127.0.0.1
  port: 3000
database:
  url: "sqlite::memory:"
  seed_sample_data: false
"#;
        let cfg: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.database.url, "sqlite::memory:");
        assert!(!cfg.database.seed_sample_data);
    }
}
