use crate::errors::ConfigError;
use derive_getters::Getters;
use serde::Deserialize;
use std::{fs::File, io::BufReader};

#[derive(Clone, Debug, Deserialize, Getters)]
pub struct Config {
    #[serde(default = "default_bind_host")]
    bind_host: String,
    #[serde(default = "default_app_name")]
    app_name: String,
    #[serde(default = "default_protocol")]
    protocol: String,
    #[serde(default = "default_loopback")]
    server_address: String,
    #[serde(default = "default_loopback")]
    remote_address: String,
    #[serde(default = "default_remote_port")]
    remote_port: u16,
    #[serde(default = "default_read_timeout_secs")]
    read_timeout_secs: u64,
    #[serde(default = "default_max_request_bytes")]
    max_request_bytes: usize,
}

fn default_bind_host() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_app_name() -> String {
    "request-engine".to_string()
}

fn default_protocol() -> String {
    "HTTP/1.1".to_string()
}

fn default_loopback() -> String {
    "127.0.0.1".to_string()
}

fn default_remote_port() -> u16 {
    3000
}

fn default_read_timeout_secs() -> u64 {
    1
}

fn default_max_request_bytes() -> usize {
    1024 * 1024
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_host: default_bind_host(),
            app_name: default_app_name(),
            protocol: default_protocol(),
            server_address: default_loopback(),
            remote_address: default_loopback(),
            remote_port: default_remote_port(),
            read_timeout_secs: default_read_timeout_secs(),
            max_request_bytes: default_max_request_bytes(),
        }
    }
}

impl Config {
    pub fn load(filename: Option<String>) -> Result<Self, ConfigError> {
        let filename = match filename {
            Some(x) => {
                log::debug!("Using argument for config file: '{x}'.");
                x
            }
            None => {
                log::debug!("Using default config file path, ./config.json");
                "config.json".to_string()
            }
        };

        let config_file = File::open(&filename).map_err(|source| ConfigError::Io {
            path: filename.clone(),
            source,
        })?;
        let config_reader = BufReader::new(config_file);
        Ok(serde_json::from_reader(config_reader)?)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default() {
        let config = Config::load(Some("src/resources/test-min-config.json".to_string()))
            .expect("Failed to load config");
        assert_eq!(config.bind_host(), "127.0.0.1:3000");
        assert_eq!(config.app_name(), "request-engine");
        assert_eq!(config.protocol(), "HTTP/1.1");
        assert_eq!(config.server_address(), "127.0.0.1");
        assert_eq!(config.remote_address(), "127.0.0.1");
        assert_eq!(config.remote_port(), &3000);
        assert_eq!(config.read_timeout_secs(), &1);
        assert_eq!(config.max_request_bytes(), &1048576);
    }

    #[test]
    fn test_full_config() {
        let config = Config::load(Some("src/resources/test-max-config.json".to_string()))
            .expect("Failed to load config");
        assert_eq!(config.bind_host(), "0.0.0.0:8080");
        assert_eq!(config.app_name(), "Home Lab");
        assert_eq!(config.protocol(), "HTTP/1.0");
        assert_eq!(config.server_address(), "10.0.0.1");
        assert_eq!(config.remote_address(), "10.0.0.2");
        assert_eq!(config.remote_port(), &4321);
        assert_eq!(config.read_timeout_secs(), &5);
        assert_eq!(config.max_request_bytes(), &2048);
    }

    #[test]
    fn test_missing_file() {
        let result = Config::load(Some("src/resources/does-not-exist.json".to_string()));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_bad_json() {
        let result = Config::load(Some("src/resources/test-bad-config.json".to_string()));
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[test]
    fn default_matches_empty_file() {
        let loaded: Config = serde_json::from_str("{}").expect("Failed to parse config");
        let default = Config::default();
        assert_eq!(loaded.bind_host(), default.bind_host());
        assert_eq!(loaded.remote_port(), default.remote_port());
        assert_eq!(loaded.max_request_bytes(), default.max_request_bytes());
    }
}
