//! Startup configuration for the demo binary
//!
//! Loaded once from `config.toml` with `FAKE_FTP_*` environment overrides;
//! missing files fall back to built-in defaults so the binary runs out of
//! the box.

use config::{Config, Environment, File};
use log::warn;
use serde::Deserialize;

/// Settings read at process start.
#[derive(Debug, Clone, Deserialize)]
pub struct StartupConfig {
    /// IP address to bind the control connection.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port for the control connection.
    #[serde(default = "default_control_port")]
    pub control_port: u16,

    /// System name reported by SYST.
    #[serde(default = "default_system_name")]
    pub system_name: String,

    /// Accounts to configure before the server starts.
    #[serde(default)]
    pub users: Vec<UserEntry>,
}

/// One configured account.
#[derive(Debug, Clone, Deserialize)]
pub struct UserEntry {
    pub username: String,
    pub password: String,
    pub home_directory: String,
    #[serde(default)]
    pub groups: Vec<String>,
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_control_port() -> u16 {
    2121
}

fn default_system_name() -> String {
    "UNIX".to_string()
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            control_port: default_control_port(),
            system_name: default_system_name(),
            users: Vec::new(),
        }
    }
}

impl StartupConfig {
    /// Loads configuration from the first readable candidate path, applying
    /// environment overrides; falls back to defaults when none loads.
    pub fn load() -> Self {
        let config_paths = ["fake-ftp-server/config", "config"];

        for config_path in &config_paths {
            let settings = Config::builder()
                .add_source(File::with_name(config_path))
                .add_source(Environment::with_prefix("FAKE_FTP"))
                .build();

            match settings {
                Ok(settings) => match settings.try_deserialize::<StartupConfig>() {
                    Ok(config) => return config,
                    Err(e) => {
                        warn!("Invalid configuration in {}: {}", config_path, e);
                    }
                },
                Err(_) => continue,
            }
        }

        warn!("No config.toml found, using built-in defaults");
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StartupConfig::default();
        assert_eq!(config.bind_address, "127.0.0.1");
        assert_eq!(config.control_port, 2121);
        assert_eq!(config.system_name, "UNIX");
        assert!(config.users.is_empty());
    }
}
