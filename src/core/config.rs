use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub auth: AuthConfig,
    /// Owner account created at startup when no owner exists yet.
    pub bootstrap: Option<BootstrapConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: Option<u16>,
    pub unix_socket: Option<PathBuf>,
    #[serde(default = "default_num_threads")]
    pub num_threads: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_console")]
    pub console: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for bearer tokens.
    pub token_secret: String,
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapConfig {
    pub owner_email: String,
    pub owner_username: String,
    pub owner_password: String,
}

// Default value functions
fn default_num_threads() -> usize {
    num_cpus::get()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_console() -> bool {
    false
}

fn default_token_ttl() -> i64 {
    86_400 // 24 hours
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .context("Failed to parse config file")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.port.is_none() && self.server.unix_socket.is_none() {
            bail!("Either port or unix_socket must be specified in server config");
        }

        if let Some(port) = self.server.port {
            if port == 0 {
                bail!("Server port must be greater than 0");
            }
        }

        if self.server.num_threads == 0 {
            bail!("num_threads must be greater than 0");
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            bail!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.logging.level
            );
        }

        let valid_formats = ["json", "console"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            bail!(
                "Invalid log format '{}'. Must be one of: json, console",
                self.logging.format
            );
        }

        if self.auth.token_secret.len() < 16 {
            bail!("token_secret must be at least 16 characters");
        }

        if self.auth.token_ttl_secs <= 0 {
            bail!("token_ttl_secs must be greater than 0");
        }

        if let Some(bootstrap) = &self.bootstrap {
            if bootstrap.owner_email.is_empty()
                || bootstrap.owner_username.is_empty()
                || bootstrap.owner_password.is_empty()
            {
                bail!("bootstrap owner_email, owner_username and owner_password must not be empty");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    const MINIMAL: &str = r#"
        [server]
        port = 8000

        [logging]

        [auth]
        token_secret = "0123456789abcdef0123456789abcdef"
    "#;

    #[test]
    fn test_minimal_config_with_defaults() {
        let file = write_config(MINIMAL);
        let config = Config::from_file(&file.path().to_path_buf()).unwrap();

        assert_eq!(config.server.port, Some(8000));
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.auth.token_ttl_secs, 86_400);
        assert!(config.bootstrap.is_none());
    }

    #[test]
    fn test_bootstrap_section_parsed() {
        let file = write_config(
            r#"
            [server]
            port = 8000

            [logging]
            level = "debug"
            format = "console"

            [auth]
            token_secret = "0123456789abcdef0123456789abcdef"
            token_ttl_secs = 3600

            [bootstrap]
            owner_email = "owner@mcq.dz"
            owner_username = "owner"
            owner_password = "change-me"
            "#,
        );

        let config = Config::from_file(&file.path().to_path_buf()).unwrap();
        let bootstrap = config.bootstrap.unwrap();
        assert_eq!(bootstrap.owner_username, "owner");
        assert_eq!(config.auth.token_ttl_secs, 3600);
    }

    #[test]
    fn test_rejects_missing_listener() {
        let file = write_config(
            r#"
            [server]

            [logging]

            [auth]
            token_secret = "0123456789abcdef0123456789abcdef"
            "#,
        );

        assert!(Config::from_file(&file.path().to_path_buf()).is_err());
    }

    #[test]
    fn test_rejects_short_secret() {
        let file = write_config(
            r#"
            [server]
            port = 8000

            [logging]

            [auth]
            token_secret = "short"
            "#,
        );

        assert!(Config::from_file(&file.path().to_path_buf()).is_err());
    }

    #[test]
    fn test_rejects_bad_log_level() {
        let file = write_config(
            r#"
            [server]
            port = 8000

            [logging]
            level = "verbose"

            [auth]
            token_secret = "0123456789abcdef0123456789abcdef"
            "#,
        );

        assert!(Config::from_file(&file.path().to_path_buf()).is_err());
    }
}
