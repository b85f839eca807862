use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{
    AdminConfig, Config, DatabaseConfig, LoggingConfig, ServerConfig, UploadsConfig,
};

const DEFAULT_CONFIG_FILE: &str = "portal.toml";
const ENV_PREFIX: &str = "PORTAL";
const SSL_MODES: [&str; 6] = ["disable", "allow", "prefer", "require", "verify-ca", "verify-full"];

/// Loads the application configuration.
///
/// Sources are layered in order: built-in defaults, the TOML file (the given
/// path, which must exist, or an optional `portal.toml` in the working
/// directory), then `PORTAL__<SECTION>__<KEY>` environment variables.
/// `DATABASE_URL` fills in the database URL when no other source set it.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let mut config = builder.try_deserialize::<Config>()?;
    if config.database.url.is_none() {
        config.database.url = std::env::var("DATABASE_URL").ok();
    }

    validate(&config)?;
    tracing::debug!(
        host = %config.server.host,
        port = config.server.port,
        uploads = %config.uploads.root.display(),
        "Configuration loaded."
    );
    Ok(config)
}

/// Rejects settings that would only fail later, at bind or connect time.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port must be greater than 0".to_string(),
        ));
    }
    if config.database.max_connections == 0 {
        return Err(ConfigError::ValidationError(
            "database.max_connections must be greater than 0".to_string(),
        ));
    }
    if let Some(ssl_mode) = &config.database.ssl_mode {
        if !SSL_MODES.contains(&ssl_mode.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "database.ssl_mode '{}' is not one of {}",
                ssl_mode,
                SSL_MODES.join(", ")
            )));
        }
    }
    if config.uploads.max_body_bytes == 0 {
        return Err(ConfigError::ValidationError(
            "uploads.max_body_bytes must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("failed to create temp file");
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_apply_to_missing_sections() {
        let file = write_config(
            r#"
            [server]
            port = 8080

            [database]
            url = "postgres://portal@localhost/portal"
            "#,
        );
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.database.ssl_mode, None);
        assert_eq!(
            config.database.url.as_deref(),
            Some("postgres://portal@localhost/portal")
        );
        assert_eq!(config.uploads.root, std::path::PathBuf::from("uploads"));
        assert!(!config.admin.strict_not_found);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn file_values_override_defaults() {
        let file = write_config(
            r#"
            [database]
            url = "postgres://localhost/portal"
            ssl_mode = "require"
            ssl_root_cert = "/etc/ssl/ca.pem"

            [uploads]
            root = "/srv/portal/uploads"

            [admin]
            strict_not_found = true
            "#,
        );
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.database.ssl_mode.as_deref(), Some("require"));
        assert_eq!(
            config.database.ssl_root_cert.as_deref(),
            Some(Path::new("/etc/ssl/ca.pem"))
        );
        assert_eq!(config.uploads.root, std::path::PathBuf::from("/srv/portal/uploads"));
        assert!(config.admin.strict_not_found);
    }

    #[test]
    fn invalid_ssl_mode_is_rejected() {
        let file = write_config(
            r#"
            [database]
            url = "postgres://localhost/portal"
            ssl_mode = "sometimes"
            "#,
        );
        let err = load_config(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = load_config(Some(Path::new("/definitely/not/here/portal.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::LoadError(_)));
    }

    #[test]
    fn zero_port_fails_validation() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(matches!(validate(&config), Err(ConfigError::ValidationError(_))));
    }
}
