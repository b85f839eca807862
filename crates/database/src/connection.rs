use crate::error::DbError;
use configuration::DatabaseConfig;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use std::str::FromStr;
use std::time::Duration;

/// Builds the connection options from the `[database]` settings.
///
/// The URL comes from the settings (which fall back to `DATABASE_URL`). An
/// `sslmode` in the URL is kept unless `ssl_mode` is set explicitly, in which
/// case the setting wins. The optional root certificate is always applied.
pub fn connect_options(config: &DatabaseConfig) -> Result<PgConnectOptions, DbError> {
    let database_url = config.url.as_deref().ok_or_else(|| {
        DbError::ConnectionConfigError("DATABASE_URL or database.url must be set.".to_string())
    })?;

    let mut options = PgConnectOptions::from_str(database_url)?;
    if let Some(ssl_mode) = &config.ssl_mode {
        let ssl_mode = PgSslMode::from_str(ssl_mode)
            .map_err(|e| DbError::ConnectionConfigError(format!("invalid ssl_mode: {e}")))?;
        options = options.ssl_mode(ssl_mode);
    }
    if let Some(cert) = &config.ssl_root_cert {
        options = options.ssl_root_cert(cert);
    }
    Ok(options)
}

/// Establishes a connection pool to the PostgreSQL database.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DbError> {
    let options = connect_options(config)?;
    let ssl_mode = options.get_ssl_mode();

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect_with(options)
        .await?;

    tracing::info!(
        max_connections = config.max_connections,
        ssl_mode = ?ssl_mode,
        "Connected to the database."
    );
    Ok(pool)
}

/// Applies the bundled schema so the `class_semester_info` table exists.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    // Use a relative path from the crate root
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str, ssl_mode: Option<&str>) -> DatabaseConfig {
        DatabaseConfig {
            url: Some(url.to_string()),
            ssl_mode: ssl_mode.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn url_sslmode_is_kept_when_setting_is_absent() {
        let options =
            connect_options(&config("postgres://portal@db.internal/portal?sslmode=require", None))
                .unwrap();
        assert!(matches!(options.get_ssl_mode(), PgSslMode::Require));

        let options = connect_options(&config(
            "postgres://portal@db.internal/portal?sslmode=verify-full",
            None,
        ))
        .unwrap();
        assert!(matches!(options.get_ssl_mode(), PgSslMode::VerifyFull));
    }

    #[test]
    fn explicit_setting_overrides_url_sslmode() {
        let options = connect_options(&config(
            "postgres://portal@db.internal/portal?sslmode=prefer",
            Some("verify-ca"),
        ))
        .unwrap();
        assert!(matches!(options.get_ssl_mode(), PgSslMode::VerifyCa));
    }

    #[test]
    fn missing_url_and_bad_mode_are_config_errors() {
        let missing = DatabaseConfig::default();
        assert!(matches!(
            connect_options(&missing),
            Err(DbError::ConnectionConfigError(_))
        ));

        let bad = config("postgres://localhost/portal", Some("sometimes"));
        assert!(matches!(
            connect_options(&bad),
            Err(DbError::ConnectionConfigError(_))
        ));
    }
}
