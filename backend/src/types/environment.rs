//! Environment configuration for different deployment stages

use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use aws_config::{retry::RetryConfig, timeout::TimeoutConfig, BehaviorVersion, Region};
use sqlx::postgres::{PgConnectOptions, PgSslMode};

use crate::presigner::DEFAULT_PRESIGN_EXPIRY;

/// Port the HTTP server listens on when `PORT` is unset
pub const DEFAULT_PORT: u16 = 3001;

/// Application environment configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment (uses `LocalStack`)
    Development {
        /// Optional override for presigned URL expiry in seconds
        presign_expiry_override: Option<u64>,
    },
}

/// Connection parameters for the metadata database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Server host, `None` falls back to `PGHOST`/localhost
    pub host: Option<String>,
    /// Server port
    pub port: u16,
    /// Login role
    pub user: Option<String>,
    /// Login password
    pub password: Option<String>,
    /// Database name
    pub database: Option<String>,
    /// TLS mode (`disable`, `require`, `verify-full`, ...)
    pub ssl_mode: String,
    /// Session `TimeZone`
    pub timezone: String,
    /// Maximum pool size
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Builds sqlx connect options from this configuration
    ///
    /// # Errors
    ///
    /// Returns an error if `ssl_mode` is not a valid `PostgreSQL` TLS mode
    pub fn connect_options(&self) -> anyhow::Result<PgConnectOptions> {
        let ssl_mode = PgSslMode::from_str(&self.ssl_mode)
            .with_context(|| format!("Invalid DB_SSLMODE: {}", self.ssl_mode))?;

        let mut options = PgConnectOptions::new()
            .port(self.port)
            .ssl_mode(ssl_mode)
            .options([("TimeZone", self.timezone.as_str())]);

        if let Some(host) = &self.host {
            options = options.host(host);
        }
        if let Some(user) = &self.user {
            options = options.username(user);
        }
        if let Some(password) = &self.password {
            options = options.password(password);
        }
        if let Some(database) = &self.database {
            options = options.database(database);
        }

        Ok(options)
    }
}

/// Reads a variable, treating empty values as unset
fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// # Panics
    ///
    /// Panics if `APP_ENV` contains an invalid value
    #[must_use]
    pub fn from_env() -> Self {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Self::Production,
            "staging" => Self::Staging,
            "development" => {
                let presign_expiry_override = env::var("PRESIGNED_URL_EXPIRY_SECS")
                    .ok()
                    .and_then(|val| val.parse::<u64>().ok());

                Self::Development {
                    presign_expiry_override,
                }
            }
            _ => panic!("Invalid environment: {env}"),
        }
    }

    /// Returns the S3 bucket name
    ///
    /// # Errors
    ///
    /// Returns an error if `S3_BUCKET` is not set
    pub fn s3_bucket(&self) -> anyhow::Result<String> {
        non_empty_var("S3_BUCKET").context("S3_BUCKET must be set")
    }

    /// Returns the AWS region of the bucket
    ///
    /// # Errors
    ///
    /// Returns an error if `AWS_REGION` is not set
    pub fn aws_region(&self) -> anyhow::Result<String> {
        non_empty_var("AWS_REGION").context("AWS_REGION must be set")
    }

    /// Port the HTTP server binds to
    ///
    /// # Errors
    ///
    /// Returns an error if `PORT` is set but not a valid port number
    pub fn port(&self) -> anyhow::Result<u16> {
        non_empty_var("PORT").map_or(Ok(DEFAULT_PORT), |port| {
            port.parse()
                .with_context(|| format!("Invalid PORT: {port}"))
        })
    }

    /// Default `tracing` filter when `RUST_LOG` is unset
    #[must_use]
    pub const fn default_log_filter(&self) -> &'static str {
        match self {
            Self::Production | Self::Staging => "info,tower_http=info",
            Self::Development { .. } => "debug,tower_http=debug,hyper=info,aws_smithy_runtime=info",
        }
    }

    /// Origins allowed by CORS, `None` allows any origin
    #[must_use]
    pub fn cors_allowed_origins(&self) -> Option<Vec<String>> {
        non_empty_var("CORS_ALLOWED_ORIGINS").map(|origins| {
            origins
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect()
        })
    }

    /// Returns the endpoint URL to use for AWS services
    #[must_use]
    pub const fn override_aws_endpoint_url(&self) -> Option<&str> {
        match self {
            // Regular AWS endpoints for production and staging
            Self::Production | Self::Staging => None,
            // LocalStack endpoint for development
            Self::Development { .. } => Some("http://localhost:4566"),
        }
    }

    /// AWS configuration with retry and timeout settings
    ///
    /// # Errors
    ///
    /// Returns an error if `AWS_REGION` is not set
    pub async fn aws_config(&self) -> anyhow::Result<aws_config::SdkConfig> {
        let region = self.aws_region()?;

        let retry_config = RetryConfig::standard()
            .with_max_attempts(3)
            .with_initial_backoff(Duration::from_millis(50));

        let timeout_config = TimeoutConfig::builder()
            .operation_timeout(Duration::from_secs(30))
            .build();

        let mut config_builder = aws_config::load_defaults(BehaviorVersion::latest())
            .await
            .to_builder()
            .region(Region::new(region))
            .retry_config(retry_config)
            .timeout_config(timeout_config);

        if let Some(endpoint_url) = self.override_aws_endpoint_url() {
            config_builder = config_builder.endpoint_url(endpoint_url);
        }

        Ok(config_builder.build())
    }

    /// AWS S3 service configuration
    ///
    /// # Errors
    ///
    /// Returns an error if `AWS_REGION` is not set
    pub async fn s3_client_config(&self) -> anyhow::Result<aws_sdk_s3::Config> {
        let aws_config = self.aws_config().await?;
        let s3_config: aws_sdk_s3::Config = (&aws_config).into();
        let mut builder = s3_config.to_builder();

        // Override "force path style" to true for compatibility with LocalStack
        // https://github.com/awslabs/aws-sdk-rust/discussions/874
        if matches!(self, Self::Development { .. }) {
            builder.set_force_path_style(Some(true));
        }

        Ok(builder.build())
    }

    /// Lifetime of presigned upload URLs
    #[must_use]
    pub const fn presigned_url_expiry(&self) -> Duration {
        match self {
            Self::Production | Self::Staging => DEFAULT_PRESIGN_EXPIRY,
            Self::Development {
                presign_expiry_override: Some(secs),
            } => Duration::from_secs(*secs),
            Self::Development {
                presign_expiry_override: None,
            } => DEFAULT_PRESIGN_EXPIRY,
        }
    }

    /// Metadata database connection parameters
    ///
    /// # Errors
    ///
    /// Returns an error if `DB_PORT` or `DB_MAX_CONNECTIONS` is not a number
    pub fn database_config(&self) -> anyhow::Result<DatabaseConfig> {
        let port = non_empty_var("DB_PORT")
            .map_or(Ok(5432), |port| port.parse())
            .context("Invalid DB_PORT")?;

        let max_connections = non_empty_var("DB_MAX_CONNECTIONS")
            .map_or(Ok(10), |max| max.parse())
            .context("Invalid DB_MAX_CONNECTIONS")?;

        Ok(DatabaseConfig {
            host: non_empty_var("DB_HOST"),
            port,
            user: non_empty_var("DB_USER"),
            password: non_empty_var("DB_PASSWORD"),
            database: non_empty_var("DB_DATABASE"),
            ssl_mode: non_empty_var("DB_SSLMODE").unwrap_or_else(|| "disable".to_string()),
            timezone: non_empty_var("DB_TIMEZONE").unwrap_or_else(|| "Asia/Tokyo".to_string()),
            max_connections,
        })
    }
}
