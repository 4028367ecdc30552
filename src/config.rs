//! Application configuration loaded from environment variables.

use std::collections::{HashMap, HashSet};
use std::env;

use secrecy::{ExposeSecret, SecretString};

/// Fallback `User-Agent` for upstream calls when the caller sent none.
pub const DEFAULT_USER_AGENT: &str = "DevPortal/1.0";

/// AWS service name used when signing internal backend requests.
pub const SIGNING_SERVICE: &str = "execute-api";

/// Development default values - NEVER use in production.
pub mod defaults {
    pub const DEV_HOST: &str = "127.0.0.1";
    pub const DEV_PORT: u16 = 8080;
    pub const DEV_GRAPHQL_URL: &str = "http://localhost:8082/v1/graphql";
    pub const DEV_SERVICE_TOKEN: &str = "dev-service-token-do-not-use-in-production";
    pub const DEV_GENERAL_SECRET_KEY: &str = "dev-general-secret-do-not-use-in-production";
    pub const DEV_NOTIFICATION_ENDPOINT: &str = "http://localhost:9000/notifications";
    pub const DEV_PAYMENTS_ENDPOINT: &str = "http://localhost:9000/payments";
    pub const DEFAULT_REGION: &str = "us-east-1";
    pub const DEFAULT_MAX_NOTIFICATIONS_PER_DAY: u32 = 1;
}

/// Deployment stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Dev,
    Staging,
    Production,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Dev, Stage::Staging, Stage::Production];

    /// Parse a stage name. Only the exact lowercase names are recognised.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "dev" => Some(Self::Dev),
            "staging" => Some(Self::Staging),
            "production" => Some(Self::Production),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }

    /// Check if this is the development stage.
    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }

    fn allow_list_var(&self) -> &'static str {
        match self {
            Self::Dev => "NOTIFICATION_ALLOWED_TEAMS_DEV",
            Self::Staging => "NOTIFICATION_ALLOWED_TEAMS_STAGING",
            Self::Production => "NOTIFICATION_ALLOWED_TEAMS_PRODUCTION",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Teams allowed to send notifications, per stage.
#[derive(Debug, Clone, Default)]
pub struct NotificationPermissions {
    teams: HashMap<Stage, HashSet<String>>,
}

impl NotificationPermissions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a team to the allow-list of a stage.
    pub fn allow(mut self, stage: Stage, team_id: impl Into<String>) -> Self {
        self.teams.entry(stage).or_default().insert(team_id.into());
        self
    }

    /// Check whether `team_id` may send notifications in `stage`.
    pub fn allows(&self, stage: Stage, team_id: &str) -> bool {
        self.teams
            .get(&stage)
            .is_some_and(|teams| teams.contains(team_id))
    }

    /// Number of teams allowed in a stage.
    pub fn len(&self, stage: Stage) -> usize {
        self.teams.get(&stage).map_or(0, HashSet::len)
    }

    /// Parse a comma separated list of team ids for a stage.
    pub fn with_list(mut self, stage: Stage, list: &str) -> Self {
        for team in list.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            self = self.allow(stage, team);
        }
        self
    }

    fn from_env() -> Self {
        Stage::ALL.iter().fold(Self::new(), |perms, stage| {
            match env::var(stage.allow_list_var()) {
                Ok(list) => perms.with_list(*stage, &list),
                Err(_) => perms,
            }
        })
    }
}

/// Internal backend endpoints and signing settings.
#[derive(Debug, Clone)]
pub struct BackendSettings {
    /// Notification dispatch endpoint
    pub notification_endpoint: String,
    /// Base URL of the internal payments backend
    pub payments_endpoint: String,
    /// AWS region used for request signing
    pub region: String,
    /// Forwarded `maxNotificationsPerDay`
    pub max_notifications_per_day: u32,
}

/// Key Store / Metadata GraphQL service settings.
#[derive(Debug, Clone)]
pub struct GraphqlSettings {
    pub url: String,
    pub service_token: SecretString,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Deployment stage, `None` when `APP_ENV` is unset or unrecognised
    pub stage: Option<Stage>,
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// HMAC key for hashed API-key secrets
    pub general_secret_key: SecretString,
    pub graphql: GraphqlSettings,
    pub backend: BackendSettings,
    pub permissions: NotificationPermissions,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// An invalid `APP_ENV` is not a startup error: requests needing the stage
    /// are rejected instead. Development defaults only apply when
    /// `APP_ENV=dev`; every other stage must set endpoints and secrets.
    ///
    /// Environment variables:
    /// - `APP_ENV`: dev, staging or production
    /// - `GATEWAY_HOST` / `GATEWAY_PORT`: bind address (default: 127.0.0.1:8080)
    /// - `HASURA_GRAPHQL_URL`, `HASURA_SERVICE_TOKEN`: key store service
    /// - `GENERAL_SECRET_KEY`: HMAC key for hashed secrets
    /// - `SEND_NOTIFICATION_ENDPOINT`, `INTERNAL_PAYMENTS_ENDPOINT`: internal backends
    /// - `TRANSACTION_BACKEND_REGION`: signing region (default: us-east-1)
    /// - `NOTIFICATION_MAX_PER_DAY`: forwarded daily limit (default: 1)
    /// - `NOTIFICATION_ALLOWED_TEAMS_{DEV,STAGING,PRODUCTION}`: comma separated team ids
    pub fn from_env() -> Result<Self, ConfigError> {
        let stage = env::var("APP_ENV").ok().as_deref().and_then(Stage::parse);
        let dev = stage.is_some_and(|s| s.is_dev());

        let with_default = |name: &'static str, default: &str| -> Result<String, ConfigError> {
            match env::var(name) {
                Ok(v) if !v.is_empty() => Ok(v),
                _ if dev => Ok(default.to_string()),
                _ => Err(ConfigError::MissingEnvVar(name)),
            }
        };

        let host = env::var("GATEWAY_HOST").unwrap_or_else(|_| defaults::DEV_HOST.to_string());

        let port = env::var("GATEWAY_PORT")
            .unwrap_or_else(|_| defaults::DEV_PORT.to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidValue("GATEWAY_PORT must be a valid port number"))?;

        let graphql = GraphqlSettings {
            url: with_default("HASURA_GRAPHQL_URL", defaults::DEV_GRAPHQL_URL)?,
            service_token: SecretString::from(with_default(
                "HASURA_SERVICE_TOKEN",
                defaults::DEV_SERVICE_TOKEN,
            )?),
        };

        let general_secret_key = SecretString::from(with_default(
            "GENERAL_SECRET_KEY",
            defaults::DEV_GENERAL_SECRET_KEY,
        )?);

        let max_notifications_per_day = env::var("NOTIFICATION_MAX_PER_DAY")
            .unwrap_or_else(|_| defaults::DEFAULT_MAX_NOTIFICATIONS_PER_DAY.to_string())
            .parse::<u32>()
            .map_err(|_| {
                ConfigError::InvalidValue("NOTIFICATION_MAX_PER_DAY must be a valid number")
            })?;

        let backend = BackendSettings {
            notification_endpoint: with_default(
                "SEND_NOTIFICATION_ENDPOINT",
                defaults::DEV_NOTIFICATION_ENDPOINT,
            )?,
            payments_endpoint: with_default(
                "INTERNAL_PAYMENTS_ENDPOINT",
                defaults::DEV_PAYMENTS_ENDPOINT,
            )?,
            region: env::var("TRANSACTION_BACKEND_REGION")
                .unwrap_or_else(|_| defaults::DEFAULT_REGION.to_string()),
            max_notifications_per_day,
        };

        let config = Config {
            stage,
            host,
            port,
            general_secret_key,
            graphql,
            backend,
            permissions: NotificationPermissions::from_env(),
        };

        if !dev {
            config.validate_deployed()?;
        }

        Ok(config)
    }

    /// Validate that a deployed stage does not use development defaults.
    fn validate_deployed(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.general_secret_key.expose_secret() == defaults::DEV_GENERAL_SECRET_KEY {
            errors.push(
                "GENERAL_SECRET_KEY is using the development default. Set a secure key."
                    .to_string(),
            );
        }

        if self.graphql.service_token.expose_secret() == defaults::DEV_SERVICE_TOKEN {
            errors.push(
                "HASURA_SERVICE_TOKEN is using the development default. Set a service token."
                    .to_string(),
            );
        }

        if !errors.is_empty() {
            return Err(ConfigError::ProductionValidation(errors));
        }

        Ok(())
    }

    /// Get the server bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if running in the development stage.
    pub fn is_development(&self) -> bool {
        self.stage.is_some_and(|s| s.is_dev())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(&'static str),

    #[error("Production configuration validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    ProductionValidation(Vec<String>),
}
