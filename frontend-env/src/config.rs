//! Environment configuration loading.
//!
//! Builds the frontend `Environment` record from its development defaults,
//! overriding individual fields from environment variables.
//!
//! # Environment Variables
//!
//! - `FRONTEND_ENV_PRODUCTION`: Build-mode flag (default: `false`)
//! - `FRONTEND_ENV_API_SERVER_URL`: API server base URL (default: `http://127.0.0.1:5000`)
//! - `FRONTEND_ENV_AUTH0_URL`: Auth0 domain prefix (default: `coffee-shop-udacity01.us`)
//! - `FRONTEND_ENV_AUTH0_AUDIENCE`: Auth0 audience (default: `http://127.0.0.1:5000/api/v2`)
//! - `FRONTEND_ENV_AUTH0_CLIENT_ID`: Auth0 client id
//! - `FRONTEND_ENV_AUTH0_CALLBACK_URL`: Auth0 callback URL (default: `https://localhost:3000`)
//! - `FRONTEND_ENV_LISTEN_PORT`: Port the config service listens on (default: `4200`)
//!
//! # Invariants
//!
//! - A loaded `EnvironmentConfig` always holds a record that passed `Environment::validate()`.
//! - `listen_port` is always a valid, non-zero port number.

use crate::environment::{Environment, EnvironmentError};

pub const PRODUCTION_VAR: &str = "FRONTEND_ENV_PRODUCTION";
pub const API_SERVER_URL_VAR: &str = "FRONTEND_ENV_API_SERVER_URL";
pub const AUTH0_URL_VAR: &str = "FRONTEND_ENV_AUTH0_URL";
pub const AUTH0_AUDIENCE_VAR: &str = "FRONTEND_ENV_AUTH0_AUDIENCE";
pub const AUTH0_CLIENT_ID_VAR: &str = "FRONTEND_ENV_AUTH0_CLIENT_ID";
pub const AUTH0_CALLBACK_URL_VAR: &str = "FRONTEND_ENV_AUTH0_CALLBACK_URL";
pub const LISTEN_PORT_VAR: &str = "FRONTEND_ENV_LISTEN_PORT";

/// Loaded configuration: the environment record plus service settings.
///
/// # Post-conditions
///
/// When constructed via `from_env()` or `from_lookup()`:
/// - `environment` has passed validation
/// - `listen_port` is in the range 1-65535
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentConfig {
    /// The frontend environment record.
    pub environment: Environment,
    /// Port to serve the record on.
    pub listen_port: u16,
}

/// Error returned when loading configuration fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    InvalidValue { name: String, message: String },
    /// The resulting record is not usable.
    InvalidEnvironment(EnvironmentError),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { name, message } => {
                write!(f, "invalid value for {name}: {message}")
            }
            Self::InvalidEnvironment(e) => write!(f, "invalid environment: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidEnvironment(e) => Some(e),
            Self::InvalidValue { .. } => None,
        }
    }
}

impl From<EnvironmentError> for ConfigError {
    fn from(e: EnvironmentError) -> Self {
        Self::InvalidEnvironment(e)
    }
}

impl EnvironmentConfig {
    /// Default port for the config service.
    pub const DEFAULT_PORT: u16 = 4200;

    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `FRONTEND_ENV_PRODUCTION` is set but not a boolean
    /// - `FRONTEND_ENV_LISTEN_PORT` is set but not a valid port number
    /// - the resulting record fails validation
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration, reading variables through `lookup`.
    ///
    /// Unset variables keep the development default.
    ///
    /// # Errors
    ///
    /// Same as `from_env()`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = environment_from_lookup(&lookup)?;
        environment.validate()?;
        let listen_port = Self::load_listen_port(&lookup)?;

        Ok(Self {
            environment,
            listen_port,
        })
    }

    /// The port to serve on: `requested` if given, otherwise the configured one.
    #[must_use]
    pub const fn serve_port(&self, requested: Option<u16>) -> u16 {
        match requested {
            Some(port) => port,
            None => self.listen_port,
        }
    }

    /// Load the listen port.
    ///
    /// Returns the default if not set.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is set but not a valid port number.
    fn load_listen_port<F>(lookup: &F) -> Result<u16, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(LISTEN_PORT_VAR) {
            Some(value) => parse_port(LISTEN_PORT_VAR, &value),
            None => Ok(Self::DEFAULT_PORT),
        }
    }
}

/// Apply overrides from the process environment, without validating.
///
/// # Errors
///
/// Returns an error if the production flag is not a boolean.
pub fn environment_from_env() -> Result<Environment, ConfigError> {
    environment_from_lookup(&|name: &str| std::env::var(name).ok())
}

/// Apply overrides on top of `Environment::development()`, without validating.
///
/// # Errors
///
/// Returns an error if the production flag is not a boolean.
pub fn environment_from_lookup<F>(lookup: &F) -> Result<Environment, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut environment = Environment::development();

    if let Some(value) = lookup(PRODUCTION_VAR) {
        environment.production = parse_bool(PRODUCTION_VAR, &value)?;
    }
    if let Some(value) = lookup(API_SERVER_URL_VAR) {
        environment.api_server_url = value;
    }
    if let Some(value) = lookup(AUTH0_URL_VAR) {
        environment.auth0.url = value;
    }
    if let Some(value) = lookup(AUTH0_AUDIENCE_VAR) {
        environment.auth0.audience = value;
    }
    if let Some(value) = lookup(AUTH0_CLIENT_ID_VAR) {
        environment.auth0.client_id = value;
    }
    if let Some(value) = lookup(AUTH0_CALLBACK_URL_VAR) {
        environment.auth0.callback_url = value;
    }

    Ok(environment)
}

/// Collect every configuration problem in the process environment.
///
/// An empty vector means `EnvironmentConfig::from_env()` will succeed.
#[must_use]
pub fn check_from_env() -> Vec<ConfigError> {
    check_from_lookup(&|name: &str| std::env::var(name).ok())
}

/// Collect every configuration problem, reading variables through `lookup`.
///
/// Unlike `EnvironmentConfig::from_lookup()`, this does not stop at the first
/// invalid field: every record field and the listen port are reported.
#[must_use]
pub fn check_from_lookup<F>(lookup: &F) -> Vec<ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut problems = Vec::new();
    match environment_from_lookup(lookup) {
        Ok(environment) => problems.extend(
            environment
                .validate_all()
                .into_iter()
                .map(ConfigError::from),
        ),
        Err(e) => problems.push(e),
    }
    if let Err(e) = EnvironmentConfig::load_listen_port(lookup) {
        problems.push(e);
    }
    problems
}

fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name: name.to_string(),
            message: format!("'{value}' is not a boolean (expected true or false)"),
        }),
    }
}

fn parse_port(name: &str, value: &str) -> Result<u16, ConfigError> {
    match value.trim().parse::<u16>() {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(ConfigError::InvalidValue {
            name: name.to_string(),
            message: format!("'{value}' is not a valid port number (must be 1-65535)"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::environment::fields;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_default_values() {
        assert_eq!(EnvironmentConfig::DEFAULT_PORT, 4200);
    }

    #[test]
    fn test_no_overrides_yields_development() {
        let config = EnvironmentConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.environment, Environment::development());
        assert_eq!(config.listen_port, EnvironmentConfig::DEFAULT_PORT);
    }

    #[test]
    fn test_overrides_replace_named_fields_only() {
        let config = EnvironmentConfig::from_lookup(lookup_from(&[
            (PRODUCTION_VAR, "TRUE"),
            (API_SERVER_URL_VAR, "https://api.coffee.example"),
            (AUTH0_CLIENT_ID_VAR, "prod-client"),
            (LISTEN_PORT_VAR, "8080"),
        ]))
        .unwrap();

        let defaults = Environment::development();
        assert!(config.environment.production);
        assert_eq!(config.environment.api_server_url, "https://api.coffee.example");
        assert_eq!(config.environment.auth0.client_id, "prod-client");
        assert_eq!(config.environment.auth0.url, defaults.auth0.url);
        assert_eq!(config.environment.auth0.audience, defaults.auth0.audience);
        assert_eq!(
            config.environment.auth0.callback_url,
            defaults.auth0.callback_url
        );
        assert_eq!(config.listen_port, 8080);
    }

    #[test]
    fn test_all_auth0_overrides() {
        let config = EnvironmentConfig::from_lookup(lookup_from(&[
            (AUTH0_URL_VAR, "coffee.eu"),
            (AUTH0_AUDIENCE_VAR, "https://api.coffee.example/v2"),
            (AUTH0_CALLBACK_URL_VAR, "https://coffee.example"),
        ]))
        .unwrap();
        assert_eq!(config.environment.auth0.url, "coffee.eu");
        assert_eq!(
            config.environment.auth0.audience,
            "https://api.coffee.example/v2"
        );
        assert_eq!(
            config.environment.auth0.callback_url,
            "https://coffee.example"
        );
    }

    #[test]
    fn test_invalid_production_flag() {
        let err = EnvironmentConfig::from_lookup(lookup_from(&[(PRODUCTION_VAR, "maybe")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                name: PRODUCTION_VAR.to_string(),
                message: "'maybe' is not a boolean (expected true or false)".to_string(),
            }
        );
    }

    #[test]
    fn test_invalid_listen_port() {
        for bad in ["0", "65536", "http", ""] {
            let err = EnvironmentConfig::from_lookup(lookup_from(&[(LISTEN_PORT_VAR, bad)]))
                .unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidValue { ref name, .. } if name == LISTEN_PORT_VAR),
                "expected '{bad}' to be rejected"
            );
        }
    }

    #[test]
    fn test_empty_override_fails_validation() {
        let err = EnvironmentConfig::from_lookup(lookup_from(&[(AUTH0_CLIENT_ID_VAR, "")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidEnvironment(EnvironmentError::Empty {
                field: fields::AUTH0_CLIENT_ID
            })
        );
    }

    #[test]
    fn test_invalid_url_override_fails_validation() {
        let err = EnvironmentConfig::from_lookup(lookup_from(&[(
            AUTH0_CALLBACK_URL_VAR,
            "localhost:3000",
        )]))
        .unwrap_err();
        match err {
            ConfigError::InvalidEnvironment(e) => assert_eq!(e.field(), fields::AUTH0_CALLBACK_URL),
            ConfigError::InvalidValue { .. } => panic!("expected InvalidEnvironment"),
        }
    }

    #[test]
    fn test_environment_from_lookup_skips_validation() {
        let env = environment_from_lookup(&lookup_from(&[
            (API_SERVER_URL_VAR, ""),
            (AUTH0_CLIENT_ID_VAR, ""),
        ]))
        .unwrap();
        assert_eq!(env.validate_all().len(), 2);
    }

    #[test]
    fn test_check_from_lookup_clean() {
        assert!(check_from_lookup(&lookup_from(&[])).is_empty());
        assert!(EnvironmentConfig::from_lookup(lookup_from(&[])).is_ok());
    }

    #[test]
    fn test_check_from_lookup_reports_bad_listen_port() {
        for bad in ["0", "http"] {
            let problems = check_from_lookup(&lookup_from(&[(LISTEN_PORT_VAR, bad)]));
            assert_eq!(problems.len(), 1, "expected '{bad}' to be reported");
            assert!(
                matches!(&problems[0], ConfigError::InvalidValue { name, .. } if name == LISTEN_PORT_VAR)
            );
        }
    }

    #[test]
    fn test_check_from_lookup_reports_fields_and_port_together() {
        let problems = check_from_lookup(&lookup_from(&[
            (API_SERVER_URL_VAR, " http://127.0.0.1:5000"),
            (AUTH0_CLIENT_ID_VAR, ""),
            (LISTEN_PORT_VAR, "65536"),
        ]));
        assert_eq!(problems.len(), 3);
        assert!(matches!(
            &problems[0],
            ConfigError::InvalidEnvironment(e) if e.field() == fields::API_SERVER_URL
        ));
        assert_eq!(
            problems[1],
            ConfigError::InvalidEnvironment(EnvironmentError::Empty {
                field: fields::AUTH0_CLIENT_ID
            })
        );
        assert!(matches!(
            &problems[2],
            ConfigError::InvalidValue { name, .. } if name == LISTEN_PORT_VAR
        ));
    }

    #[test]
    fn test_check_from_lookup_reports_bad_production_flag() {
        let problems = check_from_lookup(&lookup_from(&[(PRODUCTION_VAR, "prod")]));
        assert_eq!(problems.len(), 1);
        assert!(matches!(
            &problems[0],
            ConfigError::InvalidValue { name, .. } if name == PRODUCTION_VAR
        ));
    }

    #[test]
    fn test_serve_port_prefers_requested() {
        let config =
            EnvironmentConfig::from_lookup(lookup_from(&[(LISTEN_PORT_VAR, "9000")])).unwrap();
        assert_eq!(config.serve_port(None), 9000);
        assert_eq!(config.serve_port(Some(8081)), 8081);
    }

    #[test]
    fn test_config_error_display_invalid() {
        let error = ConfigError::InvalidValue {
            name: "TEST_VAR".to_string(),
            message: "bad value".to_string(),
        };
        assert_eq!(error.to_string(), "invalid value for TEST_VAR: bad value");
    }

    #[test]
    fn test_config_error_source() {
        use std::error::Error;

        let error = ConfigError::from(EnvironmentError::Empty {
            field: fields::API_SERVER_URL,
        });
        assert_eq!(
            error.to_string(),
            "invalid environment: apiServerUrl must not be empty"
        );
        assert!(error.source().is_some());
    }
}
