//! The frontend environment record.
//!
//! Holds the values the frontend build bakes into its `environment` module:
//! the build-mode flag, the API server base URL and the Auth0 settings the
//! authentication client is constructed with.
//!
//! # Invariants
//!
//! - Every field is present and non-empty once `validate()` has passed.
//! - `apiServerUrl` and `auth0.callbackURL` are absolute `http`/`https` URLs.
//! - `auth0.audience` is an absolute URL with a host.
//! - The record is never mutated after loading.

use serde::{Deserialize, Serialize};
use url::Url;

/// External key names, as the frontend reads them.
pub mod fields {
    pub const PRODUCTION: &str = "production";
    pub const API_SERVER_URL: &str = "apiServerUrl";
    pub const AUTH0_URL: &str = "auth0.url";
    pub const AUTH0_AUDIENCE: &str = "auth0.audience";
    pub const AUTH0_CLIENT_ID: &str = "auth0.clientId";
    pub const AUTH0_CALLBACK_URL: &str = "auth0.callbackURL";
}

/// Suffix appended to the domain prefix to form the tenant domain.
pub const AUTH0_DOMAIN_SUFFIX: &str = "auth0.com";

/// Error returned when the environment record fails validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentError {
    /// A required field is empty.
    Empty { field: &'static str },
    /// A URL field could not be parsed or has the wrong shape.
    InvalidUrl {
        field: &'static str,
        value: String,
        reason: String,
    },
    /// The Auth0 domain prefix is not a bare host prefix.
    InvalidDomainPrefix { value: String, reason: String },
    /// The Auth0 client identifier is malformed.
    InvalidClientId { reason: String },
}

impl EnvironmentError {
    /// The external key of the field this error is about.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Empty { field } | Self::InvalidUrl { field, .. } => *field,
            Self::InvalidDomainPrefix { .. } => fields::AUTH0_URL,
            Self::InvalidClientId { .. } => fields::AUTH0_CLIENT_ID,
        }
    }
}

impl std::fmt::Display for EnvironmentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{field} must not be empty"),
            Self::InvalidUrl {
                field,
                value,
                reason,
            } => write!(f, "{field} is not a valid URL ('{value}'): {reason}"),
            Self::InvalidDomainPrefix { value, reason } => {
                write!(
                    f,
                    "{} is not a valid domain prefix ('{value}'): {reason}",
                    fields::AUTH0_URL
                )
            }
            Self::InvalidClientId { reason } => {
                write!(f, "{} is invalid: {reason}", fields::AUTH0_CLIENT_ID)
            }
        }
    }
}

impl std::error::Error for EnvironmentError {}

/// Auth0 settings consumed by the frontend authentication client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Auth0Config {
    /// Tenant domain prefix, e.g. `coffee-shop-udacity01.us`.
    pub url: String,
    /// Identifier of the protected API.
    pub audience: String,
    /// Public identifier of the registered client application.
    #[serde(rename = "clientId")]
    pub client_id: String,
    /// Where the identity provider redirects after login.
    #[serde(rename = "callbackURL")]
    pub callback_url: String,
}

impl Auth0Config {
    /// The full tenant domain, `<url>.auth0.com`.
    #[must_use]
    pub fn domain(&self) -> String {
        format!("{}.{AUTH0_DOMAIN_SUFFIX}", self.url)
    }

    /// The token issuer for this tenant, `https://<domain>/`.
    #[must_use]
    pub fn issuer(&self) -> String {
        format!("https://{}/", self.domain())
    }

    /// The authorize link the frontend sends users to.
    ///
    /// Uses the implicit flow (`response_type=token`), with the audience,
    /// client id and callback URL passed as query parameters.
    ///
    /// # Errors
    ///
    /// Returns `EnvironmentError::InvalidDomainPrefix` if the domain prefix
    /// does not form a valid host.
    pub fn login_url(&self) -> Result<Url, EnvironmentError> {
        validate_domain_prefix(&self.url)?;
        let mut url = Url::parse(&format!("https://{}/authorize", self.domain())).map_err(|e| {
            EnvironmentError::InvalidDomainPrefix {
                value: self.url.clone(),
                reason: e.to_string(),
            }
        })?;
        url.query_pairs_mut()
            .append_pair("audience", &self.audience)
            .append_pair("response_type", "token")
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.callback_url);
        Ok(url)
    }
}

/// The frontend environment record.
///
/// # Post-conditions
///
/// When obtained from `EnvironmentConfig::from_env()`, the record has passed
/// `validate()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Environment {
    /// Build-mode flag.
    pub production: bool,
    /// Base address of the backend API.
    pub api_server_url: String,
    /// Identity provider settings.
    pub auth0: Auth0Config,
}

impl Environment {
    pub const DEFAULT_PRODUCTION: bool = false;
    pub const DEFAULT_API_SERVER_URL: &'static str = "http://127.0.0.1:5000";
    pub const DEFAULT_AUTH0_URL: &'static str = "coffee-shop-udacity01.us";
    pub const DEFAULT_AUTH0_AUDIENCE: &'static str = "http://127.0.0.1:5000/api/v2";
    pub const DEFAULT_AUTH0_CLIENT_ID: &'static str = "NmPvTxKFj23u51uSasVtTsMPd8692rZM";
    pub const DEFAULT_AUTH0_CALLBACK_URL: &'static str = "https://localhost:3000";

    /// The development record the frontend ships with.
    #[must_use]
    pub fn development() -> Self {
        Self {
            production: Self::DEFAULT_PRODUCTION,
            api_server_url: Self::DEFAULT_API_SERVER_URL.to_string(),
            auth0: Auth0Config {
                url: Self::DEFAULT_AUTH0_URL.to_string(),
                audience: Self::DEFAULT_AUTH0_AUDIENCE.to_string(),
                client_id: Self::DEFAULT_AUTH0_CLIENT_ID.to_string(),
                callback_url: Self::DEFAULT_AUTH0_CALLBACK_URL.to_string(),
            },
        }
    }

    /// Validate the record, returning the first problem found.
    ///
    /// Fields are checked in declaration order.
    ///
    /// # Errors
    ///
    /// Returns the first `EnvironmentError` encountered.
    pub fn validate(&self) -> Result<(), EnvironmentError> {
        self.validate_all().into_iter().next().map_or(Ok(()), Err)
    }

    /// Validate the record, returning every problem found.
    ///
    /// An empty vector means the record is usable.
    #[must_use]
    pub fn validate_all(&self) -> Vec<EnvironmentError> {
        let checks = [
            validate_http_url(fields::API_SERVER_URL, &self.api_server_url).map(drop),
            validate_domain_prefix(&self.auth0.url),
            validate_absolute_url(fields::AUTH0_AUDIENCE, &self.auth0.audience).map(drop),
            validate_client_id(&self.auth0.client_id),
            validate_http_url(fields::AUTH0_CALLBACK_URL, &self.auth0.callback_url).map(drop),
        ];
        checks.into_iter().filter_map(Result::err).collect()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::development()
    }
}

/// Parse `value` as an absolute URL that has a host.
///
/// The parser silently strips whitespace and fills in missing slashes, so the
/// raw value must already be in parsed form (up to the trailing `/` the parser
/// adds to an empty path). The raw value is what gets rendered and served.
fn validate_absolute_url(field: &'static str, value: &str) -> Result<Url, EnvironmentError> {
    if value.is_empty() {
        return Err(EnvironmentError::Empty { field });
    }
    let invalid = |reason: String| EnvironmentError::InvalidUrl {
        field,
        value: value.to_string(),
        reason,
    };
    if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(invalid("must not contain whitespace or control characters".to_string()));
    }
    let url = Url::parse(value).map_err(|e| invalid(e.to_string()))?;
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }
    let parsed = url.as_str();
    if parsed != value && parsed.strip_suffix('/') != Some(value) {
        return Err(invalid(format!("not in canonical form (parses as '{parsed}')")));
    }
    Ok(url)
}

/// Parse `value` as an absolute `http`/`https` URL.
fn validate_http_url(field: &'static str, value: &str) -> Result<Url, EnvironmentError> {
    let url = validate_absolute_url(field, value)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(EnvironmentError::InvalidUrl {
            field,
            value: value.to_string(),
            reason: format!("unsupported scheme '{other}' (expected http or https)"),
        }),
    }
}

fn validate_domain_prefix(value: &str) -> Result<(), EnvironmentError> {
    if value.is_empty() {
        return Err(EnvironmentError::Empty {
            field: fields::AUTH0_URL,
        });
    }
    let invalid = |reason: &str| EnvironmentError::InvalidDomainPrefix {
        value: value.to_string(),
        reason: reason.to_string(),
    };
    if value.contains("://") {
        return Err(invalid("must not include a scheme"));
    }
    if let Some(c) = value
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '.'))
    {
        return Err(invalid(&format!("unexpected character '{c}'")));
    }
    if value.starts_with(['.', '-']) || value.ends_with(['.', '-']) {
        return Err(invalid("must not start or end with '.' or '-'"));
    }
    if value.contains("..") {
        return Err(invalid("must not contain empty labels"));
    }
    Ok(())
}

fn validate_client_id(value: &str) -> Result<(), EnvironmentError> {
    if value.is_empty() {
        return Err(EnvironmentError::Empty {
            field: fields::AUTH0_CLIENT_ID,
        });
    }
    if value.chars().any(char::is_whitespace) {
        return Err(EnvironmentError::InvalidClientId {
            reason: "must not contain whitespace".to_string(),
        });
    }
    Ok(())
}
