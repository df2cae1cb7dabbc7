//! Rendering the environment record into build artifacts.
//!
//! The frontend build imports a TypeScript module exporting `environment`;
//! other tooling reads the same record as JSON.

use std::path::Path;
use std::str::FromStr;

use crate::environment::{Environment, EnvironmentError};

/// Errors that can occur when rendering or writing an artifact.
#[derive(Debug)]
pub enum RenderError {
    /// The record failed validation and was not written.
    InvalidEnvironment(EnvironmentError),
    /// JSON serialization failed.
    Json(serde_json::Error),
    /// Writing the artifact failed.
    Io(std::io::Error),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEnvironment(e) => write!(f, "invalid environment: {e}"),
            Self::Json(e) => write!(f, "JSON serialization error: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidEnvironment(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Io(e) => Some(e),
        }
    }
}

impl From<EnvironmentError> for RenderError {
    fn from(e: EnvironmentError) -> Self {
        Self::InvalidEnvironment(e)
    }
}

impl From<serde_json::Error> for RenderError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<std::io::Error> for RenderError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Output format of a rendered artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// `export const environment = { ... };`
    #[default]
    TypeScript,
    /// Pretty-printed JSON.
    Json,
}

impl Format {
    /// Render `environment` in this format.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::Json` if JSON serialization fails.
    pub fn render(self, environment: &Environment) -> Result<String, RenderError> {
        match self {
            Self::TypeScript => Ok(render_typescript(environment)),
            Self::Json => render_json(environment),
        }
    }

    /// Conventional file extension for this format.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::TypeScript => "ts",
            Self::Json => "json",
        }
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ts" | "typescript" => Ok(Self::TypeScript),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown format '{other}' (expected ts or json)")),
        }
    }
}

/// Render the record as the frontend's `environment.ts` module.
#[must_use]
pub fn render_typescript(environment: &Environment) -> String {
    let auth0 = &environment.auth0;
    format!(
        "export const environment = {{\n  \
         production: {},\n  \
         apiServerUrl: {},\n  \
         auth0: {{\n    \
         url: {},\n    \
         audience: {},\n    \
         clientId: {},\n    \
         callbackURL: {},\n  \
         }},\n\
         }};\n",
        environment.production,
        ts_string(&environment.api_server_url),
        ts_string(&auth0.url),
        ts_string(&auth0.audience),
        ts_string(&auth0.client_id),
        ts_string(&auth0.callback_url),
    )
}

/// Render the record as pretty JSON with the external key names.
///
/// # Errors
///
/// Returns `RenderError::Json` if serialization fails.
pub fn render_json(environment: &Environment) -> Result<String, RenderError> {
    let mut json = serde_json::to_string_pretty(environment)?;
    json.push('\n');
    Ok(json)
}

/// Validate `environment` and write it to `path` in `format`.
///
/// Creates the parent directory if needed. Nothing is written if the record
/// is invalid.
///
/// # Errors
///
/// Returns an error if validation, serialization or the write fails.
pub fn write_artifact(
    environment: &Environment,
    format: Format,
    path: &Path,
) -> Result<(), RenderError> {
    environment.validate()?;
    let contents = format.render(environment)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)?;

    tracing::info!("wrote {} environment to {}", format.extension(), path.display());
    Ok(())
}

/// Quote `value` as a single-quoted TypeScript string literal.
fn ts_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", u32::from(c))),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}
