// Life of the record:
// 1. Start from the development defaults
// 2. Apply FRONTEND_ENV_* overrides
// 3. Validate
// 4. Either render it for the frontend build (environment.ts / .json)
//    or serve it to the running frontend over HTTP
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod config;
pub mod environment;
pub mod render;
pub mod server;

pub use config::{ConfigError, EnvironmentConfig};
pub use environment::{Auth0Config, Environment, EnvironmentError};
pub use render::{Format, RenderError};
