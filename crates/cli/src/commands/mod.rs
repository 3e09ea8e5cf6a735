//! CLI command implementations.

pub mod orders;
pub mod products;

use thiserror::Error;

use taproom_storefront::api::{ApiClient, ApiFailure};
use taproom_storefront::config::{ApiConfig, ConfigError};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Backend settings could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The backend refused a request or was unreachable.
    #[error("Backend error: {0}")]
    Api(#[from] ApiFailure),

    /// A seed file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The customer password was not provided.
    #[error("Set {0} to the customer's password")]
    MissingPassword(&'static str),

    /// A seed file is not valid YAML for the expected shape.
    #[error("Invalid seed file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A seed file parsed but holds products the backend would reject.
    #[error("{0} validation errors found")]
    Validation(usize),
}

/// Build the backend client from the environment.
///
/// # Errors
///
/// Returns `CommandError::Config` if `TAPROOM_API_BASE_URL` is invalid.
pub fn api_client() -> Result<ApiClient, CommandError> {
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env()?;
    tracing::debug!(base_url = %config.base_url, "Using backend");
    Ok(ApiClient::new(&config))
}
