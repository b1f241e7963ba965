use stratcritic_gateway::InvalidApiKey;
use thiserror::Error;

/// Pre-flight problems that stop a run before any model is called
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("No API key provided; pass --api-key or set OPENROUTER_CRITIC_API_KEY (a .env file works)")]
    MissingCredential,

    #[error("Invalid API key: {0}")]
    InvalidCredential(#[from] InvalidApiKey),

    #[error("No critic models selected")]
    NoModelsSelected,

    #[error("Required field '{0}' is empty")]
    EmptyField(&'static str),
}

#[derive(Error, Debug)]
pub enum RunError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),
}
