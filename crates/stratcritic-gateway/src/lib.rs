mod credential;
mod openrouter;
mod output;
mod request;
mod traits;

pub use credential::{ApiKey, InvalidApiKey};
pub use openrouter::OpenRouterClient;
pub use output::Completion;
pub use request::{ChatMessage, CompletionRequest};
pub use traits::{CompletionProvider, GatewayConfig, GatewayError, DEFAULT_BASE_URL};
