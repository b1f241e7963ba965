mod error;
mod report;
mod request;
mod runner;

pub use error::{ConfigError, RunError};
pub use report::{Consensus, CriticEntry, CriticResult, EvaluationReport};
pub use request::EvaluationRequest;
pub use runner::{EvaluationRunner, RunSettings, DEFAULT_CALL_TIMEOUT};
