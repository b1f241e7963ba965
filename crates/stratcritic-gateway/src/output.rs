use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Text returned by a completion call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    /// Content of the first choice, verbatim
    pub text: String,
    /// Model the gateway reports having routed to, if any
    pub model: Option<String>,
    /// Wall-clock time of the call
    #[serde(with = "duration_secs")]
    pub duration: Duration,
}

impl Completion {
    pub fn new(text: String, model: Option<String>, duration: Duration) -> Self {
        Self {
            text,
            model,
            duration,
        }
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs_f64().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Ok(Duration::from_secs_f64(secs))
    }
}
