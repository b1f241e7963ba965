use std::fmt;
use thiserror::Error;

/// Bearer credential for the gateway. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidApiKey {
    #[error("API key is empty")]
    Blank,

    #[error("API key contains whitespace")]
    ContainsWhitespace,
}

impl ApiKey {
    /// Validate a raw key. Surrounding whitespace is trimmed first.
    pub fn parse(raw: &str) -> Result<Self, InvalidApiKey> {
        let key = raw.trim();
        if key.is_empty() {
            return Err(InvalidApiKey::Blank);
        }
        if key.chars().any(char::is_whitespace) {
            return Err(InvalidApiKey::ContainsWhitespace);
        }
        Ok(Self(key.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}
