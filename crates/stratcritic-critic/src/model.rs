use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Supported critic backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelId {
    Gemini,
    Openai,
    Deepseek,
}

impl ModelId {
    /// Every critic, in default evaluation order
    pub const ALL: [ModelId; 3] = [ModelId::Gemini, ModelId::Openai, ModelId::Deepseek];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelId::Gemini => "gemini",
            ModelId::Openai => "openai",
            ModelId::Deepseek => "deepseek",
        }
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ModelId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Ok(ModelId::Gemini),
            "openai" => Ok(ModelId::Openai),
            "deepseek" => Ok(ModelId::Deepseek),
            _ => Err(format!("Unknown model: {}", s)),
        }
    }
}

/// Fixed call parameters for one critic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelProfile {
    /// Model identifier understood by the gateway
    pub upstream_id: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl ModelProfile {
    pub fn new(upstream_id: impl Into<String>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            upstream_id: upstream_id.into(),
            temperature,
            max_tokens,
        }
    }

    /// Built-in parameters for a critic
    pub fn builtin(model: ModelId) -> Self {
        match model {
            ModelId::Gemini => Self::new("google/gemini-2.5-pro", 0.3, 2000),
            ModelId::Openai => Self::new("openai/gpt-4.1", 0.3, 10000),
            ModelId::Deepseek => Self::new("deepseek/deepseek-chat-v3.1", 0.3, 2000),
        }
    }
}

/// Lookup table from critic to call parameters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelTable {
    profiles: BTreeMap<ModelId, ModelProfile>,
}

impl Default for ModelTable {
    fn default() -> Self {
        Self {
            profiles: ModelId::ALL
                .iter()
                .map(|id| (*id, ModelProfile::builtin(*id)))
                .collect(),
        }
    }
}

impl ModelTable {
    pub fn get(&self, model: ModelId) -> &ModelProfile {
        // Every ModelId is inserted by Default and entries are only replaced
        &self.profiles[&model]
    }

    /// Replace the profile used for a critic
    pub fn set(&mut self, model: ModelId, profile: ModelProfile) {
        self.profiles.insert(model, profile);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_profiles() {
        let table = ModelTable::default();

        let gemini = table.get(ModelId::Gemini);
        assert_eq!(gemini.upstream_id, "google/gemini-2.5-pro");
        assert_eq!(gemini.max_tokens, 2000);

        let openai = table.get(ModelId::Openai);
        assert_eq!(openai.upstream_id, "openai/gpt-4.1");
        assert_eq!(openai.max_tokens, 10000);

        let deepseek = table.get(ModelId::Deepseek);
        assert_eq!(deepseek.upstream_id, "deepseek/deepseek-chat-v3.1");
        assert_eq!(deepseek.max_tokens, 2000);

        assert!(ModelId::ALL
            .iter()
            .all(|id| (table.get(*id).temperature - 0.3).abs() < f32::EPSILON));
    }

    #[test]
    fn test_set_replaces_single_profile() {
        let mut table = ModelTable::default();
        table.set(ModelId::Deepseek, ModelProfile::new("deepseek/deepseek-r1", 0.0, 4000));

        assert_eq!(table.get(ModelId::Deepseek).upstream_id, "deepseek/deepseek-r1");
        assert_eq!(table.get(ModelId::Gemini), &ModelProfile::builtin(ModelId::Gemini));
    }

    #[test]
    fn test_model_id_parse_and_display() {
        assert_eq!("Gemini".parse::<ModelId>().unwrap(), ModelId::Gemini);
        assert_eq!("deepseek".parse::<ModelId>().unwrap(), ModelId::Deepseek);
        assert!("claude".parse::<ModelId>().is_err());
        assert_eq!(ModelId::Openai.to_string(), "openai");
        assert_eq!(serde_json::to_string(&ModelId::Openai).unwrap(), "\"openai\"");
    }
}
