use stratcritic_critic::{ModelId, StrategySubmission};

use crate::ConfigError;

/// One (prompt, strategy output, code) triple and the critics to ask
#[derive(Debug, Clone)]
pub struct EvaluationRequest {
    pub prompt: String,
    pub strategy_output: String,
    pub code: String,
    selected_models: Vec<ModelId>,
}

impl EvaluationRequest {
    /// Repeated models are dropped; the first occurrence keeps its position.
    pub fn new(
        prompt: impl Into<String>,
        strategy_output: impl Into<String>,
        code: impl Into<String>,
        models: impl IntoIterator<Item = ModelId>,
    ) -> Self {
        let mut selected_models = Vec::new();
        for model in models {
            if !selected_models.contains(&model) {
                selected_models.push(model);
            }
        }

        Self {
            prompt: prompt.into(),
            strategy_output: strategy_output.into(),
            code: code.into(),
            selected_models,
        }
    }

    pub fn selected_models(&self) -> &[ModelId] {
        &self.selected_models
    }

    pub fn submission(&self) -> StrategySubmission<'_> {
        StrategySubmission {
            prompt: &self.prompt,
            strategy_output: &self.strategy_output,
            code: &self.code,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("prompt", &self.prompt),
            ("strategy-output", &self.strategy_output),
            ("code", &self.code),
        ];
        if let Some((name, _)) = fields
            .into_iter()
            .find(|(_, value)| value.trim().is_empty())
        {
            return Err(ConfigError::EmptyField(name));
        }

        if self.selected_models.is_empty() {
            return Err(ConfigError::NoModelsSelected);
        }

        Ok(())
    }
}
