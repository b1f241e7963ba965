use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use stratcritic_critic::{extract_verdict, CriticPrompts, ModelId, ModelProfile, ModelTable};
use stratcritic_gateway::{ApiKey, CompletionProvider, CompletionRequest, GatewayError};
use stratcritic_logging::{LogEvent, Logger};

use crate::{ConfigError, CriticEntry, CriticResult, EvaluationReport, EvaluationRequest, RunError};

/// Per-call limit when nothing else is configured
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(120);

/// Everything the runner needs besides the request itself
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Raw credential as found in flags or environment; validated by `run`
    pub api_key: Option<String>,
    pub call_timeout: Duration,
    /// Issue all model calls at once instead of one after another
    pub concurrent: bool,
    pub models: ModelTable,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            concurrent: false,
            models: ModelTable::default(),
        }
    }
}

impl RunSettings {
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_concurrent(mut self, concurrent: bool) -> Self {
        self.concurrent = concurrent;
        self
    }

    pub fn with_models(mut self, models: ModelTable) -> Self {
        self.models = models;
        self
    }

    fn credential(&self) -> Result<ApiKey, ConfigError> {
        let raw = self
            .api_key
            .as_deref()
            .ok_or(ConfigError::MissingCredential)?;
        Ok(ApiKey::parse(raw)?)
    }
}

/// Fans one evaluation request out to the selected critics
pub struct EvaluationRunner {
    provider: Arc<dyn CompletionProvider>,
    settings: RunSettings,
    logger: Arc<Logger>,
}

impl EvaluationRunner {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        settings: RunSettings,
        logger: Arc<Logger>,
    ) -> Self {
        Self {
            provider,
            settings,
            logger,
        }
    }

    /// Evaluate the request with every selected critic.
    ///
    /// Configuration problems are returned before any call is made. After
    /// that the run always completes: a failing critic becomes a
    /// [`CriticEntry::Failed`] in its own slot.
    pub async fn run(&self, request: &EvaluationRequest) -> Result<EvaluationReport, RunError> {
        let api_key = self.settings.credential()?;
        request.validate()?;

        let started = Instant::now();
        let prompt = CriticPrompts::build_prompt(request.submission());
        let models = request.selected_models();

        self.logger.log(&LogEvent::EvaluationStarted {
            prompt: request.prompt.clone(),
            models: models.iter().map(ToString::to_string).collect(),
            concurrent: self.settings.concurrent,
        });

        debug!(
            prompt_len = prompt.len(),
            models = models.len(),
            provider = self.provider.name(),
            "Running evaluation"
        );

        let entries = if self.settings.concurrent {
            self.run_concurrent(models, prompt, api_key).await
        } else {
            self.run_sequential(models, &prompt, &api_key).await
        };

        let report = EvaluationReport::new(entries, started.elapsed());

        self.logger.log(&LogEvent::EvaluationCompleted {
            approvals: report.approvals(),
            total: report.entries.len(),
            failures: report.failures(),
            duration_secs: report.total_duration_secs,
        });

        Ok(report)
    }

    async fn run_sequential(
        &self,
        models: &[ModelId],
        prompt: &str,
        api_key: &ApiKey,
    ) -> Vec<CriticEntry> {
        let mut entries = Vec::with_capacity(models.len());
        for &model in models {
            let call = self.call(model);
            entries.push(call.evaluate(prompt, api_key).await);
        }
        entries
    }

    async fn run_concurrent(
        &self,
        models: &[ModelId],
        prompt: String,
        api_key: ApiKey,
    ) -> Vec<CriticEntry> {
        let prompt: Arc<str> = Arc::from(prompt);

        let handles: Vec<_> = models
            .iter()
            .map(|&model| {
                let call = self.call(model);
                let prompt = prompt.clone();
                let api_key = api_key.clone();
                let handle =
                    tokio::spawn(async move { call.evaluate(&prompt, &api_key).await });
                (model, handle)
            })
            .collect();

        // Joined in selection order; each handle already knows its model
        let mut entries = Vec::with_capacity(handles.len());
        for (model, handle) in handles {
            let entry = match handle.await {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(model = %model, error = %e, "Critic task aborted");
                    CriticEntry::Failed {
                        model,
                        upstream_id: self.settings.models.get(model).upstream_id.clone(),
                        error: format!("Critic task aborted: {}", e),
                    }
                }
            };
            entries.push(entry);
        }
        entries
    }

    fn call(&self, model: ModelId) -> CriticCall {
        CriticCall {
            model,
            profile: self.settings.models.get(model).clone(),
            provider: self.provider.clone(),
            logger: self.logger.clone(),
            timeout: self.settings.call_timeout,
        }
    }
}

/// A single critic invocation, owned so it can move onto a task
struct CriticCall {
    model: ModelId,
    profile: ModelProfile,
    provider: Arc<dyn CompletionProvider>,
    logger: Arc<Logger>,
    timeout: Duration,
}

impl CriticCall {
    async fn evaluate(self, prompt: &str, api_key: &ApiKey) -> CriticEntry {
        self.logger.log(&LogEvent::CriticStarted {
            model: self.model.to_string(),
            upstream_id: self.profile.upstream_id.clone(),
        });

        match self.call_model(prompt, api_key).await {
            Ok(result) => {
                info!(
                    model = %self.model,
                    verdict = %result.verdict,
                    duration_secs = result.duration_secs,
                    "Critic completed"
                );
                self.logger.log(&LogEvent::CriticCompleted {
                    model: self.model.to_string(),
                    verdict: result.verdict.to_string(),
                    response_lines: result.raw_response_text.lines().count(),
                    duration_secs: result.duration_secs,
                });
                CriticEntry::Reviewed(result)
            }
            Err(e) => {
                warn!(model = %self.model, error = %e, "Critic call failed");
                self.logger.log(&LogEvent::CriticFailed {
                    model: self.model.to_string(),
                    error: e.to_string(),
                });
                CriticEntry::Failed {
                    model: self.model,
                    upstream_id: self.profile.upstream_id,
                    error: e.to_string(),
                }
            }
        }
    }

    async fn call_model(&self, prompt: &str, api_key: &ApiKey) -> Result<CriticResult, GatewayError> {
        let request = CompletionRequest::single_user(
            &self.profile.upstream_id,
            prompt,
            self.profile.temperature,
            self.profile.max_tokens,
        );

        let started = Instant::now();
        let completion = tokio::time::timeout(self.timeout, self.provider.complete(&request, api_key))
            .await
            .map_err(|_| GatewayError::Timeout(self.timeout))??;

        let verdict = extract_verdict(&completion.text);

        Ok(CriticResult {
            model: self.model,
            upstream_id: self.profile.upstream_id.clone(),
            routed_model: completion.model,
            raw_response_text: completion.text,
            verdict,
            duration_secs: started.elapsed().as_secs_f64(),
        })
    }
}
