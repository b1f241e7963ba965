use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use stratcritic_core::{
    ConfigError, CriticEntry, EvaluationRequest, EvaluationRunner, RunError, RunSettings,
};
use stratcritic_critic::{ModelId, ModelProfile, ModelTable, Verdict};
use stratcritic_gateway::{
    ApiKey, Completion, CompletionProvider, CompletionRequest, GatewayError,
};
use stratcritic_logging::{LogFormat, Logger};

/// What the stub gateway does for a given upstream model
#[derive(Clone)]
enum Scripted {
    Reply(&'static str),
    ReplyAfter(Duration, &'static str),
    Status(u16),
    Hang,
}

/// Deterministic provider that records every request it receives
#[derive(Default)]
struct StubProvider {
    script: HashMap<String, Scripted>,
    calls: Mutex<Vec<CompletionRequest>>,
}

impl StubProvider {
    fn with(mut self, model: ModelId, behaviour: Scripted) -> Self {
        let upstream = ModelProfile::builtin(model).upstream_id;
        self.script.insert(upstream, behaviour);
        self
    }

    fn recorded(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    async fn complete(
        &self,
        request: &CompletionRequest,
        api_key: &ApiKey,
    ) -> Result<Completion, GatewayError> {
        assert_eq!(api_key.expose(), "sk-test");
        self.calls.lock().unwrap().push(request.clone());

        let behaviour = self
            .script
            .get(&request.model)
            .cloned()
            .unwrap_or(Scripted::Reply("No script.\nYes"));

        match behaviour {
            Scripted::Reply(text) => Ok(Completion::new(
                text.to_string(),
                Some(request.model.clone()),
                Duration::from_millis(1),
            )),
            Scripted::ReplyAfter(delay, text) => {
                tokio::time::sleep(delay).await;
                Ok(Completion::new(
                    text.to_string(),
                    Some(request.model.clone()),
                    delay,
                ))
            }
            Scripted::Status(status) => Err(GatewayError::from_status(
                status,
                "upstream unavailable".to_string(),
            )),
            Scripted::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Err(GatewayError::Network("unreachable".to_string()))
            }
        }
    }
}

fn runner(provider: Arc<StubProvider>, settings: RunSettings) -> EvaluationRunner {
    EvaluationRunner::new(provider, settings, Arc::new(Logger::new(LogFormat::Compact)))
}

fn settings() -> RunSettings {
    RunSettings::default().with_api_key("sk-test")
}

fn sma_request(models: impl IntoIterator<Item = ModelId>) -> EvaluationRequest {
    EvaluationRequest::new(
        "SMA 50/200 crossover strategy",
        r#"{"indicators":["SMA50","SMA200"]}"#,
        "class Strategy:\n    def next(self):\n        self.sma50 = SMA(50)\n        self.sma200 = SMA(200)",
        models,
    )
}

fn models_of(entries: &[CriticEntry]) -> Vec<ModelId> {
    entries.iter().map(CriticEntry::model).collect()
}

#[tokio::test]
async fn test_all_succeed_in_selection_order() {
    let provider = Arc::new(
        StubProvider::default()
            .with(ModelId::Gemini, Scripted::Reply("Complete.\nYes"))
            .with(ModelId::Openai, Scripted::Reply("Missing exit rule.\nNo"))
            .with(ModelId::Deepseek, Scripted::Reply("Hard to say.\nPerhaps")),
    );
    let selection = [ModelId::Deepseek, ModelId::Gemini, ModelId::Openai];

    let report = runner(provider.clone(), settings())
        .run(&sma_request(selection))
        .await
        .unwrap();

    assert_eq!(report.entries.len(), 3);
    assert_eq!(models_of(&report.entries), selection.to_vec());
    assert_eq!(report.entry(ModelId::Gemini).unwrap().verdict(), Some(Verdict::Yes));
    assert_eq!(report.entry(ModelId::Openai).unwrap().verdict(), Some(Verdict::No));
    assert_eq!(
        report.entry(ModelId::Deepseek).unwrap().verdict(),
        Some(Verdict::Unknown)
    );

    let called: Vec<String> = provider.recorded().into_iter().map(|r| r.model).collect();
    assert_eq!(
        called,
        vec![
            "deepseek/deepseek-chat-v3.1",
            "google/gemini-2.5-pro",
            "openai/gpt-4.1"
        ]
    );
}

#[tokio::test]
async fn test_requests_use_model_profiles_and_shared_prompt() {
    let provider = Arc::new(StubProvider::default());

    runner(provider.clone(), settings())
        .run(&sma_request([ModelId::Gemini, ModelId::Openai]))
        .await
        .unwrap();

    let calls = provider.recorded();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].max_tokens, 2000);
    assert_eq!(calls[1].max_tokens, 10000);
    assert!((calls[0].temperature - 0.3).abs() < f32::EPSILON);
    assert_eq!(calls[0].messages.len(), 1);
    assert_eq!(calls[0].messages[0].role, "user");
    assert_eq!(calls[0].messages[0].content, calls[1].messages[0].content);
    assert!(calls[0].messages[0]
        .content
        .contains("SMA 50/200 crossover strategy"));
}

#[tokio::test]
async fn test_overridden_profile_is_used() {
    let provider = Arc::new(StubProvider::default());
    let mut table = ModelTable::default();
    table.set(ModelId::Gemini, ModelProfile::new("google/gemini-2.5-flash", 0.0, 512));

    runner(provider.clone(), settings().with_models(table))
        .run(&sma_request([ModelId::Gemini]))
        .await
        .unwrap();

    let calls = provider.recorded();
    assert_eq!(calls[0].model, "google/gemini-2.5-flash");
    assert_eq!(calls[0].max_tokens, 512);
}

#[tokio::test]
async fn test_one_failure_does_not_suppress_others() {
    let provider = Arc::new(
        StubProvider::default()
            .with(ModelId::Gemini, Scripted::Reply("Fine.\nYes"))
            .with(ModelId::Openai, Scripted::Status(503))
            .with(ModelId::Deepseek, Scripted::Reply("Fine.\nYes")),
    );

    let report = runner(provider.clone(), settings())
        .run(&sma_request(ModelId::ALL))
        .await
        .unwrap();

    assert_eq!(report.entries.len(), 3);
    assert_eq!(models_of(&report.entries), ModelId::ALL.to_vec());
    assert_eq!(report.failures(), 1);
    assert_eq!(report.approvals(), 2);

    match &report.entries[1] {
        CriticEntry::Failed {
            model,
            upstream_id,
            error,
        } => {
            assert_eq!(*model, ModelId::Openai);
            assert_eq!(upstream_id, "openai/gpt-4.1");
            assert!(error.contains("503"));
        }
        other => panic!("expected failure entry, got {:?}", other),
    }
    assert_eq!(provider.recorded().len(), 3);
}

#[tokio::test]
async fn test_concurrent_failure_isolated_and_ordered() {
    let provider = Arc::new(
        StubProvider::default()
            .with(
                ModelId::Gemini,
                Scripted::ReplyAfter(Duration::from_millis(150), "Slow but fine.\nYes"),
            )
            .with(ModelId::Openai, Scripted::Status(401))
            .with(ModelId::Deepseek, Scripted::Reply("Missing stop loss.\nNo")),
    );

    let report = runner(provider.clone(), settings().with_concurrent(true))
        .run(&sma_request(ModelId::ALL))
        .await
        .unwrap();

    assert_eq!(models_of(&report.entries), ModelId::ALL.to_vec());
    assert_eq!(report.entries[0].verdict(), Some(Verdict::Yes));
    assert!(report.entries[1].is_failed());
    assert_eq!(report.entries[2].verdict(), Some(Verdict::No));
    assert_eq!(provider.recorded().len(), 3);
}

#[tokio::test]
async fn test_timeout_becomes_failed_entry() {
    let provider = Arc::new(
        StubProvider::default()
            .with(ModelId::Gemini, Scripted::Hang)
            .with(ModelId::Deepseek, Scripted::Reply("ok\nYes")),
    );

    let report = runner(
        provider,
        settings().with_call_timeout(Duration::from_millis(100)),
    )
    .run(&sma_request([ModelId::Gemini, ModelId::Deepseek]))
    .await
    .unwrap();

    match &report.entries[0] {
        CriticEntry::Failed { error, .. } => assert!(error.contains("timed out")),
        other => panic!("expected timeout failure, got {:?}", other),
    }
    assert_eq!(report.entries[1].verdict(), Some(Verdict::Yes));
}

#[tokio::test]
async fn test_missing_credential_fails_before_any_call() {
    let provider = Arc::new(StubProvider::default());

    let result = runner(provider.clone(), RunSettings::default())
        .run(&sma_request(ModelId::ALL))
        .await;

    assert!(matches!(
        result,
        Err(RunError::Configuration(ConfigError::MissingCredential))
    ));
    assert!(provider.recorded().is_empty());
}

#[tokio::test]
async fn test_blank_credential_is_invalid() {
    let provider = Arc::new(StubProvider::default());

    let result = runner(provider.clone(), RunSettings::default().with_api_key("   "))
        .run(&sma_request(ModelId::ALL))
        .await;

    assert!(matches!(
        result,
        Err(RunError::Configuration(ConfigError::InvalidCredential(_)))
    ));
    assert!(provider.recorded().is_empty());
}

#[tokio::test]
async fn test_no_models_is_configuration_error() {
    let provider = Arc::new(StubProvider::default());

    let result = runner(provider.clone(), settings())
        .run(&sma_request(Vec::new()))
        .await;

    assert!(matches!(
        result,
        Err(RunError::Configuration(ConfigError::NoModelsSelected))
    ));
    assert!(provider.recorded().is_empty());
}

#[tokio::test]
async fn test_missing_crossover_scenario_preserves_raw_text() {
    let raw = "The strategy computes SMA50 and SMA200 but never compares them...missing crossover check...\nNo";
    let provider = Arc::new(StubProvider::default().with(ModelId::Gemini, Scripted::Reply(raw)));

    let report = runner(provider, settings())
        .run(&sma_request([ModelId::Gemini]))
        .await
        .unwrap();

    assert_eq!(report.entries.len(), 1);
    match &report.entries[0] {
        CriticEntry::Reviewed(result) => {
            assert_eq!(result.model, ModelId::Gemini);
            assert_eq!(result.verdict, Verdict::No);
            assert_eq!(result.raw_response_text, raw);
            assert_eq!(result.routed_model.as_deref(), Some("google/gemini-2.5-pro"));
        }
        other => panic!("expected review, got {:?}", other),
    }
}
