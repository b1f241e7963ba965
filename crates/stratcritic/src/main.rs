mod config;
mod report;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use stratcritic_core::{EvaluationRequest, EvaluationRunner, RunSettings, DEFAULT_CALL_TIMEOUT};
use stratcritic_critic::ModelId;
use stratcritic_gateway::{GatewayConfig, OpenRouterClient, DEFAULT_BASE_URL};
use stratcritic_logging::{init_tracing, LogFormat, Logger};

use crate::config::ProjectConfig;

#[derive(Parser, Debug)]
#[command(
    name = "stratcritic",
    about = "Ask several LLM critics whether a generated trading strategy meets its request",
    version,
    author,
    after_help = "Examples:\n  stratcritic --prompt \"Create a simple SMA crossover strategy\" \\\n    --strategy-output '{\"timeframe\": \"1h\", \"indicators\": [\"SMA50\", \"SMA200\"]}' \\\n    --code-file strategy.py\n\n  stratcritic --prompt \"...\" --strategy-output \"...\" --code \"...\" --models gemini deepseek"
)]
struct Cli {
    /// The original user request for the trading strategy
    #[arg(long)]
    prompt: String,

    /// The generated strategy configuration or description
    #[arg(
        long,
        conflicts_with = "strategy_output_file",
        required_unless_present = "strategy_output_file"
    )]
    strategy_output: Option<String>,

    /// Read the strategy output from a file
    #[arg(long)]
    strategy_output_file: Option<PathBuf>,

    /// The generated strategy code
    #[arg(long, conflicts_with = "code_file", required_unless_present = "code_file")]
    code: Option<String>,

    /// Read the strategy code from a file
    #[arg(long)]
    code_file: Option<PathBuf>,

    /// Critic models to ask, in order (default: all)
    #[arg(long, value_enum, num_args = 0..)]
    models: Option<Vec<ModelChoice>>,

    /// Gateway API key (overrides the environment variable)
    #[arg(long)]
    api_key: Option<String>,

    /// Gateway base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Per-call timeout in seconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: Option<u64>,

    /// Call all critics at once instead of one after another
    #[arg(long)]
    concurrent: bool,

    /// Path to config file (default: ./stratcritic.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum, default_value = "pretty")]
    log_format: LogFormatChoice,

    /// Tracing filter when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Output final report as JSON
    #[arg(long)]
    json_output: bool,

    /// Dry run: show what would be sent without calling any model
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModelChoice {
    Gemini,
    Openai,
    Deepseek,
}

impl From<ModelChoice> for ModelId {
    fn from(choice: ModelChoice) -> Self {
        match choice {
            ModelChoice::Gemini => ModelId::Gemini,
            ModelChoice::Openai => ModelId::Openai,
            ModelChoice::Deepseek => ModelId::Deepseek,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is normal; the key may come from the flag or the shell
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_format: LogFormat = cli.log_format.into();
    init_tracing(&cli.log_level, log_format);

    let config = load_config(&cli)?;

    let request = EvaluationRequest::new(
        cli.prompt.clone(),
        read_text(cli.strategy_output.as_deref(), cli.strategy_output_file.as_ref())
            .context("Failed to read strategy output")?,
        read_text(cli.code.as_deref(), cli.code_file.as_ref()).context("Failed to read code")?,
        selected_models(&cli, &config),
    );

    let call_timeout = cli
        .timeout_secs
        .or(config.timeout_secs)
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_CALL_TIMEOUT);
    let base_url = cli
        .base_url
        .clone()
        .or_else(|| config.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let settings = RunSettings {
        api_key: cli
            .api_key
            .clone()
            .or_else(|| std::env::var(config.api_key_env()).ok()),
        call_timeout,
        concurrent: cli.concurrent || config.concurrent.unwrap_or(false),
        models: config.model_table(),
    };

    if cli.dry_run {
        request.validate()?;
        print_dry_run(&request, &settings, &base_url);
        return Ok(());
    }

    let gateway = GatewayConfig::default()
        .with_base_url(base_url)
        .with_timeout(call_timeout);
    let provider = OpenRouterClient::new(gateway).context("Failed to create gateway client")?;

    let logger = Arc::new(Logger::new(log_format));
    let runner = EvaluationRunner::new(Arc::new(provider), settings, logger);

    // Configuration errors surface here, before any call is made
    let report = runner.run(&request).await?;

    if cli.json_output {
        let json = serde_json::to_string_pretty(&report)?;
        println!("{}", json);
    } else {
        let stdout = std::io::stdout();
        report::write_report(&mut stdout.lock(), &report)?;
    }

    // Individual critic failures are reported, not turned into an exit code
    Ok(())
}

fn load_config(cli: &Cli) -> Result<ProjectConfig> {
    if let Some(ref path) = cli.config {
        return ProjectConfig::load_from(path);
    }
    let working_dir = std::env::current_dir().context("Failed to get current directory")?;
    Ok(ProjectConfig::load(&working_dir)?.unwrap_or_default())
}

fn selected_models(cli: &Cli, config: &ProjectConfig) -> Vec<ModelId> {
    match (&cli.models, &config.models) {
        (Some(choices), _) => choices.iter().map(|c| ModelId::from(*c)).collect(),
        (None, Some(models)) => models.clone(),
        (None, None) => ModelId::ALL.to_vec(),
    }
}

/// Inline value wins; clap guarantees exactly one of the two is present
fn read_text(inline: Option<&str>, file: Option<&PathBuf>) -> Result<String> {
    match (inline, file) {
        (Some(text), _) => Ok(text.to_string()),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        (None, None) => Ok(String::new()),
    }
}

fn print_dry_run(request: &EvaluationRequest, settings: &RunSettings, base_url: &str) {
    println!("=== Dry Run ===");
    println!(
        "Prompt: {}",
        if request.prompt.chars().count() > 100 {
            format!("{}...", request.prompt.chars().take(100).collect::<String>())
        } else {
            request.prompt.clone()
        }
    );
    println!("Gateway: {}", base_url);
    println!(
        "Mode: {}",
        if settings.concurrent {
            "concurrent"
        } else {
            "sequential"
        }
    );
    println!("Timeout: {}s", settings.call_timeout.as_secs());
    println!(
        "API key: {}",
        if settings.api_key.is_some() {
            "set"
        } else {
            "missing"
        }
    );
    println!("Models:");
    for model in request.selected_models() {
        let profile = settings.models.get(*model);
        println!(
            "  {:10} {} (temperature {}, max_tokens {})",
            model.as_str(),
            profile.upstream_id,
            profile.temperature,
            profile.max_tokens
        );
    }
}
