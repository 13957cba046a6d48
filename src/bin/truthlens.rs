//! CLI binary for truthlens.
//!
//! A thin presentation layer over the library: maps flags to `AuditConfig`,
//! renders stage progress as a spinner and prints the report card.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use truthlens::prompts::MANUAL_CHECKLIST;
use truthlens::services::{create_provider, ProviderText, ProviderVision};
use truthlens::services::{GeminiVision, GroqChat, TextService, VisionService};
use truthlens::{
    AuditConfig, AuditError, AuditObserver, AuditReport, Auditor, Credentials, RiskGlyph, Stage,
};

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress observer using indicatif ────────────────────────────────────

/// Spinner that shows the running stage and logs each finished one.
struct CliObserver {
    bar: ProgressBar,
}

impl CliObserver {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Performing Deep Forensic Analysis");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl AuditObserver for CliObserver {
    fn on_stage_start(&self, stage: Stage) {
        self.bar.set_message(stage.label());
    }

    fn on_stage_complete(&self, stage: Stage, duration_ms: u64) {
        self.bar.println(format!(
            "  {} {}  {}",
            green("✓"),
            stage.label(),
            dim(&format!("{:.1}s", duration_ms as f64 / 1000.0)),
        ));
    }

    fn on_audit_complete(&self, _report: &AuditReport) {
        self.bar.finish_and_clear();
        eprintln!("{} {}", green("✔"), bold("Audit Complete!"));
    }

    fn on_audit_failed(&self, error: &AuditError) {
        self.bar.finish_and_clear();
        eprintln!("{} {}", red("✘"), red(&error.to_string()));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Audit a screenshot (keys from the environment)
  truthlens payment.jpg

  # Keys on the command line
  truthlens --vision-key AIza... --verdict-key gsk_... payment.png

  # Full report as JSON
  truthlens --json payment.png > report.json

  # Print the manual check guide
  truthlens --checklist

  # Use an edgequake-llm provider for the vision stage
  truthlens --vision-provider openai --vision-model gpt-4.1-mini payment.png

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY          Vision service key
  GROQ_API_KEY            Verdict service key
  TRUTHLENS_VISION_MODEL  Override the vision model
  TRUTHLENS_VERDICT_MODEL Override the verdict model

A stage backed by --vision-provider/--verdict-provider authenticates with
that provider's own environment variable (e.g. OPENAI_API_KEY), so the
GEMINI_API_KEY or GROQ_API_KEY for that stage is not needed.
"#;

/// Audit a payment screenshot for signs of tampering.
#[derive(Parser, Debug)]
#[command(
    name = "truthlens",
    version,
    about = "Audit payment screenshots for tampering using EXIF metadata and vision/text LLMs",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// JPEG or PNG screenshot to audit.
    #[arg(required_unless_present = "checklist")]
    input: Option<PathBuf>,

    /// Vision service API key.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    vision_key: Option<String>,

    /// Verdict service API key.
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    verdict_key: Option<String>,

    /// Vision model ID.
    #[arg(long, env = "TRUTHLENS_VISION_MODEL", default_value = truthlens::config::DEFAULT_VISION_MODEL)]
    vision_model: String,

    /// Verdict model ID.
    #[arg(long, env = "TRUTHLENS_VERDICT_MODEL", default_value = truthlens::config::DEFAULT_VERDICT_MODEL)]
    verdict_model: String,

    /// Back the vision stage with an edgequake-llm provider (openai, anthropic, gemini, ollama, …).
    /// The provider reads its own key; --vision-key is then not needed.
    #[arg(long, env = "TRUTHLENS_VISION_PROVIDER")]
    vision_provider: Option<String>,

    /// Back the verdict stage with an edgequake-llm provider.
    /// The provider reads its own key; --verdict-key is then not needed.
    #[arg(long, env = "TRUTHLENS_VERDICT_PROVIDER")]
    verdict_provider: Option<String>,

    /// Sampling temperature for both calls (0.0–2.0).
    #[arg(long, env = "TRUTHLENS_TEMPERATURE")]
    temperature: Option<f32>,

    /// Per-call timeout in seconds.
    #[arg(long, env = "TRUTHLENS_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Largest accepted upload, in MiB.
    #[arg(long, env = "TRUTHLENS_MAX_UPLOAD_MB", default_value_t = 8)]
    max_upload_mb: u64,

    /// Output the full report as JSON.
    #[arg(long)]
    json: bool,

    /// Print the manual check guide and exit.
    #[arg(long)]
    checklist: bool,

    /// Disable the progress spinner.
    #[arg(long)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except the verdict and errors.
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    if cli.checklist {
        print_checklist();
        return Ok(());
    }

    let input = cli
        .input
        .clone()
        .context("An input screenshot is required")?;

    let config = build_config(&cli)?;
    let (vision, text) = build_services(&cli, &config)?;

    let mut auditor = Auditor::with_services(config, vision, text);
    if show_progress {
        auditor = auditor.with_observer(CliObserver::new());
    }

    auditor.open();
    auditor
        .upload_path(&input)
        .await
        .with_context(|| format!("Could not load {}", input.display()))?;

    let report = match auditor.run().await {
        Ok(report) => report,
        Err(e) if e.is_missing_credentials() => {
            return Err(anyhow::Error::new(e)
                .context("Set --vision-key/--verdict-key or GEMINI_API_KEY/GROQ_API_KEY"));
        }
        Err(e) => return Err(anyhow::Error::new(e).context("Audit failed, try again")),
    };

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
    } else {
        print_report(&report, cli.quiet);
    }

    Ok(())
}

/// Map CLI args to `AuditConfig`.
fn build_config(cli: &Cli) -> Result<AuditConfig> {
    let credentials = Credentials {
        vision: cli.vision_key.clone().map(Into::into),
        verdict: cli.verdict_key.clone().map(Into::into),
    };

    let mut builder = AuditConfig::builder()
        .credentials(credentials)
        .vision_model(&cli.vision_model)
        .verdict_model(&cli.verdict_model)
        .api_timeout_secs(cli.api_timeout)
        .max_upload_bytes(cli.max_upload_mb.saturating_mul(1024 * 1024));

    if let Some(t) = cli.temperature {
        builder = builder.temperature(t);
    }

    builder.build().context("Invalid configuration")
}

/// Pick the HTTP backends, or edgequake-llm providers when named.
fn build_services(
    cli: &Cli,
    config: &AuditConfig,
) -> Result<(Arc<dyn VisionService>, Arc<dyn TextService>)> {
    let vision: Arc<dyn VisionService> = match cli.vision_provider.as_deref() {
        Some(name) => Arc::new(
            ProviderVision::new(create_provider(name, &config.vision_model)?, name)
                .temperature(config.temperature),
        ),
        None => Arc::new(GeminiVision::from_config(config).context("Vision client")?),
    };

    let text: Arc<dyn TextService> = match cli.verdict_provider.as_deref() {
        Some(name) => Arc::new(
            ProviderText::new(
                create_provider(name, &config.verdict_model)?,
                name,
                config.verdict_max_tokens,
            )
            .temperature(config.temperature),
        ),
        None => Arc::new(GroqChat::from_config(config).context("Verdict client")?),
    };

    Ok((vision, text))
}

fn print_checklist() {
    println!("{}", bold("📝 Manual UPI Check Guide"));
    println!("Before AI scan, check these:");
    for item in MANUAL_CHECKLIST {
        println!("  [ ] {item}");
    }
}

fn print_report(report: &AuditReport, quiet: bool) {
    if quiet {
        println!("{}", report.verdict);
        return;
    }

    let risk = match report.glyph {
        RiskGlyph::HighRisk => red(&report.glyph.to_string()),
        RiskGlyph::Verified => green(&report.glyph.to_string()),
    };

    println!();
    println!("{}", bold("🏁 Final Verdict"));
    println!("{}", report.verdict.trim_end());
    println!();
    println!("{}  {}", bold("Risk Level:"), risk);
    println!("{}  {}", bold("Label:     "), report.label);
    println!("{}  {}", bold("Metadata:  "), dim(&report.metadata.to_string()));
    eprintln!(
        "   {} tokens in  /  {} tokens out  —  {}ms total",
        dim(&report.stats.total_input_tokens().to_string()),
        dim(&report.stats.total_output_tokens().to_string()),
        report.stats.total_duration_ms,
    );
}
