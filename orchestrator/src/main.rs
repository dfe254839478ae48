//! Daily report CLI
//!
//! Usage:
//!   daily-report run
//!   daily-report run --no-email --output-dir ./out
//!   daily-report pdf --input report.txt --output report.pdf
//!   daily-report table --input metrics.json
//!   daily-report config

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use orchestrator::pipeline::{PipelineOptions, ReportPipeline};
use report_agent::config::ReportFileConfig;
use report_agent::metrics::MetricRecord;
use reporting::render::{render_pdf, render_table, DocumentInput, RenderOutcome};

#[derive(Parser)]
#[command(name = "daily-report")]
#[command(about = "Generate the daily company performance report")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Ollama server URL
    #[arg(long, env = "OLLAMA_URL", global = true)]
    ollama_url: Option<String>,

    /// Model used for summaries and synthesis
    #[arg(short = 'm', long, env = "OLLAMA_MODEL", global = true)]
    model: Option<String>,

    /// Config file (defaults to the nearest .report.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace). Default is warn.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: summaries, reports and email
    Run {
        /// Directory for the generated artifacts
        #[arg(long, env = "REPORT_DIR")]
        output_dir: Option<PathBuf>,

        /// Sales data API endpoint
        #[arg(long, env = "SALES_API_URL")]
        sales_url: Option<String>,

        /// Marketing data API endpoint
        #[arg(long, env = "MARKETING_API_URL")]
        marketing_url: Option<String>,

        /// Do not email the report
        #[arg(long)]
        no_email: bool,

        /// Do not generate an executive summary
        #[arg(long)]
        no_synthesis: bool,
    },
    /// Render a PDF from flat text with `PAGE <n>` marker lines
    Pdf {
        /// Text file to render
        #[arg(long, short)]
        input: PathBuf,

        /// Output PDF path
        #[arg(long, short, default_value = "company_report.pdf")]
        output: PathBuf,
    },
    /// Render a spreadsheet from a JSON array of metric records
    Table {
        /// JSON file containing an array of objects
        #[arg(long, short)]
        input: PathBuf,

        /// Output spreadsheet path
        #[arg(long, short, default_value = "company_data.xlsx")]
        output: PathBuf,
    },
    /// Show the resolved configuration
    Config,
}

/// Initialize tracing with the given verbosity level
///
/// - 0: warn (default)
/// - 1: info (-v)
/// - 2: debug (-vv)
/// - 3+: trace (-vvv)
fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    // Allow RUST_LOG to override if set
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string()));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => ReportFileConfig::load_from_path(path)?,
        None => ReportFileConfig::load()?,
    };
    if let Some(url) = cli.ollama_url {
        config.llm.url = url;
    }
    if let Some(model) = cli.model {
        config.llm.model = model;
    }
    config.apply_mail_env();

    match cli.command {
        Commands::Run {
            output_dir,
            sales_url,
            marketing_url,
            no_email,
            no_synthesis,
        } => {
            if let Some(dir) = output_dir {
                config.output.dir = dir;
            }
            if let Some(url) = sales_url {
                config.sources.sales_url = url;
            }
            if let Some(url) = marketing_url {
                config.sources.marketing_url = url;
            }

            let options = PipelineOptions {
                synthesis: !no_synthesis,
                email: !no_email,
            };
            run_pipeline(&config, options).await
        }
        Commands::Pdf { input, output } => run_pdf(input, output),
        Commands::Table { input, output } => run_table(input, output),
        Commands::Config => show_config(&config),
    }
}

async fn run_pipeline(config: &ReportFileConfig, options: PipelineOptions) -> Result<()> {
    let pipeline = ReportPipeline::from_config(config, options)?;
    let report = pipeline.run().await;

    println!("Stages:");
    for stage in &report.stages {
        println!(
            "  {} {} ({}ms)",
            if stage.success { "✓" } else { "✗" },
            stage.stage,
            stage.duration_ms
        );
    }
    println!("Total duration: {}ms", report.total_duration_ms());

    if !report.succeeded() {
        anyhow::bail!("Text report could not be written");
    }
    Ok(())
}

fn run_pdf(input: PathBuf, output: PathBuf) -> Result<()> {
    let text = std::fs::read_to_string(&input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    match render_pdf(&DocumentInput::Marked(text), &output) {
        RenderOutcome::Written(path) => {
            println!("Generated PDF report: {}", path.display());
            Ok(())
        }
        RenderOutcome::Skipped(reason) | RenderOutcome::Failed(reason) => {
            anyhow::bail!("Error generating PDF report: {}", reason)
        }
    }
}

fn run_table(input: PathBuf, output: PathBuf) -> Result<()> {
    let json = std::fs::read_to_string(&input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let records: Vec<MetricRecord> = serde_json::from_str(&json)
        .with_context(|| format!("{} is not a JSON array of records", input.display()))?;

    match render_table(&records, &output) {
        RenderOutcome::Written(path) => println!("Generated spreadsheet: {}", path.display()),
        RenderOutcome::Skipped(reason) => println!("Spreadsheet skipped: {}", reason),
        RenderOutcome::Failed(reason) => anyhow::bail!("Error generating spreadsheet: {}", reason),
    }
    Ok(())
}

fn show_config(config: &ReportFileConfig) -> Result<()> {
    println!("{}", toml::to_string_pretty(config)?);

    let mail = reporting::delivery::MailSettings::from_env(
        &config.mail.smtp_host,
        config.mail.smtp_port,
    );
    if mail.is_complete() {
        println!("# email: configured ({})", mail.sender.as_deref().unwrap_or_default());
    } else {
        println!("# email: disabled, missing {}", mail.missing().join(", "));
    }
    Ok(())
}
