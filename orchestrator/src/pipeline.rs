//! Report pipeline execution
//!
//! Runs every stage in order and never aborts on a stage failure:
//! - Summary sources (sales, marketing)
//! - Fallback normalization
//! - Optional synthesis of an executive summary
//! - Text, PDF and spreadsheet rendering
//! - Optional email delivery

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};

use report_agent::config::{OutputConfig, ReportFileConfig};
use report_agent::llm::{Llm, OllamaClient};
use report_agent::metrics::MetricRecord;
use report_agent::sources::{AgentReport, DataAgent, SummarySource};
use report_agent::summary::{normalize, Domain, NormalizedSummary};
use report_agent::synthesis::{Synthesis, Synthesizer};
use reporting::delivery::{Deliverer, DeliveryOutcome, MailSettings, MailTransport};
use reporting::render::{
    render_pdf, render_table, render_text, DocumentInput, RenderOutcome, ReportContent,
};

/// Per-invocation switches
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Ask the LLM for an executive summary
    pub synthesis: bool,
    /// Email the PDF and spreadsheet
    pub email: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            synthesis: true,
            email: true,
        }
    }
}

/// Timing and status of one stage
#[derive(Debug, Clone)]
pub struct StageResult {
    pub stage: &'static str,
    pub success: bool,
    pub duration_ms: u64,
}

/// Everything a run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    pub date: NaiveDate,
    pub sales: NormalizedSummary,
    pub marketing: NormalizedSummary,
    /// `None` when synthesis was disabled
    pub synthesis: Option<Synthesis>,
    pub text: RenderOutcome,
    pub pdf: RenderOutcome,
    pub spreadsheet: RenderOutcome,
    /// `None` when email was disabled
    pub delivery: Option<DeliveryOutcome>,
    pub stages: Vec<StageResult>,
}

impl RunReport {
    /// A run succeeds when the text artifact was written
    pub fn succeeded(&self) -> bool {
        self.text.is_written()
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.stages.iter().map(|s| s.duration_ms).sum()
    }
}

/// The daily report pipeline
pub struct ReportPipeline {
    llm: Arc<dyn Llm>,
    sales: Box<dyn SummarySource>,
    marketing: Box<dyn SummarySource>,
    output: OutputConfig,
    mail: MailSettings,
    options: PipelineOptions,
    date: NaiveDate,
    transport: Option<Box<dyn MailTransport>>,
}

impl ReportPipeline {
    /// Create a pipeline from explicit collaborators
    pub fn new(
        llm: Arc<dyn Llm>,
        sales: Box<dyn SummarySource>,
        marketing: Box<dyn SummarySource>,
        output: OutputConfig,
    ) -> Self {
        Self {
            llm,
            sales,
            marketing,
            output,
            mail: MailSettings::default(),
            options: PipelineOptions::default(),
            date: Local::now().date_naive(),
            transport: None,
        }
    }

    /// Build the Ollama client and data agents from configuration
    ///
    /// Collaborator construction errors surface here, before any stage runs.
    pub fn from_config(config: &ReportFileConfig, options: PipelineOptions) -> Result<Self> {
        let llm: Arc<dyn Llm> = Arc::new(
            OllamaClient::new(&config.llm.url, &config.llm.model)
                .context("Failed to create LLM client")?,
        );

        let timeout = Duration::from_secs(config.sources.timeout_secs);
        let sales = DataAgent::new(Domain::Sales, &config.sources.sales_url, llm.clone(), timeout)
            .context("Failed to create sales agent")?;
        let marketing = DataAgent::new(
            Domain::Marketing,
            &config.sources.marketing_url,
            llm.clone(),
            timeout,
        )
        .context("Failed to create marketing agent")?;

        let mail = MailSettings::from_env(&config.mail.smtp_host, config.mail.smtp_port);

        Ok(Self::new(llm, Box::new(sales), Box::new(marketing), config.output.clone())
            .with_mail_settings(mail)
            .with_options(options))
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_mail_settings(mut self, mail: MailSettings) -> Self {
        self.mail = mail;
        self
    }

    /// Override the report date (defaults to today)
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    /// Send through this transport instead of the configured SMTP relay
    pub fn with_mail_transport(mut self, transport: Box<dyn MailTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Run every stage once
    pub async fn run(&self) -> RunReport {
        println!("\n{}", "═".repeat(60));
        println!("  DAILY REPORT: {}", self.date.format("%Y-%m-%d"));
        println!("{}\n", "═".repeat(60));

        let mut stages = Vec::new();
        let sales = collect(self.sales.as_ref(), &mut stages).await;
        let marketing = collect(self.marketing.as_ref(), &mut stages).await;

        self.finish(sales, marketing, stages).await
    }

    /// Run the stages after the summary sources with precomputed summaries
    pub async fn run_with(&self, sales: AgentReport, marketing: AgentReport) -> RunReport {
        self.finish(sales, marketing, Vec::new()).await
    }

    async fn finish(
        &self,
        sales: AgentReport,
        marketing: AgentReport,
        mut stages: Vec<StageResult>,
    ) -> RunReport {
        let metrics: Vec<MetricRecord> = [&sales.metrics, &marketing.metrics]
            .into_iter()
            .flatten()
            .cloned()
            .collect();

        let sales = normalize(Domain::Sales, sales.summary);
        let marketing = normalize(Domain::Marketing, marketing.summary);
        if sales.degraded {
            println!("  ⚠ Sales agent failed, using fallback message");
        }
        if marketing.degraded {
            println!("  ⚠ Marketing agent failed, using fallback message");
        }

        let synthesis = if self.options.synthesis {
            let start = Instant::now();
            let result = Synthesizer::new(self.llm.as_ref())
                .synthesize(&sales, &marketing)
                .await;
            stages.push(stage(
                "synthesis",
                matches!(result, Synthesis::Combined(_)),
                start,
            ));
            Some(result)
        } else {
            tracing::debug!("Synthesis disabled");
            None
        };

        let content = ReportContent::from_summaries(self.date, &sales, &marketing)
            .with_executive_summary(synthesis.as_ref().and_then(Synthesis::executive_summary));

        let start = Instant::now();
        let text = render_text(&content, &self.output.dir);
        stages.push(stage("text report", text.is_written(), start));
        print_outcome("Text report", &text);

        let start = Instant::now();
        let pdf = render_pdf(&DocumentInput::from_report(&content), &self.output.pdf_path());
        stages.push(stage("pdf report", pdf.is_written(), start));
        print_outcome("PDF report", &pdf);

        let start = Instant::now();
        let spreadsheet = render_table(&metrics, &self.output.spreadsheet_path());
        stages.push(stage(
            "spreadsheet",
            !matches!(spreadsheet, RenderOutcome::Failed(_)),
            start,
        ));
        print_outcome("Spreadsheet", &spreadsheet);

        let delivery = if self.options.email {
            let start = Instant::now();
            let attachments: Vec<PathBuf> = [&pdf, &spreadsheet]
                .into_iter()
                .filter_map(|o| o.path().map(PathBuf::from))
                .collect();

            let deliverer = Deliverer::new(self.mail.clone(), self.date);
            let outcome = match &self.transport {
                Some(transport) => deliverer.deliver_via(transport.as_ref(), &attachments).await,
                None => deliverer.deliver(&attachments).await,
            };
            stages.push(stage(
                "email",
                !matches!(outcome, DeliveryOutcome::Failed(_)),
                start,
            ));
            match &outcome {
                DeliveryOutcome::Sent { attached } => {
                    println!("  ✓ Email sent ({} attachment(s))", attached.len())
                }
                DeliveryOutcome::Skipped(reason) => println!("  - Email skipped: {}", reason),
                DeliveryOutcome::Failed(reason) => println!("  ✗ Email failed: {}", reason),
            }
            Some(outcome)
        } else {
            tracing::debug!("Email disabled");
            None
        };

        println!("\n{}", "═".repeat(60));
        println!("  REPORT GENERATION COMPLETE");
        println!("{}\n", "═".repeat(60));

        RunReport {
            date: self.date,
            sales,
            marketing,
            synthesis,
            text,
            pdf,
            spreadsheet,
            delivery,
            stages,
        }
    }
}

/// Ask one source for its report and record the stage
async fn collect(source: &dyn SummarySource, stages: &mut Vec<StageResult>) -> AgentReport {
    let domain = source.domain();
    tracing::info!(%domain, "Requesting summary");

    let start = Instant::now();
    let report = source.report().await;
    if report.domain != domain {
        tracing::warn!(
            expected = %domain,
            actual = %report.domain,
            "Source returned a report for another domain"
        );
    }
    stages.push(stage(summary_stage(domain), !report.summary.is_failed(), start));
    report
}

fn summary_stage(domain: Domain) -> &'static str {
    match domain {
        Domain::Sales => "sales summary",
        Domain::Marketing => "marketing summary",
    }
}

fn stage(name: &'static str, success: bool, start: Instant) -> StageResult {
    StageResult {
        stage: name,
        success,
        duration_ms: start.elapsed().as_millis() as u64,
    }
}

fn print_outcome(label: &str, outcome: &RenderOutcome) {
    match outcome {
        RenderOutcome::Written(path) => println!("  ✓ {}: {}", label, path.display()),
        RenderOutcome::Skipped(reason) => println!("  - {} skipped: {}", label, reason),
        RenderOutcome::Failed(reason) => println!("  ✗ {} failed: {}", label, reason),
    }
}
