//! Data agents: fetch a metrics record and summarize it
//!
//! Each agent owns one endpoint and one domain. Failures never escape as
//! errors from [`SummarySource::report`]; they become
//! [`SummaryOutcome::Failed`] so the pipeline can degrade instead of abort.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::llm::{Llm, Message};
use crate::metrics::MetricRecord;
use crate::prompts;
use crate::summary::{Domain, SummaryOutcome};

/// Errors raised while producing a summary
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Could not retrieve data from {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Data API {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("Data API returned invalid JSON: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("LLM request failed: {0}")]
    Llm(String),

    #[error("LLM returned an empty summary")]
    EmptySummary,
}

/// What one agent produced for a run
#[derive(Debug, Clone)]
pub struct AgentReport {
    pub domain: Domain,
    pub summary: SummaryOutcome,
    /// The raw record the summary was based on, when it was an object
    pub metrics: Option<MetricRecord>,
}

impl AgentReport {
    pub fn failed(domain: Domain, error: &SourceError) -> Self {
        Self {
            domain,
            summary: SummaryOutcome::Failed(error.to_string()),
            metrics: None,
        }
    }
}

/// Anything that can produce one domain's summary
#[async_trait]
pub trait SummarySource: Send + Sync {
    fn domain(&self) -> Domain;

    async fn report(&self) -> AgentReport;
}

/// Agent that GETs a JSON record and asks an LLM to summarize it
pub struct DataAgent {
    domain: Domain,
    endpoint: String,
    http: reqwest::Client,
    llm: Arc<dyn Llm>,
    system_prompt: &'static str,
}

impl DataAgent {
    /// Create an agent for `domain` reading from `endpoint`
    pub fn new(
        domain: Domain,
        endpoint: impl Into<String>,
        llm: Arc<dyn Llm>,
        timeout: Duration,
    ) -> Result<Self, SourceError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(SourceError::Client)?;

        let system_prompt = match domain {
            Domain::Sales => prompts::SALES_PROMPT,
            Domain::Marketing => prompts::MARKETING_PROMPT,
        };

        Ok(Self {
            domain,
            endpoint: endpoint.into(),
            http,
            llm,
            system_prompt,
        })
    }

    /// Fetch the raw record from the data API
    pub async fn fetch(&self) -> Result<serde_json::Value, SourceError> {
        tracing::debug!(domain = %self.domain, url = %self.endpoint, "Fetching data");

        let response = self
            .http
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|source| SourceError::Fetch {
                url: self.endpoint.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: self.endpoint.clone(),
                status: status.as_u16(),
            });
        }

        response.json().await.map_err(SourceError::Decode)
    }

    /// Ask the LLM to summarize a fetched record
    pub async fn summarize(&self, data: &serde_json::Value) -> Result<String, SourceError> {
        let request = format!("Today's {} data: {}", self.domain, data);
        let messages = [Message::system(self.system_prompt), Message::user(request)];

        let summary = self
            .llm
            .complete(&messages)
            .await
            .map_err(|e| SourceError::Llm(format!("{:#}", e)))?;

        let summary = summary.trim();
        if summary.is_empty() {
            return Err(SourceError::EmptySummary);
        }
        Ok(summary.to_string())
    }
}

#[async_trait]
impl SummarySource for DataAgent {
    fn domain(&self) -> Domain {
        self.domain
    }

    async fn report(&self) -> AgentReport {
        let data = match self.fetch().await {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(domain = %self.domain, error = %e, "Data fetch failed");
                return AgentReport::failed(self.domain, &e);
            }
        };

        let metrics = MetricRecord::from_json(&data);

        match self.summarize(&data).await {
            Ok(summary) => {
                tracing::info!(domain = %self.domain, model = self.llm.model(), "Summary generated");
                AgentReport {
                    domain: self.domain,
                    summary: SummaryOutcome::Ok(summary),
                    metrics,
                }
            }
            Err(e) => {
                tracing::warn!(domain = %self.domain, error = %e, "Summarization failed");
                AgentReport {
                    domain: self.domain,
                    summary: SummaryOutcome::Failed(e.to_string()),
                    metrics,
                }
            }
        }
    }
}
