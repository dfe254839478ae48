//! Summary agents for the daily company performance report
//!
//! This crate provides:
//! - An LLM abstraction with an Ollama backend
//! - Data agents that fetch a metrics record and summarize it
//! - The tagged summary type and its fallback normalization
//! - Synthesis of the two domain summaries into an executive summary
//! - Layered configuration loading (`.report.toml` + environment)

pub mod config;
pub mod llm;
pub mod metrics;
pub mod prompts;
pub mod sources;
pub mod summary;
pub mod synthesis;

pub use config::ReportFileConfig;
pub use llm::{Llm, OllamaClient};
pub use metrics::{MetricRecord, MetricValue};
pub use sources::{AgentReport, DataAgent, SourceError, SummarySource};
pub use summary::{normalize, normalize_text, Domain, NormalizedSummary, SummaryOutcome};
pub use synthesis::{Synthesis, Synthesizer};
