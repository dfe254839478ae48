//! Daily report orchestration
//!
//! Sequences the report stages once per invocation:
//! summaries → fallback normalization → synthesis → rendering → delivery.
//!
//! # Example
//!
//! ```rust,ignore
//! use orchestrator::{PipelineOptions, ReportPipeline};
//! use report_agent::ReportFileConfig;
//!
//! let config = ReportFileConfig::load()?;
//! let pipeline = ReportPipeline::from_config(&config, PipelineOptions::default())?;
//! let report = pipeline.run().await;
//! println!("text report written: {}", report.succeeded());
//! ```

pub mod pipeline;

pub use pipeline::{PipelineOptions, ReportPipeline, RunReport, StageResult};

/// Re-export commonly used types from the agent and reporting crates
pub use report_agent::{ReportFileConfig, SummaryOutcome, SummarySource};
pub use reporting::{DeliveryOutcome, RenderOutcome};
