//! Executive summary synthesis
//!
//! Best-effort: degraded inputs short-circuit to a fixed message and a model
//! failure is terminal for the run. Nothing here is retried.

use crate::llm::{Llm, Message};
use crate::prompts;
use crate::summary::NormalizedSummary;

/// Used when either domain summary is missing
pub const INSUFFICIENT_INFORMATION: &str =
    "An executive summary could not be generated due to missing information.";

/// Outcome of the synthesis step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Synthesis {
    /// Model output, trimmed
    Combined(String),
    /// At least one input was degraded; the model was not called
    Insufficient,
    /// The model call failed
    Failed(String),
}

impl Synthesis {
    /// Text to place in the executive summary section, if any
    pub fn executive_summary(&self) -> Option<&str> {
        match self {
            Synthesis::Combined(text) => Some(text),
            Synthesis::Insufficient => Some(INSUFFICIENT_INFORMATION),
            Synthesis::Failed(_) => None,
        }
    }
}

/// Combines two domain summaries using an LLM collaborator
pub struct Synthesizer<'a> {
    llm: &'a dyn Llm,
}

impl<'a> Synthesizer<'a> {
    pub fn new(llm: &'a dyn Llm) -> Self {
        Self { llm }
    }

    pub async fn synthesize(
        &self,
        sales: &NormalizedSummary,
        marketing: &NormalizedSummary,
    ) -> Synthesis {
        if !sales.is_usable() || !marketing.is_usable() {
            tracing::info!("Skipping synthesis: a domain summary is unavailable");
            return Synthesis::Insufficient;
        }

        let messages = [
            Message::system(prompts::SYNTHESIS_PROMPT),
            Message::user(prompts::synthesis_request(&sales.text, &marketing.text)),
        ];

        match self.llm.complete(&messages).await {
            Ok(text) => Synthesis::Combined(text.trim().to_string()),
            Err(e) => {
                tracing::warn!(error = %format!("{:#}", e), "Synthesis failed, omitting executive summary");
                Synthesis::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::{normalize, Domain, SummaryOutcome};
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingLlm {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingLlm {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl Llm for CountingLlm {
        async fn complete(&self, _messages: &[Message]) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("connection refused");
            }
            Ok("\n Overall performance was solid. \n".to_string())
        }

        fn model(&self) -> &str {
            "counting"
        }
    }

    fn ok(domain: Domain, text: &str) -> NormalizedSummary {
        normalize(domain, SummaryOutcome::Ok(text.to_string()))
    }

    #[tokio::test]
    async fn test_synthesize_combines_usable_summaries() {
        let llm = CountingLlm::new(false);
        let result = Synthesizer::new(&llm)
            .synthesize(&ok(Domain::Sales, "Revenue up."), &ok(Domain::Marketing, "Clicks up."))
            .await;

        assert_eq!(
            result,
            Synthesis::Combined("Overall performance was solid.".to_string())
        );
        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fallback_input_skips_model() {
        let llm = CountingLlm::new(false);
        let marketing = normalize(Domain::Marketing, SummaryOutcome::from_raw("Error: timeout"));

        let result = Synthesizer::new(&llm)
            .synthesize(&ok(Domain::Sales, "Revenue up."), &marketing)
            .await;

        assert_eq!(result, Synthesis::Insufficient);
        assert_eq!(result.executive_summary(), Some(INSUFFICIENT_INFORMATION));
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_raw_sentinel_input_skips_model() {
        let llm = CountingLlm::new(false);
        let sales = NormalizedSummary {
            domain: Domain::Sales,
            text: "Error: upstream down".to_string(),
            degraded: false,
        };

        let result = Synthesizer::new(&llm)
            .synthesize(&sales, &ok(Domain::Marketing, "Clicks up."))
            .await;

        assert_eq!(result, Synthesis::Insufficient);
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_model_failure_is_terminal() {
        let llm = CountingLlm::new(true);
        let result = Synthesizer::new(&llm)
            .synthesize(&ok(Domain::Sales, "Revenue up."), &ok(Domain::Marketing, "Clicks up."))
            .await;

        assert!(matches!(result, Synthesis::Failed(ref reason) if reason.contains("connection refused")));
        assert_eq!(result.executive_summary(), None);
        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
    }
}
