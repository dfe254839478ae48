//! Domain summaries and fallback normalization
//!
//! A summary is either analytic prose or a failure. Upstream collaborators that
//! still speak the plain-string convention (`"Error: <reason>"`) are adapted at
//! the boundary with [`SummaryOutcome::from_raw`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Prefix that marks a failed summary in the plain-string convention
pub const ERROR_SENTINEL: &str = "Error:";

/// Substituted for a failed sales summary
pub const SALES_FALLBACK: &str = "Sales data could not be retrieved. The Sales API may be down.";

/// Substituted for a failed marketing summary
pub const MARKETING_FALLBACK: &str =
    "Marketing data could not be retrieved. The Marketing API may be down.";

/// Business domain a summary belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Sales,
    Marketing,
}

impl Domain {
    /// Fixed fallback sentence for this domain
    pub fn fallback(self) -> &'static str {
        match self {
            Domain::Sales => SALES_FALLBACK,
            Domain::Marketing => MARKETING_FALLBACK,
        }
    }

    /// Section heading used by the renderers
    pub fn heading(self) -> &'static str {
        match self {
            Domain::Sales => "Sales Performance Summary",
            Domain::Marketing => "Marketing Campaign Summary",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Sales => "sales",
            Domain::Marketing => "marketing",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of asking a summary source for one domain's summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOutcome {
    /// Analytic prose
    Ok(String),
    /// The source failed; carries the reason
    Failed(String),
}

impl SummaryOutcome {
    /// Adapt a plain string that may carry the `"Error:"` sentinel
    pub fn from_raw(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        match raw.strip_prefix(ERROR_SENTINEL) {
            Some(reason) => SummaryOutcome::Failed(reason.trim().to_string()),
            None => SummaryOutcome::Ok(raw),
        }
    }

    /// Render back into the plain-string convention
    pub fn to_raw(&self) -> String {
        match self {
            SummaryOutcome::Ok(text) => text.clone(),
            SummaryOutcome::Failed(reason) => format!("{} {}", ERROR_SENTINEL, reason),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SummaryOutcome::Failed(_))
    }
}

/// A summary after fallback substitution, safe to hand to the renderers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedSummary {
    pub domain: Domain,
    pub text: String,
    /// True when `text` is the domain fallback rather than real analysis
    pub degraded: bool,
}

impl NormalizedSummary {
    /// Whether this summary can feed the synthesis step
    ///
    /// Text that still carries the sentinel or equals a fallback sentence is
    /// treated as degraded even when the flag was not set by [`normalize`].
    pub fn is_usable(&self) -> bool {
        !self.degraded
            && !self.text.starts_with(ERROR_SENTINEL)
            && self.text != SALES_FALLBACK
            && self.text != MARKETING_FALLBACK
    }
}

/// Replace a failed summary with the fixed domain fallback
pub fn normalize(domain: Domain, outcome: SummaryOutcome) -> NormalizedSummary {
    match outcome {
        SummaryOutcome::Ok(text) => NormalizedSummary {
            domain,
            text,
            degraded: false,
        },
        SummaryOutcome::Failed(reason) => {
            tracing::warn!(%domain, %reason, "Summary source failed, using fallback");
            NormalizedSummary {
                domain,
                text: domain.fallback().to_string(),
                degraded: true,
            }
        }
    }
}

/// String-level normalization: sentinel text becomes the domain fallback
pub fn normalize_text(domain: Domain, summary: &str) -> String {
    normalize(domain, SummaryOutcome::from_raw(summary)).text
}
