use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Feedback used when the critic's reply cannot be understood
pub const FALLBACK_FEEDBACK: &str = "Critic failed to provide valid feedback.";

/// Approval state reported by the critic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Evaluation {
    Approved,
    NeedsImprovement,
}

impl Evaluation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Evaluation::Approved => "approved",
            Evaluation::NeedsImprovement => "needs_improvement",
        }
    }
}

impl std::fmt::Display for Evaluation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The critic's structured verdict on a draft
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CritiqueVerdict {
    /// Whether the post is ready to publish
    pub evaluation: Evaluation,
    /// Specific critique of the post
    pub feedback: String,
}

#[derive(Error, Debug)]
pub enum CritiqueParseError {
    #[error("No JSON object found in critic output")]
    NoJsonFound,

    #[error("Critic output does not match the critique schema: {0}")]
    Json(#[from] serde_json::Error),
}

impl CritiqueVerdict {
    /// Verdict substituted for any reply that fails to parse
    pub fn fallback() -> Self {
        Self {
            evaluation: Evaluation::NeedsImprovement,
            feedback: FALLBACK_FEEDBACK.to_string(),
        }
    }

    pub fn is_approved(&self) -> bool {
        self.evaluation == Evaluation::Approved
    }

    /// Parse a verdict from the critic's raw reply.
    ///
    /// Accepts a bare JSON object, a fenced code block containing one, or an
    /// object embedded in surrounding prose:
    /// ```text
    /// {"evaluation": "approved", "feedback": "..."}
    /// Sure! Here is my review: {"evaluation": "needs_improvement", "feedback": "..."}
    /// ```
    pub fn parse(critic_output: &str) -> Result<Self, CritiqueParseError> {
        debug!(output_len = critic_output.len(), "Parsing critic verdict");

        let mut last_error = None;
        for candidate in Self::json_candidates(critic_output) {
            match serde_json::from_str::<CritiqueVerdict>(candidate) {
                Ok(verdict) => return Ok(verdict),
                Err(e) => last_error = Some(e),
            }
        }

        Err(last_error.map_or(CritiqueParseError::NoJsonFound, CritiqueParseError::Json))
    }

    /// Possible JSON payloads, most specific first: the whole reply, the
    /// body of a fenced block, then the outermost braces.
    fn json_candidates(output: &str) -> Vec<&str> {
        let trimmed = output.trim();
        let mut candidates = Vec::with_capacity(3);

        if trimmed.starts_with('{') {
            candidates.push(trimmed);
        }
        if let Some(fenced) = Self::fenced_block(trimmed) {
            candidates.push(fenced);
        }
        if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
            if start < end {
                candidates.push(&trimmed[start..=end]);
            }
        }

        candidates.dedup();
        candidates
    }

    fn fenced_block(output: &str) -> Option<&str> {
        let open = output.find("```")?;
        let after_open = &output[open + 3..];
        // Skip an optional language tag on the fence line
        let body_start = after_open.find('\n').map(|p| p + 1).unwrap_or(0);
        let body = &after_open[body_start..];
        let close = body.rfind("```")?;
        let block = body[..close].trim();
        if block.starts_with('{') {
            Some(block)
        } else {
            None
        }
    }
}
