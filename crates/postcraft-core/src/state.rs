use postcraft_critic::{CritiqueVerdict, Evaluation};
use serde::{Deserialize, Serialize};

use crate::LoopError;

/// Iteration cap used when the caller does not supply one
pub const DEFAULT_MAX_ITERATIONS: usize = 3;

fn default_max_iterations() -> usize {
    DEFAULT_MAX_ITERATIONS
}

/// The loop's view of the latest critique
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// No evaluation has run yet
    #[default]
    Unset,
    Approved,
    NeedsImprovement,
}

impl From<Evaluation> for Verdict {
    fn from(evaluation: Evaluation) -> Self {
        match evaluation {
            Evaluation::Approved => Verdict::Approved,
            Evaluation::NeedsImprovement => Verdict::NeedsImprovement,
        }
    }
}

/// What the caller submits for one loop invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinementRequest {
    pub topic: String,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub style_account: Option<String>,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

impl RefinementRequest {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            mood: None,
            style_account: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_mood(mut self, mood: impl Into<String>) -> Self {
        self.mood = Some(mood.into());
        self
    }

    pub fn with_style_account(mut self, account: impl Into<String>) -> Self {
        self.style_account = Some(account.into());
        self
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Validate the request and build a fresh state.
    ///
    /// Blank hints are treated exactly like missing ones. A leading `@` on the
    /// style account is dropped since prompts add their own.
    pub fn into_state(self) -> Result<RefinementState, LoopError> {
        let topic = self.topic.trim();
        if topic.is_empty() {
            return Err(LoopError::EmptyInput);
        }
        if self.max_iterations == 0 {
            return Err(LoopError::InvalidRequest(
                "max_iterations must be at least 1".to_string(),
            ));
        }

        Ok(RefinementState {
            topic: topic.to_string(),
            mood: normalize_hint(self.mood),
            style_account: normalize_hint(self.style_account)
                .map(|s| s.trim_start_matches('@').to_string())
                .filter(|s| !s.is_empty()),
            current_draft: String::new(),
            verdict: Verdict::Unset,
            feedback: String::new(),
            iteration: 0,
            max_iterations: self.max_iterations,
            draft_history: Vec::new(),
        })
    }
}

fn normalize_hint(hint: Option<String>) -> Option<String> {
    hint.map(|h| h.trim().to_string()).filter(|h| !h.is_empty())
}

/// State owned by a single loop invocation.
///
/// Fields are only changed through [`RefinementState::record_draft`] and
/// [`RefinementState::record_verdict`], which keep `draft_history.len() ==
/// iteration` and `current_draft == draft_history.last()`.
#[derive(Debug, Clone, Serialize)]
pub struct RefinementState {
    topic: String,
    mood: Option<String>,
    style_account: Option<String>,
    current_draft: String,
    verdict: Verdict,
    feedback: String,
    iteration: usize,
    max_iterations: usize,
    draft_history: Vec<String>,
}

impl RefinementState {
    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn mood(&self) -> Option<&str> {
        self.mood.as_deref()
    }

    pub fn style_account(&self) -> Option<&str> {
        self.style_account.as_deref()
    }

    pub fn current_draft(&self) -> &str {
        &self.current_draft
    }

    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    pub fn feedback(&self) -> &str {
        &self.feedback
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn draft_history(&self) -> &[String] {
        &self.draft_history
    }

    pub fn is_approved(&self) -> bool {
        self.verdict == Verdict::Approved
    }

    pub fn cap_reached(&self) -> bool {
        self.iteration >= self.max_iterations
    }

    /// Append a new draft and count the cycle
    pub(crate) fn record_draft(&mut self, draft: String) {
        self.draft_history.push(draft.clone());
        self.current_draft = draft;
        self.iteration += 1;
        debug_assert_eq!(self.draft_history.len(), self.iteration);
    }

    pub(crate) fn record_verdict(&mut self, verdict: &CritiqueVerdict) {
        self.verdict = verdict.evaluation.into();
        self.feedback = verdict.feedback.clone();
    }
}
