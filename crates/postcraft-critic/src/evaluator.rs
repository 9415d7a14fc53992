use postcraft_model::{ChatModel, Message};
use tracing::{debug, info, warn};

use crate::{CritiquePrompts, CritiqueVerdict};

/// Inputs required to critique a draft
#[derive(Clone, Copy)]
pub struct CritiqueInput<'a> {
    pub draft: &'a str,
    pub topic: &'a str,
    pub mood: Option<&'a str>,
    pub iteration: usize,
}

/// Result of one critique, including why the fallback was used (if it was)
#[derive(Debug, Clone)]
pub struct CritiqueReport {
    pub verdict: CritiqueVerdict,
    pub fallback_reason: Option<String>,
}

impl CritiqueReport {
    fn fallback(reason: String) -> Self {
        Self {
            verdict: CritiqueVerdict::fallback(),
            fallback_reason: Some(reason),
        }
    }
}

/// Evaluator that runs the critic model.
///
/// Never fails: transport errors and unparseable replies both degrade to
/// [`CritiqueVerdict::fallback`].
pub struct CritiqueEvaluator<'a> {
    model: &'a dyn ChatModel,
}

impl<'a> CritiqueEvaluator<'a> {
    pub fn new(model: &'a dyn ChatModel) -> Self {
        Self { model }
    }

    pub async fn evaluate(&self, input: CritiqueInput<'_>) -> CritiqueReport {
        let prompt = CritiquePrompts::build_evaluation_prompt(input.draft, input.topic, input.mood);
        let messages = [Message::system(CritiquePrompts::SYSTEM), Message::user(prompt)];

        debug!(
            model = self.model.name(),
            iteration = input.iteration,
            "Running critique"
        );

        let raw = match self.model.invoke(&messages).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, iteration = input.iteration, "Critic model call failed");
                return CritiqueReport::fallback(format!("critic call failed: {}", e));
            }
        };

        match CritiqueVerdict::parse(&raw) {
            Ok(verdict) => {
                info!(
                    iteration = input.iteration,
                    evaluation = %verdict.evaluation,
                    "Critic completed"
                );
                CritiqueReport {
                    verdict,
                    fallback_reason: None,
                }
            }
            Err(e) => {
                warn!(error = %e, iteration = input.iteration, "Unparseable critic reply");
                CritiqueReport::fallback(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use postcraft_model::{ModelError, Role};
    use std::sync::Mutex;

    struct CannedCritic {
        reply: Result<String, u16>,
        seen: Mutex<Vec<Message>>,
    }

    impl CannedCritic {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                reply: Err(status),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatModel for CannedCritic {
        fn name(&self) -> &str {
            "canned-critic"
        }

        async fn invoke(&self, messages: &[Message]) -> Result<String, ModelError> {
            self.seen.lock().unwrap().extend_from_slice(messages);
            match &self.reply {
                Ok(reply) => Ok(reply.clone()),
                Err(status) => Err(ModelError::Api {
                    status: *status,
                    body: "unavailable".to_string(),
                }),
            }
        }
    }

    fn input() -> CritiqueInput<'static> {
        CritiqueInput {
            draft: "To infinity and beyond #space",
            topic: "space travel",
            mood: Some("funny"),
            iteration: 1,
        }
    }

    #[tokio::test]
    async fn test_evaluate_parses_valid_reply() {
        let critic =
            CannedCritic::replying(r#"{"evaluation": "approved", "feedback": "Ship it."}"#);
        let report = CritiqueEvaluator::new(&critic).evaluate(input()).await;

        assert!(report.verdict.is_approved());
        assert!(report.fallback_reason.is_none());

        let seen = critic.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].role, Role::System);
        assert!(seen[0].content.contains("harsh but fair"));
        assert!(seen[1].content.contains("To infinity and beyond #space"));
    }

    #[tokio::test]
    async fn test_evaluate_falls_back_on_malformed_reply() {
        let critic = CannedCritic::replying("Looks great to me!");
        let report = CritiqueEvaluator::new(&critic).evaluate(input()).await;

        assert!(report.fallback_reason.is_some());
        assert_eq!(report.verdict, CritiqueVerdict::fallback());
    }

    #[tokio::test]
    async fn test_evaluate_falls_back_on_model_error() {
        let critic = CannedCritic::failing(503);
        let report = CritiqueEvaluator::new(&critic).evaluate(input()).await;

        assert!(report.fallback_reason.unwrap().contains("503"));
        assert_eq!(
            report.verdict.feedback,
            "Critic failed to provide valid feedback."
        );
    }
}
