use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use postcraft_critic::{CritiqueEvaluator, CritiqueInput};
use postcraft_logging::{DraftStep, LogEvent, Logger};
use postcraft_model::{Message, ModelRole, ModelSet};

use crate::error::LoopError;
use crate::outcome::LoopOutcome;
use crate::prompts::DraftPrompts;
use crate::{RefinementRequest, RefinementState, Stage};

/// Orchestrates the generate -> evaluate -> optimize loop.
///
/// Holds only shared, read-only resources, so one runner can serve any
/// number of concurrent invocations.
#[derive(Clone)]
pub struct LoopRunner {
    models: ModelSet,
    logger: Arc<Logger>,
}

impl LoopRunner {
    pub fn new(models: ModelSet, logger: Arc<Logger>) -> Self {
        Self { models, logger }
    }

    /// Run the loop until the critic approves or the cap is reached
    pub async fn run(&self, request: RefinementRequest) -> Result<LoopOutcome, LoopError> {
        let mut state = request.into_state()?;
        let started_at = Instant::now();

        self.logger.log(&LogEvent::LoopStarted {
            topic: state.topic().to_string(),
            mood: state.mood().map(String::from),
            style_account: state.style_account().map(String::from),
            max_iterations: state.max_iterations(),
        });

        let mut stage = Stage::Generate;
        loop {
            debug!(%stage, iteration = state.iteration(), "Entering stage");
            match stage {
                Stage::Generate => self.generate(&mut state).await?,
                Stage::Evaluate => self.evaluate(&mut state).await,
                Stage::Optimize => self.optimize(&mut state).await?,
                Stage::Terminal => break,
            }
            stage = stage.next(&state);
        }

        let outcome = LoopOutcome::new(state, started_at.elapsed());

        if !outcome.is_approved() {
            self.logger.log(&LogEvent::IterationCapReached {
                iterations: outcome.iterations(),
            });
        }
        self.logger.log(&LogEvent::LoopCompleted {
            iterations: outcome.iterations(),
            approved: outcome.is_approved(),
            duration_secs: outcome.total_duration_secs,
        });
        info!(
            iterations = outcome.iterations(),
            approved = outcome.is_approved(),
            "Refinement loop finished"
        );

        Ok(outcome)
    }

    async fn generate(&self, state: &mut RefinementState) -> Result<(), LoopError> {
        let prompt =
            DraftPrompts::build_generation_prompt(state.topic(), state.mood(), state.style_account());
        let messages = [
            Message::system(DraftPrompts::GENERATOR_SYSTEM),
            Message::user(prompt),
        ];
        let draft = self.draft(state, DraftStep::Generate, &messages).await?;
        state.record_draft(draft);
        Ok(())
    }

    async fn evaluate(&self, state: &mut RefinementState) {
        let iteration = state.iteration();
        self.logger.log(&LogEvent::CritiqueStarted { iteration });

        let evaluator = CritiqueEvaluator::new(self.models.get(ModelRole::Evaluator).as_ref());
        let report = evaluator
            .evaluate(CritiqueInput {
                draft: state.current_draft(),
                topic: state.topic(),
                mood: state.mood(),
                iteration,
            })
            .await;

        if let Some(ref reason) = report.fallback_reason {
            self.logger.log(&LogEvent::CritiqueFallback {
                iteration,
                reason: reason.clone(),
            });
        }
        self.logger.log(&LogEvent::CritiqueCompleted {
            iteration,
            evaluation: report.verdict.evaluation.to_string(),
            feedback: report.verdict.feedback.clone(),
        });

        state.record_verdict(&report.verdict);
    }

    async fn optimize(&self, state: &mut RefinementState) -> Result<(), LoopError> {
        let prompt = DraftPrompts::build_optimization_prompt(
            state.current_draft(),
            state.feedback(),
            state.topic(),
            state.mood(),
        );
        let messages = [
            Message::system(DraftPrompts::OPTIMIZER_SYSTEM),
            Message::user(prompt),
        ];
        let draft = self.draft(state, DraftStep::Optimize, &messages).await?;
        state.record_draft(draft);
        Ok(())
    }

    /// Run one drafting call. Failures abort the invocation; there is no retry.
    async fn draft(
        &self,
        state: &RefinementState,
        step: DraftStep,
        messages: &[Message],
    ) -> Result<String, LoopError> {
        let (role, stage) = match step {
            DraftStep::Generate => (ModelRole::Generator, Stage::Generate),
            DraftStep::Optimize => (ModelRole::Optimizer, Stage::Optimize),
        };
        let model = self.models.get(role);
        let iteration = state.iteration() + 1;
        self.logger.log(&LogEvent::DraftStarted { iteration, step });

        let call_started = Instant::now();
        match model.invoke(messages).await {
            Ok(draft) => {
                self.logger.log(&LogEvent::DraftCompleted {
                    iteration,
                    step,
                    chars: draft.chars().count(),
                    duration_secs: call_started.elapsed().as_secs_f64(),
                });
                Ok(draft)
            }
            Err(source) => {
                self.logger.log(&LogEvent::ErrorEncountered {
                    iteration,
                    error: source.to_string(),
                });
                Err(LoopError::ModelUnavailable { stage, source })
            }
        }
    }
}
