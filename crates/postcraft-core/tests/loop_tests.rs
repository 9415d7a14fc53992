use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use postcraft_core::{
    LoopError, LoopRunner, RefinementRequest, Stage, TerminationReason, Verdict,
};
use postcraft_logging::Logger;
use postcraft_model::{ChatModel, Message, ModelError, ModelSet};

const APPROVED: &str = r#"{"evaluation": "approved", "feedback": "Ready to post."}"#;
const NEEDS_WORK: &str = r#"{"evaluation": "needs_improvement", "feedback": "Sharpen the hook."}"#;

/// Model that replays scripted replies and records every call
struct ScriptedModel {
    name: &'static str,
    replies: Mutex<VecDeque<Result<String, ModelError>>>,
    repeat_last: Option<String>,
    calls: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedModel {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            replies: Mutex::new(VecDeque::new()),
            repeat_last: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Reply with `text` on every call
    fn always(name: &'static str, text: &str) -> Self {
        Self {
            repeat_last: Some(text.to_string()),
            ..Self::new(name)
        }
    }

    fn then(self, text: &str) -> Self {
        self.replies.lock().unwrap().push_back(Ok(text.to_string()));
        self
    }

    fn then_fail(self) -> Self {
        self.replies.lock().unwrap().push_back(Err(ModelError::Api {
            status: 503,
            body: "model is loading".to_string(),
        }));
        self
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn user_prompt(&self, call: usize) -> String {
        self.calls.lock().unwrap()[call][1].content.clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    fn name(&self) -> &str {
        self.name
    }

    async fn invoke(&self, messages: &[Message]) -> Result<String, ModelError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(messages.to_vec());
            calls.len()
        };
        match self.replies.lock().unwrap().pop_front() {
            Some(reply) => reply,
            None => Ok(self
                .repeat_last
                .clone()
                .unwrap_or_else(|| format!("{} reply {}", self.name, call))),
        }
    }
}

struct Harness {
    generator: Arc<ScriptedModel>,
    evaluator: Arc<ScriptedModel>,
    optimizer: Arc<ScriptedModel>,
    runner: LoopRunner,
}

fn harness(generator: ScriptedModel, evaluator: ScriptedModel, optimizer: ScriptedModel) -> Harness {
    let generator = Arc::new(generator);
    let evaluator = Arc::new(evaluator);
    let optimizer = Arc::new(optimizer);
    let models = ModelSet::new(generator.clone(), evaluator.clone(), optimizer.clone());
    Harness {
        generator,
        evaluator,
        optimizer,
        runner: LoopRunner::new(models, Arc::new(Logger::silent())),
    }
}

fn default_harness(evaluator: ScriptedModel) -> Harness {
    harness(
        ScriptedModel::always("generator", "Exciting times for #AI and #space"),
        evaluator,
        ScriptedModel::new("optimizer"),
    )
}

// ============================================================
// Termination
// ============================================================

#[tokio::test]
async fn test_approval_on_first_draft_skips_optimizer() {
    for max in [1, 3, 7] {
        let h = default_harness(ScriptedModel::always("critic", APPROVED));
        let outcome = h
            .runner
            .run(RefinementRequest::new("AI").with_max_iterations(max))
            .await
            .unwrap();

        assert_eq!(outcome.reason, TerminationReason::Approved);
        assert_eq!(h.generator.call_count(), 1);
        assert_eq!(h.evaluator.call_count(), 1);
        assert_eq!(h.optimizer.call_count(), 0);
        assert_eq!(outcome.state.draft_history().len(), 1);
        assert_eq!(outcome.final_draft(), "Exciting times for #AI and #space");
        assert_eq!(outcome.exit_code(), 0);
    }
}

#[tokio::test]
async fn test_never_approving_critic_runs_cap_minus_one_optimizations() {
    let h = default_harness(ScriptedModel::always("critic", NEEDS_WORK));
    let outcome = h
        .runner
        .run(RefinementRequest::new("AI").with_max_iterations(4))
        .await
        .unwrap();

    assert_eq!(outcome.reason, TerminationReason::IterationCapReached);
    assert_eq!(h.generator.call_count(), 1);
    assert_eq!(h.optimizer.call_count(), 3);
    assert_eq!(h.evaluator.call_count(), 4);
    assert_eq!(outcome.iterations(), 4);
    assert_eq!(outcome.state.draft_history().len(), 4);
    assert_eq!(outcome.final_draft(), "optimizer reply 3");
    assert_eq!(outcome.state.verdict(), Verdict::NeedsImprovement);
    assert_eq!(outcome.exit_code(), 1);
}

#[tokio::test]
async fn test_cap_of_one_terminates_after_single_evaluation() {
    let h = default_harness(ScriptedModel::always("critic", NEEDS_WORK));
    let outcome = h
        .runner
        .run(
            RefinementRequest::new("space travel")
                .with_mood("funny")
                .with_max_iterations(1),
        )
        .await
        .unwrap();

    assert_eq!(h.generator.call_count(), 1);
    assert_eq!(h.evaluator.call_count(), 1);
    assert_eq!(h.optimizer.call_count(), 0);
    assert_eq!(outcome.state.draft_history().len(), 1);
    assert!(h.generator.user_prompt(0).contains("**funny** tone"));
}

#[tokio::test]
async fn test_approval_after_revision_stops_immediately() {
    let h = default_harness(
        ScriptedModel::new("critic")
            .then(NEEDS_WORK)
            .then(APPROVED)
            .then(NEEDS_WORK),
    );
    let outcome = h
        .runner
        .run(RefinementRequest::new("AI").with_max_iterations(5))
        .await
        .unwrap();

    assert!(outcome.is_approved());
    assert_eq!(outcome.iterations(), 2);
    assert_eq!(outcome.state.draft_history().len(), 2);
    assert_eq!(h.optimizer.call_count(), 1);
    assert_eq!(h.evaluator.call_count(), 2);
    assert_eq!(outcome.state.feedback(), "Ready to post.");
}

// ============================================================
// State and prompts
// ============================================================

#[tokio::test]
async fn test_history_tracks_every_draft_in_order() {
    let h = harness(
        ScriptedModel::always("generator", "draft one"),
        ScriptedModel::always("critic", NEEDS_WORK),
        ScriptedModel::new("optimizer").then("draft two").then("draft three"),
    );
    let outcome = h.runner.run(RefinementRequest::new("AI")).await.unwrap();

    assert_eq!(
        outcome.state.draft_history(),
        ["draft one", "draft two", "draft three"]
    );
    assert_eq!(outcome.final_draft(), "draft three");
    assert!(outcome.state.draft_history().len() <= outcome.state.max_iterations());
}

#[tokio::test]
async fn test_optimizer_receives_latest_draft_and_feedback() {
    let h = harness(
        ScriptedModel::always("generator", "first take"),
        ScriptedModel::always("critic", NEEDS_WORK),
        ScriptedModel::new("optimizer").then("second take"),
    );
    h.runner
        .run(RefinementRequest::new("rust").with_mood("bold"))
        .await
        .unwrap();

    let first = h.optimizer.user_prompt(0);
    assert!(first.contains(r#"Original Tweet: "first take""#));
    assert!(first.contains("Sharpen the hook."));
    assert!(first.contains("**bold** tone"));

    let second = h.optimizer.user_prompt(1);
    assert!(second.contains(r#"Original Tweet: "second take""#));

    let critique = h.evaluator.user_prompt(2);
    assert!(critique.contains("optimizer reply 2"));
}

// ============================================================
// Error policy
// ============================================================

#[tokio::test]
async fn test_malformed_critique_never_fails_the_loop() {
    let h = default_harness(ScriptedModel::always("critic", "Love it!! 10/10"));
    let outcome = h
        .runner
        .run(RefinementRequest::new("AI").with_max_iterations(2))
        .await
        .unwrap();

    assert_eq!(outcome.reason, TerminationReason::IterationCapReached);
    assert_eq!(h.optimizer.call_count(), 1);
    assert_eq!(
        outcome.state.feedback(),
        "Critic failed to provide valid feedback."
    );
}

#[tokio::test]
async fn test_critic_transport_failure_degrades_to_needs_improvement() {
    let h = default_harness(ScriptedModel::new("critic").then_fail().then(APPROVED));
    let outcome = h.runner.run(RefinementRequest::new("AI")).await.unwrap();

    assert!(outcome.is_approved());
    assert_eq!(h.optimizer.call_count(), 1);
    assert_eq!(outcome.iterations(), 2);
}

#[tokio::test]
async fn test_generation_failure_aborts_without_retry() {
    let h = harness(
        ScriptedModel::new("generator").then_fail(),
        ScriptedModel::always("critic", APPROVED),
        ScriptedModel::new("optimizer"),
    );
    let err = h.runner.run(RefinementRequest::new("AI")).await.unwrap_err();

    assert!(matches!(
        err,
        LoopError::ModelUnavailable {
            stage: Stage::Generate,
            ..
        }
    ));
    assert_eq!(h.generator.call_count(), 1);
    assert_eq!(h.evaluator.call_count(), 0);
}

#[tokio::test]
async fn test_optimization_failure_aborts() {
    let h = harness(
        ScriptedModel::always("generator", "first take"),
        ScriptedModel::always("critic", NEEDS_WORK),
        ScriptedModel::new("optimizer").then_fail(),
    );
    let err = h.runner.run(RefinementRequest::new("AI")).await.unwrap_err();

    assert!(matches!(
        err,
        LoopError::ModelUnavailable {
            stage: Stage::Optimize,
            ..
        }
    ));
    assert_eq!(h.evaluator.call_count(), 1);
    assert_eq!(h.optimizer.call_count(), 1);
}

#[tokio::test]
async fn test_blank_topic_rejected_before_any_call() {
    let h = default_harness(ScriptedModel::always("critic", APPROVED));
    let err = h
        .runner
        .run(RefinementRequest::new("  \t "))
        .await
        .unwrap_err();

    assert!(matches!(err, LoopError::EmptyInput));
    assert!(err.is_input_error());
    assert_eq!(h.generator.call_count(), 0);
}

// ============================================================
// Concurrency
// ============================================================

#[tokio::test]
async fn test_concurrent_invocations_keep_separate_state() {
    let h = default_harness(ScriptedModel::always("critic", NEEDS_WORK));
    let first = h.runner.clone();
    let second = h.runner.clone();

    let (a, b) = tokio::join!(
        first.run(RefinementRequest::new("cats").with_max_iterations(2)),
        second.run(RefinementRequest::new("dogs").with_max_iterations(3)),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(a.state.topic(), "cats");
    assert_eq!(a.state.draft_history().len(), 2);
    assert_eq!(b.state.topic(), "dogs");
    assert_eq!(b.state.draft_history().len(), 3);
    assert_eq!(h.generator.call_count(), 2);
}

#[tokio::test]
async fn test_outcome_serializes_final_state() {
    let h = default_harness(ScriptedModel::always("critic", APPROVED));
    let outcome = h.runner.run(RefinementRequest::new("AI")).await.unwrap();

    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["reason"], "approved");
    assert_eq!(json["state"]["verdict"], "approved");
    assert_eq!(json["state"]["iteration"], 1);
    assert_eq!(
        json["state"]["current_draft"],
        "Exciting times for #AI and #space"
    );
}
