use crate::RefinementState;

/// Steps of the refinement state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Generate,
    Evaluate,
    Optimize,
    Terminal,
}

impl Stage {
    /// Routing policy: pick the stage after `self` given the current state.
    ///
    /// The iteration cap wins over further improvement, so an unapproved
    /// draft at the cap still terminates.
    pub fn next(self, state: &RefinementState) -> Stage {
        match self {
            Stage::Generate => Stage::Evaluate,
            Stage::Evaluate if state.is_approved() || state.cap_reached() => Stage::Terminal,
            Stage::Evaluate => Stage::Optimize,
            Stage::Optimize => Stage::Evaluate,
            Stage::Terminal => Stage::Terminal,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Generate => write!(f, "generate"),
            Stage::Evaluate => write!(f, "evaluate"),
            Stage::Optimize => write!(f, "optimize"),
            Stage::Terminal => write!(f, "terminal"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RefinementRequest;
    use postcraft_critic::{CritiqueVerdict, Evaluation};

    fn state_after(drafts: usize, evaluation: Option<Evaluation>, max: usize) -> RefinementState {
        let mut state = RefinementRequest::new("space travel")
            .with_max_iterations(max)
            .into_state()
            .unwrap();
        for i in 0..drafts {
            state.record_draft(format!("draft {}", i + 1));
        }
        if let Some(evaluation) = evaluation {
            state.record_verdict(&CritiqueVerdict {
                evaluation,
                feedback: "feedback".to_string(),
            });
        }
        state
    }

    #[test]
    fn test_unconditional_edges() {
        let state = state_after(1, None, 3);
        assert_eq!(Stage::Generate.next(&state), Stage::Evaluate);
        assert_eq!(Stage::Optimize.next(&state), Stage::Evaluate);
        assert_eq!(Stage::Terminal.next(&state), Stage::Terminal);
    }

    #[test]
    fn test_approval_terminates() {
        let state = state_after(1, Some(Evaluation::Approved), 3);
        assert_eq!(Stage::Evaluate.next(&state), Stage::Terminal);
    }

    #[test]
    fn test_needs_improvement_below_cap_optimizes() {
        let state = state_after(2, Some(Evaluation::NeedsImprovement), 3);
        assert_eq!(Stage::Evaluate.next(&state), Stage::Optimize);
    }

    #[test]
    fn test_cap_wins_over_needs_improvement() {
        let state = state_after(3, Some(Evaluation::NeedsImprovement), 3);
        assert_eq!(Stage::Evaluate.next(&state), Stage::Terminal);

        let state = state_after(1, Some(Evaluation::NeedsImprovement), 1);
        assert_eq!(Stage::Evaluate.next(&state), Stage::Terminal);
    }
}
