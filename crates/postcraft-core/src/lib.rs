mod error;
mod loop_runner;
mod outcome;
mod prompts;
mod setup;
mod stage;
mod state;

pub use error::LoopError;
pub use loop_runner::LoopRunner;
pub use outcome::{LoopOutcome, TerminationReason};
pub use prompts::DraftPrompts;
pub use setup::models_from_env;
pub use stage::Stage;
pub use state::{RefinementRequest, RefinementState, Verdict, DEFAULT_MAX_ITERATIONS};
