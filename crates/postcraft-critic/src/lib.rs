pub mod evaluator;
mod prompts;
mod verdict;

pub use evaluator::{CritiqueEvaluator, CritiqueInput, CritiqueReport};
pub use prompts::CritiquePrompts;
pub use verdict::{CritiqueParseError, CritiqueVerdict, Evaluation, FALLBACK_FEEDBACK};
