mod model;
mod prompts;
mod verdict;

pub use model::{ModelId, ModelProfile, ModelTable};
pub use prompts::{CriticPrompts, StrategySubmission};
pub use verdict::{extract_verdict, Verdict};
