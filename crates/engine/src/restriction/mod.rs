//! Location matching and per-item restriction evaluation.

mod evaluator;
mod matcher;

pub use evaluator::Evaluator;
pub use matcher::match_spec;
