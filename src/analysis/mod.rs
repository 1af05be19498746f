pub mod evaluator;
pub mod flags;
pub mod pipeline;
pub mod report;
