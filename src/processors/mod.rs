pub mod extract_pipeline;
pub mod tract_joiner;

pub use extract_pipeline::{ExtractPipeline, ExtractSummary};
pub use tract_joiner::TractJoiner;
