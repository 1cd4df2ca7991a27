//! Data model shared by every stage.
//!
//! [`Job`] is the immutable input; [`Stage1Result`], [`Stage2Result`] and
//! [`TwoStageResult`] are produced once and never mutated afterwards.

pub mod job;
pub mod record;
pub mod results;

#[cfg(test)]
mod tests;

pub use job::{CandidateProfile, Job, status};
pub use record::ProcessedJobRecord;
pub use results::{
    EducationLevel, Recommendation, RemoteCategory, Sentiment, Stage1Result, Stage2Result,
    Stage2SkipReason, TwoStageResult,
};
