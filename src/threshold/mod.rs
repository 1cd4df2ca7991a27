//! Threshold advisor: sizes Stage 2 for a batch of jobs on the detected hardware.
//!
//! The Stage-1 admission bar rises with batch size, so large batches send a smaller
//! fraction of jobs to the expensive stage.

mod advisor;


pub use advisor::{Preferences, ThresholdAdvisor, ThresholdConfig};
