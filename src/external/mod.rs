//! Interfaces to the collaborators this crate does not own.
//!
//! - [`StructuredExtractor`] supplies Stage-1 field extraction.
//! - [`InferenceClient`] supplies semantic analysis for Stage 2.
//! - [`JobStore`] receives process-pool results in bulk.

pub mod error;
pub mod extractor;
pub mod inference;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod store;


pub use error::{ExtractionError, InferenceError, StoreError};
pub use extractor::{ExtractedFields, HeuristicExtractor, StructuredExtractor};
pub use inference::{Analysis, AnalysisContext, AnalysisRequest, InferenceClient};
#[cfg(any(test, feature = "mock"))]
pub use mock::{FailingExtractor, InMemoryJobStore, MockInferenceClient};
pub use store::JobStore;
