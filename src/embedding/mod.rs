//! Local sentence-encoder inference backend.
//!
//! - [`SentenceEncoder`] runs a BERT-family model on the selected device (or a stub).
//! - [`EmbeddingInferenceClient`] exposes it as an [`InferenceClient`](crate::external::InferenceClient).

mod bert;
mod client;
mod config;
/// Device selection (CPU / Metal / CUDA).
pub mod device;
mod encoder;
mod error;
mod utils;

#[cfg(test)]
mod tests;

pub use client::EmbeddingInferenceClient;
pub use config::EncoderConfig;
pub use encoder::{SentenceEncoder, cosine};
pub use error::EmbeddingError;
