//! Stage-1 fast filter.
//!
//! CPU-only. Every job yields exactly one [`Stage1Result`](crate::model::Stage1Result):
//! `basic = skill_ratio × 0.6 + 0.3 + title bonus + tech-company bonus`, capped at 0.95,
//! then gated on language, score and seniority. Weights live in [`Stage1Weights`].

mod config;
mod error;
mod filter;
pub mod patterns;

#[cfg(test)]
mod tests;

pub use config::{Stage1Config, Stage1Weights};
pub use error::FilterError;
pub use filter::FastFilter;
