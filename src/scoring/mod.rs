//! Project scoring.
//!
//! A single JSON-mode reasoning call rates the project against the evidence on five
//! capped categories. The answer is treated as untrusted:
//!
//! - markdown fences are stripped and the body must be a JSON object;
//! - breakdown keys are matched to [`Category`] by tolerant aliasing;
//! - every category must be present;
//! - sub-scores are clamped to their caps and `final_score` to `0..=100`.
//!
//! Any violation produces the single envelope `{"error": "Failed to parse response"}`
//! rather than an error, so callers can distinguish a bad answer from a failed call.

pub mod error;
pub mod scorer;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::{ScoreFormatError, ScoringError};
pub use scorer::{Scorer, parse_score_response, strip_code_fences};
pub use types::{Category, ScoreBreakdown, ScoreCard, ScoreResult};
