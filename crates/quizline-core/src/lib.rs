//! quizline-core: Quiz session engine, scoring, and review.
//!
//! This crate defines the question model, the per-session answer store,
//! the scoring rules, the session state machine and its countdown timer,
//! and the read-only review of completed attempts.

pub mod answer;
pub mod error;
pub mod model;
pub mod parser;
pub mod review;
pub mod scoring;
pub mod session;
pub mod statistics;
pub mod timer;
pub mod traits;

pub use error::QuizError;
