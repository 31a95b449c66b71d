//! quizline-store: Storage backends for quizline.
//!
//! Implements the `QuestionSource`, `ResultSink`, and `ResultSource` traits
//! over process memory and over a plain data directory, and loads the
//! quizline configuration.

pub mod config;
pub mod error;
pub mod file;
pub mod memory;

pub use config::{load_config, load_config_from, QuizlineConfig};
pub use error::StoreError;
pub use file::FileStore;
pub use memory::MemoryStore;
