//! Collaborator traits for question storage and result persistence.
//!
//! These async traits are implemented by the `quizline-store` crate. The
//! core never talks to storage any other way.

use async_trait::async_trait;

use crate::model::Question;
use crate::session::QuizResult;

/// Supplies the questions of a quiz.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Fetch all questions of `quiz_id`, in authoring order.
    async fn fetch_questions(&self, quiz_id: &str) -> anyhow::Result<Vec<Question>>;
}

/// Receives completed results.
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Store `result` keyed by (student, quiz), replacing any earlier one.
    async fn persist_result(
        &self,
        student_id: &str,
        quiz_id: &str,
        result: &QuizResult,
    ) -> anyhow::Result<()>;
}

/// Reads back persisted results.
#[async_trait]
pub trait ResultSource: Send + Sync {
    /// The stored result for (student, quiz), if any.
    async fn fetch_result(&self, student_id: &str, quiz_id: &str)
        -> anyhow::Result<Option<QuizResult>>;

    /// Every stored result for a quiz, across students.
    async fn results_for_quiz(&self, quiz_id: &str) -> anyhow::Result<Vec<QuizResult>>;
}
