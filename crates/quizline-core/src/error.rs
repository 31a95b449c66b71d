//! Quiz engine error types.
//!
//! Every fallible session or scoring operation reports one of these.
//! Apart from `EmptyQuestionSet` they are recoverable: the session keeps
//! its prior state and the caller may ignore the error or show it.

use thiserror::Error;

use crate::model::QuestionType;
use crate::session::SessionState;

/// Errors that can occur while running a quiz session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    /// `start` was called with no questions.
    #[error("quiz has no questions")]
    EmptyQuestionSet,

    /// The operation is not allowed in the session's current state.
    #[error("cannot {operation} while session is {state}")]
    InvalidTransition {
        operation: &'static str,
        state: SessionState,
    },

    /// The session has already been completed and scored.
    #[error("session is already completed")]
    AlreadyCompleted,

    /// The answer variant does not fit the question type.
    #[error("question {question_id} expects a {expected} answer, got {found}")]
    InvalidAnswerShape {
        question_id: String,
        expected: QuestionType,
        found: QuestionType,
    },

    /// No question with this id belongs to the session.
    #[error("unknown question: {0}")]
    UnknownQuestion(String),

    /// A question violates the model invariants.
    #[error("invalid question {id}: {reason}")]
    InvalidQuestion { id: String, reason: String },

    /// The question source failed to deliver questions.
    #[error("failed to fetch questions: {0}")]
    SourceFailure(String),

    /// The result sink rejected the result or timed out.
    #[error("result may not be saved: {0}")]
    PersistenceFailure(String),
}

impl QuizError {
    /// Returns `true` if the session can carry on after this error.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            QuizError::EmptyQuestionSet
                | QuizError::InvalidQuestion { .. }
                | QuizError::SourceFailure(_)
        )
    }
}
