//! Quiz session state machine.
//!
//! A session moves `NotStarted -> InProgress -> Completed` and never goes
//! back. Completion scores the answers, freezes the result, and hands the
//! result to the [`ResultSink`] on a background task so the transition does
//! not wait on storage.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::answer::{Answer, AnswerStore};
use crate::error::QuizError;
use crate::model::{Question, QuestionId};
use crate::scoring::Score;
use crate::traits::{QuestionSource, ResultSink};

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionState {
    NotStarted,
    InProgress,
    Completed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::NotStarted => write!(f, "not-started"),
            SessionState::InProgress => write!(f, "in-progress"),
            SessionState::Completed => write!(f, "completed"),
        }
    }
}

/// How a session reached `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompletionReason {
    /// The student advanced past the last question or submitted early.
    Submitted,
    /// The countdown ran out.
    TimeExpired,
}

/// The outcome of a completed session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResult {
    /// Unique result identifier.
    pub id: Uuid,
    pub student_id: String,
    pub quiz_id: String,
    /// Score as a rounded percentage (0-100).
    pub percentage: u8,
    pub correct_count: u32,
    pub total_questions: u32,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub completion: CompletionReason,
    /// Question ids in the order the student saw them.
    #[serde(default)]
    pub question_order: Vec<QuestionId>,
    /// Snapshot of the answers at completion.
    pub answers: AnswerStore,
}

impl QuizResult {
    pub fn score(&self) -> Score {
        Score {
            correct_count: self.correct_count,
            total_questions: self.total_questions,
            percentage: self.percentage,
        }
    }

    /// Wall-clock time between start and completion.
    pub fn time_taken(&self) -> chrono::Duration {
        self.completed_at - self.started_at
    }
}

/// Fixed parameters of a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub student_id: String,
    pub quiz_id: String,
    /// Time allowed, fixed for the life of the session.
    pub time_limit_minutes: u32,
    /// How long the result sink gets before the persist is reported failed.
    pub persist_timeout: Duration,
}

impl SessionConfig {
    pub fn new(
        student_id: impl Into<String>,
        quiz_id: impl Into<String>,
        time_limit_minutes: u32,
    ) -> Self {
        Self {
            student_id: student_id.into(),
            quiz_id: quiz_id.into(),
            time_limit_minutes,
            persist_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_persist_timeout(mut self, timeout: Duration) -> Self {
        self.persist_timeout = timeout;
        self
    }
}

/// Result of [`QuizSession::advance`].
#[derive(Debug)]
pub enum Advance {
    /// Moved to the question at this index.
    Moved(usize),
    /// Advanced past the last question; the session is now completed.
    Completed(Completion),
}

/// A freshly completed session: the frozen result and its pending persist.
#[derive(Debug)]
pub struct Completion {
    pub result: QuizResult,
    pub persistence: PersistHandle,
}

/// Handle to the background persist of a result.
///
/// Dropping it does not cancel the persist.
#[derive(Debug)]
pub struct PersistHandle {
    inner: PersistInner,
}

#[derive(Debug)]
enum PersistInner {
    Spawned(JoinHandle<Result<(), QuizError>>),
    Failed(QuizError),
}

impl PersistHandle {
    fn spawn(sink: Arc<dyn ResultSink>, result: QuizResult, timeout: Duration) -> Self {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                tracing::warn!(
                    "no async runtime, result {} for {}/{} not persisted",
                    result.id,
                    result.student_id,
                    result.quiz_id
                );
                return Self {
                    inner: PersistInner::Failed(QuizError::PersistenceFailure(
                        "no async runtime available".into(),
                    )),
                };
            }
        };

        let task = handle.spawn(async move {
            let persist = sink.persist_result(&result.student_id, &result.quiz_id, &result);
            match tokio::time::timeout(timeout, persist).await {
                Ok(Ok(())) => {
                    tracing::debug!(
                        "persisted result {} for {}/{}",
                        result.id,
                        result.student_id,
                        result.quiz_id
                    );
                    Ok(())
                }
                Ok(Err(e)) => {
                    tracing::warn!(
                        "failed to persist result for {}/{}: {e:#}",
                        result.student_id,
                        result.quiz_id
                    );
                    Err(QuizError::PersistenceFailure(format!("{e:#}")))
                }
                Err(_) => {
                    tracing::warn!(
                        "persisting result for {}/{} timed out after {}ms",
                        result.student_id,
                        result.quiz_id,
                        timeout.as_millis()
                    );
                    Err(QuizError::PersistenceFailure(format!(
                        "timed out after {}ms",
                        timeout.as_millis()
                    )))
                }
            }
        });

        Self {
            inner: PersistInner::Spawned(task),
        }
    }

    /// Wait for the persist to finish and report how it went.
    pub async fn outcome(self) -> Result<(), QuizError> {
        match self.inner {
            PersistInner::Spawned(task) => match task.await {
                Ok(outcome) => outcome,
                Err(e) => Err(QuizError::PersistenceFailure(format!(
                    "persist task failed: {e}"
                ))),
            },
            PersistInner::Failed(err) => Err(err),
        }
    }
}

/// A single student's attempt at a quiz.
pub struct QuizSession {
    config: SessionConfig,
    sink: Arc<dyn ResultSink>,
    state: SessionState,
    questions: Vec<Question>,
    index: usize,
    answers: AnswerStore,
    started_at: Option<DateTime<Utc>>,
    result: Option<QuizResult>,
}

impl QuizSession {
    pub fn new(config: SessionConfig, sink: Arc<dyn ResultSink>) -> Self {
        Self {
            config,
            sink,
            state: SessionState::NotStarted,
            questions: Vec::new(),
            index: 0,
            answers: AnswerStore::new(),
            started_at: None,
            result: None,
        }
    }

    /// Start the session with `questions` in a uniformly random order.
    pub fn start(&mut self, questions: Vec<Question>) -> Result<(), QuizError> {
        self.start_with_rng(questions, &mut rand::thread_rng())
    }

    /// Start the session, shuffling with `rng`.
    pub fn start_with_rng<R: Rng + ?Sized>(
        &mut self,
        mut questions: Vec<Question>,
        rng: &mut R,
    ) -> Result<(), QuizError> {
        self.require(SessionState::NotStarted, "start")?;
        if questions.is_empty() {
            return Err(QuizError::EmptyQuestionSet);
        }

        let mut seen = HashSet::new();
        for question in &questions {
            question.validate()?;
            if !seen.insert(question.id.as_str()) {
                return Err(QuizError::InvalidQuestion {
                    id: question.id.clone(),
                    reason: "duplicate question id".into(),
                });
            }
        }

        // Fisher-Yates
        questions.shuffle(rng);

        self.questions = questions;
        self.index = 0;
        self.answers = AnswerStore::new();
        self.started_at = Some(Utc::now());
        self.state = SessionState::InProgress;

        tracing::debug!(
            "started session for {}/{} with {} questions",
            self.config.student_id,
            self.config.quiz_id,
            self.questions.len()
        );
        Ok(())
    }

    /// Fetch the quiz's questions from `source` and start the session.
    pub async fn start_from(&mut self, source: &dyn QuestionSource) -> Result<(), QuizError> {
        self.require(SessionState::NotStarted, "start")?;
        let questions = source
            .fetch_questions(&self.config.quiz_id)
            .await
            .map_err(|e| QuizError::SourceFailure(format!("{e:#}")))?;
        self.start(questions)
    }

    /// Record `answer` for a question, replacing any earlier answer.
    ///
    /// A rejected write leaves the prior answer in place.
    pub fn set_answer(&mut self, question_id: &str, answer: Answer) -> Result<(), QuizError> {
        self.require(SessionState::InProgress, "set an answer")?;

        let question = self
            .questions
            .iter()
            .find(|q| q.id == question_id)
            .ok_or_else(|| QuizError::UnknownQuestion(question_id.to_string()))?;

        let expected = question.question_type();
        let found = answer.question_type();
        if expected != found {
            return Err(QuizError::InvalidAnswerShape {
                question_id: question_id.to_string(),
                expected,
                found,
            });
        }

        self.answers.set(question_id, answer);
        Ok(())
    }

    /// Move to the next question, or complete the session from the last one.
    pub fn advance(&mut self) -> Result<Advance, QuizError> {
        if self.state == SessionState::Completed {
            return Err(QuizError::AlreadyCompleted);
        }
        self.require(SessionState::InProgress, "advance")?;

        if self.index + 1 < self.questions.len() {
            self.index += 1;
            Ok(Advance::Moved(self.index))
        } else {
            Ok(Advance::Completed(self.complete(CompletionReason::Submitted)))
        }
    }

    /// Move back one question.
    pub fn retreat(&mut self) -> Result<usize, QuizError> {
        self.require(SessionState::InProgress, "retreat")?;
        if self.index == 0 {
            return Err(QuizError::InvalidTransition {
                operation: "retreat from the first question",
                state: self.state,
            });
        }
        self.index -= 1;
        Ok(self.index)
    }

    /// Complete the session now because time ran out, whatever the position.
    pub fn force_complete(&mut self) -> Result<Completion, QuizError> {
        self.finish_early(CompletionReason::TimeExpired)
    }

    /// Complete the session now at the student's request.
    pub fn submit(&mut self) -> Result<Completion, QuizError> {
        self.finish_early(CompletionReason::Submitted)
    }

    fn finish_early(&mut self, reason: CompletionReason) -> Result<Completion, QuizError> {
        if self.state == SessionState::Completed {
            return Err(QuizError::AlreadyCompleted);
        }
        self.require(SessionState::InProgress, "complete")?;
        Ok(self.complete(reason))
    }

    fn complete(&mut self, reason: CompletionReason) -> Completion {
        let score = Score::compute(&self.questions, &self.answers);
        let completed_at = Utc::now();

        let result = QuizResult {
            id: Uuid::new_v4(),
            student_id: self.config.student_id.clone(),
            quiz_id: self.config.quiz_id.clone(),
            percentage: score.percentage,
            correct_count: score.correct_count,
            total_questions: score.total_questions,
            started_at: self.started_at.unwrap_or(completed_at),
            completed_at,
            completion: reason,
            question_order: self.questions.iter().map(|q| q.id.clone()).collect(),
            answers: self.answers.clone(),
        };

        self.state = SessionState::Completed;
        self.result = Some(result.clone());

        tracing::info!(
            "quiz {} completed by {} ({:?}): {}/{} correct, {}%",
            result.quiz_id,
            result.student_id,
            reason,
            result.correct_count,
            result.total_questions,
            result.percentage
        );

        let persistence = PersistHandle::spawn(
            Arc::clone(&self.sink),
            result.clone(),
            self.config.persist_timeout,
        );

        Completion {
            result,
            persistence,
        }
    }

    fn require(&self, state: SessionState, operation: &'static str) -> Result<(), QuizError> {
        if self.state == state {
            Ok(())
        } else {
            Err(QuizError::InvalidTransition {
                operation,
                state: self.state,
            })
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Questions in presentation order.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.index)
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        !self.questions.is_empty() && self.index + 1 == self.questions.len()
    }

    pub fn answers(&self) -> &AnswerStore {
        &self.answers
    }

    pub fn answer_for(&self, question_id: &str) -> Option<&Answer> {
        self.answers.get(question_id)
    }

    pub fn unanswered_count(&self) -> usize {
        self.questions
            .iter()
            .filter(|q| !self.answers.contains(&q.id))
            .count()
    }

    /// The frozen result, once completed.
    pub fn result(&self) -> Option<&QuizResult> {
        self.result.as_ref()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn time_limit_minutes(&self) -> u32 {
        self.config.time_limit_minutes
    }

    pub fn time_limit(&self) -> Duration {
        Duration::from_secs(u64::from(self.config.time_limit_minutes) * 60)
    }

    pub fn student_id(&self) -> &str {
        &self.config.student_id
    }

    pub fn quiz_id(&self) -> &str {
        &self.config.quiz_id
    }
}
