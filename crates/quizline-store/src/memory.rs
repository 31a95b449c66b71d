//! In-memory store, for tests and for embedding quizline without a disk.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;

use quizline_core::model::{Question, Quiz};
use quizline_core::session::QuizResult;
use quizline_core::traits::{QuestionSource, ResultSink, ResultSource};

use crate::error::StoreError;

/// Quizzes and results held in process memory.
///
/// Persists can be made to fail or to stall, to exercise how sessions
/// cope with an unreliable backend.
#[derive(Default)]
pub struct MemoryStore {
    /// Quiz id → questions.
    quizzes: Mutex<HashMap<String, Vec<Question>>>,
    /// (student id, quiz id) → latest result.
    results: Mutex<HashMap<(String, String), QuizResult>>,
    /// Number of persist calls received.
    persist_calls: AtomicU32,
    fail_persist: AtomicBool,
    persist_delay: Option<Duration>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the questions of `quiz`.
    pub fn with_quiz(quiz: Quiz) -> Self {
        let store = Self::new();
        store.add_questions(&quiz.id, quiz.questions);
        store
    }

    /// Make every persist fail.
    pub fn failing_persist(self) -> Self {
        self.fail_persist.store(true, Ordering::Relaxed);
        self
    }

    /// Make every persist wait `delay` before completing.
    pub fn with_persist_delay(mut self, delay: Duration) -> Self {
        self.persist_delay = Some(delay);
        self
    }

    pub fn set_fail_persist(&self, fail: bool) {
        self.fail_persist.store(fail, Ordering::Relaxed);
    }

    /// Store (or replace) the questions of a quiz.
    pub fn add_questions(&self, quiz_id: &str, questions: Vec<Question>) {
        self.quizzes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(quiz_id.to_string(), questions);
    }

    /// Get the number of persist calls made to this store.
    pub fn persist_calls(&self) -> u32 {
        self.persist_calls.load(Ordering::Relaxed)
    }

    /// Get the number of stored results.
    pub fn result_count(&self) -> usize {
        self.results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl QuestionSource for MemoryStore {
    async fn fetch_questions(&self, quiz_id: &str) -> anyhow::Result<Vec<Question>> {
        let quizzes = self
            .quizzes
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        quizzes
            .get(quiz_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(quiz_id.to_string()).into())
    }
}

#[async_trait]
impl ResultSink for MemoryStore {
    async fn persist_result(
        &self,
        student_id: &str,
        quiz_id: &str,
        result: &QuizResult,
    ) -> anyhow::Result<()> {
        self.persist_calls.fetch_add(1, Ordering::Relaxed);

        if let Some(delay) = self.persist_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_persist.load(Ordering::Relaxed) {
            anyhow::bail!("memory store is rejecting writes");
        }

        self.results
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))?
            .insert((student_id.to_string(), quiz_id.to_string()), result.clone());
        Ok(())
    }
}

#[async_trait]
impl ResultSource for MemoryStore {
    async fn fetch_result(
        &self,
        student_id: &str,
        quiz_id: &str,
    ) -> anyhow::Result<Option<QuizResult>> {
        let results = self
            .results
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        Ok(results
            .get(&(student_id.to_string(), quiz_id.to_string()))
            .cloned())
    }

    async fn results_for_quiz(&self, quiz_id: &str) -> anyhow::Result<Vec<QuizResult>> {
        let results = self
            .results
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        let mut matching: Vec<QuizResult> = results
            .iter()
            .filter(|((_, quiz), _)| quiz == quiz_id)
            .map(|(_, r)| r.clone())
            .collect();
        matching.sort_by_key(|r| r.completed_at);
        Ok(matching)
    }
}
