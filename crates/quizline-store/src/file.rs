//! Store backed by a plain data directory.
//!
//! Layout:
//!
//! ```text
//! <data_dir>/
//!   quizzes/<quiz_id>.toml
//!   results/<quiz_id>/<student_id>.json
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use quizline_core::model::{Question, Quiz};
use quizline_core::parser::parse_quiz_str;
use quizline_core::session::QuizResult;
use quizline_core::traits::{QuestionSource, ResultSink, ResultSource};

use crate::error::{check_id, StoreError};

const QUIZZES_DIR: &str = "quizzes";
const RESULTS_DIR: &str = "results";

/// Quizzes and results stored as files under one directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn quizzes_dir(&self) -> PathBuf {
        self.data_dir.join(QUIZZES_DIR)
    }

    /// Path of the definition file for `quiz_id`.
    pub fn quiz_path(&self, quiz_id: &str) -> Result<PathBuf, StoreError> {
        check_id(quiz_id)?;
        Ok(self.quizzes_dir().join(format!("{quiz_id}.toml")))
    }

    /// Path of the stored result for (student, quiz).
    pub fn result_path(&self, student_id: &str, quiz_id: &str) -> Result<PathBuf, StoreError> {
        check_id(student_id)?;
        check_id(quiz_id)?;
        Ok(self
            .data_dir
            .join(RESULTS_DIR)
            .join(quiz_id)
            .join(format!("{student_id}.json")))
    }

    /// Load a full quiz definition, including title and time limit.
    pub async fn load_quiz(&self, quiz_id: &str) -> Result<Quiz, StoreError> {
        let path = self.quiz_path(quiz_id)?;
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(quiz_id.to_string()));
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.display().to_string(),
                    source,
                });
            }
        };

        let quiz = parse_quiz_str(&content, &path).map_err(|e| StoreError::Parse {
            path: path.display().to_string(),
            message: format!("{e:#}"),
        })?;
        if quiz.id != quiz_id {
            tracing::warn!(
                "{} declares quiz id {:?}, expected {:?}",
                path.display(),
                quiz.id,
                quiz_id
            );
        }
        Ok(quiz)
    }

    /// Write a quiz definition file, creating the directory as needed.
    pub async fn save_quiz_source(
        &self,
        quiz_id: &str,
        toml_source: &str,
    ) -> Result<PathBuf, StoreError> {
        let path = self.quiz_path(quiz_id)?;
        write_atomic(&path, toml_source.as_bytes()).await?;
        Ok(path)
    }
}

/// Write `contents` next to `path` and rename it into place, so readers
/// never see a partial file.
async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
    }
    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, contents).await.map_err(io_err)?;
    tokio::fs::rename(&tmp, path).await.map_err(io_err)?;
    Ok(())
}

async fn read_result(path: &Path) -> Result<Option<QuizResult>, StoreError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.display().to_string(),
                source,
            });
        }
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| StoreError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
}

#[async_trait]
impl QuestionSource for FileStore {
    async fn fetch_questions(&self, quiz_id: &str) -> anyhow::Result<Vec<Question>> {
        Ok(self.load_quiz(quiz_id).await?.questions)
    }
}

#[async_trait]
impl ResultSink for FileStore {
    async fn persist_result(
        &self,
        student_id: &str,
        quiz_id: &str,
        result: &QuizResult,
    ) -> anyhow::Result<()> {
        let path = self.result_path(student_id, quiz_id)?;
        let json = serde_json::to_vec_pretty(result)?;
        write_atomic(&path, &json).await?;
        tracing::debug!("wrote result {} to {}", result.id, path.display());
        Ok(())
    }
}

#[async_trait]
impl ResultSource for FileStore {
    async fn fetch_result(
        &self,
        student_id: &str,
        quiz_id: &str,
    ) -> anyhow::Result<Option<QuizResult>> {
        let path = self.result_path(student_id, quiz_id)?;
        Ok(read_result(&path).await?)
    }

    async fn results_for_quiz(&self, quiz_id: &str) -> anyhow::Result<Vec<QuizResult>> {
        check_id(quiz_id)?;
        let dir = self.data_dir.join(RESULTS_DIR).join(quiz_id);

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: dir.display().to_string(),
                    source,
                }
                .into());
            }
        };

        let mut results = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }
            match read_result(&path).await {
                Ok(Some(result)) => results.push(result),
                Ok(None) => {}
                Err(e) => tracing::warn!("skipping {}: {e}", path.display()),
            }
        }

        results.sort_by_key(|r| r.completed_at);
        Ok(results)
    }
}
