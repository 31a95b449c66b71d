//! TOML quiz definition parser.
//!
//! Loads quizzes from TOML files and directories, and validates them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{Question, Quiz};

/// Intermediate TOML structure for parsing quiz files.
#[derive(Debug, Deserialize)]
struct TomlQuizFile {
    quiz: TomlQuizHeader,
    #[serde(default)]
    questions: Vec<Question>,
}

#[derive(Debug, Deserialize)]
struct TomlQuizHeader {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    time_limit_minutes: Option<u32>,
}

/// Parse a single TOML file into a `Quiz`.
pub fn parse_quiz(path: &Path) -> Result<Quiz> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read quiz file: {}", path.display()))?;

    parse_quiz_str(&content, path)
}

/// Parse a TOML string into a `Quiz` (useful for testing).
pub fn parse_quiz_str(content: &str, source_path: &Path) -> Result<Quiz> {
    let parsed: TomlQuizFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    Ok(Quiz {
        id: parsed.quiz.id,
        title: parsed.quiz.title,
        description: parsed.quiz.description,
        time_limit_minutes: parsed.quiz.time_limit_minutes,
        questions: parsed.questions,
    })
}

/// Recursively load all `.toml` quiz files from a directory.
pub fn load_quiz_directory(dir: &Path) -> Result<Vec<Quiz>> {
    let mut quizzes = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            quizzes.extend(load_quiz_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_quiz(&path) {
                Ok(quiz) => quizzes.push(quiz),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(quizzes)
}

/// A warning from quiz validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a quiz for problems that would stop or confuse a session.
pub fn validate_quiz(quiz: &Quiz) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if quiz.questions.is_empty() {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "quiz has no questions".into(),
        });
    }

    if quiz.time_limit_minutes == Some(0) {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "time_limit_minutes is 0".into(),
        });
    }

    let mut seen_ids = HashSet::new();
    for question in &quiz.questions {
        if !seen_ids.insert(&question.id) {
            warnings.push(ValidationWarning {
                question_id: Some(question.id.clone()),
                message: format!("duplicate question ID: {}", question.id),
            });
        }

        if question.prompt.trim().is_empty() {
            warnings.push(ValidationWarning {
                question_id: Some(question.id.clone()),
                message: "prompt is empty".into(),
            });
        }

        if let Err(e) = question.validate() {
            warnings.push(ValidationWarning {
                question_id: Some(question.id.clone()),
                message: e.to_string(),
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{QuestionKind, QuestionType};
    use std::path::PathBuf;

    const VALID_TOML: &str = r#"
[quiz]
id = "geography"
title = "Geography"
description = "Capitals and rivers"
time_limit_minutes = 5

[[questions]]
id = "capital-fr"
type = "multiple-choice"
prompt = "What is the capital of France?"
options = [
    { id = "opt1", text = "Lyon" },
    { id = "opt2", text = "Paris" },
    { id = "opt3", text = "Nice" },
]
correct_option_id = "opt2"

[[questions]]
id = "rivers"
type = "multi-select"
prompt = "Which of these rivers flow through Germany?"
options = [
    { id = "opt1", text = "Rhine" },
    { id = "opt2", text = "Loire" },
    { id = "opt3", text = "Danube" },
]
correct_option_ids = ["opt1", "opt3"]

[[questions]]
id = "by-size"
type = "ordering"
prompt = "Order by area, largest first"
options = [
    { id = "ru", text = "Russia" },
    { id = "ca", text = "Canada" },
    { id = "fr", text = "France" },
]
correct_order = ["ru", "ca", "fr"]

[[questions]]
id = "answer"
type = "short-answer"
prompt = "Six times seven?"
correct_answer = "42"
"#;

    #[test]
    fn parse_valid_toml() {
        let quiz = parse_quiz_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(quiz.id, "geography");
        assert_eq!(quiz.time_limit_minutes, Some(5));
        assert_eq!(quiz.questions.len(), 4);
        assert_eq!(quiz.questions[1].question_type(), QuestionType::MultiSelect);
        assert_eq!(quiz.questions[1].options[2].text, "Danube");
        assert!(matches!(
            &quiz.questions[3].kind,
            QuestionKind::ShortAnswer { correct_answer } if correct_answer == "42"
        ));
        assert!(validate_quiz(&quiz).is_empty());
    }

    #[test]
    fn parse_missing_optional_fields() {
        let toml = r#"
[quiz]
id = "minimal"
title = "Minimal"

[[questions]]
id = "q1"
type = "short-answer"
prompt = "Say hi"
correct_answer = "hi"
"#;
        let quiz = parse_quiz_str(toml, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(quiz.time_limit_minutes, None);
        assert_eq!(quiz.time_limit_or(30), 30);
        assert!(quiz.description.is_empty());
        assert!(quiz.questions[0].options.is_empty());
    }

    #[test]
    fn parse_unknown_question_type_fails() {
        let toml = r#"
[quiz]
id = "bad"
title = "Bad"

[[questions]]
id = "q1"
type = "essay"
prompt = "Discuss"
"#;
        assert!(parse_quiz_str(toml, &PathBuf::from("bad.toml")).is_err());
    }

    #[test]
    fn validate_duplicate_ids_and_invariants() {
        let toml = r#"
[quiz]
id = "dupes"
title = "Dupes"

[[questions]]
id = "same"
type = "short-answer"
prompt = "First"
correct_answer = "a"

[[questions]]
id = "same"
type = "multiple-choice"
prompt = ""
options = [{ id = "a", text = "A" }, { id = "b", text = "B" }]
correct_option_id = "c"
"#;
        let quiz = parse_quiz_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = validate_quiz(&quiz);
        assert!(warnings.iter().any(|w| w.message.contains("duplicate")));
        assert!(warnings.iter().any(|w| w.message.contains("prompt is empty")));
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("not one of the options")));
    }

    #[test]
    fn validate_empty_quiz() {
        let toml = r#"
[quiz]
id = "empty"
title = "Empty"
time_limit_minutes = 0
"#;
        let quiz = parse_quiz_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = validate_quiz(&quiz);
        assert!(warnings.iter().any(|w| w.message.contains("no questions")));
        assert!(warnings.iter().any(|w| w.message.contains("is 0")));
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        let result = parse_quiz_str(bad, &PathBuf::from("bad.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn load_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("geo.toml"), VALID_TOML).unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested/broken.toml"), "not = [toml").unwrap();

        let quizzes = load_quiz_directory(dir.path()).unwrap();
        assert_eq!(quizzes.len(), 1);
        assert_eq!(quizzes[0].id, "geography");
    }
}
