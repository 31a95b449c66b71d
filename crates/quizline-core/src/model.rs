//! Core data model types for quizline.
//!
//! A question is a tagged union over the four supported variants; each
//! variant carries only the correct-answer field it needs.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::answer::Answer;
use crate::error::QuizError;

/// Identifier of a question, unique within a quiz.
pub type QuestionId = String;

/// Identifier of an option, unique within a question.
pub type OptionId = String;

/// A selectable option of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizOption {
    pub id: OptionId,
    pub text: String,
}

/// A single quiz question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier for this question.
    pub id: QuestionId,
    /// The text shown to the student.
    pub prompt: String,
    /// Options in authoring order. Empty for short-answer questions.
    #[serde(default)]
    pub options: Vec<QuizOption>,
    /// Variant and its correct answer.
    #[serde(flatten)]
    pub kind: QuestionKind,
}

/// The question variant together with its correct answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum QuestionKind {
    MultipleChoice { correct_option_id: OptionId },
    MultiSelect { correct_option_ids: BTreeSet<OptionId> },
    Ordering { correct_order: Vec<OptionId> },
    /// Matched case-insensitively after trimming surrounding whitespace.
    ShortAnswer { correct_answer: String },
}

/// The four supported question variants, without their payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    MultipleChoice,
    MultiSelect,
    Ordering,
    ShortAnswer,
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionType::MultipleChoice => write!(f, "multiple-choice"),
            QuestionType::MultiSelect => write!(f, "multi-select"),
            QuestionType::Ordering => write!(f, "ordering"),
            QuestionType::ShortAnswer => write!(f, "short-answer"),
        }
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "multiple-choice" | "mc" => Ok(QuestionType::MultipleChoice),
            "multi-select" | "multi" => Ok(QuestionType::MultiSelect),
            "ordering" | "order" => Ok(QuestionType::Ordering),
            "short-answer" | "short" => Ok(QuestionType::ShortAnswer),
            other => Err(format!("unknown question type: {other}")),
        }
    }
}

impl QuestionKind {
    pub fn question_type(&self) -> QuestionType {
        match self {
            QuestionKind::MultipleChoice { .. } => QuestionType::MultipleChoice,
            QuestionKind::MultiSelect { .. } => QuestionType::MultiSelect,
            QuestionKind::Ordering { .. } => QuestionType::Ordering,
            QuestionKind::ShortAnswer { .. } => QuestionType::ShortAnswer,
        }
    }
}

impl Question {
    pub fn question_type(&self) -> QuestionType {
        self.kind.question_type()
    }

    /// Look up the label of an option by id.
    pub fn option_text(&self, option_id: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.id == option_id)
            .map(|o| o.text.as_str())
    }

    /// The correct answer expressed as an [`Answer`] value.
    pub fn expected_answer(&self) -> Answer {
        match &self.kind {
            QuestionKind::MultipleChoice { correct_option_id } => {
                Answer::Choice(correct_option_id.clone())
            }
            QuestionKind::MultiSelect { correct_option_ids } => {
                Answer::Selection(correct_option_ids.clone())
            }
            QuestionKind::Ordering { correct_order } => Answer::Order(correct_order.clone()),
            QuestionKind::ShortAnswer { correct_answer } => Answer::Text(correct_answer.clone()),
        }
    }

    /// Check the model invariants for this question.
    pub fn validate(&self) -> Result<(), QuizError> {
        let invalid = |reason: String| QuizError::InvalidQuestion {
            id: self.id.clone(),
            reason,
        };

        if self.id.trim().is_empty() {
            return Err(invalid("question id is empty".into()));
        }

        let mut option_ids = HashSet::new();
        for option in &self.options {
            if option.id.trim().is_empty() {
                return Err(invalid("option id is empty".into()));
            }
            if !option_ids.insert(option.id.as_str()) {
                return Err(invalid(format!("duplicate option id: {}", option.id)));
            }
        }

        match &self.kind {
            QuestionKind::MultipleChoice { correct_option_id } => {
                if self.options.len() < 2 {
                    return Err(invalid("needs at least two options".into()));
                }
                if !option_ids.contains(correct_option_id.as_str()) {
                    return Err(invalid(format!(
                        "correct option {correct_option_id} is not one of the options"
                    )));
                }
            }
            QuestionKind::MultiSelect { correct_option_ids } => {
                if self.options.len() < 2 {
                    return Err(invalid("needs at least two options".into()));
                }
                if correct_option_ids.is_empty() {
                    return Err(invalid("no correct options given".into()));
                }
                if let Some(stray) = correct_option_ids
                    .iter()
                    .find(|id| !option_ids.contains(id.as_str()))
                {
                    return Err(invalid(format!(
                        "correct option {stray} is not one of the options"
                    )));
                }
            }
            QuestionKind::Ordering { correct_order } => {
                if self.options.len() < 2 {
                    return Err(invalid("needs at least two options".into()));
                }
                let ordered: HashSet<&str> = correct_order.iter().map(String::as_str).collect();
                if ordered.len() != correct_order.len() {
                    return Err(invalid("correct order repeats an option".into()));
                }
                if ordered != option_ids {
                    return Err(invalid(
                        "correct order must list every option exactly once".into(),
                    ));
                }
            }
            QuestionKind::ShortAnswer { correct_answer } => {
                if !self.options.is_empty() {
                    return Err(invalid("short-answer questions take no options".into()));
                }
                if correct_answer.trim().is_empty() {
                    return Err(invalid("correct answer is blank".into()));
                }
            }
        }

        Ok(())
    }
}

/// A named collection of questions with a time limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    /// Unique identifier for this quiz.
    pub id: String,
    /// Human-readable title.
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Time allowed for one attempt; `None` defers to configuration.
    #[serde(default)]
    pub time_limit_minutes: Option<u32>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Quiz {
    /// The time limit, falling back to `default_minutes` when unset.
    pub fn time_limit_or(&self, default_minutes: u32) -> u32 {
        self.time_limit_minutes.unwrap_or(default_minutes)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn question_type_display_and_parse() {
        assert_eq!(QuestionType::MultiSelect.to_string(), "multi-select");
        assert_eq!(
            "Short-Answer".parse::<QuestionType>().unwrap(),
            QuestionType::ShortAnswer
        );
        assert_eq!("mc".parse::<QuestionType>().unwrap(), QuestionType::MultipleChoice);
        assert_eq!("order".parse::<QuestionType>().unwrap(), QuestionType::Ordering);
        assert!("essay".parse::<QuestionType>().is_err());
    }

    #[test]
    fn valid_fixtures_pass_validation() {
        assert!(multiple_choice("q1", "opt2").validate().is_ok());
        assert!(multi_select("q2", &["opt1", "opt3"]).validate().is_ok());
        assert!(ordering("q3", &["A", "B", "C", "D"]).validate().is_ok());
        assert!(short_answer("q4", "Paris").validate().is_ok());
    }

    #[test]
    fn multiple_choice_must_reference_an_option() {
        let q = multiple_choice("q1", "opt9");
        let err = q.validate().unwrap_err();
        assert!(err.to_string().contains("opt9"), "got: {err}");
    }

    #[test]
    fn multi_select_must_be_subset_of_options() {
        assert!(multi_select("q1", &["opt1", "opt7"]).validate().is_err());
        assert!(multi_select("q1", &[]).validate().is_err());
    }

    #[test]
    fn ordering_must_be_a_permutation() {
        let mut q = ordering("q1", &["A", "B", "C"]);
        q.kind = QuestionKind::Ordering {
            correct_order: vec!["A".into(), "B".into()],
        };
        assert!(q.validate().is_err(), "omission must be rejected");

        q.kind = QuestionKind::Ordering {
            correct_order: vec!["A".into(), "B".into(), "B".into()],
        };
        assert!(q.validate().is_err(), "duplicate must be rejected");

        q.kind = QuestionKind::Ordering {
            correct_order: vec!["C".into(), "A".into(), "B".into()],
        };
        assert!(q.validate().is_ok());
    }

    #[test]
    fn duplicate_option_ids_rejected() {
        let mut q = multiple_choice("q1", "opt1");
        q.options.push(QuizOption {
            id: "opt1".into(),
            text: "again".into(),
        });
        assert!(q.validate().is_err());
    }

    #[test]
    fn short_answer_rejects_options_and_blank_answer() {
        let mut q = short_answer("q1", "   ");
        assert!(q.validate().is_err());
        q = short_answer("q1", "42");
        q.options = options(&["a", "b"]);
        assert!(q.validate().is_err());
    }

    #[test]
    fn expected_answer_matches_variant() {
        assert_eq!(
            multiple_choice("q1", "opt2").expected_answer(),
            Answer::Choice("opt2".into())
        );
        assert_eq!(
            short_answer("q1", "42").expected_answer(),
            Answer::Text("42".into())
        );
    }

    #[test]
    fn question_serde_uses_type_tag() {
        let q = multi_select("q1", &["opt1", "opt3"]);
        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json["type"], "multi-select");
        assert_eq!(json["correct_option_ids"][1], "opt3");

        let back: Question = serde_json::from_value(json).unwrap();
        assert_eq!(back, q);
    }
}
