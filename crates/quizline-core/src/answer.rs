//! Answers and the per-session answer store.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::model::{OptionId, Question, QuestionId, QuestionKind, QuestionType};

/// A student's answer to one question.
///
/// The variant must match the question type; an `Order` may be partial
/// while the student is still arranging items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum Answer {
    Choice(OptionId),
    Selection(BTreeSet<OptionId>),
    Order(Vec<OptionId>),
    Text(String),
}

impl Answer {
    /// The question type this answer variant belongs to.
    pub fn question_type(&self) -> QuestionType {
        match self {
            Answer::Choice(_) => QuestionType::MultipleChoice,
            Answer::Selection(_) => QuestionType::MultiSelect,
            Answer::Order(_) => QuestionType::Ordering,
            Answer::Text(_) => QuestionType::ShortAnswer,
        }
    }

    /// Build a selection answer from option ids.
    pub fn selection<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Answer::Selection(ids.into_iter().map(Into::into).collect())
    }

    /// Build an order answer from option ids.
    pub fn order<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Answer::Order(ids.into_iter().map(Into::into).collect())
    }

    /// Parse a line of user input into the answer variant `question` expects.
    ///
    /// Options may be given by id or by 1-based position. Multi-select and
    /// ordering answers are comma-separated lists.
    pub fn parse_for(question: &Question, input: &str) -> Result<Answer, String> {
        let input = input.trim_end_matches(['\r', '\n']);
        match &question.kind {
            QuestionKind::MultipleChoice { .. } => {
                let token = input.trim();
                if token.contains(',') {
                    return Err("pick exactly one option".into());
                }
                resolve_option(question, token).map(Answer::Choice)
            }
            QuestionKind::MultiSelect { .. } => {
                let ids = split_options(question, input)?;
                Ok(Answer::Selection(ids.into_iter().collect()))
            }
            QuestionKind::Ordering { .. } => {
                let ids = split_options(question, input)?;
                let unique: BTreeSet<&String> = ids.iter().collect();
                if unique.len() != ids.len() {
                    return Err("each option may appear only once".into());
                }
                Ok(Answer::Order(ids))
            }
            QuestionKind::ShortAnswer { .. } => {
                if input.trim().is_empty() {
                    Err("answer is empty".into())
                } else {
                    Ok(Answer::Text(input.to_string()))
                }
            }
        }
    }
}

fn resolve_option(question: &Question, token: &str) -> Result<OptionId, String> {
    if token.is_empty() {
        return Err("no option given".into());
    }
    if let Some(option) = question.options.iter().find(|o| o.id == token) {
        return Ok(option.id.clone());
    }
    match token.parse::<usize>() {
        Ok(n) if (1..=question.options.len()).contains(&n) => Ok(question.options[n - 1].id.clone()),
        _ => Err(format!("unknown option: {token}")),
    }
}

fn split_options(question: &Question, input: &str) -> Result<Vec<OptionId>, String> {
    let ids = input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| resolve_option(question, t))
        .collect::<Result<Vec<_>, _>>()?;
    if ids.is_empty() {
        return Err("no options given".into());
    }
    Ok(ids)
}

/// Mapping from question id to the student's current answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerStore {
    answers: BTreeMap<QuestionId, Answer>,
}

impl AnswerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, question_id: &str) -> Option<&Answer> {
        self.answers.get(question_id)
    }

    /// Store an answer, returning the one it replaced.
    pub fn set(&mut self, question_id: impl Into<QuestionId>, answer: Answer) -> Option<Answer> {
        self.answers.insert(question_id.into(), answer)
    }

    pub fn contains(&self, question_id: &str) -> bool {
        self.answers.contains_key(question_id)
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn answered_ids(&self) -> impl Iterator<Item = &str> {
        self.answers.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Answer)> {
        self.answers.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(QuestionId, Answer)> for AnswerStore {
    fn from_iter<T: IntoIterator<Item = (QuestionId, Answer)>>(iter: T) -> Self {
        Self {
            answers: iter.into_iter().collect(),
        }
    }
}
