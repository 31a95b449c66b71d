//! Answer correctness predicates and quiz scoring.
//!
//! Scoring is all-or-nothing per question: no partial credit for a subset
//! of a multi-select or for an ordering that is nearly right.

use serde::{Deserialize, Serialize};

use crate::answer::{Answer, AnswerStore};
use crate::model::{Question, QuestionKind};

/// Normalize a short answer for comparison: trim the ends and lower-case.
/// Interior whitespace is left alone.
pub fn normalize_text(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Whether `answer` is the correct answer to `question`.
///
/// A missing answer, or one whose variant does not fit the question, is
/// simply incorrect.
pub fn is_correct(question: &Question, answer: Option<&Answer>) -> bool {
    let Some(answer) = answer else {
        return false;
    };

    match (&question.kind, answer) {
        (QuestionKind::MultipleChoice { correct_option_id }, Answer::Choice(chosen)) => {
            chosen == correct_option_id
        }
        (QuestionKind::MultiSelect { correct_option_ids }, Answer::Selection(chosen)) => {
            chosen.len() == correct_option_ids.len() && chosen.is_subset(correct_option_ids)
        }
        (QuestionKind::Ordering { correct_order }, Answer::Order(order)) => order == correct_order,
        (QuestionKind::ShortAnswer { correct_answer }, Answer::Text(text)) => {
            normalize_text(text) == normalize_text(correct_answer)
        }
        _ => false,
    }
}

/// Outcome of scoring an answer store against a question set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    /// Questions answered correctly.
    pub correct_count: u32,
    /// Questions in the quiz.
    pub total_questions: u32,
    /// `100 * correct / total`, rounded half-up to an integer.
    pub percentage: u8,
}

impl Score {
    /// Score `answers` against `questions`.
    ///
    /// Pure and deterministic. An empty question slice scores 0 of 0.
    pub fn compute(questions: &[Question], answers: &AnswerStore) -> Self {
        let correct_count = questions
            .iter()
            .filter(|q| is_correct(q, answers.get(&q.id)))
            .count() as u32;
        let total_questions = questions.len() as u32;

        Self {
            correct_count,
            total_questions,
            percentage: percentage(correct_count, total_questions),
        }
    }

    /// Number of questions not answered correctly.
    pub fn incorrect_count(&self) -> u32 {
        self.total_questions - self.correct_count
    }
}

/// Shorthand for [`Score::compute`].
pub fn score(questions: &[Question], answers: &AnswerStore) -> Score {
    Score::compute(questions, answers)
}

/// Round-half-up percentage in integer arithmetic, so 12.5% becomes 13.
fn percentage(correct: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    let correct = u64::from(correct.min(total));
    let total = u64::from(total);
    ((200 * correct + total) / (2 * total)) as u8
}
