//! Aggregate statistics over stored results of one quiz.

use serde::{Deserialize, Serialize};

use crate::model::Question;
use crate::scoring::is_correct;
use crate::session::{CompletionReason, QuizResult};

/// Statistics for a quiz across all students' results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizStats {
    pub quiz_id: String,
    /// Number of stored results.
    pub attempts: usize,
    /// Mean percentage across attempts.
    pub average_percentage: f64,
    pub best_percentage: u8,
    pub worst_percentage: u8,
    /// Minimum percentage counted as a pass.
    pub pass_threshold: u8,
    /// Fraction of attempts at or above the pass threshold.
    pub pass_rate: f64,
    /// Attempts that ended because time ran out.
    pub timed_out: usize,
    /// Per-question figures, hardest first.
    pub per_question: Vec<QuestionStats>,
}

/// How students fared on a single question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionStats {
    pub question_id: String,
    pub prompt: String,
    /// Results in which the question was presented.
    pub attempts: usize,
    pub correct: usize,
    /// `correct / attempts`, or 0 with no attempts.
    pub correct_rate: f64,
}

/// Compute statistics for `quiz_id` from its stored results.
///
/// Correctness per question is re-derived from each result's answer
/// snapshot against the current questions.
pub fn compute_quiz_stats(
    quiz_id: &str,
    results: &[QuizResult],
    questions: &[Question],
    pass_threshold: u8,
) -> QuizStats {
    let attempts = results.len();
    let n = attempts.max(1) as f64;

    let average_percentage = results
        .iter()
        .map(|r| f64::from(r.percentage))
        .sum::<f64>()
        / n;
    let best_percentage = results.iter().map(|r| r.percentage).max().unwrap_or(0);
    let worst_percentage = results.iter().map(|r| r.percentage).min().unwrap_or(0);
    let passed = results
        .iter()
        .filter(|r| r.percentage >= pass_threshold)
        .count();
    let timed_out = results
        .iter()
        .filter(|r| r.completion == CompletionReason::TimeExpired)
        .count();

    let mut per_question: Vec<QuestionStats> = questions
        .iter()
        .map(|q| {
            // Results written before question order was recorded saw every question.
            let presented: Vec<&QuizResult> = results
                .iter()
                .filter(|r| r.question_order.is_empty() || r.question_order.contains(&q.id))
                .collect();
            let correct = presented
                .iter()
                .filter(|r| is_correct(q, r.answers.get(&q.id)))
                .count();
            let correct_rate = if presented.is_empty() {
                0.0
            } else {
                correct as f64 / presented.len() as f64
            };
            QuestionStats {
                question_id: q.id.clone(),
                prompt: q.prompt.clone(),
                attempts: presented.len(),
                correct,
                correct_rate,
            }
        })
        .collect();

    per_question.sort_by(|a, b| {
        a.correct_rate
            .total_cmp(&b.correct_rate)
            .then_with(|| a.question_id.cmp(&b.question_id))
    });

    QuizStats {
        quiz_id: quiz_id.to_string(),
        attempts,
        average_percentage,
        best_percentage,
        worst_percentage,
        pass_threshold,
        pass_rate: passed as f64 / n,
        timed_out,
        per_question,
    }
}
