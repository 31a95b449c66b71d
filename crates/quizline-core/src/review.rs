//! Read-only replay of a completed attempt.
//!
//! A review pairs each question with the answer recorded in the result's
//! snapshot and the correct answer. It reads nothing from a live session
//! and never modifies the result.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::answer::Answer;
use crate::model::Question;
use crate::scoring::is_correct;
use crate::session::QuizResult;
use crate::traits::{QuestionSource, ResultSource};

/// One question of a review, in the order the student saw it.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewItem {
    /// 0-based position.
    pub index: usize,
    pub question: Question,
    /// The answer in the result snapshot, if the student gave one.
    pub recorded: Option<Answer>,
    pub expected: Answer,
    pub correct: bool,
}

/// Position-by-position replay of a result.
#[derive(Debug, Clone, Serialize)]
pub struct Review {
    pub result: QuizResult,
    pub items: Vec<ReviewItem>,
}

impl Review {
    /// Pair `result` with `questions`.
    ///
    /// Items follow the result's recorded question order. Recorded ids with
    /// no matching question are skipped; questions the result never listed
    /// are appended in the order given.
    pub fn build(result: &QuizResult, questions: &[Question]) -> Self {
        let by_id: HashMap<&str, &Question> =
            questions.iter().map(|q| (q.id.as_str(), q)).collect();

        let mut ordered: Vec<&Question> = Vec::with_capacity(questions.len());
        let mut placed: HashSet<&str> = HashSet::new();

        for id in &result.question_order {
            match by_id.get(id.as_str()) {
                Some(&q) => {
                    if placed.insert(q.id.as_str()) {
                        ordered.push(q);
                    }
                }
                None => {
                    tracing::warn!(
                        "question {id} from result {} no longer exists in quiz {}",
                        result.id,
                        result.quiz_id
                    );
                }
            }
        }
        for q in questions {
            if placed.insert(q.id.as_str()) {
                ordered.push(q);
            }
        }

        let items = ordered
            .into_iter()
            .enumerate()
            .map(|(index, question)| {
                let recorded = result.answers.get(&question.id).cloned();
                ReviewItem {
                    index,
                    correct: is_correct(question, recorded.as_ref()),
                    expected: question.expected_answer(),
                    question: question.clone(),
                    recorded,
                }
            })
            .collect();

        Self {
            result: result.clone(),
            items,
        }
    }

    pub fn correct_count(&self) -> usize {
        self.items.iter().filter(|i| i.correct).count()
    }

    /// Render the review as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Score:** {}% ({} of {} correct)\n\n",
            self.result.percentage, self.result.correct_count, self.result.total_questions
        ));

        md.push_str("| # | Question | Your answer | Correct answer | Result |\n");
        md.push_str("|---|----------|-------------|----------------|--------|\n");
        for item in &self.items {
            let recorded = item
                .recorded
                .as_ref()
                .map(|a| describe_answer(&item.question, a))
                .unwrap_or_else(|| "(no answer)".to_string());
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                item.index + 1,
                escape_cell(&item.question.prompt),
                escape_cell(&recorded),
                escape_cell(&describe_answer(&item.question, &item.expected)),
                if item.correct { "correct" } else { "incorrect" }
            ));
        }

        md
    }
}

/// Render an answer using the question's option labels.
pub fn describe_answer(question: &Question, answer: &Answer) -> String {
    let label = |id: &str| question.option_text(id).unwrap_or(id).to_string();
    match answer {
        Answer::Choice(id) => label(id),
        Answer::Selection(ids) => ids.iter().map(|id| label(id)).collect::<Vec<_>>().join(", "),
        Answer::Order(ids) => ids.iter().map(|id| label(id)).collect::<Vec<_>>().join(" > "),
        Answer::Text(text) => text.trim().to_string(),
    }
}

fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}

/// Fetch a stored result and its quiz's questions and build the review.
///
/// Returns `None` if the student has no stored result for the quiz.
pub async fn review_from_store(
    results: &dyn ResultSource,
    questions: &dyn QuestionSource,
    student_id: &str,
    quiz_id: &str,
) -> anyhow::Result<Option<Review>> {
    let Some(result) = results.fetch_result(student_id, quiz_id).await? else {
        return Ok(None);
    };
    let questions = questions.fetch_questions(quiz_id).await?;
    Ok(Some(Review::build(&result, &questions)))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::answer::AnswerStore;
    use crate::model::fixtures::*;
    use crate::session::CompletionReason;

    fn make_result(order: &[&str], answers: AnswerStore) -> QuizResult {
        QuizResult {
            id: Uuid::nil(),
            student_id: "s1".into(),
            quiz_id: "quiz".into(),
            percentage: 50,
            correct_count: 1,
            total_questions: 2,
            started_at: Utc::now(),
            completed_at: Utc::now(),
            completion: CompletionReason::Submitted,
            question_order: order.iter().map(|s| (*s).to_string()).collect(),
            answers,
        }
    }

    #[test]
    fn follows_recorded_order() {
        let questions = vec![
            multiple_choice("a", "opt1"),
            short_answer("b", "yes"),
            ordering("c", &["X", "Y"]),
        ];
        let mut answers = AnswerStore::new();
        answers.set("a", Answer::Choice("opt2".into()));
        answers.set("b", Answer::Text("YES".into()));

        let result = make_result(&["c", "b", "a"], answers);
        let review = Review::build(&result, &questions);

        let ids: Vec<&str> = review.items.iter().map(|i| i.question.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
        assert!(review.items[0].recorded.is_none());
        assert!(!review.items[0].correct);
        assert!(review.items[1].correct);
        assert!(!review.items[2].correct);
        assert_eq!(review.items[2].expected, Answer::Choice("opt1".into()));
        assert_eq!(review.correct_count(), 1);
    }

    #[test]
    fn skips_removed_and_appends_new_questions() {
        let questions = vec![short_answer("b", "x"), short_answer("new", "y")];
        let result = make_result(&["gone", "b"], AnswerStore::new());
        let review = Review::build(&result, &questions);

        let ids: Vec<&str> = review.items.iter().map(|i| i.question.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "new"]);
        assert_eq!(review.items[1].index, 1);
    }

    #[test]
    fn build_leaves_result_untouched() {
        let questions = vec![short_answer("b", "x")];
        let mut answers = AnswerStore::new();
        answers.set("b", Answer::Text("x".into()));
        let result = make_result(&["b"], answers);
        let before = result.clone();

        let review = Review::build(&result, &questions);
        assert_eq!(result, before);
        assert_eq!(review.result, before);
    }

    #[test]
    fn describe_uses_option_labels() {
        let q = multi_select("q", &["opt1", "opt3"]);
        assert_eq!(
            describe_answer(&q, &Answer::selection(["opt3", "opt1"])),
            "Option opt1, Option opt3"
        );
        let q = ordering("o", &["A", "B"]);
        assert_eq!(
            describe_answer(&q, &Answer::order(["B", "A"])),
            "Option B > Option A"
        );
    }

    #[test]
    fn markdown_lists_every_question() {
        let questions = vec![multiple_choice("a", "opt1"), short_answer("b", "yes")];
        let mut answers = AnswerStore::new();
        answers.set("a", Answer::Choice("opt1".into()));
        let review = Review::build(&make_result(&["a", "b"], answers), &questions);

        let md = review.to_markdown();
        assert!(md.contains("**Score:** 50%"));
        assert!(md.contains("(no answer)"));
        assert!(md.contains("| 1 | Pick one for a | Option opt1 | Option opt1 | correct |"));
    }
}
