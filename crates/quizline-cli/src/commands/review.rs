//! The `quizline review` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use quizline_core::review::{describe_answer, review_from_store, Review};
use quizline_store::{load_config_from, FileStore};

pub async fn execute(
    quiz_id: String,
    student_id: String,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let store = FileStore::new(&config.data_dir);

    let Some(review) = review_from_store(&store, &store, &student_id, &quiz_id).await? else {
        anyhow::bail!("no stored result for student {student_id} on quiz {quiz_id}");
    };

    match format.as_str() {
        "table" => print_table(&review),
        "markdown" => print!("{}", review.to_markdown()),
        "json" => println!("{}", serde_json::to_string_pretty(&review)?),
        other => anyhow::bail!("unknown format: {other} (expected table, markdown, or json)"),
    }

    Ok(())
}

fn print_table(review: &Review) {
    let result = &review.result;
    println!(
        "{} on {}: {}% ({} of {} correct, {:?})",
        result.student_id,
        result.quiz_id,
        result.percentage,
        result.correct_count,
        result.total_questions,
        result.completion
    );

    let mut table = Table::new();
    table.set_header(vec!["#", "Question", "Your answer", "Correct answer", "Result"]);

    for item in &review.items {
        let recorded = item
            .recorded
            .as_ref()
            .map(|a| describe_answer(&item.question, a))
            .unwrap_or_else(|| "(no answer)".to_string());
        table.add_row(vec![
            Cell::new(item.index + 1),
            Cell::new(&item.question.prompt),
            Cell::new(recorded),
            Cell::new(describe_answer(&item.question, &item.expected)),
            Cell::new(if item.correct { "correct" } else { "incorrect" }),
        ]);
    }

    println!("{table}");
}
