//! The `quizline stats` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use quizline_core::statistics::{compute_quiz_stats, QuizStats};
use quizline_core::traits::{QuestionSource, ResultSource};
use quizline_store::{load_config_from, FileStore};

pub async fn execute(quiz_id: String, format: String, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let store = FileStore::new(&config.data_dir);

    let questions = store.fetch_questions(&quiz_id).await?;
    let results = store.results_for_quiz(&quiz_id).await?;
    let stats = compute_quiz_stats(&quiz_id, &results, &questions, config.pass_threshold);

    match format.as_str() {
        "table" => print_stats(&stats),
        "json" => println!("{}", serde_json::to_string_pretty(&stats)?),
        other => anyhow::bail!("unknown format: {other} (expected table or json)"),
    }

    Ok(())
}

fn print_stats(stats: &QuizStats) {
    if stats.attempts == 0 {
        println!("No results stored for quiz {}.", stats.quiz_id);
        return;
    }

    println!("Quiz: {}", stats.quiz_id);
    println!("Attempts: {}", stats.attempts);
    println!("Average: {:.1}%", stats.average_percentage);
    println!(
        "Best / worst: {}% / {}%",
        stats.best_percentage, stats.worst_percentage
    );
    println!(
        "Pass rate (>= {}%): {:.1}%",
        stats.pass_threshold,
        stats.pass_rate * 100.0
    );
    println!("Timed out: {}", stats.timed_out);

    let mut table = Table::new();
    table.set_header(vec!["Question", "Prompt", "Correct", "Rate"]);
    for q in &stats.per_question {
        table.add_row(vec![
            Cell::new(&q.question_id),
            Cell::new(&q.prompt),
            Cell::new(format!("{}/{}", q.correct, q.attempts)),
            Cell::new(format!("{:.1}%", q.correct_rate * 100.0)),
        ]);
    }

    println!("\n{table}");
}
