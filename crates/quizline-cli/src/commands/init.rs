//! The `quizline init` command.

use std::path::Path;

use anyhow::{Context, Result};

const CONFIG_PATH: &str = "quizline.toml";
const EXAMPLE_QUIZ_PATH: &str = "quizline-data/quizzes/example.toml";

pub fn execute() -> Result<()> {
    if Path::new(CONFIG_PATH).exists() {
        println!("{CONFIG_PATH} already exists, skipping.");
    } else {
        std::fs::write(CONFIG_PATH, SAMPLE_CONFIG)
            .with_context(|| format!("failed to write {CONFIG_PATH}"))?;
        println!("Created {CONFIG_PATH}");
    }

    let example_path = Path::new(EXAMPLE_QUIZ_PATH);
    if example_path.exists() {
        println!("{EXAMPLE_QUIZ_PATH} already exists, skipping.");
    } else {
        if let Some(parent) = example_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        std::fs::write(example_path, EXAMPLE_QUIZ)
            .with_context(|| format!("failed to write {EXAMPLE_QUIZ_PATH}"))?;
        println!("Created {EXAMPLE_QUIZ_PATH}");
    }

    println!("\nNext steps:");
    println!("  1. Run: quizline validate --quiz-file {EXAMPLE_QUIZ_PATH}");
    println!("  2. Run: quizline take --quiz example --student you");
    println!("  3. Run: quizline review --quiz example --student you");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizline configuration

# Quizzes live in <data_dir>/quizzes, results in <data_dir>/results.
data_dir = "./quizline-data"

# Used for quizzes that do not set time_limit_minutes.
default_time_limit_minutes = 30

# Minimum percentage counted as a pass by `quizline stats`.
pass_threshold = 50

# How long saving a result may take before it is reported as failed.
persist_timeout_ms = 10000
"#;

const EXAMPLE_QUIZ: &str = r#"[quiz]
id = "example"
title = "Example Quiz"
description = "One question of each kind"
time_limit_minutes = 5

[[questions]]
id = "capital"
type = "multiple-choice"
prompt = "What is the capital of Australia?"
options = [
    { id = "syd", text = "Sydney" },
    { id = "can", text = "Canberra" },
    { id = "mel", text = "Melbourne" },
]
correct_option_id = "can"

[[questions]]
id = "primes"
type = "multi-select"
prompt = "Which of these numbers are prime?"
options = [
    { id = "two", text = "2" },
    { id = "nine", text = "9" },
    { id = "eleven", text = "11" },
    { id = "fifteen", text = "15" },
]
correct_option_ids = ["two", "eleven"]

[[questions]]
id = "planets"
type = "ordering"
prompt = "Order these planets by distance from the Sun, nearest first"
options = [
    { id = "mars", text = "Mars" },
    { id = "mercury", text = "Mercury" },
    { id = "earth", text = "Earth" },
]
correct_order = ["mercury", "earth", "mars"]

[[questions]]
id = "water"
type = "short-answer"
prompt = "What is the chemical formula of water?"
correct_answer = "H2O"
"#;
