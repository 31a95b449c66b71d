//! CLI integration tests using assert_cmd.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const FIRST_OPTION_QUIZ: &str = r#"
[quiz]
id = "first"
title = "Always The First"
time_limit_minutes = 5

[[questions]]
id = "q1"
type = "multiple-choice"
prompt = "Question one"
options = [{ id = "right", text = "Right" }, { id = "wrong", text = "Wrong" }]
correct_option_id = "right"

[[questions]]
id = "q2"
type = "multiple-choice"
prompt = "Question two"
options = [{ id = "right", text = "Right" }, { id = "wrong", text = "Wrong" }]
correct_option_id = "right"

[[questions]]
id = "q3"
type = "multiple-choice"
prompt = "Question three"
options = [{ id = "right", text = "Right" }, { id = "wrong", text = "Wrong" }]
correct_option_id = "right"
"#;

/// A command isolated from the user's config and data.
fn quizline(home: &Path) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("quizline").unwrap();
    cmd.current_dir(home)
        .env("HOME", home)
        .env("QUIZLINE_DATA_DIR", home.join("data"))
        .env_remove("RUST_LOG");
    cmd
}

fn setup() -> TempDir {
    let dir = TempDir::new().unwrap();
    let quizzes = dir.path().join("data/quizzes");
    std::fs::create_dir_all(&quizzes).unwrap();
    std::fs::write(quizzes.join("first.toml"), FIRST_OPTION_QUIZ).unwrap();
    dir
}

fn take(dir: &TempDir, student: &str, input: &str) -> assert_cmd::assert::Assert {
    quizline(dir.path())
        .args(["take", "--quiz", "first", "--student", student, "--seed", "7"])
        .write_stdin(input)
        .assert()
}

#[test]
fn take_all_correct() {
    let dir = setup();
    take(&dir, "alice", "1\n1\n1\n")
        .success()
        .stdout(predicate::str::contains("Always The First: 3 questions"))
        .stdout(predicate::str::contains("Score: 100% (3 of 3 correct)"))
        .stdout(predicate::str::contains("Result saved."));

    assert!(dir.path().join("data/results/first/alice.json").is_file());
}

#[test]
fn take_by_option_id() {
    let dir = setup();
    take(&dir, "alice", "right\nwrong\nright\n")
        .success()
        .stdout(predicate::str::contains("Score: 67% (2 of 3 correct)"));
}

#[test]
fn take_submit_early() {
    let dir = setup();
    take(&dir, "bob", "1\n:submit\n")
        .success()
        .stdout(predicate::str::contains("Score: 33% (1 of 3 correct)"));
}

#[test]
fn take_end_of_input_submits() {
    let dir = setup();
    take(&dir, "carol", "")
        .success()
        .stdout(predicate::str::contains("Score: 0% (0 of 3 correct)"))
        .stdout(predicate::str::contains("Result saved."));
}

#[test]
fn take_rejects_bad_answer_and_keeps_going() {
    let dir = setup();
    take(&dir, "dave", "9\n1\n:next\n:back\n1\n1\n")
        .success()
        .stdout(predicate::str::contains("unknown option: 9"))
        .stdout(predicate::str::contains("Score: 100%"));
}

#[test]
fn take_back_on_first_question_is_reported() {
    let dir = setup();
    take(&dir, "erin", ":back\n:submit\n")
        .success()
        .stdout(predicate::str::contains("[1/3]"))
        .stdout(predicate::str::contains("Score: 0%"));
}

#[test]
fn take_unknown_quiz() {
    let dir = setup();
    quizline(dir.path())
        .args(["take", "--quiz", "missing", "--student", "alice"])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("quiz not found: missing"));
}

#[test]
fn take_rejects_path_like_student() {
    let dir = setup();
    quizline(dir.path())
        .args(["take", "--quiz", "first", "--student", "../evil"])
        .write_stdin(":submit\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("result may not be saved"));
}

#[test]
fn review_after_take() {
    let dir = setup();
    take(&dir, "alice", "1\n2\n1\n").success();

    quizline(dir.path())
        .args(["review", "--quiz", "first", "--student", "alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("67% (2 of 3 correct"))
        .stdout(predicate::str::contains("incorrect"));

    quizline(dir.path())
        .args(["review", "--quiz", "first", "--student", "alice", "--format", "markdown"])
        .assert()
        .success()
        .stdout(predicate::str::contains("**Score:** 67%"));

    quizline(dir.path())
        .args(["review", "--quiz", "first", "--student", "alice", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"percentage\": 67"));
}

#[test]
fn review_without_result() {
    let dir = setup();
    quizline(dir.path())
        .args(["review", "--quiz", "first", "--student", "nobody"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no stored result"));
}

#[test]
fn review_unknown_format() {
    let dir = setup();
    take(&dir, "alice", "1\n1\n1\n").success();
    quizline(dir.path())
        .args(["review", "--quiz", "first", "--student", "alice", "--format", "pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format"));
}

#[test]
fn stats_over_several_students() {
    let dir = setup();
    take(&dir, "alice", "1\n1\n1\n").success();
    take(&dir, "bob", "2\n2\n2\n").success();

    quizline(dir.path())
        .args(["stats", "--quiz", "first"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Attempts: 2"))
        .stdout(predicate::str::contains("Average: 50.0%"))
        .stdout(predicate::str::contains("Best / worst: 100% / 0%"));

    quizline(dir.path())
        .args(["stats", "--quiz", "first", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"attempts\": 2"));
}

#[test]
fn stats_without_results() {
    let dir = setup();
    quizline(dir.path())
        .args(["stats", "--quiz", "first"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No results stored"));
}

#[test]
fn config_file_sets_data_dir() {
    let dir = setup();
    std::fs::write(
        dir.path().join("custom.toml"),
        format!("data_dir = {:?}\n", dir.path().join("data").display().to_string()),
    )
    .unwrap();

    let mut cmd = quizline(dir.path());
    cmd.env_remove("QUIZLINE_DATA_DIR")
        .args(["take", "--quiz", "first", "--student", "alice", "--config", "custom.toml"])
        .write_stdin(":submit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 0%"));
}

#[test]
fn missing_config_file() {
    let dir = setup();
    quizline(dir.path())
        .args(["stats", "--quiz", "first", "--config", "nope.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn validate_sample_quiz() {
    #[allow(deprecated)]
    Command::cargo_bin("quizline")
        .unwrap()
        .arg("validate")
        .arg("--quiz-file")
        .arg("../../quizzes/geography.toml")
        .assert()
        .success()
        .stdout(predicate::str::contains("5 questions"))
        .stdout(predicate::str::contains("All quizzes valid"));
}

#[test]
fn validate_directory() {
    #[allow(deprecated)]
    Command::cargo_bin("quizline")
        .unwrap()
        .arg("validate")
        .arg("--quiz-file")
        .arg("../../quizzes")
        .assert()
        .success()
        .stdout(predicate::str::contains("World Geography"))
        .stdout(predicate::str::contains("Mental Arithmetic"));
}

#[test]
fn validate_reports_broken_question() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(
        &path,
        r#"
[quiz]
id = "broken"
title = "Broken"

[[questions]]
id = "q1"
type = "multiple-choice"
prompt = "Pick"
options = [{ id = "a", text = "A" }, { id = "b", text = "B" }]
correct_option_id = "z"
"#,
    )
    .unwrap();

    #[allow(deprecated)]
    Command::cargo_bin("quizline")
        .unwrap()
        .arg("validate")
        .arg("--quiz-file")
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("[q1] WARNING"))
        .stderr(predicate::str::contains("1 problem(s) found"));
}

#[test]
fn validate_nonexistent_file() {
    #[allow(deprecated)]
    Command::cargo_bin("quizline")
        .unwrap()
        .arg("validate")
        .arg("--quiz-file")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    quizline(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created quizline.toml"))
        .stdout(predicate::str::contains(
            "Created quizline-data/quizzes/example.toml",
        ));

    assert!(dir.path().join("quizline.toml").exists());
    assert!(dir.path().join("quizline-data/quizzes/example.toml").exists());

    quizline(dir.path())
        .args(["validate", "--quiz-file", "quizline-data/quizzes/example.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("All quizzes valid"));
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    quizline(dir.path()).arg("init").assert().success();

    quizline(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn init_then_take_example() {
    let dir = TempDir::new().unwrap();
    quizline(dir.path()).arg("init").assert().success();

    let mut cmd = quizline(dir.path());
    cmd.env_remove("QUIZLINE_DATA_DIR")
        .args(["take", "--quiz", "example", "--student", "you"])
        .write_stdin(":submit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Example Quiz: 4 questions, 5 minute(s)"))
        .stdout(predicate::str::contains("Result saved."));

    assert!(dir
        .path()
        .join("quizline-data/results/example/you.json")
        .is_file());
}
