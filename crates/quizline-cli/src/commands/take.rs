//! The `quizline take` command.
//!
//! Reads answers line by line from stdin. Besides answers, a line may be
//! `:back`, `:next` (skip), or `:submit`. End of input submits.

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{mpsc, oneshot};

use quizline_core::answer::Answer;
use quizline_core::model::{Question, QuestionKind};
use quizline_core::review::describe_answer;
use quizline_core::session::{Advance, Completion, QuizSession, SessionConfig};
use quizline_core::timer::{format_remaining, TimeThreshold, Timer};
use quizline_store::{load_config_from, FileStore};

enum Input {
    TimeUp,
    /// `None` once stdin is closed.
    Line(Option<String>),
}

pub async fn execute(
    quiz_id: String,
    student_id: String,
    seed: Option<u64>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let store = Arc::new(FileStore::new(&config.data_dir));

    let quiz = store.load_quiz(&quiz_id).await?;
    tracing::debug!(
        "loaded quiz {} ({} questions) from {}",
        quiz.id,
        quiz.questions.len(),
        store.data_dir().display()
    );
    let time_limit = quiz.time_limit_or(config.default_time_limit_minutes);
    anyhow::ensure!(time_limit >= 1, "quiz {quiz_id} has a time limit of 0 minutes");

    let session_config = SessionConfig::new(&student_id, &quiz_id, time_limit)
        .with_persist_timeout(config.persist_timeout());
    let mut session = QuizSession::new(session_config, store);
    match seed {
        Some(seed) => session.start_with_rng(quiz.questions, &mut StdRng::seed_from_u64(seed))?,
        None => session.start(quiz.questions)?,
    }

    println!(
        "{}: {} questions, {} minute(s)",
        quiz.title,
        session.len(),
        time_limit
    );
    println!("Type an answer, or :back, :next, :submit\n");

    let (expired_tx, mut expired_rx) = oneshot::channel();
    let mut timer = Timer::start(time_limit, move || {
        let _ = expired_tx.send(());
    });
    let mut lines = spawn_stdin_reader();

    let completion = loop {
        let Some(question) = session.current_question().cloned() else {
            break session.submit()?;
        };
        print_question(&session, &question, &timer);

        let input = tokio::select! {
            _ = &mut expired_rx => Input::TimeUp,
            line = lines.recv() => Input::Line(line),
        };
        let line = match input {
            Input::TimeUp => {
                println!("\nTime is up.");
                break session.force_complete()?;
            }
            Input::Line(Some(line)) => line,
            Input::Line(None) => break session.submit()?,
        };

        match line.trim() {
            ":submit" => break session.submit()?,
            ":back" => {
                if let Err(e) = session.retreat() {
                    println!("  {e}");
                }
            }
            ":next" => {
                if let Some(done) = advance(&mut session)? {
                    break done;
                }
            }
            "" => {}
            input => match Answer::parse_for(&question, input) {
                Ok(answer) => {
                    session.set_answer(&question.id, answer)?;
                    if let Some(done) = advance(&mut session)? {
                        break done;
                    }
                }
                Err(msg) => println!("  {msg}"),
            },
        }
    };
    timer.cancel();

    let result = &completion.result;
    println!(
        "\nScore: {}% ({} of {} correct)",
        result.percentage, result.correct_count, result.total_questions
    );

    match completion.persistence.outcome().await {
        Ok(()) => println!("Result saved."),
        Err(e) => eprintln!("Warning: {e}"),
    }

    Ok(())
}

fn advance(session: &mut QuizSession) -> Result<Option<Completion>> {
    match session.advance()? {
        Advance::Moved(_) => Ok(None),
        Advance::Completed(completion) => Ok(Some(completion)),
    }
}

/// Read stdin on its own thread so a pending read never holds up exit.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn print_question(session: &QuizSession, question: &Question, timer: &Timer) {
    let marker = match timer.threshold() {
        TimeThreshold::Normal => "",
        TimeThreshold::Warning => " (hurry)",
        TimeThreshold::Danger => " (almost out of time)",
    };
    println!(
        "[{}/{}] {} left{marker}",
        session.index() + 1,
        session.len(),
        format_remaining(timer.remaining())
    );
    println!("{}", question.prompt);

    for (i, option) in question.options.iter().enumerate() {
        println!("  {}. {}", i + 1, option.text);
    }

    let hint = match question.kind {
        QuestionKind::MultipleChoice { .. } => "pick one",
        QuestionKind::MultiSelect { .. } => "pick all that apply, comma-separated",
        QuestionKind::Ordering { .. } => "list every option in order, comma-separated",
        QuestionKind::ShortAnswer { .. } => "type your answer",
    };
    match session.answer_for(&question.id) {
        Some(current) => println!("({hint}; current: {})", describe_answer(question, current)),
        None => println!("({hint})"),
    }
}
