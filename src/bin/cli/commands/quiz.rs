use anyhow::{bail, Result};

use lumiere_lib::progress::ProgressAction;
use lumiere_lib::quiz::{QuizQuestion, QuizSession};

use crate::app::{read_line, App};
use crate::render::terminal::{paint, Color};
use crate::OutputFormat;

pub fn run(app: &App, topic_name: &str, format: &OutputFormat, use_color: bool) -> Result<()> {
    let topic = app.find_topic(topic_name)?;
    let generator = app.ctx.quiz_generator();
    let questions = app.runtime.block_on(generator.generate(topic));

    // JSON output lists the questions without playing them. An empty quiz is
    // an empty list there, not an error.
    if let OutputFormat::Json = format {
        if questions.is_empty() {
            log::warn!("No quiz questions for {}", topic.id);
        }
        println!("{}", questions_json(&questions)?);
        return Ok(());
    }

    if questions.is_empty() {
        bail!("Could not build a quiz for {}. Check your API key and try again.", topic.name);
    }

    let mut session = QuizSession::new(questions);
    let total = session.len();
    let title = format!("{} {} quiz", topic.emoji, topic.name);
    println!("{}", paint(&title, Color::BOLD, use_color));

    while let Some(question) = session.current_question().cloned() {
        println!();
        let heading = format!("{}/{}. {}", session.position() + 1, total, question.question);
        println!("{}", paint(&heading, Color::BOLD, use_color));
        for (i, option) in question.options.iter().enumerate() {
            println!("  {}) {}", i + 1, option);
        }
        print!("> ");
        std::io::Write::flush(&mut std::io::stdout()).ok();

        let Some(input) = read_line() else {
            println!();
            println!("Quiz abandoned.");
            return Ok(());
        };
        let answer = resolve_answer(&question, &input);

        if let Some(outcome) = session.answer(&answer) {
            if outcome.correct {
                let message = format!("Bravo ! +{} stars", outcome.points_awarded);
                println!("{}", paint(&message, Color::GREEN, use_color));
            } else {
                let message = format!("Not quite. The answer is: {}", outcome.correct_answer);
                println!("{}", paint(&message, Color::YELLOW, use_color));
            }
            if !outcome.explanation.is_empty() {
                println!("{}", paint(&outcome.explanation, Color::GRAY, use_color));
            }
        }
    }

    let points = session.points();
    let state = app
        .ctx
        .progress
        .dispatch(ProgressAction::record(topic.category, topic.id, points));

    println!();
    println!(
        "{} correct out of {}. You earned {} stars ({} in total).",
        session.correct_count(),
        total,
        points,
        state.stars
    );

    Ok(())
}

fn questions_json(questions: &[QuizQuestion]) -> Result<String> {
    Ok(serde_json::to_string_pretty(questions)?)
}

/// Accept either the option number or the option text
fn resolve_answer(question: &QuizQuestion, input: &str) -> String {
    input
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| question.options.get(i))
        .cloned()
        .unwrap_or_else(|| input.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question() -> QuizQuestion {
        QuizQuestion {
            question: "Comment dit-on 'cat' ?".to_string(),
            options: vec!["le chien".to_string(), "le chat".to_string()],
            correct_answer: "le chat".to_string(),
            explanation: String::new(),
        }
    }

    #[test]
    fn test_resolve_answer_by_number() {
        assert_eq!(resolve_answer(&question(), "2"), "le chat");
        assert_eq!(resolve_answer(&question(), "0"), "0");
        assert_eq!(resolve_answer(&question(), "7"), "7");
    }

    #[test]
    fn test_empty_quiz_is_empty_json_list() {
        let json = questions_json(&[]).unwrap();
        assert_eq!(json, "[]");
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, serde_json::json!([]));
    }

    #[test]
    fn test_questions_json_lists_questions() {
        let json = questions_json(&[question()]).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn test_resolve_answer_by_text() {
        assert_eq!(resolve_answer(&question(), "Le Chat"), "Le Chat");
    }
}
