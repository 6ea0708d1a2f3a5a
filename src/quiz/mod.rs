//! Multiple-choice quizzes built from a topic's cached cards

mod generator;
pub mod models;
mod session;

pub use generator::{QuizGenerator, QUESTIONS_PER_QUIZ, SAMPLE_SIZE};
pub use models::{AnswerOutcome, QuizQuestion};
pub use session::{QuizSession, POINTS_PER_CORRECT_ANSWER};
