//! Grading state for one quiz run

use super::models::{AnswerOutcome, QuizQuestion};

pub const POINTS_PER_CORRECT_ANSWER: u32 = 10;

pub struct QuizSession {
    questions: Vec<QuizQuestion>,
    current: usize,
    correct: usize,
}

impl QuizSession {
    pub fn new(questions: Vec<QuizQuestion>) -> Self {
        Self {
            questions,
            current: 0,
            correct: 0,
        }
    }

    /// The question waiting for an answer, `None` once finished
    pub fn current_question(&self) -> Option<&QuizQuestion> {
        self.questions.get(self.current)
    }

    /// Zero-based index of the current question
    pub fn position(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn is_finished(&self) -> bool {
        self.current >= self.questions.len()
    }

    /// Grade an answer to the current question and advance
    pub fn answer(&mut self, answer: &str) -> Option<AnswerOutcome> {
        let question = self.questions.get(self.current)?;
        let correct = question.is_correct(answer);
        let outcome = AnswerOutcome {
            correct,
            correct_answer: question.correct_answer.clone(),
            explanation: question.explanation.clone(),
            points_awarded: if correct { POINTS_PER_CORRECT_ANSWER } else { 0 },
        };
        if correct {
            self.correct += 1;
        }
        self.current += 1;
        Some(outcome)
    }

    pub fn correct_count(&self) -> usize {
        self.correct
    }

    /// Points earned so far, recorded in the history when the quiz ends
    pub fn points(&self) -> u32 {
        self.correct as u32 * POINTS_PER_CORRECT_ANSWER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(answer: &str) -> QuizQuestion {
        QuizQuestion {
            question: "?".to_string(),
            options: vec!["un".to_string(), "deux".to_string()],
            correct_answer: answer.to_string(),
            explanation: "Counting.".to_string(),
        }
    }

    #[test]
    fn test_grading_and_points() {
        let mut session = QuizSession::new(vec![question("un"), question("deux"), question("un")]);

        let first = session.answer("UN").unwrap();
        assert!(first.correct);
        assert_eq!(first.points_awarded, 10);

        let second = session.answer("un").unwrap();
        assert!(!second.correct);
        assert_eq!(second.correct_answer, "deux");

        session.answer("un").unwrap();
        assert!(session.is_finished());
        assert!(session.answer("un").is_none());
        assert_eq!(session.correct_count(), 2);
        assert_eq!(session.points(), 20);
    }

    #[test]
    fn test_empty_session_is_finished() {
        let session = QuizSession::new(Vec::new());
        assert!(session.is_empty());
        assert!(session.is_finished());
        assert!(session.current_question().is_none());
        assert_eq!(session.points(), 0);
    }
}
