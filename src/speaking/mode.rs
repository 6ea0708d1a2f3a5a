//! Coaching modes and their system instructions

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionMode {
    /// Free, gentle conversation
    Conversation,
    /// The coach asks questions about a topic out loud
    OralQuiz,
    /// The learner repeats words and gets a score for each
    Pronunciation,
}

impl SessionMode {
    pub fn label(&self) -> &'static str {
        match self {
            SessionMode::Conversation => "conversation",
            SessionMode::OralQuiz => "oral-quiz",
            SessionMode::Pronunciation => "pronunciation",
        }
    }

    /// System instruction for the live model. `focus_words` are cached cards
    /// of the chosen topic, if any.
    pub fn system_instruction(&self, learner_name: Option<&str>, focus_words: &[String]) -> String {
        let learner = learner_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(|n| format!("a child named {}", n))
            .unwrap_or_else(|| "a young child".to_string());

        let mut instruction = format!(
            "You are Lumière, a warm and patient French coach talking with {} who is \
             learning French and speaks English. Use short sentences, speak slowly and \
             praise every effort.\n",
            learner
        );

        instruction.push_str(match self {
            SessionMode::Conversation => {
                "Have a simple conversation in French. If the child is stuck, help in \
                 English and then repeat the phrase in French."
            }
            SessionMode::OralQuiz => {
                "Run a spoken quiz: ask one question at a time, wait for the answer, say \
                 whether it was right and explain briefly. Keep count of correct answers."
            }
            SessionMode::Pronunciation => {
                "Coach pronunciation: say one word, ask the child to repeat it, then give a \
                 score written as n/10 with one tip. Move on to the next word after each score."
            }
        });

        if !focus_words.is_empty() {
            instruction.push_str(&format!(
                "\nPractise these words: {}.",
                focus_words.join(", ")
            ));
        }
        instruction
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SessionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "conversation" | "chat" => Ok(SessionMode::Conversation),
            "oral-quiz" | "quiz" => Ok(SessionMode::OralQuiz),
            "pronunciation" | "pronounce" => Ok(SessionMode::Pronunciation),
            other => Err(format!("unknown session mode: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruction_mentions_focus_words() {
        let words = vec!["le chat".to_string(), "le chien".to_string()];
        let instruction = SessionMode::Pronunciation.system_instruction(Some("Léa"), &words);
        assert!(instruction.contains("Léa"));
        assert!(instruction.contains("n/10"));
        assert!(instruction.contains("le chat, le chien"));
    }

    #[test]
    fn test_parse_modes() {
        assert_eq!("quiz".parse::<SessionMode>().unwrap(), SessionMode::OralQuiz);
        assert_eq!(
            SessionMode::Pronunciation.to_string().parse::<SessionMode>().unwrap(),
            SessionMode::Pronunciation
        );
        assert!("karaoke".parse::<SessionMode>().is_err());
    }
}
