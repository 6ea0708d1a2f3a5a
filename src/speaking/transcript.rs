//! Running transcript and pronunciation scores of a speaking session

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Learner,
    Coach,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
    /// False while transcription chunks are still arriving
    pub complete: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Transcript {
    turns: Vec<Turn>,
    /// Turns before this index have been handed out for scoring
    #[serde(skip)]
    scored: usize,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transcription chunk, extending the speaker's open turn or
    /// starting a new one. Returns the updated turn.
    pub fn append(&mut self, speaker: Speaker, chunk: &str) -> &Turn {
        let extend = matches!(
            self.turns.last(),
            Some(turn) if turn.speaker == speaker && !turn.complete
        );
        if !extend {
            // The other speaker's open turn ends when this one starts talking
            if let Some(last) = self.turns.last_mut() {
                last.complete = true;
            }
            self.turns.push(Turn {
                speaker,
                text: String::new(),
                complete: false,
            });
        }

        let index = self.turns.len() - 1;
        let turn = &mut self.turns[index];
        turn.text.push_str(chunk);
        &self.turns[index]
    }

    /// Close every open turn. Returns the coach turns closed since the last
    /// call, including ones closed when the learner started talking.
    pub fn complete_turn(&mut self) -> Vec<Turn> {
        for turn in self.turns.iter_mut().filter(|t| !t.complete) {
            turn.complete = true;
        }
        self.take_closed_coach_turns()
    }

    /// Coach turns that have closed and were not returned before. Each turn
    /// is returned once.
    pub fn take_closed_coach_turns(&mut self) -> Vec<Turn> {
        // Only the last turn can still be open
        let end = match self.turns.last() {
            Some(last) if !last.complete => self.turns.len() - 1,
            _ => self.turns.len(),
        };
        if end <= self.scored {
            return Vec::new();
        }
        let closed = self.turns[self.scored..end]
            .iter()
            .filter(|t| t.speaker == Speaker::Coach)
            .cloned()
            .collect();
        self.scored = end;
        closed
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// A score the coach gave, such as "8/10"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PronunciationScore {
    pub value: u32,
    pub out_of: u32,
}

impl PronunciationScore {
    pub fn percent(&self) -> u32 {
        if self.out_of == 0 {
            return 0;
        }
        (self.value * 100 + self.out_of / 2) / self.out_of
    }
}

fn score_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"\b(\d{1,2})\s*/\s*(10|5)\b").ok())
        .as_ref()
}

/// Scores of the form `n/10` or `n/5` in coach output
pub fn parse_scores(text: &str) -> Vec<PronunciationScore> {
    let Some(pattern) = score_pattern() else {
        return Vec::new();
    };
    pattern
        .captures_iter(text)
        .filter_map(|caps| {
            let value: u32 = caps.get(1)?.as_str().parse().ok()?;
            let out_of: u32 = caps.get(2)?.as_str().parse().ok()?;
            (value <= out_of).then_some(PronunciationScore { value, out_of })
        })
        .collect()
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScoreCard {
    scores: Vec<PronunciationScore>,
}

impl ScoreCard {
    pub fn record(&mut self, score: PronunciationScore) {
        self.scores.push(score);
    }

    pub fn scores(&self) -> &[PronunciationScore] {
        &self.scores
    }

    /// Mean percentage over all scores, `None` before the first one
    pub fn average_percent(&self) -> Option<u32> {
        if self.scores.is_empty() {
            return None;
        }
        let total: u32 = self.scores.iter().map(PronunciationScore::percent).sum();
        Some(total / self.scores.len() as u32)
    }

    /// Stars earned for the session: a tenth of each score's percentage
    pub fn points(&self) -> u32 {
        self.scores.iter().map(|s| s.percent() / 10).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partials_extend_open_turn() {
        let mut transcript = Transcript::new();
        transcript.append(Speaker::Learner, "Je ");
        transcript.append(Speaker::Learner, "m'appelle Léa");
        transcript.append(Speaker::Coach, "Bonjour ");
        let turn = transcript.append(Speaker::Coach, "Léa !").clone();

        assert_eq!(transcript.turns().len(), 2);
        assert_eq!(transcript.turns()[0].text, "Je m'appelle Léa");
        assert!(transcript.turns()[0].complete);
        assert_eq!(turn.text, "Bonjour Léa !");
        assert!(!turn.complete);
    }

    #[test]
    fn test_complete_turn_returns_coach_turns() {
        let mut transcript = Transcript::new();
        transcript.append(Speaker::Coach, "Très bien, 8/10");
        let closed = transcript.complete_turn();
        assert_eq!(closed.len(), 1);
        assert!(transcript.complete_turn().is_empty());

        transcript.append(Speaker::Coach, "Encore");
        assert_eq!(transcript.turns().len(), 2);
    }

    #[test]
    fn test_coach_turn_closed_by_learner_is_returned_once() {
        let mut transcript = Transcript::new();
        transcript.append(Speaker::Coach, "Très bien ! 8/10");
        assert!(transcript.take_closed_coach_turns().is_empty());

        transcript.append(Speaker::Learner, "le chat");
        let closed = transcript.take_closed_coach_turns();
        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].text, "Très bien ! 8/10");
        assert!(closed[0].complete);

        // Closing the learner turn later does not hand the coach turn out again
        assert!(transcript.complete_turn().is_empty());
        assert!(transcript.take_closed_coach_turns().is_empty());
    }

    #[test]
    fn test_complete_turn_includes_turns_closed_by_append() {
        let mut transcript = Transcript::new();
        transcript.append(Speaker::Coach, "Bravo, 9/10");
        transcript.append(Speaker::Learner, "le chien");
        transcript.append(Speaker::Coach, "Super, 7/10");

        let closed = transcript.complete_turn();
        let texts: Vec<&str> = closed.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["Bravo, 9/10", "Super, 7/10"]);
    }

    #[test]
    fn test_parse_scores() {
        assert_eq!(
            parse_scores("Super ! 8/10 pour « chat » et 4 / 5 pour « chien »."),
            vec![
                PronunciationScore { value: 8, out_of: 10 },
                PronunciationScore { value: 4, out_of: 5 }
            ]
        );
        assert!(parse_scores("12/10 is not a score, nor is 3/4").is_empty());
        assert!(parse_scores("no scores here").is_empty());
    }

    #[test]
    fn test_score_card_average() {
        let mut card = ScoreCard::default();
        assert_eq!(card.average_percent(), None);
        card.record(PronunciationScore { value: 8, out_of: 10 });
        card.record(PronunciationScore { value: 3, out_of: 5 });
        assert_eq!(card.average_percent(), Some(70));
        assert_eq!(card.points(), 14);
    }
}
