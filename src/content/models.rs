//! Data models for flashcard content

use serde::{Deserialize, Serialize};

/// A French sentence with its English translation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamplePair {
    pub french: String,
    pub english: String,
}

/// A plain vocabulary word or phrase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermCard {
    pub french: String,
    pub english: String,
    pub example: ExamplePair,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phonetic: Option<String>,
}

/// One row of a conjugation table ("je" → "mange")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conjugation {
    pub pronoun: String,
    pub form: String,
}

/// A verb with its present-tense conjugation table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerbCard {
    pub infinitive: String,
    pub english: String,
    pub example: ExamplePair,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phonetic: Option<String>,
    pub conjugations: Vec<Conjugation>,
}

/// An adjective with masculine and feminine forms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjectiveCard {
    pub masculine: String,
    pub feminine: String,
    pub english: String,
    pub example: ExamplePair,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phonetic: Option<String>,
}

/// A grammar overview card (e.g. "le, la, les") with extra examples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewCard {
    pub title: String,
    pub explanation: String,
    pub examples: Vec<ExamplePair>,
}

/// A flashcard. Each kind carries exactly the fields it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ContentItem {
    Term(TermCard),
    Verb(VerbCard),
    Adjective(AdjectiveCard),
    ArticleOverview(OverviewCard),
}

impl ContentItem {
    /// The French word shown on the front of the card
    pub fn headword(&self) -> &str {
        match self {
            ContentItem::Term(card) => &card.french,
            ContentItem::Verb(card) => &card.infinitive,
            ContentItem::Adjective(card) => &card.masculine,
            ContentItem::ArticleOverview(card) => &card.title,
        }
    }

    /// English meaning (or explanation, for overviews)
    pub fn translation(&self) -> &str {
        match self {
            ContentItem::Term(card) => &card.english,
            ContentItem::Verb(card) => &card.english,
            ContentItem::Adjective(card) => &card.english,
            ContentItem::ArticleOverview(card) => &card.explanation,
        }
    }

    /// Main example sentence, if the card has one
    pub fn example(&self) -> Option<&ExamplePair> {
        match self {
            ContentItem::Term(card) => Some(&card.example),
            ContentItem::Verb(card) => Some(&card.example),
            ContentItem::Adjective(card) => Some(&card.example),
            ContentItem::ArticleOverview(card) => card.examples.first(),
        }
    }

    pub fn phonetic(&self) -> Option<&str> {
        match self {
            ContentItem::Term(card) => card.phonetic.as_deref(),
            ContentItem::Verb(card) => card.phonetic.as_deref(),
            ContentItem::Adjective(card) => card.phonetic.as_deref(),
            ContentItem::ArticleOverview(_) => None,
        }
    }

    /// Whether this card explains a rule rather than teaching a word
    pub fn is_overview(&self) -> bool {
        matches!(self, ContentItem::ArticleOverview(_))
    }

    /// One-line summary used when embedding cards into prompts
    pub fn prompt_line(&self) -> String {
        match self {
            ContentItem::Term(card) => format!("{} = {}", card.french, card.english),
            ContentItem::Verb(card) => {
                let forms: Vec<String> = card
                    .conjugations
                    .iter()
                    .map(|c| format!("{} {}", c.pronoun, c.form))
                    .collect();
                format!("{} = {} ({})", card.infinitive, card.english, forms.join(", "))
            }
            ContentItem::Adjective(card) => format!(
                "{} / {} = {}",
                card.masculine, card.feminine, card.english
            ),
            ContentItem::ArticleOverview(card) => {
                format!("{}: {}", card.title, card.explanation)
            }
        }
    }
}
