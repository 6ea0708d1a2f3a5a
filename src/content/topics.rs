//! Topic catalog
//!
//! Topics are fixed; their cached card lists are what grows over time.

use serde::Serialize;

/// Top-level grouping shown on the category grid and the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Vocabulary,
    Grammar,
    Speaking,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Vocabulary => "Vocabulary",
            Category::Grammar => "Grammar",
            Category::Speaking => "Speaking",
        }
    }
}

/// Which card shape a topic produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentKind {
    /// Plain vocabulary words
    Term,
    /// Verbs with conjugation tables
    Verb,
    /// Adjectives with masculine/feminine forms
    Adjective,
    /// Article topics: one overview card plus article + noun terms
    Article,
}

impl ContentKind {
    /// Maximum number of cached cards per topic
    pub fn cap(&self) -> usize {
        match self {
            ContentKind::Term | ContentKind::Article => 40,
            ContentKind::Verb | ContentKind::Adjective => 100,
        }
    }

    /// Seeding runs while the cache holds fewer cards than this
    pub fn seed_threshold(&self) -> usize {
        self.cap()
    }

    /// Cards requested per generation call
    pub fn batch_size(&self) -> usize {
        match self {
            ContentKind::Term | ContentKind::Article => 10,
            ContentKind::Verb | ContentKind::Adjective => 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: &'static str,
    pub name: &'static str,
    pub category: Category,
    pub kind: ContentKind,
    pub emoji: &'static str,
    /// What the generated cards should cover
    pub focus: &'static str,
}

const fn topic(
    id: &'static str,
    name: &'static str,
    category: Category,
    kind: ContentKind,
    emoji: &'static str,
    focus: &'static str,
) -> Topic {
    Topic { id, name, category, kind, emoji, focus }
}

static TOPICS: [Topic; 14] = [
    topic("animals", "Animals", Category::Vocabulary, ContentKind::Term, "🐶",
        "pets, farm animals and zoo animals, each with its article (le/la)"),
    topic("colors", "Colours", Category::Vocabulary, ContentKind::Term, "🎨",
        "colours and colourful everyday objects"),
    topic("numbers", "Numbers", Category::Vocabulary, ContentKind::Term, "🔢",
        "numbers from zero to one hundred and counting things"),
    topic("food", "Food", Category::Vocabulary, ContentKind::Term, "🍎",
        "fruit, vegetables, snacks and meals, each with its article"),
    topic("family", "Family", Category::Vocabulary, ContentKind::Term, "👪",
        "family members and words for people at home"),
    topic("body", "My Body", Category::Vocabulary, ContentKind::Term, "🖐️",
        "parts of the body and face"),
    topic("clothes", "Clothes", Category::Vocabulary, ContentKind::Term, "👕",
        "clothes, shoes and accessories"),
    topic("weather", "Weather", Category::Vocabulary, ContentKind::Term, "🌦️",
        "weather expressions and seasons"),
    topic("school", "School", Category::Vocabulary, ContentKind::Term, "🏫",
        "classroom objects and school activities"),
    topic("greetings", "Greetings", Category::Vocabulary, ContentKind::Term, "👋",
        "greetings, polite phrases and simple questions"),
    topic("er-verbs", "-ER Verbs", Category::Grammar, ContentKind::Verb, "🏃",
        "common regular -er verbs in the present tense"),
    topic("irregular-verbs", "Irregular Verbs", Category::Grammar, ContentKind::Verb, "⭐",
        "common irregular verbs such as être, avoir, aller and faire in the present tense"),
    topic("adjectives", "Adjectives", Category::Grammar, ContentKind::Adjective, "🌈",
        "describing words with their masculine and feminine forms"),
    topic("articles", "Le, La, Les", Category::Grammar, ContentKind::Article, "📚",
        "definite and indefinite articles (le, la, l', les, un, une, des) with nouns"),
];

pub fn all_topics() -> &'static [Topic] {
    &TOPICS
}

/// Look up a topic by id (case-insensitive)
pub fn find_topic(id: &str) -> Option<&'static Topic> {
    let id = id.trim();
    TOPICS.iter().find(|t| t.id.eq_ignore_ascii_case(id))
}

pub fn topics_in(category: Category) -> impl Iterator<Item = &'static Topic> {
    TOPICS.iter().filter(move |t| t.category == category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_topic_ids_unique() {
        let ids: HashSet<&str> = all_topics().iter().map(|t| t.id).collect();
        assert_eq!(ids.len(), all_topics().len());
    }

    #[test]
    fn test_find_topic() {
        assert_eq!(find_topic("Animals").unwrap().id, "animals");
        assert_eq!(find_topic(" er-verbs ").unwrap().kind, ContentKind::Verb);
        assert!(find_topic("dinosaurs").is_none());
    }

    #[test]
    fn test_caps_per_kind() {
        assert_eq!(ContentKind::Term.cap(), 40);
        assert_eq!(ContentKind::Verb.cap(), 100);
        for topic in all_topics() {
            assert!(topic.kind.batch_size() <= topic.kind.cap());
            assert!(topic.kind.seed_threshold() <= topic.kind.cap());
        }
    }

    #[test]
    fn test_no_speaking_topics_in_catalog() {
        assert_eq!(topics_in(Category::Speaking).count(), 0);
        assert_eq!(topics_in(Category::Grammar).count(), 4);
    }
}
