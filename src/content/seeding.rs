//! On-demand generation of topic cards
//!
//! A seed call asks the text model for one batch of new cards, appends the
//! valid ones to the cached list and truncates to the kind's cap. Failures
//! never reach the caller: the pre-call list is returned instead.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Deserialize;

use super::cache::ContentCache;
use super::models::*;
use super::topics::{ContentKind, Topic};
use crate::ai::{generate_json, GenerativeClient, ResponseSchema, TextRequest};

// ===== Raw model output =====

/// Card as the model returns it. Which fields are present depends on the
/// requested kind; `into_item` picks the right variant.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawCard {
    pub french: Option<String>,
    pub english: Option<String>,
    pub example_french: Option<String>,
    pub example_english: Option<String>,
    pub phonetic: Option<String>,
    pub feminine: Option<String>,
    pub conjugations: Option<Vec<RawConjugation>>,
    pub is_overview: Option<bool>,
    pub examples: Option<Vec<RawExample>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawConjugation {
    pub pronoun: String,
    pub form: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawExample {
    pub french: String,
    pub english: String,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl RawCard {
    /// Validate and convert into a typed card. `None` when a field the kind
    /// needs is missing or blank.
    pub fn into_item(self, kind: ContentKind) -> Option<ContentItem> {
        if kind == ContentKind::Article && self.is_overview == Some(true) {
            let examples: Vec<ExamplePair> = self
                .examples
                .unwrap_or_default()
                .into_iter()
                .filter(|e| !e.french.trim().is_empty())
                .map(|e| ExamplePair {
                    french: e.french.trim().to_string(),
                    english: e.english.trim().to_string(),
                })
                .collect();
            return Some(ContentItem::ArticleOverview(OverviewCard {
                title: non_empty(self.french)?,
                explanation: non_empty(self.english)?,
                examples,
            }));
        }

        let french = non_empty(self.french)?;
        let english = non_empty(self.english)?;
        let example = ExamplePair {
            french: non_empty(self.example_french)?,
            english: non_empty(self.example_english).unwrap_or_default(),
        };
        let phonetic = non_empty(self.phonetic);

        let item = match kind {
            ContentKind::Term | ContentKind::Article => ContentItem::Term(TermCard {
                french,
                english,
                example,
                phonetic,
            }),
            ContentKind::Verb => {
                let conjugations: Vec<Conjugation> = self
                    .conjugations
                    .unwrap_or_default()
                    .into_iter()
                    .filter(|c| !c.pronoun.trim().is_empty() && !c.form.trim().is_empty())
                    .map(|c| Conjugation {
                        pronoun: c.pronoun.trim().to_string(),
                        form: c.form.trim().to_string(),
                    })
                    .collect();
                if conjugations.is_empty() {
                    return None;
                }
                ContentItem::Verb(VerbCard {
                    infinitive: french,
                    english,
                    example,
                    phonetic,
                    conjugations,
                })
            }
            ContentKind::Adjective => ContentItem::Adjective(AdjectiveCard {
                feminine: non_empty(self.feminine).unwrap_or_else(|| french.clone()),
                masculine: french,
                english,
                example,
                phonetic,
            }),
        };
        Some(item)
    }
}

// ===== Prompt and schema =====

/// Declared response shape for a batch of cards of the given kind
pub fn schema_for(kind: ContentKind) -> ResponseSchema {
    let mut card = ResponseSchema::object()
        .described("french", ResponseSchema::String, "The French word or phrase")
        .described("english", ResponseSchema::String, "English meaning")
        .required("exampleFrench", ResponseSchema::String)
        .required("exampleEnglish", ResponseSchema::String)
        .described(
            "phonetic",
            ResponseSchema::String,
            "Simple pronunciation guide for an English-speaking child",
        );

    match kind {
        ContentKind::Term => {}
        ContentKind::Verb => {
            let row = ResponseSchema::object()
                .required("pronoun", ResponseSchema::String)
                .required("form", ResponseSchema::String);
            card = card.required("conjugations", ResponseSchema::array_of(row));
        }
        ContentKind::Adjective => {
            card = card.described("feminine", ResponseSchema::String, "Feminine form");
        }
        ContentKind::Article => {
            let example = ResponseSchema::object()
                .required("french", ResponseSchema::String)
                .required("english", ResponseSchema::String);
            card = card
                .optional("isOverview", ResponseSchema::Boolean)
                .optional("examples", ResponseSchema::array_of(example));
        }
    }

    ResponseSchema::array_of(card)
}

fn kind_instructions(kind: ContentKind, has_overview: bool) -> &'static str {
    match kind {
        ContentKind::Term => "Each card is one word or short phrase, with its article when it is a noun.",
        ContentKind::Verb => {
            "Each card is a verb in the infinitive. Give the full present tense \
             conjugation for je, tu, il/elle, nous, vous and ils/elles."
        }
        ContentKind::Adjective => {
            "Each card is an adjective. Put the masculine form in \"french\" and the \
             feminine form in \"feminine\"."
        }
        ContentKind::Article if has_overview => {
            "Each card is a noun with its article, chosen to show when each article is used."
        }
        ContentKind::Article => {
            "The first card must be an overview with isOverview set to true: \"french\" is a \
             short title, \"english\" explains the rule simply, and \"examples\" lists a few \
             example pairs. The other cards are nouns with their article."
        }
    }
}

/// Build the seeding prompt. Existing headwords are listed so the model
/// avoids repeating them.
pub fn build_prompt(
    topic: &Topic,
    existing: &[ContentItem],
    learner_name: Option<&str>,
) -> String {
    let kind = topic.kind;
    let has_overview = existing.iter().any(ContentItem::is_overview);
    let learner = match learner_name {
        Some(name) if !name.trim().is_empty() => format!("a child named {}", name.trim()),
        _ => "a young child".to_string(),
    };

    let mut prompt = format!(
        "You are creating French flashcards for {} who speaks English.\n\
         Topic: {} ({}).\n\
         Create {} new cards. {}\n\
         Keep example sentences short, cheerful and suitable for ages 5 to 10.\n",
        learner,
        topic.name,
        topic.focus,
        kind.batch_size(),
        kind_instructions(kind, has_overview),
    );

    let known: Vec<&str> = existing.iter().map(ContentItem::headword).collect();
    if !known.is_empty() {
        prompt.push_str(&format!(
            "Do not repeat any of these existing cards: {}.\n",
            known.join(", ")
        ));
    }
    prompt
}

fn dedupe_key(item: &ContentItem) -> String {
    item.headword().trim().to_lowercase()
}

// ===== Seeder =====

#[derive(Clone)]
pub struct Seeder {
    client: Arc<dyn GenerativeClient>,
    cache: ContentCache,
    learner_name: Option<String>,
}

impl Seeder {
    pub fn new(client: Arc<dyn GenerativeClient>, cache: ContentCache) -> Self {
        Self {
            client,
            cache,
            learner_name: None,
        }
    }

    pub fn with_learner_name(mut self, name: Option<String>) -> Self {
        self.learner_name = name;
        self
    }

    pub fn cache(&self) -> &ContentCache {
        &self.cache
    }

    pub fn client(&self) -> &Arc<dyn GenerativeClient> {
        &self.client
    }

    /// Fill a topic's cache by one batch if it is below the threshold.
    ///
    /// Returns the merged list, or the unchanged pre-call list when the topic
    /// is already full or anything goes wrong.
    pub async fn seed(&self, topic: &Topic) -> Vec<ContentItem> {
        let existing = self.cache.load(topic.id);
        let kind = topic.kind;
        if existing.len() >= kind.seed_threshold() {
            log::debug!(
                "Topic {} already has {} cards, skipping seed",
                topic.id,
                existing.len()
            );
            return existing;
        }

        let request = TextRequest::new(build_prompt(topic, &existing, self.learner_name.as_deref()))
            .with_schema(schema_for(kind))
            .with_temperature(0.9);

        let raw: Vec<RawCard> = match generate_json(self.client.as_ref(), request).await {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("Seeding {} failed: {}", topic.id, e);
                return existing;
            }
        };

        let merged = merge_batch(&existing, raw, kind);
        if merged.len() == existing.len() {
            log::info!("Seeding {} produced no new cards", topic.id);
            return existing;
        }

        if let Err(e) = self.cache.save(topic.id, &merged) {
            log::error!("Failed to persist seeded cards for {}: {}", topic.id, e);
            return existing;
        }

        log::info!(
            "Seeded {}: {} -> {} cards",
            topic.id,
            existing.len(),
            merged.len()
        );
        merged
    }
}

/// Existing cards followed by the valid, unseen cards of a batch, truncated
/// to the cap. An article topic keeps a single overview card.
fn merge_batch(existing: &[ContentItem], raw: Vec<RawCard>, kind: ContentKind) -> Vec<ContentItem> {
    let mut seen: HashSet<String> = existing.iter().map(dedupe_key).collect();
    let mut has_overview = existing.iter().any(ContentItem::is_overview);
    let mut merged = existing.to_vec();

    for item in raw.into_iter().filter_map(|card| card.into_item(kind)) {
        if item.is_overview() {
            if has_overview {
                continue;
            }
            has_overview = true;
        }
        if seen.insert(dedupe_key(&item)) {
            merged.push(item);
        }
    }

    merged.truncate(kind.cap().max(existing.len()));
    merged
}
