use rand::seq::SliceRandom;
use rand::Rng;

use super::models::QuizQuestion;
use crate::ai::{generate_json, ResponseSchema, TextRequest};
use crate::content::{ContentItem, Seeder, Topic};

/// Cards embedded into one quiz prompt
pub const SAMPLE_SIZE: usize = 12;

/// Questions requested (and kept at most) per quiz
pub const QUESTIONS_PER_QUIZ: usize = 5;

pub struct QuizGenerator {
    seeder: Seeder,
}

impl QuizGenerator {
    pub fn new(seeder: Seeder) -> Self {
        Self { seeder }
    }

    /// Generate questions for a topic. An empty topic is seeded first.
    /// Every failure yields an empty list.
    pub async fn generate(&self, topic: &Topic) -> Vec<QuizQuestion> {
        let mut items = self.seeder.cache().load(topic.id);
        if items.is_empty() {
            log::info!("No cards for {} yet, seeding before quiz", topic.id);
            items = self.seeder.seed(topic).await;
        }
        if items.is_empty() {
            log::warn!("Cannot build a quiz for {}: no cards", topic.id);
            return Vec::new();
        }

        let (sample, seed) = sample_items(&items);
        let request = TextRequest::new(build_quiz_prompt(topic, &sample, seed))
            .with_schema(quiz_schema())
            .with_temperature(1.0);

        let questions: Vec<QuizQuestion> =
            match generate_json(self.seeder.client().as_ref(), request).await {
                Ok(questions) => questions,
                Err(e) => {
                    log::warn!("Quiz generation for {} failed: {}", topic.id, e);
                    return Vec::new();
                }
            };

        let kept: Vec<QuizQuestion> = questions
            .into_iter()
            .filter(QuizQuestion::is_well_formed)
            .take(QUESTIONS_PER_QUIZ)
            .collect();
        log::debug!("Quiz for {}: {} questions", topic.id, kept.len());
        kept
    }
}

/// Random subset of the cards plus a random seed that nudges the model
/// towards different questions each time
fn sample_items(items: &[ContentItem]) -> (Vec<ContentItem>, u32) {
    let mut rng = rand::thread_rng();
    let sample = items
        .choose_multiple(&mut rng, SAMPLE_SIZE)
        .cloned()
        .collect();
    (sample, rng.gen())
}

fn quiz_schema() -> ResponseSchema {
    ResponseSchema::array_of(
        ResponseSchema::object()
            .required("question", ResponseSchema::String)
            .required("options", ResponseSchema::array_of(ResponseSchema::String))
            .described(
                "correctAnswer",
                ResponseSchema::String,
                "Must be exactly one of the options",
            )
            .described(
                "explanation",
                ResponseSchema::String,
                "One friendly sentence explaining the answer",
            ),
    )
}

fn build_quiz_prompt(topic: &Topic, sample: &[ContentItem], seed: u32) -> String {
    let cards: Vec<String> = sample
        .iter()
        .map(|item| format!("- {}", item.prompt_line()))
        .collect();

    format!(
        "Write {} multiple-choice questions for a young child learning French.\n\
         Topic: {}.\n\
         Use only these cards:\n{}\n\
         Each question has 3 or 4 short options and exactly one correct answer. \
         Mix French-to-English and English-to-French questions.\n\
         Variation seed: {}",
        QUESTIONS_PER_QUIZ,
        topic.name,
        cards.join("\n"),
        seed
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::mock::ScriptedClient;
    use crate::content::{find_topic, ContentCache, ExamplePair, TermCard};
    use crate::storage::KvStore;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn create_test_generator() -> (QuizGenerator, Arc<ScriptedClient>, ContentCache, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(KvStore::new(temp_dir.path().to_path_buf()).unwrap());
        let cache = ContentCache::new(store);
        let client = Arc::new(ScriptedClient::new());
        let generator = QuizGenerator::new(Seeder::new(client.clone(), cache.clone()));
        (generator, client, cache, temp_dir)
    }

    fn term(french: &str) -> ContentItem {
        ContentItem::Term(TermCard {
            french: french.to_string(),
            english: "thing".to_string(),
            example: ExamplePair {
                french: "Voilà.".to_string(),
                english: "There.".to_string(),
            },
            phonetic: None,
        })
    }

    fn questions(n: usize) -> String {
        let list: Vec<_> = (0..n)
            .map(|i| {
                json!({
                    "question": format!("Question {}?", i),
                    "options": ["a", "b", "c"],
                    "correctAnswer": "a",
                    "explanation": "Because."
                })
            })
            .collect();
        serde_json::to_string(&list).unwrap()
    }

    #[tokio::test]
    async fn test_empty_topic_seeds_before_quiz() {
        let (generator, client, cache, _temp) = create_test_generator();
        let topic = find_topic("animals").unwrap();

        client.push_text(Ok(json!([
            {"french": "le chat", "english": "the cat", "exampleFrench": "Le chat dort.", "exampleEnglish": "The cat sleeps."}
        ])
        .to_string()));
        client.push_text(Ok(questions(5)));

        let quiz = generator.generate(topic).await;

        assert_eq!(client.text_calls(), 2);
        let requests = client.text_requests();
        assert!(requests[0].prompt.contains("flashcards"));
        assert!(requests[1].prompt.contains("le chat = the cat"));
        assert_eq!(cache.count(topic.id), 1);
        assert_eq!(quiz.len(), 5);
    }

    #[tokio::test]
    async fn test_existing_cards_skip_seeding() {
        let (generator, client, cache, _temp) = create_test_generator();
        let topic = find_topic("food").unwrap();
        cache.save(topic.id, &[term("la pomme")]).unwrap();

        client.push_text(Ok(questions(2)));
        let quiz = generator.generate(topic).await;

        assert_eq!(client.text_calls(), 1);
        assert_eq!(quiz.len(), 2);
    }

    #[tokio::test]
    async fn test_malformed_questions_dropped_and_capped() {
        let (generator, client, cache, _temp) = create_test_generator();
        let topic = find_topic("food").unwrap();
        cache.save(topic.id, &[term("la pomme")]).unwrap();

        let mut list: Vec<serde_json::Value> = serde_json::from_str(&questions(6)).unwrap();
        list.push(json!({"question": "", "options": ["a", "b"], "correctAnswer": "a"}));
        list.insert(0, json!({"question": "Only one?", "options": ["a"], "correctAnswer": "a"}));
        client.push_text(Ok(serde_json::to_string(&list).unwrap()));

        let quiz = generator.generate(topic).await;
        assert_eq!(quiz.len(), QUESTIONS_PER_QUIZ);
        assert_eq!(quiz[0].question, "Question 0?");
    }

    #[tokio::test]
    async fn test_failure_yields_empty_quiz() {
        let (generator, client, cache, _temp) = create_test_generator();
        let topic = find_topic("food").unwrap();
        cache.save(topic.id, &[term("la pomme")]).unwrap();

        client.push_text(Ok("not json".to_string()));
        assert!(generator.generate(topic).await.is_empty());
    }

    #[tokio::test]
    async fn test_seed_failure_yields_empty_quiz() {
        let (generator, client, _cache, _temp) = create_test_generator();
        let topic = find_topic("weather").unwrap();

        let quiz = generator.generate(topic).await;
        assert!(quiz.is_empty());
        assert_eq!(client.text_calls(), 1);
    }

    #[test]
    fn test_sample_is_bounded() {
        let items: Vec<ContentItem> = (0..30).map(|i| term(&format!("w{}", i))).collect();
        let (sample, _) = sample_items(&items);
        assert_eq!(sample.len(), SAMPLE_SIZE);

        let (small, _) = sample_items(&items[..3]);
        assert_eq!(small.len(), 3);
    }
}
