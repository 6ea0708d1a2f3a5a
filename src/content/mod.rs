//! Flashcard content: topic catalog, card model, cache and seeding

mod cache;
pub mod models;
pub mod seeding;
pub mod topics;

pub use cache::ContentCache;
pub use models::*;
pub use seeding::Seeder;
pub use topics::{all_topics, find_topic, topics_in, Category, ContentKind, Topic};
