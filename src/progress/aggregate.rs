//! Dashboard aggregation over the history log
//!
//! Everything here is a pure function of the history; nothing is stored.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use super::mastery::mastery_percent;
use super::models::HistoryEntry;
use crate::content::Category;

/// Total points per topic id
pub fn points_by_topic(history: &[HistoryEntry]) -> BTreeMap<String, u32> {
    let mut totals = BTreeMap::new();
    for entry in history {
        let total = totals.entry(entry.topic.clone()).or_insert(0u32);
        *total = total.saturating_add(entry.points);
    }
    totals
}

/// Total points per UTC calendar day
pub fn points_by_day(history: &[HistoryEntry]) -> BTreeMap<NaiveDate, u32> {
    let mut totals = BTreeMap::new();
    for entry in history {
        let total = totals.entry(entry.timestamp.date_naive()).or_insert(0u32);
        *total = total.saturating_add(entry.points);
    }
    totals
}

/// Total points per category
pub fn points_by_category(history: &[HistoryEntry]) -> BTreeMap<Category, u32> {
    let mut totals = BTreeMap::new();
    for entry in history {
        let total = totals.entry(entry.category).or_insert(0u32);
        *total = total.saturating_add(entry.points);
    }
    totals
}

/// Points for each of the last `days` days ending at `today`, zero-filled
pub fn daily_trend(history: &[HistoryEntry], today: NaiveDate, days: u32) -> Vec<DayPoints> {
    let by_day = points_by_day(history);
    (0..i64::from(days))
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset);
            DayPoints {
                date,
                points: by_day.get(&date).copied().unwrap_or(0),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicMastery {
    pub topic: String,
    pub points: u32,
    pub mastery: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayPoints {
    pub date: NaiveDate,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_points: u32,
    pub activities: usize,
    /// Highest mastery first
    pub topics: Vec<TopicMastery>,
    pub categories: BTreeMap<Category, u32>,
    pub trend: Vec<DayPoints>,
}

/// Days shown in the trend chart
pub const TREND_DAYS: u32 = 7;

pub fn summarize(history: &[HistoryEntry], today: NaiveDate) -> DashboardSummary {
    let mut topics: Vec<TopicMastery> = points_by_topic(history)
        .into_iter()
        .map(|(topic, points)| TopicMastery {
            topic,
            mastery: mastery_percent(points),
            points,
        })
        .collect();
    topics.sort_by(|a, b| b.points.cmp(&a.points).then_with(|| a.topic.cmp(&b.topic)));

    DashboardSummary {
        total_points: history.iter().fold(0u32, |acc, e| acc.saturating_add(e.points)),
        activities: history.len(),
        topics,
        categories: points_by_category(history),
        trend: daily_trend(history, today, TREND_DAYS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn entry(topic: &str, category: Category, points: u32, day: u32, hour: u32) -> HistoryEntry {
        HistoryEntry {
            id: Uuid::new_v4(),
            timestamp: Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap(),
            category,
            topic: topic.to_string(),
            points,
            mastery: 0,
        }
    }

    fn history() -> Vec<HistoryEntry> {
        vec![
            entry("animals", Category::Vocabulary, 30, 1, 9),
            entry("animals", Category::Vocabulary, 50, 2, 23),
            entry("er-verbs", Category::Grammar, 40, 2, 1),
            entry("conversation", Category::Speaking, 20, 3, 12),
        ]
    }

    #[test]
    fn test_points_by_topic() {
        let totals = points_by_topic(&history());
        assert_eq!(totals["animals"], 80);
        assert_eq!(totals["er-verbs"], 40);
    }

    #[test]
    fn test_points_by_day_uses_utc_dates() {
        let totals = points_by_day(&history());
        let day2 = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        assert_eq!(totals[&day2], 90);
        assert_eq!(totals.len(), 3);
    }

    #[test]
    fn test_points_by_category() {
        let totals = points_by_category(&history());
        assert_eq!(totals[&Category::Vocabulary], 80);
        assert_eq!(totals[&Category::Grammar], 40);
        assert_eq!(totals[&Category::Speaking], 20);
    }

    #[test]
    fn test_trend_is_zero_filled() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 4).unwrap();
        let trend = daily_trend(&history(), today, 5);
        let points: Vec<u32> = trend.iter().map(|d| d.points).collect();
        assert_eq!(points, vec![0, 30, 90, 20, 0]);
        assert_eq!(trend.last().unwrap().date, today);
    }

    #[test]
    fn test_summary() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 3).unwrap();
        let summary = summarize(&history(), today);
        assert_eq!(summary.total_points, 140);
        assert_eq!(summary.activities, 4);
        assert_eq!(summary.topics[0].topic, "animals");
        assert_eq!(summary.topics[0].mastery, 16);
        assert_eq!(summary.trend.len(), TREND_DAYS as usize);
    }

    #[test]
    fn test_totals_saturate_instead_of_overflowing() {
        let huge = vec![
            entry("animals", Category::Vocabulary, u32::MAX - 5, 1, 9),
            entry("animals", Category::Vocabulary, 10, 1, 10),
            entry("animals", Category::Vocabulary, 10, 1, 11),
        ];
        let day1 = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();

        assert_eq!(points_by_topic(&huge)["animals"], u32::MAX);
        assert_eq!(points_by_day(&huge)[&day1], u32::MAX);
        assert_eq!(points_by_category(&huge)[&Category::Vocabulary], u32::MAX);

        let summary = summarize(&huge, day1);
        assert_eq!(summary.total_points, u32::MAX);
        assert_eq!(summary.topics[0].mastery, 100);
    }

    #[test]
    fn test_empty_history() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 3).unwrap();
        let summary = summarize(&[], today);
        assert_eq!(summary.total_points, 0);
        assert!(summary.topics.is_empty());
        assert!(summary.trend.iter().all(|d| d.points == 0));
    }
}
