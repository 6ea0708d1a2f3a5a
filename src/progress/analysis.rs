//! Progress report for parents, written by the text model

use serde::{Deserialize, Serialize};

use super::aggregate::DashboardSummary;
use crate::ai::{generate_json, GenerativeClient, ResponseSchema, TextRequest};
use crate::content::find_topic;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentReport {
    pub summary: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub focus_areas: Vec<String>,
    /// Suggested activities to try next
    #[serde(default)]
    pub next_steps: Vec<String>,
}

fn report_schema() -> ResponseSchema {
    let list = || ResponseSchema::array_of(ResponseSchema::String);
    ResponseSchema::object()
        .described("summary", ResponseSchema::String, "Two or three encouraging sentences")
        .required("strengths", list())
        .required("focusAreas", list())
        .described("nextSteps", list(), "Concrete activities to do together at home")
}

fn topic_label(id: &str) -> &str {
    find_topic(id).map(|t| t.name).unwrap_or(id)
}

fn build_report_prompt(summary: &DashboardSummary, learner_name: Option<&str>) -> String {
    let learner = learner_name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or("the child");

    let topics: Vec<String> = summary
        .topics
        .iter()
        .map(|t| format!("- {}: {} points, {}% mastery", topic_label(&t.topic), t.points, t.mastery))
        .collect();
    let categories: Vec<String> = summary
        .categories
        .iter()
        .map(|(category, points)| format!("- {}: {} points", category.label(), points))
        .collect();
    let trend: Vec<String> = summary
        .trend
        .iter()
        .map(|d| format!("{}: {}", d.date, d.points))
        .collect();

    format!(
        "You are a friendly French tutor writing a short progress note for the parents of {}.\n\
         Total points: {} over {} activities.\n\
         Topics:\n{}\n\
         Categories:\n{}\n\
         Points over the last days: {}\n\
         Be warm and specific. Mention topics by name.",
        learner,
        summary.total_points,
        summary.activities,
        topics.join("\n"),
        categories.join("\n"),
        trend.join(", ")
    )
}

/// Ask the model for a parent report. `None` when there is nothing to
/// report yet or the call fails.
pub async fn generate_report(
    client: &dyn GenerativeClient,
    summary: &DashboardSummary,
    learner_name: Option<&str>,
) -> Option<ParentReport> {
    if summary.activities == 0 {
        log::info!("No activities recorded yet, skipping parent report");
        return None;
    }

    let request = TextRequest::new(build_report_prompt(summary, learner_name))
        .with_schema(report_schema())
        .with_temperature(0.7);

    match generate_json::<ParentReport>(client, request).await {
        Ok(report) if !report.summary.trim().is_empty() => Some(report),
        Ok(_) => {
            log::warn!("Parent report came back without a summary");
            None
        }
        Err(e) => {
            log::warn!("Parent report generation failed: {}", e);
            None
        }
    }
}
