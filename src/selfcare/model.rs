use serde::{Deserialize, Serialize};

use crate::storage::{ActivityRow, CompletionDetailRow, ProgressRow};

#[derive(Debug, Deserialize, Default)]
pub struct CompleteActivityRequest {
    /// 1..=5 star rating.
    pub rating: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserProgress {
    pub total_completions: i64,
    pub last_completed_at: Option<String>,
    pub is_favorite: bool,
}

impl From<ProgressRow> for UserProgress {
    fn from(row: ProgressRow) -> Self {
        Self {
            total_completions: row.total_completions,
            last_completed_at: row.last_completed_at,
            is_favorite: row.is_favorite,
        }
    }
}

/// An activity with the caller's progress attached (None = never touched).
#[derive(Debug, Clone, Serialize)]
pub struct Activity {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub duration_minutes: i64,
    pub difficulty_level: String,
    pub instructions: Vec<String>,
    pub benefits: Vec<String>,
    pub mood_tags: Vec<String>,
    pub icon_name: Option<String>,
    pub user_progress: Option<UserProgress>,
}

impl Activity {
    pub fn from_row(row: ActivityRow, progress: Option<ProgressRow>) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            category: row.category,
            duration_minutes: row.duration_minutes,
            difficulty_level: row.difficulty_level,
            instructions: parse_json_list(&row.instructions),
            benefits: parse_json_list(&row.benefits),
            mood_tags: parse_json_list(&row.mood_tags),
            icon_name: row.icon_name,
            user_progress: progress.map(UserProgress::from),
        }
    }
}

/// Stored as a JSON array of strings; a malformed value degrades to empty
/// rather than failing the whole listing.
fn parse_json_list(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentCompletion {
    pub activity_id: i64,
    pub title: String,
    pub category: String,
    pub rating: Option<i64>,
    pub completed_at: String,
}

impl From<CompletionDetailRow> for RecentCompletion {
    fn from(row: CompletionDetailRow) -> Self {
        Self {
            activity_id: row.activity_id,
            title: row.title,
            category: row.category,
            rating: row.rating,
            completed_at: row.completed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_json_list_degrades_to_empty() {
        assert!(parse_json_list("not json").is_empty());
        assert_eq!(parse_json_list(r#"["a","b"]"#), vec!["a", "b"]);
    }

    #[test]
    fn activity_attaches_progress() {
        let row = ActivityRow {
            id: 1,
            title: "Box Breathing".into(),
            description: "Slow, even breaths".into(),
            category: "breathing".into(),
            duration_minutes: 5,
            difficulty_level: "beginner".into(),
            instructions: r#"["Inhale 4s","Hold 4s","Exhale 4s","Hold 4s"]"#.into(),
            benefits: r#"["Calms the nervous system"]"#.into(),
            mood_tags: r#"["anxious","stressed"]"#.into(),
            icon_name: Some("wind".into()),
        };
        let activity = Activity::from_row(row, None);
        assert_eq!(activity.instructions.len(), 4);
        assert!(activity.user_progress.is_none());
    }
}
