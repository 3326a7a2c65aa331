//! Response models for the achievements endpoint.

use serde::Serialize;

use super::catalog::RequirementKind;

/// One catalog definition merged with the caller's unlock state and progress.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluatedAchievement {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub category: String,
    /// "bronze" | "silver" | "gold" | "master"
    pub tier: String,
    /// Which statistic the requirement measures.
    pub requirement_type: RequirementKind,
    pub requirement_value: u64,
    pub is_unlocked: bool,
    /// RFC 3339; present only when unlocked.
    pub unlocked_at: Option<String>,
    /// Current statistic value, capped at `requirement_value`.
    pub progress: u64,
    pub progress_total: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AchievementsResponse {
    pub achievements: Vec<EvaluatedAchievement>,
    pub total_unlocked: u64,
    pub completion_percentage: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluated_achievement_serializes_unlock_state() {
        let a = EvaluatedAchievement {
            id: "first_steps".into(),
            title: "First Steps".into(),
            description: "Complete your first self-care activity".into(),
            icon: "🌱".into(),
            category: "Activity".into(),
            tier: "bronze".into(),
            requirement_type: RequirementKind::Completions,
            requirement_value: 1,
            is_unlocked: true,
            unlocked_at: Some("2026-08-20T10:00:00+00:00".into()),
            progress: 1,
            progress_total: 1,
        };
        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json["is_unlocked"], true);
        assert_eq!(json["progress"], 1);
        assert_eq!(json["tier"], "bronze");
        assert_eq!(json["requirement_type"], "completions");
    }

    #[test]
    fn response_carries_summary_fields() {
        let resp = AchievementsResponse {
            achievements: vec![],
            total_unlocked: 4,
            completion_percentage: 25.0,
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["total_unlocked"], 4);
        assert_eq!(json["completion_percentage"], 25.0);
    }
}
