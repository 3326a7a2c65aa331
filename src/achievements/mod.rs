//! Gamified achievements: catalog, statistics, evaluation, presentation.
//!
//! Evaluation is read-mostly and idempotent. Every request recomputes the
//! user's counters, unlocks anything newly earned with an atomic conditional
//! insert, and returns the full catalog merged with unlock state. There is no
//! wrapping transaction: an unlock that commits stays committed even if a
//! later write in the same request fails.

pub mod catalog;
pub mod handlers;
pub mod model;
pub mod stats;
pub mod store;

use anyhow::Result;
use tracing::info;

use model::{AchievementsResponse, EvaluatedAchievement};
use store::AchievementStore;

/// Sort rank for a serialized tier name. Unknown tiers sort first.
fn tier_rank(tier: &str) -> u8 {
    match tier {
        "bronze" => 1,
        "silver" => 2,
        "gold" => 3,
        "master" => 4,
        _ => 0,
    }
}

/// Evaluate every catalog definition against current stats, persisting any
/// new unlocks, then sort for display and summarize.
pub async fn evaluate_for_user(
    store: &AchievementStore,
    user_id: &str,
) -> Result<AchievementsResponse> {
    let stats = store.user_stats(user_id).await?;
    let unlocked = store.unlocked(user_id).await?;

    let mut achievements = Vec::with_capacity(catalog::all().len());
    let mut newly_unlocked: Vec<&str> = Vec::new();

    for def in catalog::all() {
        let current = stats.value_for(def.requirement);
        let mut unlocked_at = unlocked.get(def.id).cloned();

        // Meeting the threshold exactly unlocks; the insert is a no-op when a
        // concurrent request got there first, and the stored (earlier)
        // timestamp is what we report.
        if unlocked_at.is_none() && current >= def.requirement_value {
            if store.unlock(user_id, def.id).await? {
                newly_unlocked.push(def.id);
            }
            unlocked_at = store.unlocked_at(user_id, def.id).await?;
        }

        let is_unlocked = unlocked_at.is_some();
        achievements.push(EvaluatedAchievement {
            id: def.id.to_string(),
            title: def.title.to_string(),
            description: def.description.to_string(),
            icon: def.icon.to_string(),
            category: def.category.to_string(),
            tier: format!("{:?}", def.tier).to_lowercase(),
            requirement_type: def.requirement,
            requirement_value: def.requirement_value,
            is_unlocked,
            unlocked_at,
            progress: current.min(def.requirement_value),
            progress_total: def.requirement_value,
        });
    }

    if !newly_unlocked.is_empty() {
        info!(user_id, unlocked = ?newly_unlocked, "achievements unlocked");
    }

    sort_for_display(&mut achievements);
    Ok(summarize(achievements))
}

/// Stable sort: unlocked first, then ascending tier, then ascending
/// requirement value. Ties keep catalog order.
pub fn sort_for_display(achievements: &mut [EvaluatedAchievement]) {
    achievements.sort_by_key(|a| (!a.is_unlocked, tier_rank(&a.tier), a.requirement_value));
}

/// Wrap the sorted list with unlock count and completion percentage.
pub fn summarize(achievements: Vec<EvaluatedAchievement>) -> AchievementsResponse {
    let total = achievements.len();
    let total_unlocked = achievements.iter().filter(|a| a.is_unlocked).count() as u64;
    let completion_percentage = if total > 0 {
        (total_unlocked as f32 / total as f32) * 100.0
    } else {
        0.0
    };
    AchievementsResponse {
        achievements,
        total_unlocked,
        completion_percentage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluated(id: &str, tier: &str, value: u64, unlocked: bool) -> EvaluatedAchievement {
        EvaluatedAchievement {
            id: id.into(),
            title: id.into(),
            description: String::new(),
            icon: String::new(),
            category: String::new(),
            tier: tier.into(),
            requirement_type: catalog::RequirementKind::Completions,
            requirement_value: value,
            is_unlocked: unlocked,
            unlocked_at: unlocked.then(|| "2026-08-20T10:00:00+00:00".into()),
            progress: 0,
            progress_total: value,
        }
    }

    #[test]
    fn unlocked_sort_before_locked_regardless_of_tier() {
        // A locked (gold, 30), B unlocked (silver, 15), C unlocked (bronze, 5)
        let mut list = vec![
            evaluated("a", "gold", 30, false),
            evaluated("b", "silver", 15, true),
            evaluated("c", "bronze", 5, true),
        ];
        sort_for_display(&mut list);
        let ids: Vec<&str> = list.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[test]
    fn ties_keep_input_order() {
        let mut list = vec![
            evaluated("first", "bronze", 3, false),
            evaluated("second", "bronze", 3, false),
        ];
        sort_for_display(&mut list);
        assert_eq!(list[0].id, "first");
        assert_eq!(list[1].id, "second");
    }

    #[test]
    fn unknown_tier_sorts_before_known_tiers() {
        let mut list = vec![
            evaluated("bronze", "bronze", 1, false),
            evaluated("odd", "platinum", 1, false),
        ];
        sort_for_display(&mut list);
        assert_eq!(list[0].id, "odd");
    }

    #[test]
    fn summary_percentage_handles_empty_and_full() {
        let empty = summarize(vec![]);
        assert_eq!(empty.total_unlocked, 0);
        assert_eq!(empty.completion_percentage, 0.0);

        let full = summarize(vec![
            evaluated("a", "bronze", 1, true),
            evaluated("b", "silver", 5, true),
        ]);
        assert_eq!(full.total_unlocked, 2);
        assert_eq!(full.completion_percentage, 100.0);
    }

    #[test]
    fn summary_percentage_quarter() {
        let list = vec![
            evaluated("a", "bronze", 1, true),
            evaluated("b", "bronze", 2, false),
            evaluated("c", "bronze", 3, false),
            evaluated("d", "bronze", 4, false),
        ];
        let resp = summarize(list);
        assert_eq!(resp.total_unlocked, 1);
        assert_eq!(resp.completion_percentage, 25.0);
    }
}
