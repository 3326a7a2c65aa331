//! Compiled-in achievement catalog.
//!
//! Definitions never change at runtime; user state lives in the
//! `user_achievements` table only. The catalog order is the tie-break
//! order for presentation sorting, so entries are grouped by category
//! and ascending threshold.

use anyhow::{bail, Result};
use serde::Serialize;

/// Which user statistic an achievement is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementKind {
    /// Total activity completions, all time.
    Completions,
    /// Distinct activities completed at least once.
    ActivitiesTried,
    /// Distinct days with at least one completion in the current week.
    WeeklyStreak,
    /// Total journal entries.
    JournalEntries,
    /// Activities currently marked favorite.
    Favorites,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Bronze,
    Silver,
    Gold,
    Master,
}

impl Tier {
    /// Sort rank: bronze < silver < gold < master.
    pub fn rank(self) -> u8 {
        match self {
            Tier::Bronze => 1,
            Tier::Silver => 2,
            Tier::Gold => 3,
            Tier::Master => 4,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AchievementDef {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub category: &'static str,
    pub tier: Tier,
    pub requirement: RequirementKind,
    pub requirement_value: u64,
}

const CATALOG: &[AchievementDef] = &[
    // Activity milestones
    AchievementDef {
        id: "first_steps",
        title: "First Steps",
        description: "Complete your first self-care activity",
        icon: "🌱",
        category: "Activity",
        tier: Tier::Bronze,
        requirement: RequirementKind::Completions,
        requirement_value: 1,
    },
    AchievementDef {
        id: "getting_started",
        title: "Getting Started",
        description: "Complete 5 self-care activities",
        icon: "🌿",
        category: "Activity",
        tier: Tier::Bronze,
        requirement: RequirementKind::Completions,
        requirement_value: 5,
    },
    AchievementDef {
        id: "self_care_explorer",
        title: "Self-Care Explorer",
        description: "Complete 15 self-care activities",
        icon: "🌳",
        category: "Activity",
        tier: Tier::Silver,
        requirement: RequirementKind::Completions,
        requirement_value: 15,
    },
    AchievementDef {
        id: "wellness_warrior",
        title: "Wellness Warrior",
        description: "Complete 30 self-care activities",
        icon: "⭐",
        category: "Activity",
        tier: Tier::Gold,
        requirement: RequirementKind::Completions,
        requirement_value: 30,
    },
    AchievementDef {
        id: "mindfulness_master",
        title: "Mindfulness Master",
        description: "Complete 50 self-care activities",
        icon: "🏆",
        category: "Activity",
        tier: Tier::Master,
        requirement: RequirementKind::Completions,
        requirement_value: 50,
    },
    // Variety
    AchievementDef {
        id: "curious_mind",
        title: "Curious Mind",
        description: "Try 3 different activities",
        icon: "🔍",
        category: "Variety",
        tier: Tier::Bronze,
        requirement: RequirementKind::ActivitiesTried,
        requirement_value: 3,
    },
    AchievementDef {
        id: "variety_seeker",
        title: "Variety Seeker",
        description: "Try 7 different activities",
        icon: "🎨",
        category: "Variety",
        tier: Tier::Silver,
        requirement: RequirementKind::ActivitiesTried,
        requirement_value: 7,
    },
    AchievementDef {
        id: "well_rounded",
        title: "Well-Rounded",
        description: "Try 12 different activities",
        icon: "💎",
        category: "Variety",
        tier: Tier::Gold,
        requirement: RequirementKind::ActivitiesTried,
        requirement_value: 12,
    },
    // Consistency
    AchievementDef {
        id: "consistent_carer",
        title: "Consistent Carer",
        description: "Practice self-care 3 days this week",
        icon: "📅",
        category: "Consistency",
        tier: Tier::Bronze,
        requirement: RequirementKind::WeeklyStreak,
        requirement_value: 3,
    },
    AchievementDef {
        id: "weekly_champion",
        title: "Weekly Champion",
        description: "Practice self-care 5 days this week",
        icon: "🔥",
        category: "Consistency",
        tier: Tier::Silver,
        requirement: RequirementKind::WeeklyStreak,
        requirement_value: 5,
    },
    AchievementDef {
        id: "dedication_master",
        title: "Dedication Master",
        description: "Practice self-care every day this week",
        icon: "👑",
        category: "Consistency",
        tier: Tier::Gold,
        requirement: RequirementKind::WeeklyStreak,
        requirement_value: 7,
    },
    // Journal
    AchievementDef {
        id: "thought_recorder",
        title: "Thought Recorder",
        description: "Write your first journal entry",
        icon: "📝",
        category: "Journal",
        tier: Tier::Bronze,
        requirement: RequirementKind::JournalEntries,
        requirement_value: 1,
    },
    AchievementDef {
        id: "reflective_writer",
        title: "Reflective Writer",
        description: "Write 5 journal entries",
        icon: "📖",
        category: "Journal",
        tier: Tier::Silver,
        requirement: RequirementKind::JournalEntries,
        requirement_value: 5,
    },
    AchievementDef {
        id: "journaling_guru",
        title: "Journaling Guru",
        description: "Write 15 journal entries",
        icon: "✨",
        category: "Journal",
        tier: Tier::Gold,
        requirement: RequirementKind::JournalEntries,
        requirement_value: 15,
    },
    // Engagement
    AchievementDef {
        id: "favorite_finder",
        title: "Favorite Finder",
        description: "Mark 3 activities as favorites",
        icon: "❤️",
        category: "Engagement",
        tier: Tier::Bronze,
        requirement: RequirementKind::Favorites,
        requirement_value: 3,
    },
    AchievementDef {
        id: "preference_pro",
        title: "Preference Pro",
        description: "Mark 7 activities as favorites",
        icon: "💖",
        category: "Engagement",
        tier: Tier::Silver,
        requirement: RequirementKind::Favorites,
        requirement_value: 7,
    },
];

/// All achievement definitions in catalog order.
pub fn all() -> &'static [AchievementDef] {
    CATALOG
}

/// Reject duplicate ids. A duplicate is a programming error; called once at
/// startup so requests never pay for the check.
pub fn validate() -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    for def in CATALOG {
        if !seen.insert(def.id) {
            bail!("duplicate achievement id in catalog: {}", def.id);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_sixteen_definitions() {
        assert_eq!(all().len(), 16);
    }

    #[test]
    fn catalog_ids_are_unique() {
        validate().unwrap();
    }

    #[test]
    fn tier_ranks_are_ordered() {
        assert!(Tier::Bronze.rank() < Tier::Silver.rank());
        assert!(Tier::Silver.rank() < Tier::Gold.rank());
        assert!(Tier::Gold.rank() < Tier::Master.rank());
    }

    #[test]
    fn thresholds_ascend_within_category() {
        let mut last: std::collections::HashMap<&str, u64> = Default::default();
        for def in all() {
            if let Some(prev) = last.insert(def.category, def.requirement_value) {
                assert!(
                    def.requirement_value > prev,
                    "{} does not ascend within {}",
                    def.id,
                    def.category
                );
            }
        }
    }
}
