//! Point-in-time snapshot of the counters achievements are measured against.

use chrono::{Datelike, Local, NaiveDate};

use super::catalog::RequirementKind;

/// All counters default to zero, so a user with no history evaluates every
/// achievement against 0 rather than erroring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserStats {
    /// Activity completions, all time.
    pub completions: u64,
    /// Distinct activities completed at least once.
    pub activities_tried: u64,
    /// Distinct local days with at least one completion since Monday.
    pub weekly_streak: u64,
    /// Journal entries, all time.
    pub journal_entries: u64,
    /// Activities currently marked favorite.
    pub favorites: u64,
}

impl UserStats {
    pub fn value_for(&self, kind: RequirementKind) -> u64 {
        match kind {
            RequirementKind::Completions => self.completions,
            RequirementKind::ActivitiesTried => self.activities_tried,
            RequirementKind::WeeklyStreak => self.weekly_streak,
            RequirementKind::JournalEntries => self.journal_entries,
            RequirementKind::Favorites => self.favorites,
        }
    }
}

/// The most recent Monday on or before `today`. Weeks run Monday through
/// Sunday; on a Monday this returns `today` itself.
pub fn week_start_monday(today: NaiveDate) -> NaiveDate {
    let offset = today.weekday().num_days_from_monday() as i64;
    today - chrono::Duration::days(offset)
}

/// Week start for "now" in local time.
pub fn current_week_start() -> NaiveDate {
    week_start_monday(Local::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monday_is_its_own_week_start() {
        let monday = NaiveDate::from_ymd_opt(2026, 8, 17).unwrap();
        assert_eq!(week_start_monday(monday), monday);
    }

    #[test]
    fn sunday_maps_back_six_days() {
        let sunday = NaiveDate::from_ymd_opt(2026, 8, 23).unwrap();
        let monday = NaiveDate::from_ymd_opt(2026, 8, 17).unwrap();
        assert_eq!(week_start_monday(sunday), monday);
    }

    #[test]
    fn zero_stats_report_zero_for_every_kind() {
        let stats = UserStats::default();
        for kind in [
            RequirementKind::Completions,
            RequirementKind::ActivitiesTried,
            RequirementKind::WeeklyStreak,
            RequirementKind::JournalEntries,
            RequirementKind::Favorites,
        ] {
            assert_eq!(stats.value_for(kind), 0);
        }
    }
}
