//! Achievement query + write layer over the shared SQLite pool.

use anyhow::{Context as _, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use std::collections::HashMap;

use super::stats::{current_week_start, UserStats};

pub struct AchievementStore {
    pool: SqlitePool,
}

impl AchievementStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Compute the user's statistic counters in one pass per table.
    ///
    /// A user with no rows anywhere gets all zeros. The weekly streak counts
    /// distinct local calendar days with at least one completion since the
    /// most recent Monday; stored timestamps are UTC, so the `localtime`
    /// modifier converts before taking the date.
    pub async fn user_stats(&self, user_id: &str) -> Result<UserStats> {
        let (completions, activities_tried): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(DISTINCT activity_id)
               FROM activity_completions WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .context("completion counters")?;

        let week_start = current_week_start().to_string();
        let weekly_streak: i64 = sqlx::query_scalar(
            "SELECT COUNT(DISTINCT DATE(completed_at, 'localtime'))
               FROM activity_completions
              WHERE user_id = ? AND DATE(completed_at, 'localtime') >= ?",
        )
        .bind(user_id)
        .bind(&week_start)
        .fetch_one(&self.pool)
        .await
        .context("weekly streak counter")?;

        let journal_entries: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM journal_entries WHERE user_id = ?")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await
                .context("journal counter")?;

        let favorites: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM activity_progress WHERE user_id = ? AND is_favorite = 1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .context("favorites counter")?;

        Ok(UserStats {
            completions: completions as u64,
            activities_tried: activities_tried as u64,
            weekly_streak: weekly_streak as u64,
            journal_entries: journal_entries as u64,
            favorites: favorites as u64,
        })
    }

    /// Map of achievement_id -> unlocked_at for the user.
    pub async fn unlocked(&self, user_id: &str) -> Result<HashMap<String, String>> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT achievement_id, unlocked_at FROM user_achievements WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("load unlocks")?;
        Ok(rows.into_iter().collect())
    }

    /// Stored unlock timestamp for one achievement, if unlocked.
    pub async fn unlocked_at(&self, user_id: &str, achievement_id: &str) -> Result<Option<String>> {
        Ok(sqlx::query_scalar(
            "SELECT unlocked_at FROM user_achievements WHERE user_id = ? AND achievement_id = ?",
        )
        .bind(user_id)
        .bind(achievement_id)
        .fetch_optional(&self.pool)
        .await
        .context("read unlock timestamp")?)
    }

    /// Unlock an achievement for a user. A single atomic conditional insert:
    /// concurrent evaluations racing on the same id leave exactly one row,
    /// and the first writer's timestamp wins.
    /// Returns `true` if this call inserted the row.
    pub async fn unlock(&self, user_id: &str, achievement_id: &str) -> Result<bool> {
        let now = Utc::now().to_rfc3339();
        let rows_affected = sqlx::query(
            "INSERT OR IGNORE INTO user_achievements (user_id, achievement_id, unlocked_at)
             VALUES (?, ?, ?)",
        )
        .bind(user_id)
        .bind(achievement_id)
        .bind(&now)
        .execute(&self.pool)
        .await
        .context("unlock achievement")?
        .rows_affected();

        Ok(rows_affected > 0)
    }
}
