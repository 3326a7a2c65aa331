use anyhow::{Context as _, Result};
use chrono::Utc;
use sqlx::{sqlite::SqliteConnectOptions, ConnectOptions, SqlitePool};
use std::{path::Path, str::FromStr};
use uuid::Uuid;

/// Default timeout for individual SQLite queries.
/// Prevents hung queries from blocking the daemon indefinitely.
const QUERY_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Execute a future with the standard query timeout.
/// Returns an error if the operation takes longer than `QUERY_TIMEOUT`.
async fn with_timeout<T>(fut: impl std::future::Future<Output = Result<T>>) -> Result<T> {
    match tokio::time::timeout(QUERY_TIMEOUT, fut).await {
        Ok(result) => result,
        Err(_) => Err(anyhow::anyhow!(
            "database query timed out after {}s",
            QUERY_TIMEOUT.as_secs()
        )),
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MoodRow {
    pub id: i64,
    pub user_id: String,
    pub mood: String,
    pub notes: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct JournalRow {
    pub id: i64,
    pub user_id: String,
    pub content: String,
    pub mood_emoji: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActivityRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub duration_minutes: i64,
    pub difficulty_level: String,
    /// JSON array of step strings. SQLite has no array type; stored as TEXT.
    pub instructions: String,
    /// JSON array of benefit strings.
    pub benefits: String,
    /// JSON array of mood tags, e.g. `["anxious","stressed"]`.
    pub mood_tags: String,
    pub icon_name: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProgressRow {
    pub user_id: String,
    pub activity_id: i64,
    pub total_completions: i64,
    pub last_completed_at: Option<String>,
    pub is_favorite: bool,
    pub updated_at: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ChatMessageRow {
    pub id: i64,
    pub user_id: String,
    pub message_text: String,
    /// "user" | "assistant"
    pub message_type: String,
    pub created_at: String,
}

/// A completion joined with its activity title/category, for progress views.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CompletionDetailRow {
    pub activity_id: i64,
    pub title: String,
    pub category: String,
    pub rating: Option<i64>,
    pub completed_at: String,
}

#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    pub async fn new(data_dir: &Path) -> Result<Self> {
        Self::new_with_slow_query(data_dir, 0).await
    }

    /// Create storage with slow-query logging enabled.
    ///
    /// `slow_query_ms` is the threshold in milliseconds — queries exceeding it
    /// are logged at WARN level. Set to 0 to disable slow-query logging.
    pub async fn new_with_slow_query(data_dir: &Path, slow_query_ms: u64) -> Result<Self> {
        tokio::fs::create_dir_all(data_dir).await?;
        let db_path = data_dir.join("havend.db");
        let mut opts =
            SqliteConnectOptions::from_str(&format!("sqlite://{}?mode=rwc", db_path.display()))?
                .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
                .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
                .create_if_missing(true);

        if slow_query_ms > 0 {
            opts = opts.log_slow_statements(
                log::LevelFilter::Warn,
                std::time::Duration::from_millis(slow_query_ms),
            );
        }

        let pool = SqlitePool::connect_with(opts).await?;
        Self::bootstrap(&pool).await?;
        Ok(Self { pool })
    }

    /// Return a clone of the connection pool (cheap — Arc-backed).
    pub fn pool(&self) -> SqlitePool {
        self.pool.clone()
    }

    /// Create all tables if they do not exist. Idempotent; runs at startup.
    async fn bootstrap(pool: &SqlitePool) -> Result<()> {
        let stmts = [
            "CREATE TABLE IF NOT EXISTS mood_entries (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id     TEXT NOT NULL,
                mood        TEXT NOT NULL,
                notes       TEXT,
                created_at  TEXT NOT NULL
            )",
            "CREATE INDEX IF NOT EXISTS idx_mood_entries_user
                ON mood_entries (user_id, created_at)",
            "CREATE TABLE IF NOT EXISTS journal_entries (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id     TEXT NOT NULL,
                content     TEXT NOT NULL,
                mood_emoji  TEXT,
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            )",
            "CREATE INDEX IF NOT EXISTS idx_journal_entries_user
                ON journal_entries (user_id, updated_at)",
            "CREATE TABLE IF NOT EXISTS selfcare_activities (
                id               INTEGER PRIMARY KEY,
                title            TEXT NOT NULL,
                description      TEXT NOT NULL,
                category         TEXT NOT NULL,
                duration_minutes INTEGER NOT NULL,
                difficulty_level TEXT NOT NULL,
                instructions     TEXT NOT NULL,
                benefits         TEXT NOT NULL,
                mood_tags        TEXT NOT NULL,
                icon_name        TEXT
            )",
            "CREATE TABLE IF NOT EXISTS activity_completions (
                id           TEXT PRIMARY KEY,
                user_id      TEXT NOT NULL,
                activity_id  INTEGER NOT NULL,
                rating       INTEGER,
                notes        TEXT,
                completed_at TEXT NOT NULL
            )",
            "CREATE INDEX IF NOT EXISTS idx_activity_completions_user
                ON activity_completions (user_id, completed_at)",
            "CREATE TABLE IF NOT EXISTS activity_progress (
                user_id           TEXT NOT NULL,
                activity_id       INTEGER NOT NULL,
                total_completions INTEGER NOT NULL DEFAULT 0,
                last_completed_at TEXT,
                is_favorite       INTEGER NOT NULL DEFAULT 0,
                updated_at        TEXT NOT NULL,
                PRIMARY KEY (user_id, activity_id)
            )",
            "CREATE TABLE IF NOT EXISTS chat_messages (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id      TEXT NOT NULL,
                message_text TEXT NOT NULL,
                message_type TEXT NOT NULL,
                created_at   TEXT NOT NULL
            )",
            "CREATE INDEX IF NOT EXISTS idx_chat_messages_user
                ON chat_messages (user_id, created_at)",
            "CREATE TABLE IF NOT EXISTS user_achievements (
                user_id        TEXT NOT NULL,
                achievement_id TEXT NOT NULL,
                unlocked_at    TEXT NOT NULL,
                PRIMARY KEY (user_id, achievement_id)
            )",
        ];
        for stmt in stmts {
            sqlx::query(stmt)
                .execute(pool)
                .await
                .context("schema bootstrap")?;
        }
        Ok(())
    }

    // ─── Moods ──────────────────────────────────────────────────────────────

    pub async fn create_mood(
        &self,
        user_id: &str,
        mood: &str,
        notes: Option<&str>,
    ) -> Result<MoodRow> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO mood_entries (user_id, mood, notes, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(mood)
        .bind(notes)
        .bind(&now)
        .execute(&self.pool)
        .await
        .context("insert mood entry")?;

        let id = result.last_insert_rowid();
        Ok(MoodRow {
            id,
            user_id: user_id.to_string(),
            mood: mood.to_string(),
            notes: notes.map(String::from),
            created_at: now,
        })
    }

    pub async fn list_moods(&self, user_id: &str) -> Result<Vec<MoodRow>> {
        with_timeout(async {
            Ok(sqlx::query_as(
                "SELECT * FROM mood_entries WHERE user_id = ? ORDER BY created_at DESC, id DESC",
            )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?)
        })
        .await
    }

    /// The user's most recently logged mood, if any.
    pub async fn latest_mood(&self, user_id: &str) -> Result<Option<MoodRow>> {
        Ok(sqlx::query_as(
            "SELECT * FROM mood_entries WHERE user_id = ? ORDER BY created_at DESC, id DESC LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    // ─── Journal ────────────────────────────────────────────────────────────

    pub async fn create_journal_entry(
        &self,
        user_id: &str,
        content: &str,
        mood_emoji: Option<&str>,
    ) -> Result<JournalRow> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO journal_entries (user_id, content, mood_emoji, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(content)
        .bind(mood_emoji)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .context("insert journal entry")?;

        let id = result.last_insert_rowid();
        self.get_journal_entry(user_id, id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("journal entry not found after insert"))
    }

    pub async fn list_journal_entries(&self, user_id: &str) -> Result<Vec<JournalRow>> {
        with_timeout(async {
            Ok(sqlx::query_as(
                "SELECT * FROM journal_entries WHERE user_id = ? ORDER BY updated_at DESC, id DESC",
            )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?)
        })
        .await
    }

    pub async fn get_journal_entry(&self, user_id: &str, id: i64) -> Result<Option<JournalRow>> {
        Ok(
            sqlx::query_as("SELECT * FROM journal_entries WHERE id = ? AND user_id = ?")
                .bind(id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    /// Update a journal entry. Returns the updated row, or `None` if the entry
    /// does not exist or belongs to another user.
    pub async fn update_journal_entry(
        &self,
        user_id: &str,
        id: i64,
        content: &str,
        mood_emoji: Option<&str>,
    ) -> Result<Option<JournalRow>> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "UPDATE journal_entries SET content = ?, mood_emoji = ?, updated_at = ?
             WHERE id = ? AND user_id = ?",
        )
        .bind(content)
        .bind(mood_emoji)
        .bind(&now)
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .context("update journal entry")?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_journal_entry(user_id, id).await
    }

    /// Returns `true` if a row was deleted.
    pub async fn delete_journal_entry(&self, user_id: &str, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM journal_entries WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .context("delete journal entry")?;
        Ok(result.rows_affected() > 0)
    }

    // ─── Self-care activities ───────────────────────────────────────────────

    /// Seed the activity catalog. `INSERT OR IGNORE` keyed on fixed ids makes
    /// this safe to run on every startup.
    pub async fn seed_activity(
        &self,
        id: i64,
        title: &str,
        description: &str,
        category: &str,
        duration_minutes: i64,
        difficulty_level: &str,
        instructions: &str,
        benefits: &str,
        mood_tags: &str,
        icon_name: Option<&str>,
    ) -> Result<()> {
        sqlx::query(
            "INSERT OR IGNORE INTO selfcare_activities
             (id, title, description, category, duration_minutes, difficulty_level,
              instructions, benefits, mood_tags, icon_name)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(title)
        .bind(description)
        .bind(category)
        .bind(duration_minutes)
        .bind(difficulty_level)
        .bind(instructions)
        .bind(benefits)
        .bind(mood_tags)
        .bind(icon_name)
        .execute(&self.pool)
        .await
        .context("seed activity")?;
        Ok(())
    }

    pub async fn list_activities(&self, category: Option<&str>) -> Result<Vec<ActivityRow>> {
        with_timeout(async {
            let rows = match category {
                Some(cat) => {
                    sqlx::query_as(
                        "SELECT * FROM selfcare_activities WHERE category = ?
                         ORDER BY category, title",
                    )
                    .bind(cat)
                    .fetch_all(&self.pool)
                    .await?
                }
                None => {
                    sqlx::query_as("SELECT * FROM selfcare_activities ORDER BY category, title")
                        .fetch_all(&self.pool)
                        .await?
                }
            };
            Ok(rows)
        })
        .await
    }

    pub async fn get_activity(&self, id: i64) -> Result<Option<ActivityRow>> {
        Ok(sqlx::query_as("SELECT * FROM selfcare_activities WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn list_activity_categories(&self) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT DISTINCT category FROM selfcare_activities ORDER BY category",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(c,)| c).collect())
    }

    /// Up to `limit` activities whose mood_tags contain `mood`.
    /// Tags are a JSON array of strings, so the match is on the quoted tag.
    pub async fn activities_for_mood(&self, mood: &str, limit: i64) -> Result<Vec<ActivityRow>> {
        Ok(sqlx::query_as(
            "SELECT * FROM selfcare_activities
             WHERE mood_tags LIKE '%\"' || ? || '\"%'
             ORDER BY duration_minutes, title
             LIMIT ?",
        )
        .bind(mood)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }

    /// Fallback recommendations: shortest beginner activities first.
    pub async fn beginner_activities(&self, limit: i64) -> Result<Vec<ActivityRow>> {
        Ok(sqlx::query_as(
            "SELECT * FROM selfcare_activities
             WHERE difficulty_level = 'beginner'
             ORDER BY duration_minutes, title
             LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }

    // ─── Completions & progress ─────────────────────────────────────────────

    /// Record one completion and bump the per-activity progress counter.
    pub async fn record_completion(
        &self,
        user_id: &str,
        activity_id: i64,
        rating: Option<i64>,
        notes: Option<&str>,
    ) -> Result<ProgressRow> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO activity_completions (id, user_id, activity_id, rating, notes, completed_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(user_id)
        .bind(activity_id)
        .bind(rating)
        .bind(notes)
        .bind(&now)
        .execute(&self.pool)
        .await
        .context("insert completion")?;

        sqlx::query(
            "INSERT INTO activity_progress
             (user_id, activity_id, total_completions, last_completed_at, is_favorite, updated_at)
             VALUES (?, ?, 1, ?, 0, ?)
             ON CONFLICT (user_id, activity_id) DO UPDATE SET
                 total_completions = activity_progress.total_completions + 1,
                 last_completed_at = excluded.last_completed_at,
                 updated_at = excluded.updated_at",
        )
        .bind(user_id)
        .bind(activity_id)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .context("upsert progress")?;

        self.get_progress(user_id, activity_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("progress row not found after upsert"))
    }

    pub async fn get_progress(
        &self,
        user_id: &str,
        activity_id: i64,
    ) -> Result<Option<ProgressRow>> {
        Ok(sqlx::query_as(
            "SELECT * FROM activity_progress WHERE user_id = ? AND activity_id = ?",
        )
        .bind(user_id)
        .bind(activity_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    pub async fn list_progress(&self, user_id: &str) -> Result<Vec<ProgressRow>> {
        Ok(
            sqlx::query_as("SELECT * FROM activity_progress WHERE user_id = ?")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?,
        )
    }

    /// Flip the favorite flag, creating the progress row on first toggle.
    /// Returns the new favorite state.
    pub async fn toggle_favorite(&self, user_id: &str, activity_id: i64) -> Result<bool> {
        let now = Utc::now().to_rfc3339();
        let existing: Option<(bool,)> = sqlx::query_as(
            "SELECT is_favorite FROM activity_progress WHERE user_id = ? AND activity_id = ?",
        )
        .bind(user_id)
        .bind(activity_id)
        .fetch_optional(&self.pool)
        .await?;

        match existing {
            Some((is_favorite,)) => {
                let new_state = !is_favorite;
                sqlx::query(
                    "UPDATE activity_progress SET is_favorite = ?, updated_at = ?
                     WHERE user_id = ? AND activity_id = ?",
                )
                .bind(new_state)
                .bind(&now)
                .bind(user_id)
                .bind(activity_id)
                .execute(&self.pool)
                .await
                .context("toggle favorite")?;
                Ok(new_state)
            }
            None => {
                sqlx::query(
                    "INSERT INTO activity_progress
                     (user_id, activity_id, total_completions, last_completed_at, is_favorite, updated_at)
                     VALUES (?, ?, 0, NULL, 1, ?)",
                )
                .bind(user_id)
                .bind(activity_id)
                .bind(&now)
                .execute(&self.pool)
                .await
                .context("create favorite")?;
                Ok(true)
            }
        }
    }

    /// Favorited activities joined with progress, most completed first.
    pub async fn favorite_activities(&self, user_id: &str) -> Result<Vec<(ActivityRow, ProgressRow)>> {
        let favorites = sqlx::query_as::<_, ProgressRow>(
            "SELECT * FROM activity_progress WHERE user_id = ? AND is_favorite = 1
             ORDER BY total_completions DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut result = Vec::with_capacity(favorites.len());
        for progress in favorites {
            if let Some(activity) = self.get_activity(progress.activity_id).await? {
                result.push((activity, progress));
            }
        }
        Ok(result)
    }

    /// The user's most recent completions with activity details.
    pub async fn recent_completions(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<CompletionDetailRow>> {
        Ok(sqlx::query_as(
            "SELECT ac.activity_id, sa.title, sa.category, ac.rating, ac.completed_at
               FROM activity_completions ac
               JOIN selfcare_activities sa ON sa.id = ac.activity_id
              WHERE ac.user_id = ?
           ORDER BY ac.completed_at DESC
              LIMIT ?",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }

    /// (activities_tried, total_completions, completions last 7 days, completions last 24h).
    ///
    /// Both recency counters are rolling windows, not calendar buckets.
    /// `julianday` parses the stored RFC 3339 text; comparing the raw strings
    /// against `datetime('now')` would mix two timestamp formats.
    pub async fn completion_summary(&self, user_id: &str) -> Result<(u64, u64, u64, u64)> {
        let row: (i64, i64, i64, i64) = sqlx::query_as(
            "SELECT COUNT(DISTINCT activity_id),
                    COUNT(*),
                    COALESCE(SUM(CASE WHEN julianday(completed_at) >= julianday('now', '-7 days') THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN julianday(completed_at) >= julianday('now', '-1 day') THEN 1 ELSE 0 END), 0)
               FROM activity_completions
              WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .context("completion summary")?;
        Ok((row.0 as u64, row.1 as u64, row.2 as u64, row.3 as u64))
    }

    // ─── Chat ───────────────────────────────────────────────────────────────

    pub async fn create_chat_message(
        &self,
        user_id: &str,
        message_text: &str,
        message_type: &str,
    ) -> Result<ChatMessageRow> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO chat_messages (user_id, message_text, message_type, created_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(message_text)
        .bind(message_type)
        .bind(&now)
        .execute(&self.pool)
        .await
        .context("insert chat message")?;

        Ok(ChatMessageRow {
            id: result.last_insert_rowid(),
            user_id: user_id.to_string(),
            message_text: message_text.to_string(),
            message_type: message_type.to_string(),
            created_at: now,
        })
    }

    /// Last `limit` messages, returned oldest first.
    pub async fn list_chat_messages(&self, user_id: &str, limit: i64) -> Result<Vec<ChatMessageRow>> {
        with_timeout(async {
            let mut rows: Vec<ChatMessageRow> = sqlx::query_as(
                "SELECT * FROM chat_messages WHERE user_id = ?
                 ORDER BY created_at DESC, id DESC LIMIT ?",
            )
            .bind(user_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
            rows.reverse();
            Ok(rows)
        })
        .await
    }

    /// Delete the user's chat history. Returns the number of rows removed.
    pub async fn clear_chat_messages(&self, user_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM chat_messages WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .context("clear chat messages")?;
        Ok(result.rows_affected())
    }
}
