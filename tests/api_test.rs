// End-to-end REST tests: real server on an ephemeral port, real SQLite store.

use std::sync::Arc;

use havend::{config::HavenConfig, rest::build_router, AppContext};
use serde_json::{json, Value};

const USER: &str = "test-user";

async fn spawn_server(api_token: Option<String>) -> (String, Arc<AppContext>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let mut config = HavenConfig::new(
        Some(0),
        Some(dir.path().to_path_buf()),
        Some("error".to_string()),
        None,
    );
    config.api_token = api_token;
    // Unreachable upstream: chat requests fail fast and take the fallback path.
    config.chat.base_url = "http://127.0.0.1:9".to_string();

    let ctx = AppContext::new(config, Some("test-key".to_string()))
        .await
        .unwrap();
    let router = build_router(ctx.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (format!("http://{addr}"), ctx, dir)
}

fn client() -> reqwest::Client {
    reqwest::Client::new()
}

#[tokio::test]
async fn health_requires_no_auth() {
    let (base, _ctx, _dir) = spawn_server(Some("secret".to_string())).await;

    let resp = client()
        .get(format!("{base}/api/v1/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["db_ok"], true);
}

#[tokio::test]
async fn missing_user_header_is_unauthorized() {
    let (base, _ctx, _dir) = spawn_server(None).await;

    let resp = client()
        .get(format!("{base}/api/v1/moods"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn bearer_token_is_enforced_when_configured() {
    let (base, _ctx, _dir) = spawn_server(Some("secret".to_string())).await;

    let without = client()
        .get(format!("{base}/api/v1/moods"))
        .header("x-user-id", USER)
        .send()
        .await
        .unwrap();
    assert_eq!(without.status(), 401);

    let with = client()
        .get(format!("{base}/api/v1/moods"))
        .header("x-user-id", USER)
        .bearer_auth("secret")
        .send()
        .await
        .unwrap();
    assert_eq!(with.status(), 200);
}

#[tokio::test]
async fn mood_log_and_history() {
    let (base, _ctx, _dir) = spawn_server(None).await;
    let c = client();

    let created = c
        .post(format!("{base}/api/v1/moods"))
        .header("x-user-id", USER)
        .json(&json!({ "mood": "anxious", "notes": "before work" }))
        .send()
        .await
        .unwrap();
    assert_eq!(created.status(), 200);
    let body: Value = created.json().await.unwrap();
    assert_eq!(body["mood"], "anxious");

    let empty_mood = c
        .post(format!("{base}/api/v1/moods"))
        .header("x-user-id", USER)
        .json(&json!({ "mood": "  " }))
        .send()
        .await
        .unwrap();
    assert_eq!(empty_mood.status(), 400);

    let history: Value = c
        .get(format!("{base}/api/v1/moods"))
        .header("x-user-id", USER)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(history["moods"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn journal_crud_round_trip() {
    let (base, _ctx, _dir) = spawn_server(None).await;
    let c = client();

    let created: Value = c
        .post(format!("{base}/api/v1/journal"))
        .header("x-user-id", USER)
        .json(&json!({ "content": "first entry", "mood_emoji": "😊" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = created["id"].as_i64().unwrap();

    let fetched: Value = c
        .get(format!("{base}/api/v1/journal/{id}"))
        .header("x-user-id", USER)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["content"], "first entry");

    let updated: Value = c
        .put(format!("{base}/api/v1/journal/{id}"))
        .header("x-user-id", USER)
        .json(&json!({ "content": "edited entry" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(updated["content"], "edited entry");

    // Another user cannot see or delete the entry.
    let foreign = c
        .get(format!("{base}/api/v1/journal/{id}"))
        .header("x-user-id", "someone-else")
        .send()
        .await
        .unwrap();
    assert_eq!(foreign.status(), 404);

    let deleted = c
        .delete(format!("{base}/api/v1/journal/{id}"))
        .header("x-user-id", USER)
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status(), 200);

    let gone = c
        .get(format!("{base}/api/v1/journal/{id}"))
        .header("x-user-id", USER)
        .send()
        .await
        .unwrap();
    assert_eq!(gone.status(), 404);
}

#[tokio::test]
async fn activity_completion_and_favorites() {
    let (base, _ctx, _dir) = spawn_server(None).await;
    let c = client();

    let listing: Value = c
        .get(format!("{base}/api/v1/activities"))
        .header("x-user-id", USER)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let activities = listing["activities"].as_array().unwrap();
    assert!(!activities.is_empty());
    assert!(!listing["categories"].as_array().unwrap().is_empty());
    let id = activities[0]["id"].as_i64().unwrap();

    // Completing twice increments the counter via the upsert.
    for expected in 1..=2 {
        let done: Value = c
            .post(format!("{base}/api/v1/activities/{id}/complete"))
            .header("x-user-id", USER)
            .json(&json!({ "rating": 5 }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(done["progress"]["total_completions"], expected);
    }

    let bad_rating = c
        .post(format!("{base}/api/v1/activities/{id}/complete"))
        .header("x-user-id", USER)
        .json(&json!({ "rating": 9 }))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_rating.status(), 400);

    let favorited: Value = c
        .post(format!("{base}/api/v1/activities/{id}/favorite"))
        .header("x-user-id", USER)
        .json(&json!({}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(favorited["is_favorite"], true);

    let unfavorited: Value = c
        .post(format!("{base}/api/v1/activities/{id}/favorite"))
        .header("x-user-id", USER)
        .json(&json!({}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(unfavorited["is_favorite"], false);

    let missing = c
        .post(format!("{base}/api/v1/activities/99999/complete"))
        .header("x-user-id", USER)
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), 404);

    let progress: Value = c
        .get(format!("{base}/api/v1/progress"))
        .header("x-user-id", USER)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(progress["statistics"]["total_completions"], 2);
    assert_eq!(progress["statistics"]["activities_tried"], 1);
    assert_eq!(progress["recent_completions"].as_array().unwrap().len(), 2);

    // The full catalog comes back with the caller's progress attached.
    let all = progress["all_activities_with_progress"].as_array().unwrap();
    assert_eq!(all.len(), activities.len());
    let completed = all
        .iter()
        .find(|a| a["id"].as_i64() == Some(id))
        .unwrap();
    assert_eq!(completed["user_progress"]["total_completions"], 2);
}

#[tokio::test]
async fn progress_today_uses_a_rolling_window() {
    let (base, ctx, _dir) = spawn_server(None).await;
    let c = client();

    c.post(format!("{base}/api/v1/activities/1/complete"))
        .header("x-user-id", USER)
        .json(&json!({}))
        .send()
        .await
        .unwrap();

    // A completion from two days ago counts for the week but not for today.
    let two_days_ago = (chrono::Utc::now() - chrono::Duration::days(2)).to_rfc3339();
    sqlx::query(
        "INSERT INTO activity_completions (id, user_id, activity_id, rating, notes, completed_at)
         VALUES (?, ?, 2, NULL, NULL, ?)",
    )
    .bind(uuid::Uuid::new_v4().to_string())
    .bind(USER)
    .bind(&two_days_ago)
    .execute(&ctx.storage.pool())
    .await
    .unwrap();

    let progress: Value = c
        .get(format!("{base}/api/v1/progress"))
        .header("x-user-id", USER)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(progress["statistics"]["total_completions"], 2);
    assert_eq!(progress["statistics"]["completions_this_week"], 2);
    assert_eq!(progress["statistics"]["completions_today"], 1);
}

#[tokio::test]
async fn recommendations_follow_mood_with_fallback() {
    let (base, _ctx, _dir) = spawn_server(None).await;
    let c = client();

    // Explicit mood that the seed catalog tags.
    let matched: Value = c
        .get(format!("{base}/api/v1/recommendations?mood=anxious"))
        .header("x-user-id", USER)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!matched["activities"].as_array().unwrap().is_empty());
    assert!(matched["reason"].as_str().unwrap().contains("anxious"));
    for activity in matched["activities"].as_array().unwrap() {
        let tags: Vec<String> = activity["mood_tags"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t.as_str().unwrap().to_string())
            .collect();
        assert!(tags.contains(&"anxious".to_string()));
    }

    // No mood param and no mood history: beginner fallback.
    let fallback: Value = c
        .get(format!("{base}/api/v1/recommendations"))
        .header("x-user-id", "new-user")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!fallback["activities"].as_array().unwrap().is_empty());
    for activity in fallback["activities"].as_array().unwrap() {
        assert_eq!(activity["difficulty_level"], "beginner");
    }
}

#[tokio::test]
async fn chat_streams_fallback_when_upstream_is_down() {
    let (base, _ctx, _dir) = spawn_server(None).await;
    let c = client();

    let resp = c
        .post(format!("{base}/api/v1/chat/messages"))
        .header("x-user-id", USER)
        .json(&json!({ "message": "I had a rough day" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body = resp.text().await.unwrap();
    assert!(body.contains("still here"));

    // Give the spawned task a moment to persist the assistant reply.
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;

    let history: Value = c
        .get(format!("{base}/api/v1/chat/messages"))
        .header("x-user-id", USER)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let messages = history["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["message_type"], "user");
    assert_eq!(messages[1]["message_type"], "assistant");

    let cleared: Value = c
        .delete(format!("{base}/api/v1/chat/messages"))
        .header("x-user-id", USER)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(cleared["deleted"], 2);

    let empty_message = c
        .post(format!("{base}/api/v1/chat/messages"))
        .header("x-user-id", USER)
        .json(&json!({ "message": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(empty_message.status(), 400);
}

#[tokio::test]
async fn crisis_language_appends_resources() {
    let (base, _ctx, _dir) = spawn_server(None).await;

    let resp = client()
        .post(format!("{base}/api/v1/chat/messages"))
        .header("x-user-id", USER)
        .json(&json!({ "message": "sometimes I think about suicide" }))
        .send()
        .await
        .unwrap();
    let body = resp.text().await.unwrap();
    assert!(body.contains("988"));
}

#[tokio::test]
async fn achievements_endpoint_evaluates_and_sorts() {
    let (base, _ctx, _dir) = spawn_server(None).await;
    let c = client();

    c.post(format!("{base}/api/v1/journal"))
        .header("x-user-id", USER)
        .json(&json!({ "content": "an entry" }))
        .send()
        .await
        .unwrap();

    let body: Value = c
        .get(format!("{base}/api/v1/achievements"))
        .header("x-user-id", USER)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let achievements = body["achievements"].as_array().unwrap();
    assert_eq!(achievements.len(), 16);
    assert_eq!(body["total_unlocked"], 1);
    assert_eq!(achievements[0]["id"], "thought_recorder");
    assert_eq!(achievements[0]["is_unlocked"], true);
    assert_eq!(achievements[0]["requirement_type"], "journal_entries");
    for achievement in achievements {
        assert!(achievement["requirement_type"].is_string());
    }
}
