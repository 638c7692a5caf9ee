//! Database operations for the `generated_posts` table.
//!
//! This is the durable-storage boundary of the caption pipeline: one insert
//! per accepted request, one read-back by id. History pagination, bookmarks,
//! and deletes live elsewhere.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `generated_posts` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GeneratedPostRow {
    pub id: i64,
    pub category: String,
    pub tone: String,
    pub purpose: String,
    pub content: String,
    pub caption: String,
    /// JSON array of hashtag strings.
    pub hashtags: Value,
    /// JSON array of story-phrase strings.
    pub story_phrases: Value,
    pub engagement_question: String,
    pub score: Decimal,
    pub detected_tone: String,
    pub created_at: DateTime<Utc>,
}

/// Insert parameters for one accepted generation.
#[derive(Debug, Clone)]
pub struct NewGeneratedPost<'a> {
    pub category: &'a str,
    pub tone: &'a str,
    pub purpose: &'a str,
    pub content: &'a str,
    pub caption: &'a str,
    pub hashtags: &'a [String],
    pub story_phrases: &'a [String],
    pub engagement_question: &'a str,
    /// Quality score, bound to the `NUMERIC(6,2)` column.
    pub score: Decimal,
    pub detected_tone: &'a str,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Insert a generated post and return its generated id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_generated_post(
    pool: &PgPool,
    post: &NewGeneratedPost<'_>,
) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO generated_posts \
             (category, tone, purpose, content, caption, hashtags, story_phrases, \
              engagement_question, score, detected_tone) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         RETURNING id",
    )
    .bind(post.category)
    .bind(post.tone)
    .bind(post.purpose)
    .bind(post.content)
    .bind(post.caption)
    .bind(serde_json::json!(post.hashtags))
    .bind(serde_json::json!(post.story_phrases))
    .bind(post.engagement_question)
    .bind(post.score)
    .bind(post.detected_tone)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Fetch a generated post by id, or `None` if it does not exist.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_generated_post(
    pool: &PgPool,
    id: i64,
) -> Result<Option<GeneratedPostRow>, DbError> {
    let row = sqlx::query_as::<_, GeneratedPostRow>(
        "SELECT id, category, tone, purpose, content, caption, hashtags, story_phrases, \
                engagement_question, score, detected_tone, created_at \
         FROM generated_posts \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_post<'a>(hashtags: &'a [String], story_phrases: &'a [String]) -> NewGeneratedPost<'a> {
        NewGeneratedPost {
            category: "카페",
            tone: "CASUAL",
            purpose: "신메뉴 소개",
            content: "신메뉴 딸기라떼 출시",
            caption: "오늘부터 딸기라떼를 시작했어요.",
            hashtags,
            story_phrases,
            engagement_question: "어떤 음료가 생각나세요?",
            score: Decimal::new(8150, 2), // 81.50
            detected_tone: "CASUAL",
        }
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn insert_then_get_round_trips(pool: PgPool) {
        let hashtags = vec!["#딸기라떼".to_string(), "#신메뉴".to_string()];
        let story_phrases = vec!["새로 나온 딸기라떼".to_string()];
        let post = sample_post(&hashtags, &story_phrases);

        let id = insert_generated_post(&pool, &post)
            .await
            .expect("insert should succeed");

        let row = get_generated_post(&pool, id)
            .await
            .expect("get should succeed")
            .expect("row should exist");

        assert_eq!(row.id, id);
        assert_eq!(row.caption, post.caption);
        assert_eq!(row.tone, "CASUAL");
        assert_eq!(row.score, post.score);
        assert_eq!(
            row.hashtags,
            serde_json::json!(["#딸기라떼", "#신메뉴"]),
            "hashtags stored as JSON array"
        );
        assert_eq!(row.story_phrases.as_array().map(Vec::len), Some(1));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn get_unknown_id_returns_none(pool: PgPool) {
        let row = get_generated_post(&pool, 999_999)
            .await
            .expect("query should succeed");
        assert!(row.is_none());
    }
}
