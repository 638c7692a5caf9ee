use axum::{
    extract::{Path, State},
    Extension, Json,
};
use rust_decimal::Decimal;
use serde::Serialize;

use tonepost_db::NewGeneratedPost;
use tonepost_pipeline::{GenerationRequest, QuotaDecision};

use crate::middleware::RequestId;

use super::{map_db_error, map_pipeline_error, ApiError, ApiResponse, AppState, ResponseMeta};

/// The payload returned for both creation and read-back.
#[derive(Debug, Serialize)]
pub(super) struct CaptionData {
    pub id: i64,
    pub caption: String,
    pub hashtags: Vec<String>,
    pub story_phrases: Vec<String>,
    pub engagement_question: String,
}

/// `POST /api/v1/captions` — run the pipeline and persist the survivor.
///
/// The quota verdict arrives from the upstream gate via middleware; an
/// exhausted verdict returns `quota_exceeded` without any generation work.
pub(super) async fn create_caption(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(quota): Extension<QuotaDecision>,
    Json(request): Json<GenerationRequest>,
) -> Result<Json<ApiResponse<CaptionData>>, ApiError> {
    let result = state
        .pipeline
        .run(&request, quota)
        .await
        .map_err(|e| map_pipeline_error(req_id.0.clone(), &e))?;

    let post = NewGeneratedPost {
        category: &request.category,
        tone: request.tone.as_str(),
        purpose: &request.purpose,
        content: &request.content,
        caption: &result.caption,
        hashtags: &result.hashtags,
        story_phrases: &result.story_phrases,
        engagement_question: &result.engagement_question,
        score: Decimal::from_f32_retain(result.score).unwrap_or_default(),
        detected_tone: result.detected_tone.as_str(),
    };
    let id = tonepost_db::insert_generated_post(&state.pool, &post)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    tracing::info!(id, tone = %request.tone, "caption generated and persisted");

    Ok(Json(ApiResponse {
        data: CaptionData {
            id,
            caption: result.caption,
            hashtags: result.hashtags,
            story_phrases: result.story_phrases,
            engagement_question: result.engagement_question,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// `GET /api/v1/captions/{id}` — read back one persisted record.
pub(super) async fn get_caption(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<CaptionData>>, ApiError> {
    let row = tonepost_db::get_generated_post(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "not_found", "no such caption"))?;

    Ok(Json(ApiResponse {
        data: CaptionData {
            id: row.id,
            caption: row.caption,
            hashtags: string_array(&row.hashtags),
            story_phrases: string_array(&row.story_phrases),
            engagement_question: row.engagement_question,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Read a JSONB array column into strings, dropping anything malformed.
fn string_array(value: &serde_json::Value) -> Vec<String> {
    value
        .as_array()
        .map(|entries| {
            entries
                .iter()
                .filter_map(serde_json::Value::as_str)
                .map(ToOwned::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_array_reads_json_arrays() {
        let value = serde_json::json!(["#하나", "#둘"]);
        assert_eq!(string_array(&value), vec!["#하나", "#둘"]);
    }

    #[test]
    fn string_array_tolerates_malformed_columns() {
        assert!(string_array(&serde_json::json!("not-an-array")).is_empty());
        assert_eq!(string_array(&serde_json::json!(["ok", 42, null])), vec!["ok"]);
    }
}
