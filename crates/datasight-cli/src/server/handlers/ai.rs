//! AI query handlers.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::server::error::ApiError;
use crate::server::state::AppState;

/// Request to answer a question about the dataset.
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    /// The dataset to query; must match the served dataset.
    pub dataset_id: String,

    /// The question to answer.
    pub prompt: String,
}

/// POST /ai/query - answer a natural-language question.
///
/// The limiter is keyed by client address so one busy caller cannot
/// exhaust the budget for everyone.
pub async fn post_query(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if request.prompt.trim().is_empty() {
        return Err(ApiError::BadRequest("prompt must not be empty".to_string()));
    }
    verify_dataset_id(&state, &request.dataset_id)?;

    state.limiter.check(&addr.ip().to_string())?;

    let dataset = state.dataset.clone();
    let qa = state.qa.clone();
    let prompt = request.prompt;

    let answer = tokio::task::spawn_blocking(move || qa.answer(&dataset, &prompt))
        .await
        .map_err(|e| ApiError::Internal(format!("query task failed: {e}")))?;

    // No code generation happens here; the field stays for clients that
    // render it when present.
    Ok(Json(json!({
        "generated_code": serde_json::Value::Null,
        "result_data": {
            "nlq": answer,
        },
    })))
}

/// GET /ai/recommended-questions/:dataset_id - shape-aware question list.
pub async fn get_recommended_questions(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Path(dataset_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    verify_dataset_id(&state, &dataset_id)?;
    state.limiter.check(&addr.ip().to_string())?;

    let dataset = state.dataset.clone();
    let qa = state.qa.clone();

    let questions = tokio::task::spawn_blocking(move || qa.recommended_questions(&dataset))
        .await
        .map_err(|e| ApiError::Internal(format!("questions task failed: {e}")))?;

    Ok(Json(json!({
        "questions": questions,
    })))
}

fn verify_dataset_id(state: &AppState, id: &str) -> Result<(), ApiError> {
    if id == &*state.dataset_id {
        Ok(())
    } else {
        Err(ApiError::NotFound(format!("unknown dataset: {id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use datasight::dataset::CellValue;
    use datasight::{Dataset, QaEngine, RateLimiter, SlidingWindowLimiter, UnlimitedLimiter};

    fn sales_dataset() -> Dataset {
        let columns = vec!["order_date", "region", "revenue", "cost"];
        let rows = vec![
            vec!["2024-01-05", "NY", "100", "60"],
            vec!["2024-01-20", "LA", "200", "150"],
            vec!["2024-02-10", "NY", "300", "210"],
            vec!["2024-02-15", "LA", "150", "180"],
        ];
        Dataset::new(
            columns.into_iter().map(String::from).collect(),
            rows.into_iter()
                .map(|r| r.into_iter().map(CellValue::from_text).collect())
                .collect(),
        )
    }

    fn app_state(limiter: Arc<dyn RateLimiter>) -> AppState {
        AppState::new(sales_dataset(), QaEngine::new(), limiter)
    }

    fn client(last_octet: u8) -> ConnectInfo<SocketAddr> {
        ConnectInfo(SocketAddr::from(([127, 0, 0, last_octet], 40000)))
    }

    fn query(state: &AppState, prompt: &str) -> Json<QueryRequest> {
        Json(QueryRequest {
            dataset_id: state.dataset_id.to_string(),
            prompt: prompt.to_string(),
        })
    }

    #[tokio::test]
    async fn test_query_response_fields() {
        let state = app_state(Arc::new(UnlimitedLimiter));
        let request = query(&state, "give me a summary");
        let Json(payload) = post_query(State(state), client(1), request).await.unwrap();

        assert!(payload.get("generated_code").is_some());
        assert!(payload["generated_code"].is_null());
        let nlq = &payload["result_data"]["nlq"];
        assert!(nlq["answer"].is_string());
        assert!(nlq["explanation"].is_string());
        assert!(nlq["recommended_actions"].is_array());
        assert!(nlq.get("chart").is_some());
    }

    #[tokio::test]
    async fn test_query_requires_known_dataset() {
        let state = app_state(Arc::new(UnlimitedLimiter));
        let request = Json(QueryRequest {
            dataset_id: "not-the-served-dataset".to_string(),
            prompt: "give me a summary".to_string(),
        });
        let err = post_query(State(state), client(1), request).await;

        assert!(matches!(err, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_query_rejects_empty_prompt() {
        let state = app_state(Arc::new(UnlimitedLimiter));
        let request = query(&state, "   ");
        let err = post_query(State(state), client(1), request).await;

        assert!(matches!(err, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_recommended_questions_response_fields() {
        let state = app_state(Arc::new(UnlimitedLimiter));
        let dataset_id = state.dataset_id.to_string();
        let Json(payload) =
            get_recommended_questions(State(state), client(1), Path(dataset_id))
                .await
                .unwrap();

        assert!(payload["questions"].is_array());
        assert!(!payload["questions"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_limiter_keyed_by_client_address() {
        let limiter = Arc::new(SlidingWindowLimiter::new(1, Duration::from_secs(60)));
        let state = app_state(limiter);

        let first = post_query(
            State(state.clone()),
            client(1),
            query(&state, "give me a summary"),
        )
        .await;
        assert!(first.is_ok());

        // A different caller has its own budget
        let other = post_query(
            State(state.clone()),
            client(2),
            query(&state, "give me a summary"),
        )
        .await;
        assert!(other.is_ok());

        // The first caller is now over budget
        let again = post_query(
            State(state.clone()),
            client(1),
            query(&state, "give me a summary"),
        )
        .await;
        assert!(matches!(again, Err(ApiError::RateLimited { .. })));
    }
}
