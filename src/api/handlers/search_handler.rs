use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use tracing::debug;

use crate::{
    api::{app_state::AppState, dto::search_dto::*, validation::validators},
    error::AppError,
};

pub async fn semantic_search(
    State(state): State<AppState>,
    Query(params): Query<SearchQueryParams>,
) -> Result<impl IntoResponse, AppError> {
    let query = validators::validate_search_query(params.q.as_deref())?;
    let k = validators::validate_k(params.k)?;
    debug!("Semantic search: query: {}, k: {}", query, k);

    state.metrics.record_search();
    let start_time = std::time::Instant::now();

    let session = state.session.lock().await;
    let results: Vec<SearchResultItem> = session
        .search_similar(query, k)
        .await?
        .into_iter()
        .map(|(distance, event)| SearchResultItem {
            distance,
            event: event.clone(),
        })
        .collect();

    let took_ms = start_time.elapsed().as_millis() as u64;

    Ok(Json(SearchResponse {
        query: query.to_string(),
        total_results: results.len(),
        results,
        took_ms,
    }))
}
