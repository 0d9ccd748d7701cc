use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::debug;

use crate::{
    api::{app_state::AppState, dto::timeline_dto::*, validation::validators},
    error::AppError,
};

pub async fn get_timeline(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let session = state.session.lock().await;
    let events: Vec<_> = session.global_timeline().into_iter().cloned().collect();
    debug!("Timeline requested: {} events", events.len());

    Ok(Json(TimelineResponse {
        total: events.len(),
        events,
    }))
}

pub async fn symptom_frequency(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let name = validators::validate_name(&name)?;
    let session = state.session.lock().await;
    let events: Vec<_> = session
        .symptom_frequency(name)
        .into_iter()
        .cloned()
        .collect();
    debug!("Symptom frequency for {}: {}", name, events.len());

    Ok(Json(FrequencyResponse {
        name: name.to_string(),
        total: events.len(),
        events,
    }))
}

pub async fn medication_frequency(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let name = validators::validate_name(&name)?;
    let session = state.session.lock().await;
    let events: Vec<_> = session
        .medication_frequency(name)
        .into_iter()
        .cloned()
        .collect();
    debug!("Medication frequency for {}: {}", name, events.len());

    Ok(Json(FrequencyResponse {
        name: name.to_string(),
        total: events.len(),
        events,
    }))
}
