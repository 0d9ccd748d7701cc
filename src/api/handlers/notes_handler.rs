use axum::{Json, extract::State, response::IntoResponse};
use tracing::{debug, warn};

use crate::{
    api::{app_state::AppState, dto::notes_dto::*},
    error::AppError,
    models::event::EventKind,
};

fn note_response(note_type: &str, note: String, event_count: usize) -> NoteResponse {
    NoteResponse {
        note_type: note_type.to_string(),
        note,
        event_count,
    }
}

pub async fn generate_symptom_note(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.session.lock().await;
    let count = session.timeline().count(EventKind::Symptom);
    debug!("Generating symptom note from {} events", count);

    let note = session.generate_symptom_note().await.inspect_err(|e| {
        warn!("Symptom note generation failed: {}", e);
    })?;
    state.metrics.record_note();

    Ok(Json(note_response("symptoms", note, count)))
}

pub async fn generate_medication_note(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.session.lock().await;
    let count = session.timeline().count(EventKind::Medication);
    debug!("Generating medication note from {} events", count);

    let note = session.generate_medication_note().await.inspect_err(|e| {
        warn!("Medication note generation failed: {}", e);
    })?;
    state.metrics.record_note();

    Ok(Json(note_response("medications", note, count)))
}

pub async fn generate_timeline_summary(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.session.lock().await;
    let count = session.timeline().len();
    debug!("Generating timeline summary from {} events", count);

    let note = session.generate_timeline_summary().await.inspect_err(|e| {
        warn!("Timeline summary generation failed: {}", e);
    })?;
    state.metrics.record_note();

    Ok(Json(note_response("timeline", note, count)))
}
