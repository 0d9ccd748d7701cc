use axum::{Json, extract::State, response::IntoResponse};
use tracing::debug;

use crate::{
    api::{app_state::AppState, dto::patient_dto::*},
    error::AppError,
};

pub async fn get_patient_info(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let summary = state.session.lock().await.patient_summary();
    debug!(
        "Patient summary: {} symptoms, {} medications, mode {}",
        summary.symptom_count,
        summary.medication_count,
        summary.mode.as_str()
    );

    Ok(Json(PatientInfoResponse {
        success: true,
        summary,
    }))
}
