use axum::{Json, extract::State, response::IntoResponse};
use tracing::debug;

use crate::{
    api::{app_state::AppState, dto::chat_dto::*, validation::validators},
    error::AppError,
    services::command::interpret_chat,
};

pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<impl IntoResponse, AppError> {
    let text = validators::validate_chat_text(request.content())?;
    debug!("Chat message received ({} chars)", text.chars().count());

    let outcome = {
        let mut session = state.session.lock().await;
        interpret_chat(&mut session, text).await?
    };

    if let Some(kind) = outcome.recorded {
        state.metrics.record_event(kind);
    }
    if outcome.extraction_miss {
        state.metrics.record_extraction_miss();
    }
    if outcome.note_generated {
        state.metrics.record_note();
    }

    Ok(Json(ChatResponse {
        reply: outcome.reply,
        success: outcome.success,
    }))
}
