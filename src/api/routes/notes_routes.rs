//! Notes Routes
//!
//! 护理文档生成。

use crate::api::handlers::notes_handler::*;
use axum::{Router, routing::post};

use crate::api::app_state::AppState;

/// 创建文档路由器
pub fn create_notes_router() -> Router<AppState> {
    Router::new()
        .route("/notes/symptoms", post(generate_symptom_note))
        .route("/notes/medications", post(generate_medication_note))
        .route("/notes/timeline", post(generate_timeline_summary))
}
