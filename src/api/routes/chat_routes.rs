//! Chat Routes
//!
//! 自由文本入口与患者概要。

use crate::api::handlers::chat_handler::*;
use crate::api::handlers::patient_handler::*;
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::app_state::AppState;

/// 创建聊天路由器
pub fn create_chat_router() -> Router<AppState> {
    Router::new()
        .route("/chat", post(chat))
        .route("/patient-info", get(get_patient_info))
}
