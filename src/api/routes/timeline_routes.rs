//! Timeline Routes
//!
//! 时间线与频次查询，只读。

use crate::api::handlers::timeline_handler::*;
use axum::{Router, routing::get};

use crate::api::app_state::AppState;

/// 创建时间线路由器
pub fn create_timeline_router() -> Router<AppState> {
    Router::new()
        .route("/timeline", get(get_timeline))
        .route("/symptoms/:name/frequency", get(symptom_frequency))
        .route("/medications/:name/frequency", get(medication_frequency))
}
