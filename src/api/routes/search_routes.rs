//! Search Routes
//!
//! 定义语义搜索路由。

use crate::api::handlers::search_handler::*;
use axum::{Router, routing::get};

use crate::api::app_state::AppState;

/// 创建搜索路由器
pub fn create_search_router() -> Router<AppState> {
    Router::new().route("/search", get(semantic_search))
}
