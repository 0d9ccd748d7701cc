//! API 模块
//!
//! 提供 REST API 支持。

#[cfg(test)]
mod api_tests;
pub mod app_state;
pub mod dto;
pub mod handlers;
pub mod routes;
pub mod validation;

use crate::api::app_state::AppState;
use crate::config::config::ServerConfig;
use crate::observability::metrics_middleware;
use axum::Router;
use axum::http::{HeaderValue, Method, header};
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

pub fn create_router(app_state: AppState, server: &ServerConfig) -> Router {
    let api = Router::new()
        .merge(routes::chat_routes::create_chat_router())
        .merge(routes::timeline_routes::create_timeline_router())
        .merge(routes::notes_routes::create_notes_router())
        .merge(routes::search_routes::create_search_router());

    let metrics = app_state.metrics.clone();

    Router::new()
        .nest("/api", api)
        .layer(TimeoutLayer::new(Duration::from_secs(
            server.request_timeout.max(1),
        )))
        .layer(cors_layer(&server.cors_origins))
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn_with_state(
            metrics,
            metrics_middleware,
        ))
        .with_state(app_state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}
