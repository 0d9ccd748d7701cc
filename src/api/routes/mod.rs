//! Routes 模块
//!
//! 定义 API 路由。

pub mod chat_routes;
pub mod notes_routes;
pub mod search_routes;
pub mod timeline_routes;
