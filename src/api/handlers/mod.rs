//! Handlers 模块
//!
//! HTTP 请求处理程序。

pub mod chat_handler;
pub mod notes_handler;
pub mod patient_handler;
pub mod search_handler;
pub mod timeline_handler;

pub use chat_handler::*;
pub use notes_handler::*;
pub use patient_handler::*;
pub use search_handler::*;
pub use timeline_handler::*;
