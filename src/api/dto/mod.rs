//! DTO 模块
//!
//! 数据传输对象，用于 API 请求和响应的序列化。

pub mod chat_dto;
pub mod notes_dto;
pub mod patient_dto;
pub mod search_dto;
pub mod timeline_dto;

pub use chat_dto::*;
pub use notes_dto::*;
pub use patient_dto::*;
pub use search_dto::*;
pub use timeline_dto::*;
