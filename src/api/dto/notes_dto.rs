//! 护理文档 DTO

use serde::Serialize;

/// 生成的文档
#[derive(Debug, Serialize)]
pub struct NoteResponse {
    /// "symptoms"、"medications" 或 "timeline"
    pub note_type: String,
    pub note: String,
    /// 参与生成的事件数
    pub event_count: usize,
}
