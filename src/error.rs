//! 错误处理模块
//!
//! 定义应用程序的错误类型和错误处理逻辑。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 应用程序错误类型
#[derive(Error, Debug)]
pub enum AppError {
    /// 未识别到任何词表条目
    #[error("No recognized {kind} found in text. Recognized {kind}s: {hint}")]
    ExtractionMiss { kind: String, hint: String },

    /// 嵌入或生成服务不可用（降级模式）
    #[error("服务不可用: {0}")]
    ServiceUnavailable(String),

    /// 参数验证错误
    #[error("参数验证失败: {0}")]
    Validation(String),

    /// 嵌入模型错误
    #[error("嵌入模型错误: {0}")]
    Embedding(String),

    /// 文本生成错误
    #[error("文本生成错误: {0}")]
    Generation(String),

    /// 向量索引错误
    #[error("向量索引错误: {0}")]
    VectorIndex(String),

    /// 超时错误
    #[error("操作超时: {0}")]
    Timeout(String),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 序列化错误
    #[error("序列化错误: {0}")]
    Serialization(String),

    /// IO 错误
    #[error("IO 错误: {0}")]
    Io(String),

    /// 内部错误
    #[error("内部错误: {0}")]
    Internal(String),
}

impl AppError {
    /// 本地可恢复的错误，在边界处转换为用户提示
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AppError::ExtractionMiss { .. } | AppError::Validation(_))
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Serialization(e.to_string())
    }
}

impl From<figment::Error> for AppError {
    fn from(e: figment::Error) -> Self {
        AppError::Config(e.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AppError::Timeout(e.to_string())
        } else if e.is_connect() {
            AppError::ServiceUnavailable(e.to_string())
        } else if e.is_decode() {
            AppError::Serialization(e.to_string())
        } else {
            AppError::Internal(e.to_string())
        }
    }
}

/// Axum response implementation for AppError
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = (&self).into();
        let body = Json(ErrorResponse::new(&code, &self.to_string()));
        (
            StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body,
        )
            .into_response()
    }
}

/// 错误响应
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// 错误代码
    pub code: String,
    /// 错误消息
    pub message: String,
}

impl ErrorResponse {
    /// 创建新错误响应
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
        }
    }
}

/// HTTP 状态码映射
impl From<&AppError> for (u16, String) {
    fn from(err: &AppError) -> (u16, String) {
        match err {
            AppError::Validation(_) => (400, "BAD_REQUEST".to_string()),
            AppError::ExtractionMiss { .. } => (422, "EXTRACTION_MISS".to_string()),
            AppError::Timeout(_) => (408, "TIMEOUT".to_string()),
            AppError::ServiceUnavailable(_) => (503, "SERVICE_UNAVAILABLE".to_string()),
            AppError::Embedding(_) => (502, "EMBEDDING_ERROR".to_string()),
            AppError::Generation(_) => (502, "GENERATION_ERROR".to_string()),
            AppError::VectorIndex(_) => (500, "INDEX_ERROR".to_string()),
            _ => (500, "INTERNAL_ERROR".to_string()),
        }
    }
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let (status, code): (u16, String) = (&AppError::Validation("empty".into())).into();
        assert_eq!(status, 400);
        assert_eq!(code, "BAD_REQUEST");

        let (status, _): (u16, String) = (&AppError::ServiceUnavailable("down".into())).into();
        assert_eq!(status, 503);

        let miss = AppError::ExtractionMiss {
            kind: "symptom".into(),
            hint: "headache...".into(),
        };
        let (status, code): (u16, String) = (&miss).into();
        assert_eq!(status, 422);
        assert_eq!(code, "EXTRACTION_MISS");
    }

    #[test]
    fn test_recoverable_classification() {
        assert!(AppError::Validation("x".into()).is_recoverable());
        assert!(
            AppError::ExtractionMiss {
                kind: "medication".into(),
                hint: String::new(),
            }
            .is_recoverable()
        );
        assert!(!AppError::Generation("x".into()).is_recoverable());
        assert!(!AppError::Internal("x".into()).is_recoverable());
    }

    #[test]
    fn test_extraction_miss_message_names_kind() {
        let miss = AppError::ExtractionMiss {
            kind: "symptom".into(),
            hint: "headache, chest pain...".into(),
        };
        let message = miss.to_string();
        assert!(message.starts_with("No recognized symptom found in text."));
        assert!(message.contains("headache, chest pain..."));
    }
}
