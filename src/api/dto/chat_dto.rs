//! 聊天 DTO

use serde::{Deserialize, Serialize};

/// 聊天请求，`text` 与 `message` 二选一
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChatRequest {
    pub text: Option<String>,
    pub message: Option<String>,
}

impl ChatRequest {
    /// 两者都存在时取 `text`，空白字符串视为缺失
    pub fn content(&self) -> Option<&str> {
        [self.text.as_deref(), self.message.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty())
    }
}

/// 聊天响应
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub success: bool,
}
