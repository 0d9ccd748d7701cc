//! 文本生成服务
//!
//! 确定性解码的生成后端。

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::config::config::GenerationConfig;
use crate::error::{AppError, Result};

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// 相同提示词得到相同输出；失败返回错误，而不是空文本
    async fn generate(&self, prompt: &str) -> Result<String>;
    fn name(&self) -> &str;

    /// 启动时的可达性探测，用于选择完整或降级模式
    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

/// 离线生成器，复述提示词中的数据段
///
/// 提示词形如不含冒号的指令加 `"<Label>: <data>. <Cue>:"`，
/// 输出为 `"<Label> reported: <data>."`。
pub struct SimpleTextGenerator;

#[async_trait]
impl TextGenerator for SimpleTextGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = prompt
            .trim_end()
            .strip_suffix(':')
            .and_then(|p| p.rsplit_once(". "))
            .map(|(body, _cue)| body)
            .ok_or_else(|| AppError::Generation("prompt has no closing cue".to_string()))?;

        let (head, data) = body
            .split_once(": ")
            .ok_or_else(|| AppError::Generation("prompt has no data section".to_string()))?;
        let label = head.rsplit(' ').next().unwrap_or(head);

        if data.trim().is_empty() {
            return Err(AppError::Generation("prompt data section is empty".to_string()));
        }

        Ok(format!("{} reported: {}.", label, data.trim()))
    }

    fn name(&self) -> &str {
        "simple"
    }
}

/// Ollama 文本生成客户端（贪心解码，无随机采样）
pub struct OllamaTextGenerator {
    client: reqwest::Client,
    model_name: String,
    base_url: String,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

impl OllamaTextGenerator {
    pub fn new(
        base_url: &str,
        model_name: &str,
        max_output_tokens: u32,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            model_name: model_name.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            max_output_tokens,
        })
    }
}

#[async_trait]
impl TextGenerator for OllamaTextGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&serde_json::json!({
                "model": self.model_name,
                "prompt": prompt,
                "stream": false,
                "options": {
                    "temperature": 0.0,
                    "top_k": 1,
                    "seed": 0,
                    "num_predict": self.max_output_tokens
                }
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Generation(format!(
                "Ollama generation failed ({}): {}",
                status, error_text
            )));
        }

        let body: OllamaGenerateResponse = response
            .json()
            .await
            .map_err(|e| AppError::Generation(format!("invalid generation response: {}", e)))?;

        let text = body.response.trim();
        if text.is_empty() {
            return Err(AppError::Generation("model returned empty output".to_string()));
        }

        Ok(text.to_string())
    }

    fn name(&self) -> &str {
        &self.model_name
    }

    async fn health_check(&self) -> Result<()> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(AppError::ServiceUnavailable(format!(
                "Ollama generation backend returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}

/// 根据配置创建生成后端，`"none"` 表示不启用
pub fn create_text_generator(config: &GenerationConfig) -> Result<Option<Box<dyn TextGenerator>>> {
    match config.backend.as_str() {
        "none" => Ok(None),
        "ollama" => {
            let generator = OllamaTextGenerator::new(
                &config.ollama_url,
                &config.model_name,
                config.max_output_tokens,
                Duration::from_secs(config.timeout.max(1)),
            )?;
            Ok(Some(Box::new(generator)))
        }
        "simple" => Ok(Some(Box::new(SimpleTextGenerator))),
        other => Err(AppError::Config(format!(
            "unknown generation backend: {}",
            other
        ))),
    }
}
