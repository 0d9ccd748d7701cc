//! 嵌入模型服务

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::config::config::EmbeddingConfig;
use crate::error::{AppError, Result};

#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    async fn encode(&self, text: &str) -> Result<Vec<f32>>;
    fn dimension(&self) -> usize;
    fn name(&self) -> &str;

    /// 启动时的可达性探测，用于选择完整或降级模式
    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

/// 基于小写词元带符号特征哈希的离线嵌入
///
/// 相同输入总是得到相同的 L2 归一化向量。
pub struct SimpleEmbeddingModel {
    dimension: usize,
}

impl SimpleEmbeddingModel {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn fnv1a(bytes: &[u8]) -> u64 {
        let mut hash: u64 = 0xcbf29ce484222325;
        for b in bytes {
            hash ^= u64::from(*b);
            hash = hash.wrapping_mul(0x100000001b3);
        }
        hash
    }
}

#[async_trait]
impl EmbeddingModel for SimpleEmbeddingModel {
    async fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let mut sum = vec![0.0f32; self.dimension];

        for word in text.split_whitespace() {
            let hash = Self::fnv1a(word.to_lowercase().as_bytes());
            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            sum[bucket] += sign;
        }

        let norm: f32 = sum.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for val in &mut sum {
                *val /= norm;
            }
        }

        Ok(sum)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "simple"
    }
}

/// Ollama Embedding 模型客户端
pub struct OllamaEmbeddingModel {
    client: reqwest::Client,
    model_name: String,
    base_url: String,
    dimension: usize,
}

#[derive(Deserialize)]
struct OllamaEmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

impl OllamaEmbeddingModel {
    pub fn new(
        base_url: &str,
        model_name: &str,
        dimension: usize,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            model_name: model_name.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            dimension,
        })
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let response = self
            .client
            .post(format!("{}/api/embed", self.base_url))
            .json(&serde_json::json!({
                "model": self.model_name,
                "input": [text],
                "truncate": true
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Embedding(format!(
                "Ollama embedding failed ({}): {}",
                status, error_text
            )));
        }

        let embed_response: OllamaEmbedResponse = response
            .json()
            .await
            .map_err(|e| AppError::Embedding(format!("invalid embedding response: {}", e)))?;

        let vector = embed_response
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Embedding("empty embedding response".to_string()))?;
        if vector.len() != self.dimension {
            return Err(AppError::Embedding(format!(
                "expected dimension {}, got {}",
                self.dimension,
                vector.len()
            )));
        }

        Ok(vector)
    }
}

#[async_trait]
impl EmbeddingModel for OllamaEmbeddingModel {
    async fn encode(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(text).await
    }

    fn dimension(&self) -> usize {
        self.dimension
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
                "Ollama embedding backend returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}

/// 根据配置创建嵌入后端，`"none"` 表示不启用
pub fn create_embedding_model(config: &EmbeddingConfig) -> Result<Option<Box<dyn EmbeddingModel>>> {
    match config.backend.as_str() {
        "none" => Ok(None),
        "ollama" => {
            let model = OllamaEmbeddingModel::new(
                &config.ollama_url,
                &config.model_name,
                config.dimension,
                Duration::from_secs(config.timeout.max(1)),
            )?;
            Ok(Some(Box::new(model)))
        }
        "simple" => Ok(Some(Box::new(SimpleEmbeddingModel::new(config.dimension)))),
        other => Err(AppError::Config(format!(
            "unknown embedding backend: {}",
            other
        ))),
    }
}
