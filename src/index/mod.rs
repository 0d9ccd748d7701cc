//! 索引模块

pub mod embedding;
pub mod vector;

pub use embedding::{EmbeddingModel, create_embedding_model};
pub use vector::{FlatVectorIndex, VectorIndex, VectorSearchResult, create_vector_index};

use crate::error::{AppError, Result};
use crate::models::event::ClinicalEvent;
use crate::storage::timeline::EventRef;

/// 嵌入模型及由其构建的向量表
pub struct SemanticIndex {
    embedding_model: Box<dyn EmbeddingModel>,
    vectors: Box<dyn VectorIndex>,
}

impl SemanticIndex {
    pub fn new(
        embedding_model: Box<dyn EmbeddingModel>,
        vectors: Box<dyn VectorIndex>,
    ) -> Result<Self> {
        if embedding_model.dimension() != vectors.dimension() {
            return Err(AppError::Config(format!(
                "embedding dimension {} does not match index dimension {}",
                embedding_model.dimension(),
                vectors.dimension()
            )));
        }

        Ok(Self {
            embedding_model,
            vectors,
        })
    }

    /// 对事件的规范文本做嵌入
    pub async fn embed_event(&self, event: &ClinicalEvent) -> Result<Vec<f32>> {
        self.embedding_model.encode(&event.canonical_text()).await
    }

    pub fn add(&mut self, vector: Vec<f32>, event_ref: EventRef) -> Result<()> {
        self.vectors.add(vector, event_ref)
    }

    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<VectorSearchResult>> {
        let query_vector = self.embedding_model.encode(query).await?;
        self.vectors.search(&query_vector, k)
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

impl std::fmt::Debug for SemanticIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemanticIndex")
            .field("embedding_model", &self.embedding_model.name())
            .field("len", &self.vectors.len())
            .finish()
    }
}
