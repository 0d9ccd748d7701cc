//! 向量索引服务

use serde::Serialize;

use crate::error::{AppError, Result};
use crate::storage::timeline::EventRef;

/// 索引中的一行：向量及其来源事件
#[derive(Debug, Clone, PartialEq)]
pub struct IndexRow {
    pub event_ref: EventRef,
    pub vector: Vec<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VectorSearchResult {
    /// 与查询向量的欧氏距离平方
    pub distance: f32,
    #[serde(rename = "event_index")]
    pub event_ref: EventRef,
}

pub trait VectorIndex: Send + Sync {
    /// 追加一行，要么整行写入，要么不写入
    fn add(&mut self, vector: Vec<f32>, event_ref: EventRef) -> Result<()>;
    /// 精确 k 近邻搜索，按距离升序
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<VectorSearchResult>>;
    fn len(&self) -> usize;
    fn dimension(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 只追加的扁平表，暴力搜索
#[derive(Debug, Clone)]
pub struct FlatVectorIndex {
    rows: Vec<IndexRow>,
    dimension: usize,
}

impl FlatVectorIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            rows: Vec::new(),
            dimension,
        }
    }

    pub fn rows(&self) -> &[IndexRow] {
        &self.rows
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(AppError::VectorIndex(format!(
                "expected dimension {}, got {}",
                self.dimension,
                vector.len()
            )));
        }
        Ok(())
    }

    fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
    }
}

impl VectorIndex for FlatVectorIndex {
    fn add(&mut self, vector: Vec<f32>, event_ref: EventRef) -> Result<()> {
        self.check_dimension(&vector)?;
        if vector.iter().any(|v| !v.is_finite()) {
            return Err(AppError::VectorIndex(
                "vector contains non-finite values".to_string(),
            ));
        }

        self.rows.push(IndexRow { event_ref, vector });
        Ok(())
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<VectorSearchResult>> {
        self.check_dimension(query)?;

        let mut results: Vec<VectorSearchResult> = self
            .rows
            .iter()
            .map(|row| VectorSearchResult {
                distance: Self::squared_l2(query, &row.vector),
                event_ref: row.event_ref,
            })
            .collect();

        // stable: equal distances keep insertion order
        results.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        results.truncate(k);

        Ok(results)
    }

    fn len(&self) -> usize {
        self.rows.len()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

pub fn create_vector_index(dimension: usize) -> Box<dyn VectorIndex> {
    Box::new(FlatVectorIndex::new(dimension))
}
