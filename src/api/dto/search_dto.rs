//! 搜索 DTO

use serde::{Deserialize, Serialize};

use crate::models::event::ClinicalEvent;

/// 语义搜索查询参数
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchQueryParams {
    /// 搜索查询
    pub q: Option<String>,
    /// 返回结果数量
    pub k: Option<usize>,
}

/// 搜索结果项
#[derive(Debug, Clone, Serialize)]
pub struct SearchResultItem {
    /// 平方欧氏距离
    pub distance: f32,
    pub event: ClinicalEvent,
}

/// 搜索响应
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchResultItem>,
    pub total_results: usize,
    /// 耗时（毫秒）
    pub took_ms: u64,
}
