//! 时间线 DTO

use serde::Serialize;

use crate::models::event::ClinicalEvent;

/// 时间线响应，按时间戳升序
#[derive(Debug, Serialize)]
pub struct TimelineResponse {
    pub events: Vec<ClinicalEvent>,
    pub total: usize,
}

/// 单个症状或药物的频次响应，按记录顺序
#[derive(Debug, Serialize)]
pub struct FrequencyResponse<T: Serialize> {
    pub name: String,
    pub total: usize,
    pub events: Vec<T>,
}
