//! 患者信息 DTO

use serde::Serialize;

use crate::services::session::PatientSummary;

/// 患者概要响应
#[derive(Debug, Serialize)]
pub struct PatientInfoResponse {
    pub success: bool,
    #[serde(flatten)]
    pub summary: PatientSummary,
}
