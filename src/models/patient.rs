use serde::{Deserialize, Serialize};

use crate::config::config::PatientConfig;

/// 患者基本信息
///
/// 会话初始化时设定，此后不可修改。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientInfo {
    /// 年龄
    pub age: u32,
    /// 性别
    pub gender: String,
}

impl PatientInfo {
    pub fn new(age: u32, gender: &str) -> Self {
        Self {
            age,
            gender: gender.to_string(),
        }
    }
}

impl From<&PatientConfig> for PatientInfo {
    fn from(config: &PatientConfig) -> Self {
        Self::new(config.age, &config.gender)
    }
}
