//! 核心数据模型模块
//!
//! 定义患者信息与临床事件：SymptomEvent, MedicationEvent, ClinicalEvent 等。

pub mod event;
pub mod patient;

pub use event::*;
pub use patient::PatientInfo;
