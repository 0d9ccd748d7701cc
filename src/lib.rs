//! Chartline - 护理文档服务
//!
//! 将护士的自由文本转为结构化的症状与用药事件，维护只追加的时间线，
//! 并基于已记录事件生成护理文档。

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod index;
pub mod models;
pub mod observability;
pub mod services;
pub mod storage;
