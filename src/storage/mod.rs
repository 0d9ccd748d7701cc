//! 存储层模块
//!
//! 进程内的只追加时间线，不做持久化。

pub mod timeline;

pub use timeline::{EventRef, TimelineStore};
