//! 只追加的事件时间线

use serde::Serialize;

use crate::models::event::{ClinicalEvent, EventKind, MedicationEvent, SymptomEvent};

/// 事件在全局追加日志中的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EventRef(pub usize);

/// 只增不减的临床事件记录
///
/// 两个事件流共用一条追加日志以保留全局追加顺序，按流查询时再过滤。
/// 不提供更新或删除接口。
#[derive(Debug, Default)]
pub struct TimelineStore {
    events: Vec<ClinicalEvent>,
}

impl TimelineStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, event: impl Into<ClinicalEvent>) -> EventRef {
        self.events.push(event.into());
        EventRef(self.events.len() - 1)
    }

    pub fn get(&self, event_ref: EventRef) -> Option<&ClinicalEvent> {
        self.events.get(event_ref.0)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.events.iter().filter(|e| e.kind() == kind).count()
    }

    /// 按追加顺序返回全部事件
    pub fn events(&self) -> impl Iterator<Item = &ClinicalEvent> {
        self.events.iter()
    }

    pub fn stream(&self, kind: EventKind) -> impl Iterator<Item = &ClinicalEvent> {
        self.events.iter().filter(move |e| e.kind() == kind)
    }

    pub fn symptoms(&self) -> impl Iterator<Item = &SymptomEvent> {
        self.events.iter().filter_map(ClinicalEvent::as_symptom)
    }

    pub fn medications(&self) -> impl Iterator<Item = &MedicationEvent> {
        self.events.iter().filter_map(ClinicalEvent::as_medication)
    }

    /// 在单个事件流内按名称精确匹配（忽略大小写），保持插入顺序
    pub fn query_by_name(&self, kind: EventKind, name: &str) -> Vec<&ClinicalEvent> {
        let wanted = name.trim().to_lowercase();
        self.stream(kind)
            .filter(|e| e.name().to_lowercase() == wanted)
            .collect()
    }

    /// 按追加顺序合并两个事件流，再按时间戳稳定排序
    pub fn global_timeline(&self) -> Vec<&ClinicalEvent> {
        let mut merged: Vec<&ClinicalEvent> = self.events.iter().collect();
        merged.sort_by_key(|e| e.timestamp());
        merged
    }
}
