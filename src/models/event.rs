use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 未识别到剂量时的占位值
pub const DOSE_NOT_SPECIFIED: &str = "dose not specified";

/// 默认给药途径
pub const DEFAULT_ROUTE: &str = "oral";

/// 用药事件的固定备注
pub const MEDICATION_NOTE: &str = "patient reported intake";

/// 事件流类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// 症状
    Symptom,
    /// 用药
    Medication,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Symptom => "symptom",
            EventKind::Medication => "medication",
        }
    }

    /// 时间线报告中使用的大写标签
    pub fn label(&self) -> &'static str {
        match self {
            EventKind::Symptom => "SYMPTOM",
            EventKind::Medication => "MEDICATION",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 一天中的时间
///
/// 分类值、原样保留的钟点字符串，或未指定。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
    /// 文本中出现的钟点，如 "9:30 pm"
    Clock(String),
    Unspecified,
}

impl TimeOfDay {
    pub const UNSPECIFIED: &'static str = "unspecified time";

    pub fn as_str(&self) -> &str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
            TimeOfDay::Night => "night",
            TimeOfDay::Clock(literal) => literal,
            TimeOfDay::Unspecified => Self::UNSPECIFIED,
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for TimeOfDay {
    fn from(value: String) -> Self {
        match value.as_str() {
            "morning" => TimeOfDay::Morning,
            "afternoon" => TimeOfDay::Afternoon,
            "evening" => TimeOfDay::Evening,
            "night" => TimeOfDay::Night,
            "" | "unspecified" | Self::UNSPECIFIED => TimeOfDay::Unspecified,
            _ => TimeOfDay::Clock(value),
        }
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        match value {
            TimeOfDay::Clock(literal) => literal,
            other => other.as_str().to_string(),
        }
    }
}

/// 与进食的关系
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FoodRelation {
    #[serde(rename = "after food")]
    AfterFood,
    #[serde(rename = "before food")]
    BeforeFood,
    #[serde(rename = "with food")]
    WithFood,
    #[serde(rename = "empty stomach")]
    EmptyStomach,
}

impl FoodRelation {
    pub fn as_str(&self) -> &'static str {
        match self {
            FoodRelation::AfterFood => "after food",
            FoodRelation::BeforeFood => "before food",
            FoodRelation::WithFood => "with food",
            FoodRelation::EmptyStomach => "empty stomach",
        }
    }
}

impl fmt::Display for FoodRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 症状事件
///
/// 由一段原始文本抽取而来，创建后不可变。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomEvent {
    /// 症状名称（来自症状词表）
    pub symptom: String,
    /// 发生时间
    pub time_of_day: TimeOfDay,
    /// 与进食的关系
    pub relation_to_food: Option<FoodRelation>,
    /// 频次标记（如 "again"）
    pub frequency_marker: Option<String>,
    /// 记录时间
    pub timestamp: DateTime<Utc>,
    /// 原始文本
    pub raw_text: String,
}

/// 用药事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationEvent {
    /// 药品名称（来自药品词表）
    pub medication: String,
    /// 剂量，未识别时为 "dose not specified"
    pub dose: String,
    /// 服药时间
    pub time_of_day: TimeOfDay,
    /// 与进食的关系
    pub relation_to_food: Option<FoodRelation>,
    /// 给药途径
    pub route: String,
    /// 记录时间
    pub timestamp: DateTime<Utc>,
    /// 固定备注
    pub note: String,
    /// 原始文本
    pub raw_text: String,
}

/// 时间线中的临床事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClinicalEvent {
    Symptom(SymptomEvent),
    Medication(MedicationEvent),
}

impl ClinicalEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ClinicalEvent::Symptom(_) => EventKind::Symptom,
            ClinicalEvent::Medication(_) => EventKind::Medication,
        }
    }

    /// 症状名或药品名
    pub fn name(&self) -> &str {
        match self {
            ClinicalEvent::Symptom(e) => &e.symptom,
            ClinicalEvent::Medication(e) => &e.medication,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            ClinicalEvent::Symptom(e) => e.timestamp,
            ClinicalEvent::Medication(e) => e.timestamp,
        }
    }

    pub fn time_of_day(&self) -> &TimeOfDay {
        match self {
            ClinicalEvent::Symptom(e) => &e.time_of_day,
            ClinicalEvent::Medication(e) => &e.time_of_day,
        }
    }

    pub fn relation_to_food(&self) -> Option<FoodRelation> {
        match self {
            ClinicalEvent::Symptom(e) => e.relation_to_food,
            ClinicalEvent::Medication(e) => e.relation_to_food,
        }
    }

    pub fn as_symptom(&self) -> Option<&SymptomEvent> {
        match self {
            ClinicalEvent::Symptom(e) => Some(e),
            ClinicalEvent::Medication(_) => None,
        }
    }

    pub fn as_medication(&self) -> Option<&MedicationEvent> {
        match self {
            ClinicalEvent::Medication(e) => Some(e),
            ClinicalEvent::Symptom(_) => None,
        }
    }

    /// 生成嵌入向量所用的规范文本
    ///
    /// 相同事件总是得到相同的输入。
    pub fn canonical_text(&self) -> String {
        match self {
            ClinicalEvent::Symptom(e) => format!("symptom {} {}", e.symptom, e.time_of_day),
            ClinicalEvent::Medication(e) => format!("medication {} {}", e.medication, e.dose),
        }
    }
}

impl From<SymptomEvent> for ClinicalEvent {
    fn from(event: SymptomEvent) -> Self {
        ClinicalEvent::Symptom(event)
    }
}

impl From<MedicationEvent> for ClinicalEvent {
    fn from(event: MedicationEvent) -> Self {
        ClinicalEvent::Medication(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn symptom() -> SymptomEvent {
        SymptomEvent {
            symptom: "headache".into(),
            time_of_day: TimeOfDay::Morning,
            relation_to_food: Some(FoodRelation::AfterFood),
            frequency_marker: Some("again".into()),
            timestamp: Utc.with_ymd_and_hms(2026, 1, 8, 9, 30, 0).unwrap(),
            raw_text: "headache again after breakfast".into(),
        }
    }

    #[test]
    fn test_time_of_day_string_round_trip() {
        assert_eq!(TimeOfDay::from("night".to_string()), TimeOfDay::Night);
        assert_eq!(
            TimeOfDay::from("9:30 pm".to_string()),
            TimeOfDay::Clock("9:30 pm".into())
        );
        assert_eq!(
            TimeOfDay::from("unspecified time".to_string()),
            TimeOfDay::Unspecified
        );
        assert_eq!(String::from(TimeOfDay::Clock("8 am".into())), "8 am");
    }

    #[test]
    fn test_event_serializes_with_plain_strings() {
        let event = ClinicalEvent::from(symptom());
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "symptom");
        assert_eq!(json["time_of_day"], "morning");
        assert_eq!(json["relation_to_food"], "after food");

        let back: ClinicalEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_canonical_text() {
        let event = ClinicalEvent::from(symptom());
        assert_eq!(event.canonical_text(), "symptom headache morning");

        let med = ClinicalEvent::from(MedicationEvent {
            medication: "metformin".into(),
            dose: "1000mg".into(),
            time_of_day: TimeOfDay::Morning,
            relation_to_food: None,
            route: DEFAULT_ROUTE.into(),
            timestamp: Utc::now(),
            note: MEDICATION_NOTE.into(),
            raw_text: String::new(),
        });
        assert_eq!(med.canonical_text(), "medication metformin 1000mg");
        assert_eq!(med.kind(), EventKind::Medication);
        assert_eq!(med.name(), "metformin");
    }
}
