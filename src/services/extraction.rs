//! 抽取服务
//!
//! 从护士的口述文本中抽取临床字段。每个类别是一组按优先级排列的
//! `(pattern, value)` 规则，按列表顺序第一个命中的规则生效，与命中位置无关。

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{AppError, Result};
use crate::models::event::{
    DEFAULT_ROUTE, DOSE_NOT_SPECIFIED, FoodRelation, MEDICATION_NOTE, MedicationEvent,
    SymptomEvent, TimeOfDay,
};

/// 未命中时提示中列出的词表条目数
const HINT_SIZE: usize = 10;

const SYMPTOMS: &[&str] = &[
    "headache",
    "chest pain",
    "nausea",
    "dizziness",
    "fatigue",
    "fever",
    "breathlessness",
    "cough",
    "sore throat",
    "vomiting",
    "abdominal pain",
    "back pain",
    "joint pain",
    "muscle pain",
    "shortness of breath",
    "palpitations",
    "sweating",
    "chills",
];

const MEDICATIONS: &[&str] = &[
    "metformin",
    "aspirin",
    "paracetamol",
    "ibuprofen",
    "lisinopril",
    "amlodipine",
    "omeprazole",
    "levothyroxine",
    "atorvastatin",
    "losartan",
    "metoprolol",
    "albuterol",
    "insulin",
    "warfarin",
    "clopidogrel",
    "prednisone",
    "amoxicillin",
    "azithromycin",
];

const TIME_KEYWORDS: &[(TimeOfDay, &[&str])] = &[
    (TimeOfDay::Morning, &["morning", "am", "breakfast"]),
    (TimeOfDay::Afternoon, &["afternoon", "lunch", "noon"]),
    (TimeOfDay::Evening, &["evening", "dinner"]),
    (TimeOfDay::Night, &["night", "bedtime", "pm"]),
];

const FOOD_PHRASES: &[(FoodRelation, &[&str])] = &[
    (
        FoodRelation::AfterFood,
        &[
            "after food",
            "after eating",
            "after meal",
            "after breakfast",
            "after lunch",
            "after dinner",
        ],
    ),
    (
        FoodRelation::BeforeFood,
        &[
            "before food",
            "before eating",
            "before meal",
            "before breakfast",
            "before lunch",
            "before dinner",
        ],
    ),
    (
        FoodRelation::WithFood,
        &["with food", "with meal", "with meals", "during meal"],
    ),
    (
        FoodRelation::EmptyStomach,
        &["empty stomach", "on empty stomach", "without food"],
    ),
];

const FREQUENCY_MARKERS: &[&str] = &[
    "again",
    "twice",
    "three times",
    "multiple times",
    "every day",
    "daily",
    "since yesterday",
];

static CLOCK_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{1,2}(?::?\d{2})?\s*(?:am|pm)\b").expect("valid clock regex"));

/// 毫克、片数、单位、毫升，按此顺序尝试
static DOSE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\d+\.?\d*\s*mg",
        r"\d+\s*tablets?",
        r"\d+\s*units?",
        r"\d+\.?\d*\s*ml",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid dose regex"))
    .collect()
});

/// 过短、可能出现在其他单词内部的时间关键词
const WHOLE_WORD_TIME_KEYWORDS: &[&str] = &["am", "pm"];

/// 匹配方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// 出现在文本任意位置即可
    Substring,
    /// 必须是独立的词
    WholeWords,
}

/// 单条优先级匹配规则
#[derive(Debug, Clone, PartialEq)]
pub struct Rule<T> {
    pub pattern: String,
    pub value: T,
    pub mode: MatchMode,
}

impl<T> Rule<T> {
    pub fn new(pattern: &str, value: T) -> Self {
        Self {
            pattern: pattern.to_string(),
            value,
            mode: MatchMode::Substring,
        }
    }

    pub fn whole_word(pattern: &str, value: T) -> Self {
        Self {
            mode: MatchMode::WholeWords,
            ..Self::new(pattern, value)
        }
    }
}

/// 固定词表与关键词集合，均按优先级排列
#[derive(Debug, Clone)]
pub struct Vocabulary {
    pub symptoms: Vec<Rule<String>>,
    pub medications: Vec<Rule<String>>,
    pub time_keywords: Vec<Rule<TimeOfDay>>,
    pub food_phrases: Vec<Rule<FoodRelation>>,
    pub frequency_markers: Vec<Rule<String>>,
}

impl Vocabulary {
    /// 标准护理词表
    pub fn clinical() -> Self {
        let identity = |items: &[&str]| -> Vec<Rule<String>> {
            items.iter().map(|s| Rule::new(s, s.to_string())).collect()
        };

        Self {
            symptoms: identity(SYMPTOMS),
            medications: identity(MEDICATIONS),
            time_keywords: TIME_KEYWORDS
                .iter()
                .flat_map(|(value, words)| {
                    words.iter().map(|w| {
                        if WHOLE_WORD_TIME_KEYWORDS.contains(w) {
                            Rule::whole_word(w, value.clone())
                        } else {
                            Rule::new(w, value.clone())
                        }
                    })
                })
                .collect(),
            food_phrases: FOOD_PHRASES
                .iter()
                .flat_map(|(value, phrases)| phrases.iter().map(|p| Rule::new(p, *value)))
                .collect(),
            frequency_markers: identity(FREQUENCY_MARKERS),
        }
    }

    fn hint(rules: &[Rule<String>]) -> String {
        let sample: Vec<&str> = rules
            .iter()
            .take(HINT_SIZE)
            .map(|r| r.value.as_str())
            .collect();
        format!("{}...", sample.join(", "))
    }

    pub fn symptom_hint(&self) -> String {
        Self::hint(&self.symptoms)
    }

    pub fn medication_hint(&self) -> String {
        Self::hint(&self.medications)
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::clinical()
    }
}

/// 基于固定词表的无状态抽取器
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    vocabulary: Vocabulary,
}

impl Extractor {
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self { vocabulary }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn extract_symptom(&self, text: &str) -> Option<String> {
        first_match(&self.vocabulary.symptoms, text).cloned()
    }

    pub fn extract_medication(&self, text: &str) -> Option<String> {
        first_match(&self.vocabulary.medications, text).cloned()
    }

    /// 第一个命中的剂量模式的首个匹配，原样返回
    pub fn extract_dose(&self, text: &str) -> Option<String> {
        let lower = text.to_lowercase();
        DOSE_PATTERNS
            .iter()
            .find_map(|re| re.find(&lower))
            .map(|m| m.as_str().to_string())
    }

    /// 钟点字面量优先于分类关键词
    pub fn extract_time_of_day(&self, text: &str) -> TimeOfDay {
        let lower = text.to_lowercase();
        if let Some(m) = CLOCK_TIME.find(&lower) {
            return TimeOfDay::Clock(m.as_str().to_string());
        }

        first_match(&self.vocabulary.time_keywords, text)
            .cloned()
            .unwrap_or(TimeOfDay::Unspecified)
    }

    pub fn extract_food_relation(&self, text: &str) -> Option<FoodRelation> {
        first_match(&self.vocabulary.food_phrases, text).copied()
    }

    pub fn extract_frequency_marker(&self, text: &str) -> Option<String> {
        first_match(&self.vocabulary.frequency_markers, text).cloned()
    }

    /// 构建症状事件，未识别到症状时返回 `ExtractionMiss`
    pub fn symptom_event(&self, text: &str, timestamp: DateTime<Utc>) -> Result<SymptomEvent> {
        let symptom = self
            .extract_symptom(text)
            .ok_or_else(|| AppError::ExtractionMiss {
                kind: "symptom".to_string(),
                hint: self.vocabulary.symptom_hint(),
            })?;

        Ok(SymptomEvent {
            symptom,
            time_of_day: self.extract_time_of_day(text),
            relation_to_food: self.extract_food_relation(text),
            frequency_marker: self.extract_frequency_marker(text),
            timestamp,
            raw_text: text.to_string(),
        })
    }

    /// 构建用药事件，未识别到药品时返回 `ExtractionMiss`
    pub fn medication_event(
        &self,
        text: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<MedicationEvent> {
        let medication = self
            .extract_medication(text)
            .ok_or_else(|| AppError::ExtractionMiss {
                kind: "medication".to_string(),
                hint: self.vocabulary.medication_hint(),
            })?;

        Ok(MedicationEvent {
            medication,
            dose: self
                .extract_dose(text)
                .unwrap_or_else(|| DOSE_NOT_SPECIFIED.to_string()),
            time_of_day: self.extract_time_of_day(text),
            relation_to_food: self.extract_food_relation(text),
            route: DEFAULT_ROUTE.to_string(),
            timestamp,
            note: MEDICATION_NOTE.to_string(),
            raw_text: text.to_string(),
        })
    }
}

fn first_match<'a, T>(rules: &'a [Rule<T>], text: &str) -> Option<&'a T> {
    let lower = text.to_lowercase();
    let padded = word_padded(&lower);

    rules
        .iter()
        .find(|rule| match rule.mode {
            MatchMode::Substring => lower.contains(rule.pattern.as_str()),
            MatchMode::WholeWords => padded.contains(&format!(" {} ", rule.pattern)),
        })
        .map(|rule| &rule.value)
}

/// 标点折叠为单个空格后的 " word word word " 形式
fn word_padded(text: &str) -> String {
    let words: Vec<&str> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    format!(" {} ", words.join(" "))
}
