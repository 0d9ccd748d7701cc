//! 护理记录生成服务
//!
//! 提示词是固定模板，唯一可变的是数据段。超出长度上限时只截断数据段，指令部分始终完整。

use crate::error::Result;
use crate::models::event::{ClinicalEvent, MedicationEvent, SymptomEvent};
use crate::services::generation::TextGenerator;

pub const NO_SYMPTOMS_NOTE: &str = "No symptoms documented during this period.";
pub const NO_MEDICATIONS_NOTE: &str = "No medications documented during this period.";
pub const NO_EVENTS_SUMMARY: &str = "No events documented.";

const SYMPTOM_HEADER: &str = "=== SYMPTOM DOCUMENTATION ===\n";
const SYMPTOM_FOOTER: &str =
    "\n\nNote: This is documentation only. No clinical interpretation provided.";
const MEDICATION_HEADER: &str = "=== MEDICATION ADMINISTRATION RECORD ===\n";
const MEDICATION_FOOTER: &str = "\n\nNote: Patient-reported intake. Documentation only.";
const SUMMARY_HEADER: &str = "=== CHRONOLOGICAL SUMMARY ===\n";

const SYMPTOM_PROMPT: (&str, &str) = (
    "Write a nursing documentation note based on these reported symptoms. \
     Do not diagnose or interpret. Only document what was reported. \
     Use professional nursing language. Symptoms: ",
    ". Documentation note:",
);
const MEDICATION_PROMPT: (&str, &str) = (
    "Write a medication administration record note. \
     Do not provide dosage advice or recommendations. \
     Only document what was taken as reported. \
     Use professional nursing language. Medications: ",
    ". MAR note:",
);
const SUMMARY_PROMPT: (&str, &str) = (
    "Write a brief chronological nursing summary of these documented events. \
     Do not interpret or diagnose. Only summarize what was documented. Events: ",
    ". Summary:",
);

/// 最小提示词上限下为事件数据保留的长度
const MIN_DATA_CHARS: usize = 64;

/// 能容纳所有固定模板及部分数据的最小 `max_prompt_chars`
pub fn min_prompt_chars() -> usize {
    [SYMPTOM_PROMPT, MEDICATION_PROMPT, SUMMARY_PROMPT]
        .iter()
        .map(|(prefix, suffix)| prefix.chars().count() + suffix.chars().count())
        .max()
        .unwrap_or_default()
        + MIN_DATA_CHARS
}

pub struct NoteGenerator {
    generator: Box<dyn TextGenerator>,
    max_prompt_chars: usize,
}

impl NoteGenerator {
    pub fn new(generator: Box<dyn TextGenerator>, max_prompt_chars: usize) -> Self {
        Self {
            generator,
            max_prompt_chars,
        }
    }

    pub async fn generate_symptom_note(&self, events: &[&SymptomEvent]) -> Result<String> {
        if events.is_empty() {
            return Ok(NO_SYMPTOMS_NOTE.to_string());
        }

        let data = events
            .iter()
            .map(|e| symptom_clause(e))
            .collect::<Vec<_>>()
            .join(", ");
        let note = self.run(SYMPTOM_PROMPT, &data).await?;

        Ok(format!("{}{}{}", SYMPTOM_HEADER, note, SYMPTOM_FOOTER))
    }

    pub async fn generate_medication_note(&self, events: &[&MedicationEvent]) -> Result<String> {
        if events.is_empty() {
            return Ok(NO_MEDICATIONS_NOTE.to_string());
        }

        let data = events
            .iter()
            .map(|e| medication_clause(e))
            .collect::<Vec<_>>()
            .join(", ");
        let note = self.run(MEDICATION_PROMPT, &data).await?;

        Ok(format!("{}{}{}", MEDICATION_HEADER, note, MEDICATION_FOOTER))
    }

    /// 先按时间戳稳定排序，再生成摘要
    pub async fn generate_timeline_summary(&self, events: &[&ClinicalEvent]) -> Result<String> {
        if events.is_empty() {
            return Ok(NO_EVENTS_SUMMARY.to_string());
        }

        let mut sorted = events.to_vec();
        sorted.sort_by_key(|e| e.timestamp());

        let data = sorted
            .iter()
            .map(|e| summary_clause(e))
            .collect::<Vec<_>>()
            .join("; ");
        let summary = self.run(SUMMARY_PROMPT, &data).await?;

        Ok(format!("{}{}", SUMMARY_HEADER, summary))
    }

    async fn run(&self, (prefix, suffix): (&str, &str), data: &str) -> Result<String> {
        let prompt = build_prompt(prefix, data, suffix, self.max_prompt_chars);
        tracing::debug!(
            generator = self.generator.name(),
            prompt_chars = prompt.chars().count(),
            "Generating note"
        );
        let text = self.generator.generate(&prompt).await?;
        Ok(text.trim().to_string())
    }
}

impl std::fmt::Debug for NoteGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoteGenerator")
            .field("generator", &self.generator.name())
            .field("max_prompt_chars", &self.max_prompt_chars)
            .finish()
    }
}

/// `"<symptom> at <time_of_day>[ <food relation>][ (<frequency marker>)]"`
pub fn symptom_clause(event: &SymptomEvent) -> String {
    let mut clause = format!("{} at {}", event.symptom, event.time_of_day);
    if let Some(food) = event.relation_to_food {
        clause.push(' ');
        clause.push_str(food.as_str());
    }
    if let Some(marker) = &event.frequency_marker {
        clause.push_str(&format!(" ({})", marker));
    }
    clause
}

/// `"<medication> <dose> via <route> at <time_of_day>[ <food relation>]"`
pub fn medication_clause(event: &MedicationEvent) -> String {
    let mut clause = format!(
        "{} {} via {} at {}",
        event.medication, event.dose, event.route, event.time_of_day
    );
    if let Some(food) = event.relation_to_food {
        clause.push(' ');
        clause.push_str(food.as_str());
    }
    clause
}

fn summary_clause(event: &ClinicalEvent) -> String {
    match event {
        ClinicalEvent::Symptom(e) => format!("Symptom: {} at {}", e.symptom, e.time_of_day),
        ClinicalEvent::Medication(e) => {
            format!("Medication: {} {} at {}", e.medication, e.dose, e.time_of_day)
        }
    }
}

/// 在字符边界截断 `data`，使 `prefix + data + suffix` 不超过 `max_chars`
fn build_prompt(prefix: &str, data: &str, suffix: &str, max_chars: usize) -> String {
    let fixed = prefix.chars().count() + suffix.chars().count();
    let budget = max_chars.saturating_sub(fixed);
    let data: String = if data.chars().count() > budget {
        data.chars().take(budget).collect::<String>().trim_end().to_string()
    } else {
        data.to_string()
    };
    format!("{}{}{}", prefix, data, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::event::{
        DEFAULT_ROUTE, DOSE_NOT_SPECIFIED, FoodRelation, MEDICATION_NOTE, TimeOfDay,
    };
    use crate::services::generation::SimpleTextGenerator;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;
    use std::sync::Mutex;

    /// 记录每个提示词，并返回其固定函数值
    #[derive(Clone, Default)]
    struct RecordingGenerator {
        prompts: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingGenerator {
        fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }

        fn last_prompt(&self) -> String {
            self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
        }
    }

    #[async_trait]
    impl TextGenerator for RecordingGenerator {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(format!("note of {} chars", prompt.len()))
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl TextGenerator for FailingGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Err(AppError::Timeout("generation timed out".into()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn headache() -> SymptomEvent {
        SymptomEvent {
            symptom: "headache".into(),
            time_of_day: TimeOfDay::Morning,
            relation_to_food: Some(FoodRelation::AfterFood),
            frequency_marker: Some("again".into()),
            timestamp: Utc.with_ymd_and_hms(2026, 1, 8, 9, 30, 0).unwrap(),
            raw_text: String::new(),
        }
    }

    fn lisinopril() -> MedicationEvent {
        MedicationEvent {
            medication: "lisinopril".into(),
            dose: DOSE_NOT_SPECIFIED.into(),
            time_of_day: TimeOfDay::Night,
            relation_to_food: Some(FoodRelation::BeforeFood),
            route: DEFAULT_ROUTE.into(),
            timestamp: Utc.with_ymd_and_hms(2026, 1, 7, 19, 30, 0).unwrap(),
            note: MEDICATION_NOTE.into(),
            raw_text: String::new(),
        }
    }

    #[test]
    fn test_clause_templates() {
        assert_eq!(
            symptom_clause(&headache()),
            "headache at morning after food (again)"
        );
        assert_eq!(
            medication_clause(&lisinopril()),
            "lisinopril dose not specified via oral at night before food"
        );

        let bare = SymptomEvent {
            relation_to_food: None,
            frequency_marker: None,
            ..headache()
        };
        assert_eq!(symptom_clause(&bare), "headache at morning");
    }

    #[tokio::test]
    async fn test_empty_inputs_do_not_call_generator() {
        let recorder = RecordingGenerator::default();
        let notes = NoteGenerator::new(Box::new(recorder.clone()), 2048);

        assert_eq!(notes.generate_symptom_note(&[]).await.unwrap(), NO_SYMPTOMS_NOTE);
        assert_eq!(
            notes.generate_medication_note(&[]).await.unwrap(),
            NO_MEDICATIONS_NOTE
        );
        assert_eq!(
            notes.generate_timeline_summary(&[]).await.unwrap(),
            NO_EVENTS_SUMMARY
        );
        assert_eq!(recorder.calls(), 0);
    }

    #[tokio::test]
    async fn test_symptom_note_is_deterministic_and_wrapped() {
        let recorder = RecordingGenerator::default();
        let notes = NoteGenerator::new(Box::new(recorder.clone()), 2048);
        let event = headache();

        let first = notes.generate_symptom_note(&[&event]).await.unwrap();
        let second = notes.generate_symptom_note(&[&event]).await.unwrap();

        assert_eq!(first, second);
        assert!(first.starts_with("=== SYMPTOM DOCUMENTATION ===\n"));
        assert!(first.ends_with("No clinical interpretation provided."));
        assert_eq!(recorder.calls(), 2);

        let prompt = recorder.last_prompt();
        assert!(prompt.contains("Do not diagnose or interpret."));
        assert!(prompt.contains("Symptoms: headache at morning after food (again)."));
    }

    #[tokio::test]
    async fn test_medication_note_prompt_forbids_dosage_advice() {
        let recorder = RecordingGenerator::default();
        let notes = NoteGenerator::new(Box::new(recorder.clone()), 2048);
        let event = lisinopril();

        let note = notes.generate_medication_note(&[&event]).await.unwrap();
        assert!(note.starts_with("=== MEDICATION ADMINISTRATION RECORD ===\n"));
        assert!(note.ends_with("Patient-reported intake. Documentation only."));
        assert!(
            recorder
                .last_prompt()
                .contains("Do not provide dosage advice or recommendations.")
        );
    }

    #[tokio::test]
    async fn test_timeline_summary_sorts_by_timestamp() {
        let notes = NoteGenerator::new(Box::new(SimpleTextGenerator), 2048);
        let later = ClinicalEvent::from(headache());
        let earlier = ClinicalEvent::from(lisinopril());

        let summary = notes
            .generate_timeline_summary(&[&later, &earlier])
            .await
            .unwrap();
        assert_eq!(
            summary,
            "=== CHRONOLOGICAL SUMMARY ===\nEvents reported: Medication: lisinopril dose not specified at night; Symptom: headache at morning."
        );
    }

    #[tokio::test]
    async fn test_generator_failure_propagates() {
        let notes = NoteGenerator::new(Box::new(FailingGenerator), 2048);
        let event = headache();
        let err = notes.generate_symptom_note(&[&event]).await.unwrap_err();
        assert!(matches!(err, AppError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_long_prompts_are_cut_in_the_data_section() {
        let recorder = RecordingGenerator::default();
        let notes = NoteGenerator::new(Box::new(recorder.clone()), 300);
        let events: Vec<SymptomEvent> = (0..50).map(|_| headache()).collect();
        let refs: Vec<&SymptomEvent> = events.iter().collect();

        notes.generate_symptom_note(&refs).await.unwrap();
        let prompt = recorder.last_prompt();
        assert!(prompt.chars().count() <= 300);
        assert!(prompt.starts_with("Write a nursing documentation note"));
        assert!(prompt.ends_with(". Documentation note:"));

        // same input, same cut
        notes.generate_symptom_note(&refs).await.unwrap();
        let first_prompt = recorder.prompts.lock().unwrap()[0].clone();
        assert_eq!(first_prompt, recorder.last_prompt());
    }

    #[tokio::test]
    async fn test_smallest_prompt_limit_keeps_instructions_and_data() {
        let limit = min_prompt_chars();
        assert!(limit > MIN_DATA_CHARS);

        let recorder = RecordingGenerator::default();
        let notes = NoteGenerator::new(Box::new(recorder.clone()), limit);
        let events: Vec<MedicationEvent> = (0..20).map(|_| lisinopril()).collect();
        let refs: Vec<&MedicationEvent> = events.iter().collect();

        notes.generate_medication_note(&refs).await.unwrap();
        let prompt = recorder.last_prompt();
        assert!(prompt.chars().count() <= limit);
        assert!(prompt.contains("Medications: lisinopril"));
        assert!(prompt.ends_with(". MAR note:"));
    }
}
