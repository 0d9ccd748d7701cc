//! 文本报告渲染
//!
//! 控制台与聊天接口共用的纯文本视图。渲染不访问会话，由调用方传入已查询的数据。

use chrono::{DateTime, Utc};

use crate::models::event::{ClinicalEvent, MedicationEvent, SymptomEvent};
use crate::services::session::Recorded;

const RULE_WIDTH: usize = 60;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const EMPTY_TIMELINE: &str =
    "No events documented yet.\n\nTry: 'Patient has headache after breakfast'";

pub const HELP_TEXT: &str = "\
Commands:
  record-symptom <text>        (note)           Record symptom
  record-medication <text>     (med)            Record medication
  show-timeline                (timeline)       View all events
  symptom-frequency <name>     (frequency)      View symptom frequency
  medication-frequency <name>  (med_frequency)  View medication frequency
  generate-symptom-note        (nurse_note)     Generate nursing note
  generate-medication-note     (med_note)       Generate medication note
  generate-timeline-summary                     Generate chronological summary
  help                                          Show commands
  exit                                          Exit system";

pub const CHAT_GUIDANCE: &str = "\
Clinical Documentation Assistant

I can help you document:

Symptoms:
   \"Patient has headache after breakfast\"
   \"Chest pain in the evening\"

Medications:
   \"Gave metformin 1000mg in morning\"
   \"Lisinopril after dinner\"

View data:
   \"Show timeline\"

Try describing a symptom or medication!";

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

fn stamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// 事件记录后的确认信息
pub fn render_recorded(recorded: &Recorded) -> String {
    let mut lines = Vec::new();
    match &recorded.event {
        ClinicalEvent::Symptom(e) => {
            lines.push(format!("Symptom documented: {}", e.symptom));
            lines.push(format!("  Time: {}", e.time_of_day));
            if let Some(food) = e.relation_to_food {
                lines.push(format!("  Food relation: {}", food));
            }
            if let Some(marker) = &e.frequency_marker {
                lines.push(format!("  Frequency: {}", marker));
            }
        }
        ClinicalEvent::Medication(e) => {
            lines.push(format!("Medication documented: {}", e.medication));
            lines.push(format!("  Dose: {}", e.dose));
            lines.push(format!("  Time: {}", e.time_of_day));
            if let Some(food) = e.relation_to_food {
                lines.push(format!("  Food relation: {}", food));
            }
        }
    }
    if !recorded.indexed {
        lines.push("  (semantic index unavailable; stored in timeline only)".to_string());
    }
    lines.join("\n")
}

/// 基于已排序事件列表的 `PATIENT TIMELINE` 报告
pub fn render_timeline(events: &[&ClinicalEvent]) -> String {
    if events.is_empty() {
        return EMPTY_TIMELINE.to_string();
    }

    let mut out = format!("{}\nPATIENT TIMELINE\n{}\n", rule(), rule());
    for event in events {
        out.push_str(&format!(
            "\n[{}] {}\n",
            stamp(event.timestamp()),
            event.kind().label()
        ));
        match event {
            ClinicalEvent::Symptom(e) => {
                out.push_str(&format!("  {} at {}\n", e.symptom, e.time_of_day));
                if let Some(food) = e.relation_to_food {
                    out.push_str(&format!("  Food relation: {}\n", food));
                }
                if let Some(marker) = &e.frequency_marker {
                    out.push_str(&format!("  Frequency: {}\n", marker));
                }
            }
            ClinicalEvent::Medication(e) => {
                out.push_str(&format!(
                    "  {} {} at {}\n",
                    e.medication, e.dose, e.time_of_day
                ));
                if let Some(food) = e.relation_to_food {
                    out.push_str(&format!("  Food relation: {}\n", food));
                }
                out.push_str(&format!("  Route: {}\n", e.route));
            }
        }
    }
    out.push_str(&format!("\n{}", rule()));
    out
}

fn no_instances(name: &str) -> String {
    format!("No documented instances of '{}'", name)
}

pub fn render_symptom_frequency(name: &str, events: &[&SymptomEvent]) -> String {
    if events.is_empty() {
        return no_instances(name);
    }

    let mut out = format!(
        "{}\nFREQUENCY REPORT: {}\n{}\nTotal occurrences: {}\n\nDetailed records:\n",
        rule(),
        name.to_uppercase(),
        rule(),
        events.len()
    );
    for (i, e) in events.iter().enumerate() {
        out.push_str(&format!("\n  {}. [{}]\n", i + 1, stamp(e.timestamp)));
        out.push_str(&format!("     Time of day: {}\n", e.time_of_day));
        if let Some(food) = e.relation_to_food {
            out.push_str(&format!("     Food relation: {}\n", food));
        }
        if let Some(marker) = &e.frequency_marker {
            out.push_str(&format!("     Frequency marker: {}\n", marker));
        }
    }
    out.push_str(&format!("\n{}", rule()));
    out
}

pub fn render_medication_frequency(name: &str, events: &[&MedicationEvent]) -> String {
    if events.is_empty() {
        return no_instances(name);
    }

    let mut out = format!(
        "{}\nMEDICATION FREQUENCY REPORT: {}\n{}\nTotal administrations: {}\n\nDetailed records:\n",
        rule(),
        name.to_uppercase(),
        rule(),
        events.len()
    );
    for (i, e) in events.iter().enumerate() {
        out.push_str(&format!("\n  {}. [{}]\n", i + 1, stamp(e.timestamp)));
        out.push_str(&format!("     Dose: {}\n", e.dose));
        out.push_str(&format!("     Time of day: {}\n", e.time_of_day));
        if let Some(food) = e.relation_to_food {
            out.push_str(&format!("     Food relation: {}\n", food));
        }
        out.push_str(&format!("     Route: {}\n", e.route));
    }
    out.push_str(&format!("\n{}", rule()));
    out
}

/// 未识别到任何内容时的提示
pub fn render_extraction_miss(kind: &str, hint: &str) -> String {
    format!(
        "No recognized {kind} found in text.\n  Recognized {kind}s: {hint}",
        kind = kind,
        hint = hint
    )
}
