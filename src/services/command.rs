//! 命令语言
//!
//! 控制台与聊天接口共用同一个解析器。命令词不区分大小写，长格式之外也接受控制台别名。

use tracing::debug;

use crate::error::{AppError, Result};
use crate::models::event::EventKind;
use crate::services::report::{
    CHAT_GUIDANCE, HELP_TEXT, render_extraction_miss, render_medication_frequency,
    render_recorded, render_symptom_frequency, render_timeline,
};
use crate::services::session::DocumentationSession;

pub const EXIT_MESSAGE: &str = "Exiting documentation system.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    RecordSymptom(String),
    RecordMedication(String),
    ShowTimeline,
    SymptomFrequency(String),
    MedicationFrequency(String),
    GenerateSymptomNote,
    GenerateMedicationNote,
    GenerateTimelineSummary,
    Help,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verb {
    RecordSymptom,
    RecordMedication,
    ShowTimeline,
    SymptomFrequency,
    MedicationFrequency,
    SymptomNote,
    MedicationNote,
    TimelineSummary,
    Help,
    Exit,
}

const VERBS: &[(&str, Verb)] = &[
    ("record-symptom", Verb::RecordSymptom),
    ("note", Verb::RecordSymptom),
    ("record-medication", Verb::RecordMedication),
    ("med", Verb::RecordMedication),
    ("show-timeline", Verb::ShowTimeline),
    ("timeline", Verb::ShowTimeline),
    ("symptom-frequency", Verb::SymptomFrequency),
    ("frequency", Verb::SymptomFrequency),
    ("medication-frequency", Verb::MedicationFrequency),
    ("med_frequency", Verb::MedicationFrequency),
    ("generate-symptom-note", Verb::SymptomNote),
    ("nurse_note", Verb::SymptomNote),
    ("generate-medication-note", Verb::MedicationNote),
    ("med_note", Verb::MedicationNote),
    ("generate-timeline-summary", Verb::TimelineSummary),
    ("help", Verb::Help),
    ("exit", Verb::Exit),
];

fn lookup(word: &str) -> Option<Verb> {
    let word = word.to_lowercase();
    VERBS
        .iter()
        .find(|(name, _)| *name == word)
        .map(|(_, verb)| *verb)
}

fn split_word(input: &str) -> (&str, &str) {
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (input, ""),
    }
}

impl Command {
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(AppError::Validation("command must not be empty".to_string()));
        }

        let (word, rest) = split_word(input);
        let verb = lookup(word).ok_or_else(|| {
            AppError::Validation(format!(
                "Unknown command '{}'. Type 'help' for available commands.",
                word
            ))
        })?;

        let argument = |what: &str| -> Result<String> {
            if rest.is_empty() {
                Err(AppError::Validation(format!(
                    "'{}' requires {}",
                    word.to_lowercase(),
                    what
                )))
            } else {
                Ok(rest.to_string())
            }
        };

        Ok(match verb {
            Verb::RecordSymptom => Command::RecordSymptom(argument("a description")?),
            Verb::RecordMedication => Command::RecordMedication(argument("a description")?),
            Verb::ShowTimeline => Command::ShowTimeline,
            Verb::SymptomFrequency => Command::SymptomFrequency(argument("a symptom name")?),
            Verb::MedicationFrequency => {
                Command::MedicationFrequency(argument("a medication name")?)
            }
            Verb::SymptomNote => Command::GenerateSymptomNote,
            Verb::MedicationNote => Command::GenerateMedicationNote,
            Verb::TimelineSummary => Command::GenerateTimelineSummary,
            Verb::Help => Command::Help,
            Verb::Exit => Command::Exit,
        })
    }

    /// `input` 的首个词是否为命令词
    pub fn starts_with_command(input: &str) -> bool {
        let (word, _) = split_word(input.trim());
        lookup(word).is_some()
    }

    /// 该命令会追加的事件类型
    pub fn records(&self) -> Option<EventKind> {
        match self {
            Command::RecordSymptom(_) => Some(EventKind::Symptom),
            Command::RecordMedication(_) => Some(EventKind::Medication),
            _ => None,
        }
    }

    pub fn generates_note(&self) -> bool {
        matches!(
            self,
            Command::GenerateSymptomNote
                | Command::GenerateMedicationNote
                | Command::GenerateTimelineSummary
        )
    }
}

/// 在会话上执行一条命令并渲染回复
pub async fn execute(session: &mut DocumentationSession, command: &Command) -> Result<String> {
    debug!("Executing command: {:?}", command);
    match command {
        Command::RecordSymptom(text) => {
            let recorded = session.record_symptom(text).await?;
            Ok(render_recorded(&recorded))
        }
        Command::RecordMedication(text) => {
            let recorded = session.record_medication(text).await?;
            Ok(render_recorded(&recorded))
        }
        Command::ShowTimeline => Ok(render_timeline(&session.global_timeline())),
        Command::SymptomFrequency(name) => Ok(render_symptom_frequency(
            name,
            &session.symptom_frequency(name),
        )),
        Command::MedicationFrequency(name) => Ok(render_medication_frequency(
            name,
            &session.medication_frequency(name),
        )),
        Command::GenerateSymptomNote => session.generate_symptom_note().await,
        Command::GenerateMedicationNote => session.generate_medication_note().await,
        Command::GenerateTimelineSummary => session.generate_timeline_summary().await,
        Command::Help => Ok(HELP_TEXT.to_string()),
        Command::Exit => Ok(EXIT_MESSAGE.to_string()),
    }
}

/// 可恢复错误的用户提示，其余错误返回 `None`
pub fn recoverable_reply(err: &AppError) -> Option<String> {
    match err {
        AppError::ExtractionMiss { kind, hint } => Some(render_extraction_miss(kind, hint)),
        AppError::Validation(message) => Some(message.clone()),
        _ => None,
    }
}

/// 聊天接口的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatOutcome {
    pub reply: String,
    pub success: bool,
    /// 本条消息追加的事件类型
    pub recorded: Option<EventKind>,
    pub extraction_miss: bool,
    pub note_generated: bool,
}

impl ChatOutcome {
    fn reply(reply: String) -> Self {
        Self {
            reply,
            success: true,
            recorded: None,
            extraction_miss: false,
            note_generated: false,
        }
    }
}

/// 解释自由聊天文本
///
/// 顺序：显式命令词、识别到的症状、识别到的药品、提及 "timeline"，最后是提示信息。
pub async fn interpret_chat(session: &mut DocumentationSession, text: &str) -> Result<ChatOutcome> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::Validation("text must not be empty".to_string()));
    }

    let parsed = if Command::starts_with_command(text) {
        Command::parse(text)
    } else if session.extractor().extract_symptom(text).is_some() {
        Ok(Command::RecordSymptom(text.to_string()))
    } else if session.extractor().extract_medication(text).is_some() {
        Ok(Command::RecordMedication(text.to_string()))
    } else if text.to_lowercase().contains("timeline") {
        Ok(Command::ShowTimeline)
    } else {
        debug!("Chat text matched no command or vocabulary entry");
        let vocabulary = session.extractor().vocabulary();
        return Ok(ChatOutcome::reply(format!(
            "{}\n\nRecognized symptoms: {}\nRecognized medications: {}",
            CHAT_GUIDANCE,
            vocabulary.symptom_hint(),
            vocabulary.medication_hint()
        )));
    };

    let command = match parsed {
        Ok(Command::Exit) => return Ok(ChatOutcome::reply(CHAT_GUIDANCE.to_string())),
        Ok(command) => command,
        Err(e) => {
            return Ok(ChatOutcome {
                success: false,
                ..ChatOutcome::reply(recoverable_reply(&e).unwrap_or_else(|| e.to_string()))
            });
        }
    };

    match execute(session, &command).await {
        Ok(reply) => Ok(ChatOutcome {
            recorded: command.records(),
            note_generated: command.generates_note(),
            ..ChatOutcome::reply(reply)
        }),
        Err(e) => match recoverable_reply(&e) {
            Some(reply) => {
                debug!("Recoverable chat failure: {}", e);
                Ok(ChatOutcome {
                    success: false,
                    extraction_miss: matches!(e, AppError::ExtractionMiss { .. }),
                    ..ChatOutcome::reply(reply)
                })
            }
            None => Err(e),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{SemanticIndex, create_vector_index};
    use crate::index::embedding::SimpleEmbeddingModel;
    use crate::models::patient::PatientInfo;
    use crate::services::generation::SimpleTextGenerator;
    use crate::services::notes::NoteGenerator;
    use rstest::rstest;

    fn session() -> DocumentationSession {
        let index = SemanticIndex::new(
            Box::new(SimpleEmbeddingModel::new(16)),
            create_vector_index(16),
        )
        .unwrap();
        let notes = NoteGenerator::new(Box::new(SimpleTextGenerator), 2048);
        DocumentationSession::new(PatientInfo::new(62, "male"), Some(index), Some(notes))
    }

    #[rstest]
    #[case("record-symptom headache at night", Command::RecordSymptom("headache at night".into()))]
    #[case("note headache at night", Command::RecordSymptom("headache at night".into()))]
    #[case("MED aspirin 75mg", Command::RecordMedication("aspirin 75mg".into()))]
    #[case("show-timeline", Command::ShowTimeline)]
    #[case("timeline", Command::ShowTimeline)]
    #[case("frequency chest pain", Command::SymptomFrequency("chest pain".into()))]
    #[case("med_frequency insulin", Command::MedicationFrequency("insulin".into()))]
    #[case("nurse_note", Command::GenerateSymptomNote)]
    #[case("generate-medication-note", Command::GenerateMedicationNote)]
    #[case("generate-timeline-summary", Command::GenerateTimelineSummary)]
    #[case("  help ", Command::Help)]
    #[case("exit", Command::Exit)]
    fn test_parse(#[case] input: &str, #[case] expected: Command) {
        assert_eq!(Command::parse(input).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("record-symptom")]
    #[case("frequency   ")]
    #[case("dance")]
    fn test_parse_rejects(#[case] input: &str) {
        let err = Command::parse(input).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_unknown_command_message() {
        let err = Command::parse("dance now").unwrap_err();
        assert_eq!(
            recoverable_reply(&err).unwrap(),
            "Unknown command 'dance'. Type 'help' for available commands."
        );
    }

    #[tokio::test]
    async fn test_execute_record_and_frequency() {
        let mut session = session();
        let reply = execute(
            &mut session,
            &Command::RecordMedication("Gave metformin 1000mg in morning".into()),
        )
        .await
        .unwrap();
        assert!(reply.starts_with("Medication documented: metformin\n  Dose: 1000mg\n  Time: morning"));

        let reply = execute(&mut session, &Command::MedicationFrequency("Metformin".into()))
            .await
            .unwrap();
        assert!(reply.contains("Total administrations: 1"));
    }

    #[tokio::test]
    async fn test_execute_extraction_miss_is_recoverable() {
        let mut session = session();
        let err = execute(&mut session, &Command::RecordSymptom("feeling fine".into()))
            .await
            .unwrap_err();
        let reply = recoverable_reply(&err).unwrap();
        assert!(reply.starts_with("No recognized symptom found in text."));
        assert!(reply.ends_with("..."));
        assert!(session.timeline().is_empty());
    }

    #[tokio::test]
    async fn test_chat_symptom_beats_medication() {
        let mut session = session();
        let outcome = interpret_chat(&mut session, "nausea after taking metformin")
            .await
            .unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.recorded, Some(EventKind::Symptom));
        assert!(outcome.reply.starts_with("Symptom documented: nausea"));
    }

    #[tokio::test]
    async fn test_chat_medication_and_timeline() {
        let mut session = session();
        let outcome = interpret_chat(&mut session, "Lisinopril after dinner")
            .await
            .unwrap();
        assert_eq!(outcome.recorded, Some(EventKind::Medication));

        let outcome = interpret_chat(&mut session, "Show timeline").await.unwrap();
        assert_eq!(outcome.recorded, None);
        assert!(outcome.reply.contains("PATIENT TIMELINE"));
        assert!(outcome.reply.contains("lisinopril dose not specified at evening"));
    }

    #[tokio::test]
    async fn test_chat_guidance_for_unrecognized_text() {
        let mut session = session();
        let outcome = interpret_chat(&mut session, "hello there").await.unwrap();
        assert!(outcome.success);
        assert!(outcome.reply.starts_with("Clinical Documentation Assistant"));
        assert!(outcome.reply.contains("Recognized symptoms: headache, chest pain"));
        assert!(session.timeline().is_empty());
    }

    #[tokio::test]
    async fn test_chat_explicit_command_miss() {
        let mut session = session();
        let outcome = interpret_chat(&mut session, "med the usual pill")
            .await
            .unwrap();
        assert!(!outcome.success);
        assert!(outcome.extraction_miss);
        assert!(outcome.reply.starts_with("No recognized medication found in text."));
    }

    #[tokio::test]
    async fn test_chat_note_generation() {
        let mut session = session();
        interpret_chat(&mut session, "fever at night").await.unwrap();
        let outcome = interpret_chat(&mut session, "nurse_note").await.unwrap();
        assert!(outcome.note_generated);
        assert!(outcome.reply.starts_with("=== SYMPTOM DOCUMENTATION ==="));
    }

    #[tokio::test]
    async fn test_chat_empty_text_rejected() {
        let mut session = session();
        let err = interpret_chat(&mut session, "   ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_chat_degraded_note_is_failure() {
        let mut session = DocumentationSession::new(PatientInfo::new(62, "male"), None, None);
        let err = interpret_chat(&mut session, "med_note").await.unwrap_err();
        assert!(matches!(err, AppError::ServiceUnavailable(_)));
    }
}
