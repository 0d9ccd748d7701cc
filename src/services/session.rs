//! 文档会话
//!
//! 唯一长期存在的对象，持有患者信息、时间线与语义索引。调用方串行访问
//! （见 `api::app_state`），每个请求完成抽取、嵌入与追加后下一个请求才开始。

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::index::{SemanticIndex, create_embedding_model, create_vector_index};
use crate::models::event::{
    ClinicalEvent, DEFAULT_ROUTE, DOSE_NOT_SPECIFIED, EventKind, FoodRelation, MEDICATION_NOTE,
    MedicationEvent, SymptomEvent, TimeOfDay,
};
use crate::models::patient::PatientInfo;
use crate::services::extraction::Extractor;
use crate::services::generation::create_text_generator;
use crate::services::notes::NoteGenerator;
use crate::storage::timeline::{EventRef, TimelineStore};

/// 演示事件的原始文本
pub const DEMO_RAW_TEXT: &str = "demo record";

/// 运行模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemMode {
    /// 嵌入与生成服务均可用
    Full,
    /// 仅抽取与时间线可用
    Degraded,
}

impl SystemMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SystemMode::Full => "full",
            SystemMode::Degraded => "degraded",
        }
    }
}

/// 记录成功的结果
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub event_ref: EventRef,
    pub event: ClinicalEvent,
    /// 是否为该事件写入了向量
    pub indexed: bool,
}

/// 患者概要
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientSummary {
    pub patient_info: PatientInfo,
    pub symptom_count: usize,
    pub medication_count: usize,
    pub mode: SystemMode,
}

#[derive(Debug)]
pub struct DocumentationSession {
    patient: PatientInfo,
    extractor: Extractor,
    timeline: TimelineStore,
    index: Option<SemanticIndex>,
    notes: Option<NoteGenerator>,
}

impl DocumentationSession {
    pub fn new(
        patient: PatientInfo,
        index: Option<SemanticIndex>,
        notes: Option<NoteGenerator>,
    ) -> Self {
        Self {
            patient,
            extractor: Extractor::default(),
            timeline: TimelineStore::new(),
            index,
            notes,
        }
    }

    /// 根据配置构建会话
    ///
    /// 后端无法创建或探测失败时进入降级模式，不会导致启动失败。
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let index = match create_embedding_model(&config.embedding) {
            Ok(Some(model)) => match model.health_check().await {
                Ok(()) => {
                    info!(
                        "Embedding model initialized: {} (backend: {})",
                        model.name(),
                        config.embedding.backend
                    );
                    Some(SemanticIndex::new(
                        model,
                        create_vector_index(config.embedding.dimension),
                    )?)
                }
                Err(e) => {
                    warn!("Embedding service unavailable, semantic index disabled: {}", e);
                    None
                }
            },
            Ok(None) => {
                info!("Embedding backend disabled by configuration");
                None
            }
            Err(e) => {
                warn!("Failed to initialize embedding model: {}", e);
                None
            }
        };

        let notes = match create_text_generator(&config.generation) {
            Ok(Some(generator)) => match generator.health_check().await {
                Ok(()) => {
                    info!(
                        "Text generator initialized: {} (backend: {})",
                        generator.name(),
                        config.generation.backend
                    );
                    Some(NoteGenerator::new(
                        generator,
                        config.generation.max_prompt_chars,
                    ))
                }
                Err(e) => {
                    warn!("Generation service unavailable, notes disabled: {}", e);
                    None
                }
            },
            Ok(None) => {
                info!("Generation backend disabled by configuration");
                None
            }
            Err(e) => {
                warn!("Failed to initialize text generator: {}", e);
                None
            }
        };

        let mut session = Self::new(PatientInfo::from(&config.patient), index, notes);
        if session.mode() == SystemMode::Degraded {
            warn!("Running in degraded mode (no embedding and/or generation service)");
        }

        if config.patient.seed_demo_events {
            session.seed_demo_events().await?;
            info!("Seeded {} demo events", session.timeline.len());
        }

        Ok(session)
    }

    pub fn mode(&self) -> SystemMode {
        if self.index.is_some() && self.notes.is_some() {
            SystemMode::Full
        } else {
            SystemMode::Degraded
        }
    }

    pub fn patient(&self) -> &PatientInfo {
        &self.patient
    }

    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    pub fn timeline(&self) -> &TimelineStore {
        &self.timeline
    }

    /// 已存储的向量数，索引不可用时为 `None`
    pub fn index_len(&self) -> Option<usize> {
        self.index.as_ref().map(SemanticIndex::len)
    }

    pub fn semantic_index_available(&self) -> bool {
        self.index.is_some()
    }

    pub fn notes_available(&self) -> bool {
        self.notes.is_some()
    }

    pub async fn record_symptom(&mut self, text: &str) -> Result<Recorded> {
        self.record_symptom_at(text, Utc::now()).await
    }

    pub async fn record_symptom_at(
        &mut self,
        text: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<Recorded> {
        let event = self.extractor.symptom_event(text, timestamp)?;
        self.record_event(event.into()).await
    }

    pub async fn record_medication(&mut self, text: &str) -> Result<Recorded> {
        self.record_medication_at(text, Utc::now()).await
    }

    pub async fn record_medication_at(
        &mut self,
        text: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<Recorded> {
        let event = self.extractor.medication_event(text, timestamp)?;
        self.record_event(event.into()).await
    }

    /// 追加事件，索引可用时先做嵌入
    ///
    /// 向量行使用事件即将获得的位置写入，而追加本身不会失败，因此两者同时成功或同时不变。
    /// 嵌入服务不可达时丢弃整个索引，事件只写入时间线。
    pub async fn record_event(&mut self, event: ClinicalEvent) -> Result<Recorded> {
        let embedded = match self.index.as_ref() {
            Some(index) => Some(index.embed_event(&event).await),
            None => None,
        };

        let indexed = match embedded {
            Some(Ok(vector)) => {
                let position = EventRef(self.timeline.len());
                if let Some(index) = self.index.as_mut() {
                    index.add(vector, position)?;
                }
                true
            }
            Some(Err(e @ (AppError::ServiceUnavailable(_) | AppError::Timeout(_)))) => {
                warn!(
                    "Embedding service lost, semantic index disabled (degraded mode): {}",
                    e
                );
                self.index = None;
                false
            }
            Some(Err(e)) => return Err(e),
            None => false,
        };

        let event_ref = self.timeline.append(event.clone());
        info!(
            kind = %event.kind(),
            name = event.name(),
            position = event_ref.0,
            indexed,
            "Event recorded"
        );

        Ok(Recorded {
            event_ref,
            event,
            indexed,
        })
    }

    pub fn symptom_frequency(&self, name: &str) -> Vec<&SymptomEvent> {
        self.timeline
            .query_by_name(EventKind::Symptom, name)
            .into_iter()
            .filter_map(ClinicalEvent::as_symptom)
            .collect()
    }

    pub fn medication_frequency(&self, name: &str) -> Vec<&MedicationEvent> {
        self.timeline
            .query_by_name(EventKind::Medication, name)
            .into_iter()
            .filter_map(ClinicalEvent::as_medication)
            .collect()
    }

    pub fn global_timeline(&self) -> Vec<&ClinicalEvent> {
        self.timeline.global_timeline()
    }

    pub fn patient_summary(&self) -> PatientSummary {
        PatientSummary {
            patient_info: self.patient.clone(),
            symptom_count: self.timeline.count(EventKind::Symptom),
            medication_count: self.timeline.count(EventKind::Medication),
            mode: self.mode(),
        }
    }

    fn note_generator(&self) -> Result<&NoteGenerator> {
        self.notes.as_ref().ok_or_else(|| {
            AppError::ServiceUnavailable(
                "note generation is unavailable in degraded mode".to_string(),
            )
        })
    }

    pub async fn generate_symptom_note(&self) -> Result<String> {
        let notes = self.note_generator()?;
        let events: Vec<&SymptomEvent> = self.timeline.symptoms().collect();
        debug!("Generating symptom note from {} events", events.len());
        notes.generate_symptom_note(&events).await
    }

    pub async fn generate_medication_note(&self) -> Result<String> {
        let notes = self.note_generator()?;
        let events: Vec<&MedicationEvent> = self.timeline.medications().collect();
        debug!("Generating medication note from {} events", events.len());
        notes.generate_medication_note(&events).await
    }

    pub async fn generate_timeline_summary(&self) -> Result<String> {
        let notes = self.note_generator()?;
        let events: Vec<&ClinicalEvent> = self.timeline.events().collect();
        notes.generate_timeline_summary(&events).await
    }

    /// 与自由文本查询最接近的已记录事件
    pub async fn search_similar(&self, query: &str, k: usize) -> Result<Vec<(f32, &ClinicalEvent)>> {
        let index = self.index.as_ref().ok_or_else(|| {
            AppError::ServiceUnavailable(
                "semantic search is unavailable in degraded mode".to_string(),
            )
        })?;

        let hits = index.search(query, k).await?;
        hits.into_iter()
            .map(|hit| {
                self.timeline
                    .get(hit.event_ref)
                    .map(|event| (hit.distance, event))
                    .ok_or_else(|| {
                        AppError::Internal(format!(
                            "index row points past the timeline: {}",
                            hit.event_ref.0
                        ))
                    })
            })
            .collect()
    }

    /// 通过常规记录路径追加固定的演示数据
    pub async fn seed_demo_events(&mut self) -> Result<()> {
        for event in demo_events() {
            self.record_event(event).await?;
        }
        Ok(())
    }
}

fn demo_time(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, day, hour, minute, 0)
        .single()
        .unwrap_or_default()
}

fn demo_events() -> Vec<ClinicalEvent> {
    vec![
        ClinicalEvent::Symptom(SymptomEvent {
            symptom: "headache".into(),
            time_of_day: TimeOfDay::Morning,
            relation_to_food: Some(FoodRelation::AfterFood),
            frequency_marker: Some("again".into()),
            timestamp: demo_time(8, 9, 30),
            raw_text: DEMO_RAW_TEXT.into(),
        }),
        ClinicalEvent::Symptom(SymptomEvent {
            symptom: "chest pain".into(),
            time_of_day: TimeOfDay::Night,
            relation_to_food: Some(FoodRelation::AfterFood),
            frequency_marker: None,
            timestamp: demo_time(7, 21, 15),
            raw_text: DEMO_RAW_TEXT.into(),
        }),
        ClinicalEvent::Medication(MedicationEvent {
            medication: "metformin".into(),
            dose: "1000 mg".into(),
            time_of_day: TimeOfDay::Morning,
            relation_to_food: Some(FoodRelation::AfterFood),
            route: DEFAULT_ROUTE.into(),
            timestamp: demo_time(8, 8, 0),
            note: MEDICATION_NOTE.into(),
            raw_text: DEMO_RAW_TEXT.into(),
        }),
        ClinicalEvent::Medication(MedicationEvent {
            medication: "lisinopril".into(),
            dose: DOSE_NOT_SPECIFIED.into(),
            time_of_day: TimeOfDay::Night,
            relation_to_food: Some(FoodRelation::BeforeFood),
            route: DEFAULT_ROUTE.into(),
            timestamp: demo_time(7, 19, 30),
            note: MEDICATION_NOTE.into(),
            raw_text: DEMO_RAW_TEXT.into(),
        }),
    ]
}
