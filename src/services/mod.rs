//! 服务模块

pub mod command;
pub mod extraction;
pub mod generation;
pub mod notes;
pub mod report;
pub mod session;

pub use command::{ChatOutcome, Command, execute, interpret_chat};
pub use extraction::{Extractor, Vocabulary};
pub use generation::{TextGenerator, create_text_generator};
pub use notes::NoteGenerator;
pub use session::{DocumentationSession, PatientSummary, Recorded, SystemMode};
