//! Narrative synthesis: prompts, generation, response validation and record storage

mod client;
mod error;
mod guidance;
mod identity;
mod intake;
mod monthly;
mod prompt;
mod schema;
mod session;
mod storage;
pub mod validator;

pub use client::{request_completion, Completion, HttpGenerator, OfflineGenerator};
pub use error::{GenerationError, IntakeError};
pub use guidance::{review_communication, suggest_topics};
pub use identity::{enforce_identity, Gender, Identity, Pronouns};
pub use intake::{intake_text, PlainTextSource, TextSource};
pub use monthly::{apply_narrative, request_monthly_narrative, synthesize_monthly};
pub use prompt::{
    build_monthly_prompt, build_prompt, build_review_prompt, build_topic_prompt, ReportTemplate,
};
pub use schema::{
    CommunicationReview, MissedOpportunity, MonthlyNarrative, RedFlag, Rephrasing, SessionFields,
    TopicSuggestion, TopicSuggestions,
};
pub use session::{basic_dialogue, fallback_narrative, is_template_conformant, synthesize_session};
pub use storage::{RecordStore, SqliteStore};
pub use validator::{parse_structured, Parsed, ResponseSchema};
