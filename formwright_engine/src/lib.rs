#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]

pub const FORMWRIGHT_VERSION: &str = env!("CARGO_PKG_VERSION");

// Core modules
pub mod config;
pub mod export;
pub mod idgen;
pub mod questionnaire;
pub mod response;
pub mod roster;
pub mod slug;
pub mod store;

// Re-exports for convenience
pub use config::{EditorConfig, load_config};
pub use export::{ExportFormat, read_questionnaire, write_questionnaire};
pub use questionnaire::QuestionnaireDraft;
pub use response::{ResponseError, ResponseSession};
pub use roster::{Roster, RosterKind};
pub use slug::SlugCodec;
pub use store::{OrderedStore, Record, StoreError};
