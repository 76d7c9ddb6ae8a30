pub mod config;
pub mod history;
pub mod question;
pub mod wire;

pub use config::{ConfigError, ModeParams, OpKind, SessionConfig};
pub use history::{HistoryEntry, QuestionResult};
pub use question::Question;
pub use wire::{CheckRequest, Verdict};
