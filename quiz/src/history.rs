//! Records of past question attempts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Terminal outcome of one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionResult {
    Correct,
    Wrong,
    TimedOut,
}

impl QuestionResult {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Correct => "correct",
            Self::Wrong => "wrong",
            Self::TimedOut => "timed out",
        }
    }
}

impl std::fmt::Display for QuestionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One attempt, immutable once written. Insertion order is the store order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    /// Display label of the question, e.g. "3 × 7".
    pub question: String,
    pub result: QuestionResult,
    pub time_taken_secs: u32,
    pub recorded_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(question: String, result: QuestionResult, time_taken_secs: u32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            question,
            result,
            time_taken_secs,
            recorded_at: Utc::now(),
        }
    }
}
