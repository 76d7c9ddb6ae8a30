//! Question payload returned by the question service.

use crate::config::OpKind;
use serde::{Deserialize, Serialize};

/// One generated question: an ordered list of operands (length >= 2) and the
/// candidate answer options. Exactly one option is correct; the service owns
/// that guarantee. Replaced wholesale between questions, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub operands: Vec<i64>,
    pub options: Vec<i64>,
}

impl Question {
    /// Display label, e.g. "3 × 7" or "12 + 5 + 9".
    pub fn label(&self, mode: OpKind) -> String {
        let parts: Vec<String> = self.operands.iter().map(|n| n.to_string()).collect();
        parts.join(&format!(" {} ", mode.symbol()))
    }
}
