//! Request/response types shared by the question service and its client.

use crate::config::OpKind;
use serde::{Deserialize, Serialize};

/// Body of `POST /check`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckRequest {
    pub mode: OpKind,
    pub operands: Vec<i64>,
    pub answer: i64,
}

/// Correctness verdict for a candidate answer. The controller acts only on
/// `correct`; `correct_answer` is carried for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub correct: bool,
    pub correct_answer: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_request_wire_shape() {
        let req = CheckRequest {
            mode: OpKind::Multiply,
            operands: vec![3, 7],
            answer: 21,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"mode":"multiply","operands":[3,7],"answer":21}"#);
    }

    #[test]
    fn verdict_round_trip() {
        let v = Verdict {
            correct: false,
            correct_answer: 42,
        };
        let json = serde_json::to_string(&v).unwrap();
        let back: Verdict = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
    }
}
