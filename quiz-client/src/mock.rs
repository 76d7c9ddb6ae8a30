//! Mock QuestionService implementation for testing.

use crate::error::{ServiceError, ServiceResult};
use crate::traits::QuestionService;
use async_trait::async_trait;
use quiz::{OpKind, Question, SessionConfig, Verdict};
use std::sync::{Arc, Mutex};

type FetchFn = Box<dyn Fn() -> ServiceResult<Question> + Send>;
type CheckFn = Box<dyn Fn(i64) -> ServiceResult<Verdict> + Send>;

/// Mock service for testing - only compiled in test mode or with the mock
/// feature.
pub struct MockQuestionService {
    responses: Arc<Mutex<MockResponses>>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

#[derive(Default)]
struct MockResponses {
    fetch_question: Option<FetchFn>,
    check_answer: Option<CheckFn>,
}

/// Recorded call for verification.
#[derive(Debug, Clone)]
pub enum MockCall {
    FetchQuestion {
        config: SessionConfig,
    },
    CheckAnswer {
        operands: Vec<i64>,
        answer: i64,
        mode: OpKind,
    },
}

impl Default for MockQuestionService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockQuestionService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(MockResponses::default())),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Configure the fetch_question response.
    pub fn with_fetch_response<F>(self, f: F) -> Self
    where
        F: Fn() -> ServiceResult<Question> + Send + 'static,
    {
        self.responses.lock().unwrap().fetch_question = Some(Box::new(f));
        self
    }

    /// Configure the check_answer response. The closure receives the
    /// candidate answer.
    pub fn with_check_response<F>(self, f: F) -> Self
    where
        F: Fn(i64) -> ServiceResult<Verdict> + Send + 'static,
    {
        self.responses.lock().unwrap().check_answer = Some(Box::new(f));
        self
    }

    /// Pre-configure a standard 3 × 7 question whose check verdict compares
    /// the candidate against 21.
    pub fn with_standard_question(self) -> Self {
        self.with_fetch_response(|| {
            Ok(Question {
                operands: vec![3, 7],
                options: vec![21, 20, 24],
            })
        })
        .with_check_response(|answer| {
            Ok(Verdict {
                correct: answer == 21,
                correct_answer: 21,
            })
        })
    }

    /// Get recorded calls for verification.
    pub fn calls(&self) -> Vec<MockCall> {
        self.call_log.lock().unwrap().clone()
    }

    /// Number of fetch_question calls recorded.
    pub fn fetch_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, MockCall::FetchQuestion { .. }))
            .count()
    }

    /// Clear call history.
    pub fn clear_calls(&self) {
        self.call_log.lock().unwrap().clear()
    }
}

#[async_trait]
impl QuestionService for MockQuestionService {
    async fn fetch_question(&self, config: &SessionConfig) -> ServiceResult<Question> {
        self.call_log.lock().unwrap().push(MockCall::FetchQuestion {
            config: config.clone(),
        });

        let responses = self.responses.lock().unwrap();
        if let Some(ref f) = responses.fetch_question {
            f()
        } else {
            Err(ServiceError::NotConfigured("fetch_question".to_string()))
        }
    }

    async fn check_answer(
        &self,
        operands: &[i64],
        answer: i64,
        mode: OpKind,
    ) -> ServiceResult<Verdict> {
        self.call_log.lock().unwrap().push(MockCall::CheckAnswer {
            operands: operands.to_vec(),
            answer,
            mode,
        });

        let responses = self.responses.lock().unwrap();
        if let Some(ref f) = responses.check_answer {
            f(answer)
        } else {
            Err(ServiceError::NotConfigured("check_answer".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_mock_returns_not_configured() {
        let mock = MockQuestionService::new();
        let err = mock
            .fetch_question(&SessionConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn standard_question_checks_against_21() {
        let mock = MockQuestionService::new().with_standard_question();
        let q = mock.fetch_question(&SessionConfig::default()).await.unwrap();
        assert_eq!(q.operands, vec![3, 7]);

        let verdict = mock
            .check_answer(&q.operands, 21, OpKind::Multiply)
            .await
            .unwrap();
        assert!(verdict.correct);

        let verdict = mock
            .check_answer(&q.operands, 20, OpKind::Multiply)
            .await
            .unwrap();
        assert!(!verdict.correct);
        assert_eq!(mock.calls().len(), 3);
    }
}
