//! QuestionService trait abstraction for client implementations.

use crate::error::ServiceResult;
use async_trait::async_trait;
use quiz::{OpKind, Question, SessionConfig, Verdict};

/// Question service interface.
/// Implemented by both the real HttpQuestionClient and MockQuestionService.
///
/// Takes `&self` so the controller can share one instance across its spawned
/// fetch/check tasks.
#[async_trait]
pub trait QuestionService: Send + Sync {
    /// Generate a question for the session's mode parameters.
    async fn fetch_question(&self, config: &SessionConfig) -> ServiceResult<Question>;

    /// Return a correctness verdict for a candidate answer.
    async fn check_answer(
        &self,
        operands: &[i64],
        answer: i64,
        mode: OpKind,
    ) -> ServiceResult<Verdict>;
}
