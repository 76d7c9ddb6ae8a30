//! HTTP client for the question service.

use crate::error::{ServiceError, ServiceResult};
use crate::traits::QuestionService;
use async_trait::async_trait;
use quiz::{CheckRequest, ModeParams, OpKind, Question, SessionConfig, Verdict};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Network client for the question service.
pub struct HttpQuestionClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpQuestionClient {
    /// Build a client for the given base URL, e.g. `http://127.0.0.1:8000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn question_query(params: &ModeParams) -> Vec<(&'static str, String)> {
        match *params {
            ModeParams::Multiply {
                start_table,
                end_table,
            } => vec![
                ("mode", OpKind::Multiply.as_str().to_string()),
                ("start", start_table.to_string()),
                ("end", end_table.to_string()),
            ],
            ModeParams::Add { digits, term_count } => vec![
                ("mode", OpKind::Add.as_str().to_string()),
                ("digits", digits.to_string()),
                ("terms", term_count.to_string()),
            ],
        }
    }
}

#[async_trait]
impl QuestionService for HttpQuestionClient {
    async fn fetch_question(&self, config: &SessionConfig) -> ServiceResult<Question> {
        let url = format!("{}/question", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&Self::question_query(&config.params))
            .send()
            .await
            .map_err(|e| ServiceError::Fetch(e.to_string()))?
            .error_for_status()
            .map_err(|e| ServiceError::Fetch(e.to_string()))?;

        let question: Question = response
            .json()
            .await
            .map_err(|e| ServiceError::Fetch(e.to_string()))?;

        if question.operands.len() < 2 || question.options.is_empty() {
            return Err(ServiceError::Fetch(format!(
                "malformed question payload: {} operands, {} options",
                question.operands.len(),
                question.options.len()
            )));
        }

        Ok(question)
    }

    async fn check_answer(
        &self,
        operands: &[i64],
        answer: i64,
        mode: OpKind,
    ) -> ServiceResult<Verdict> {
        let url = format!("{}/check", self.base_url);
        let body = CheckRequest {
            mode,
            operands: operands.to_vec(),
            answer,
        };

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::Check(e.to_string()))?
            .error_for_status()
            .map_err(|e| ServiceError::Check(e.to_string()))?;

        response
            .json()
            .await
            .map_err(|e| ServiceError::Check(e.to_string()))
    }
}
