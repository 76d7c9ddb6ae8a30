//! HTTP surface: two stateless endpoints.

use axum::extract::Query;
use axum::routing::{get, post};
use axum::{Json, Router};
use quiz::{CheckRequest, ModeParams, OpKind, Question, Verdict};
use serde::Deserialize;

use crate::generator;

pub fn router() -> Router {
    Router::new()
        .route("/question", get(question))
        .route("/check", post(check))
}

/// Query parameters for `GET /question`. Range fields apply to
/// multiplication, digit/term fields to addition; anything missing falls
/// back to the setup defaults.
#[derive(Debug, Deserialize)]
pub struct QuestionQuery {
    #[serde(default = "default_mode")]
    mode: OpKind,
    start: Option<u32>,
    end: Option<u32>,
    digits: Option<u32>,
    terms: Option<u32>,
}

fn default_mode() -> OpKind {
    OpKind::Multiply
}

impl QuestionQuery {
    fn params(&self) -> ModeParams {
        match self.mode {
            OpKind::Multiply => ModeParams::Multiply {
                start_table: self.start.unwrap_or(2).max(1),
                end_table: self.end.unwrap_or(12).max(1),
            },
            OpKind::Add => ModeParams::Add {
                digits: self.digits.unwrap_or(2).clamp(1, 9),
                term_count: self.terms.unwrap_or(2).clamp(2, 12),
            },
        }
    }
}

async fn question(Query(query): Query<QuestionQuery>) -> Json<Question> {
    let params = query.params();
    let question = generator::generate(&params);
    tracing::debug!(?params, "Generated question");
    Json(question)
}

async fn check(Json(request): Json<CheckRequest>) -> Json<Verdict> {
    let verdict = generator::check(request.mode, &request.operands, request.answer);
    tracing::debug!(mode = %request.mode, correct = verdict.correct, "Checked answer");
    Json(verdict)
}
