//! Client-side contract for the question service: the `QuestionService`
//! trait, the HTTP implementation, and a mock for tests.

mod client;
mod error;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod traits;

pub use client::HttpQuestionClient;
pub use error::{ServiceError, ServiceResult};
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockCall, MockQuestionService};
pub use traits::QuestionService;
