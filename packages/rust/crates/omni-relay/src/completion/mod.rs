//! Completion client: Responses API call, retry/backoff, response normalization.

mod client;
mod error;
mod extract;
mod request;
pub(crate) mod retry;

pub use client::{CompletionClient, CompletionResult, CompletionTrace};
pub use error::CompletionFailure;
pub use extract::{ResponseShape, extract_text};
pub use request::CompletionRequest;
pub use retry::RetryPolicy;
