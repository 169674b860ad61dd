//! Tutoring agents.
//!
//! [`MathTutor`] answers a question by running a tool-calling loop over the
//! knowledge base and web search. [`FeedbackRefiner`] rewrites a previous
//! answer from user feedback in a single model call. Both sit behind small
//! traits so the HTTP server and benchmark can run against stand-ins.

mod feedback;
mod tools;
mod tutor;

pub use feedback::FeedbackRefiner;
pub use tools::{parse_tool_call, tool_definitions, ToolCall, ToolContext};
pub use tutor::{AgentResponse, MathTutor, ToolCallRecord};

use crate::error::Result;
use async_trait::async_trait;

/// Answers a math question.
#[async_trait]
pub trait Tutor: Send + Sync {
    async fn solve(&self, question: &str) -> Result<String>;
}

/// Improves a previous answer given user feedback.
#[async_trait]
pub trait Refiner: Send + Sync {
    async fn refine(&self, question: &str, answer: &str, feedback: &str) -> Result<String>;
}
