//! Dialogflow annotation middleware for chat-bot pipelines: detects intent, entities and
//! fulfillment for inbound messages, and offers `hears`/`action` predicates over the result.

pub mod config;
pub mod dialogflow;
pub mod error;
pub mod message;
pub mod middleware;
pub mod patterns;
pub mod session;

pub use config::MiddlewareConfig;
pub use error::MiddlewareError;
pub use message::{Fulfillment, Message};
pub use middleware::{DialogflowMiddleware, Outcome, SkipReason};
pub use patterns::{Pattern, PatternSet, PatternSpec};
