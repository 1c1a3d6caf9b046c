//! Middleware error types.

use crate::dialogflow::DialogflowError;
use crate::patterns::PatternError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MiddlewareError {
    /// Invalid or incomplete configuration; no middleware is constructed.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The NLU call failed. The message is left unannotated.
    #[error(transparent)]
    Transport(#[from] DialogflowError),

    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// `action()` on a message that has no NLU response.
    #[error("message has no NLU response; receive() must annotate it before action() is called")]
    MissingResponse,
}
