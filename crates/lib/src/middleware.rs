//! Receive middleware: annotate inbound chat messages with Dialogflow intent detection.
//!
//! Flow per message: skip filters (no text, own messages, ignored types) → session id →
//! one detectIntent call → merge intent, entities, fulfillment and confidence onto the message.
//! `hears` and `action` are the predicates bot code uses to branch on the annotation.

use crate::config::{MiddlewareConfig, DEFAULT_LANGUAGE};
use crate::dialogflow::{DetectIntentRequest, DialogflowClient, NluBackend, QueryResult};
use crate::error::MiddlewareError;
use crate::message::{Fulfillment, Message};
use crate::patterns::PatternSet;
use crate::session::{self, SessionId};
use std::fmt;
use std::sync::Arc;

/// Why a message was passed on without an NLU call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Text absent or blank.
    NoText,
    /// Echo or self message.
    FromSelf,
    /// Message type matched an `ignoreType` pattern.
    IgnoredType,
}

/// Result of processing one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Skipped(SkipReason),
    Annotated,
}

/// Dialogflow annotation middleware. Cheap to share behind an `Arc`; holds no per-message state.
pub struct DialogflowMiddleware {
    project_id: String,
    minimum_confidence: f64,
    session_id_props: Vec<String>,
    ignore_types: PatternSet,
    backend: Arc<dyn NluBackend>,
}

impl fmt::Debug for DialogflowMiddleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogflowMiddleware")
            .field("project_id", &self.project_id)
            .field("minimum_confidence", &self.minimum_confidence)
            .field("session_id_props", &self.session_id_props)
            .field("ignore_types", &self.ignore_types.len())
            .finish()
    }
}

impl DialogflowMiddleware {
    /// Build the middleware with an HTTP client for the configured endpoint and token.
    pub fn new(config: MiddlewareConfig) -> Result<Self, MiddlewareError> {
        let client = DialogflowClient::new(config.endpoint.clone(), config.access_token.clone());
        Self::with_backend(config, Arc::new(client))
    }

    /// Build the middleware on top of any NLU backend.
    pub fn with_backend(
        config: MiddlewareConfig,
        backend: Arc<dyn NluBackend>,
    ) -> Result<Self, MiddlewareError> {
        let project_id = config
            .project_id
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| {
                MiddlewareError::Configuration("no dialogflow project id provided".to_string())
            })?
            .to_string();
        let minimum_confidence = config.minimum_confidence;
        if !(0.0..=1.0).contains(&minimum_confidence) {
            return Err(MiddlewareError::Configuration(format!(
                "minimum confidence must be within [0, 1], got {}",
                minimum_confidence
            )));
        }
        let ignore_types = PatternSet::compile(config.ignore_type)?;
        Ok(Self {
            project_id,
            minimum_confidence,
            session_id_props: config.session_id_props,
            ignore_types,
            backend,
        })
    }

    pub fn minimum_confidence(&self) -> f64 {
        self.minimum_confidence
    }

    /// Session id this middleware would use for `message`.
    pub fn session_id(&self, message: &Message) -> SessionId {
        session::session_id(&self.session_id_props, message)
    }

    /// Process `message`, then hand the outcome to `next` exactly once.
    ///
    /// NLU failures are forwarded to `next` as `Some(MiddlewareError::Transport(..))`;
    /// skipped and annotated messages pass `None`.
    pub async fn receive<F>(&self, message: &mut Message, next: F)
    where
        F: FnOnce(Option<MiddlewareError>),
    {
        let err = self.process(message).await.err();
        next(err)
    }

    /// Filter, query and annotate. On error the message is left untouched.
    pub async fn process(&self, message: &mut Message) -> Result<Outcome, MiddlewareError> {
        let Some(text) = message.text().map(str::to_string) else {
            return Ok(Outcome::Skipped(SkipReason::NoText));
        };
        if message.is_from_self() {
            return Ok(Outcome::Skipped(SkipReason::FromSelf));
        }
        if let Some(message_type) = message.message_type.as_deref() {
            if let Some(pattern) = self.ignore_types.first_match(message_type) {
                log::debug!(
                    "skipping dialogflow call since type {:?} matched {}",
                    message_type,
                    pattern
                );
                return Ok(Outcome::Skipped(SkipReason::IgnoredType));
            }
        }

        let language = message
            .lang
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(DEFAULT_LANGUAGE)
            .to_string();
        let session_id = self.session_id(message);
        log::debug!(
            "sending message to dialogflow: session_id={}, language={}, text={}",
            session_id,
            language,
            text
        );
        let request = DetectIntentRequest::text(
            session::session_path(&self.project_id, &session_id),
            text,
            language,
        );

        let result = match self.backend.detect_intent(&request).await {
            Ok(r) => r,
            Err(e) => {
                log::warn!("dialogflow returned error: {}", e);
                return Err(e.into());
            }
        };
        log::debug!("dialogflow result: {:?}", result);
        annotate(message, result);
        Ok(Outcome::Annotated)
    }

    /// True if a pattern matches the detected intent and confidence meets the threshold.
    pub fn hears(&self, patterns: &PatternSet, message: &Message) -> bool {
        let Some(intent) = message.intent.as_deref() else {
            return false;
        };
        self.matches(patterns, "intent", intent, message.confidence)
    }

    /// Like [`hears`](Self::hears), but against the action of the raw NLU response.
    /// Fails with `MissingResponse` if the message was never annotated.
    pub fn action(
        &self,
        patterns: &PatternSet,
        message: &Message,
    ) -> Result<bool, MiddlewareError> {
        let response = message
            .nlp_response
            .as_ref()
            .ok_or(MiddlewareError::MissingResponse)?;
        let Some(action) = response.action() else {
            return Ok(false);
        };
        Ok(self.matches(patterns, "action", action, message.confidence))
    }

    fn matches(
        &self,
        patterns: &PatternSet,
        what: &str,
        value: &str,
        confidence: Option<f64>,
    ) -> bool {
        match confidence {
            Some(c) if c >= self.minimum_confidence => {}
            _ => return false,
        }
        match patterns.first_match(value) {
            Some(pattern) => {
                log::debug!("dialogflow {} {:?} matched pattern {}", what, value, pattern);
                true
            }
            None => false,
        }
    }
}

/// Merge a query result onto the message.
fn annotate(message: &mut Message, result: QueryResult) {
    message.intent = result.intent_name().map(str::to_string);
    message.entities = result.entities();
    message.fulfillment = Some(Fulfillment {
        speech: result.fulfillment_text.clone(),
        messages: result.fulfillment_messages.clone(),
    });
    message.confidence = Some(result.intent_detection_confidence);
    message.nlp_response = Some(result);
}
