//! Chat message passed through the middleware.
//!
//! The pipeline owns the message; the middleware fills in the NLU annotation fields
//! (`intent`, `entities`, `fulfillment`, `confidence`, `nlpResponse`) during `receive`.

use crate::dialogflow::QueryResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;

/// Message type used by chat platforms for the bot's own messages.
pub const SELF_MESSAGE_TYPE: &str = "self_message";

/// A message from a chat platform, plus NLU annotations once processed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// The user utterance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Platform classification tag (e.g. "message", "direct_mention", "self_message").
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,

    /// Set by platforms that echo the bot's own sends back to it.
    #[serde(rename = "is_echo", default, skip_serializing_if = "std::ops::Not::not")]
    pub is_echo: bool,

    /// Language code for the NLU query (default "en" when absent).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,

    /// Display name of the detected intent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,

    /// Extracted parameters, decoded to plain JSON.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub entities: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fulfillment: Option<Fulfillment>,

    /// Intent detection confidence in [0, 1].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,

    /// Raw query result from the NLU backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nlp_response: Option<QueryResult>,

    /// Any other platform fields (user, channel, team, ...).
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Suggested reply from the NLU backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fulfillment {
    pub speech: String,
    /// Structured rich-reply objects, in backend order.
    #[serde(default)]
    pub messages: Vec<Value>,
}

impl Message {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, message_type: impl Into<String>) -> Self {
        self.message_type = Some(message_type.into());
        self
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Text, if present and not blank.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.trim().is_empty())
    }

    /// True for the bot's own messages (echoes or self messages).
    pub fn is_from_self(&self) -> bool {
        self.is_echo || self.message_type.as_deref() == Some(SELF_MESSAGE_TYPE)
    }

    /// Value of a named field rendered as a string. Strings are returned verbatim,
    /// other JSON values in compact JSON form; absent and null fields give `None`.
    pub fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            "text" => self.text.as_deref().map(Cow::Borrowed),
            "type" => self.message_type.as_deref().map(Cow::Borrowed),
            "lang" => self.lang.as_deref().map(Cow::Borrowed),
            _ => match self.fields.get(name)? {
                Value::Null => None,
                Value::String(s) => Some(Cow::Borrowed(s.as_str())),
                other => Some(Cow::Owned(other.to_string())),
            },
        }
    }

    /// True once an NLU response has been merged onto the message.
    pub fn is_annotated(&self) -> bool {
        self.nlp_response.is_some()
    }
}
