//! Wire types for the sessions `detectIntent` call (request body and `queryResult`).

use super::struct_value::{decode_parameters, ParameterFormat};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One detectIntent call: the session it belongs to and the text query.
///
/// The language travels with each request; the client itself holds no per-call state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectIntentRequest {
    /// Session resource path (`projects/<p>/agent/sessions/<s>`). Sent in the URL, not the body.
    #[serde(skip)]
    pub session: String,
    pub query_input: QueryInput,
}

impl DetectIntentRequest {
    pub fn text(
        session: impl Into<String>,
        text: impl Into<String>,
        language_code: impl Into<String>,
    ) -> Self {
        Self {
            session: session.into(),
            query_input: QueryInput {
                text: TextInput {
                    text: text.into(),
                    language_code: language_code.into(),
                },
            },
        }
    }

    pub fn language_code(&self) -> &str {
        &self.query_input.text.language_code
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryInput {
    pub text: TextInput,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextInput {
    pub text: String,
    pub language_code: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectIntentResponse {
    #[serde(default)]
    pub response_id: Option<String>,
    #[serde(default)]
    pub query_result: Option<QueryResult>,
}

/// `queryResult` of a detectIntent response. Fields not modelled here are kept in `extra`
/// so the result can be handed to callers verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// Extracted parameters: plain JSON (REST) or a protobuf `Struct` tree.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
    /// How `parameters` is encoded; set by the backend that produced the result.
    #[serde(skip)]
    pub parameters_format: ParameterFormat,
    #[serde(default)]
    pub fulfillment_text: String,
    #[serde(default)]
    pub fulfillment_messages: Vec<Value>,
    /// Absent when no intent matched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
    /// proto3 JSON omits zero, so a missing value means 0.0.
    #[serde(default)]
    pub intent_detection_confidence: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl QueryResult {
    pub fn intent_name(&self) -> Option<&str> {
        self.intent
            .as_ref()
            .map(|i| i.display_name.as_str())
            .filter(|n| !n.is_empty())
    }

    pub fn action(&self) -> Option<&str> {
        self.action.as_deref().filter(|a| !a.is_empty())
    }

    /// `parameters` decoded to plain JSON.
    pub fn entities(&self) -> Map<String, Value> {
        self.parameters
            .as_ref()
            .map(|p| decode_parameters(p, self.parameters_format))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub display_name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_omits_session() {
        let req = DetectIntentRequest::text("projects/p/agent/sessions/s", "hello", "de");
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "queryInput": { "text": { "text": "hello", "languageCode": "de" } }
            })
        );
    }

    #[test]
    fn query_result_without_intent() {
        let r: QueryResult = serde_json::from_str(
            r#"{"queryText":"blah","fulfillmentText":"","languageCode":"en"}"#,
        )
        .unwrap();
        assert_eq!(r.intent_name(), None);
        assert_eq!(r.action(), None);
        assert_eq!(r.intent_detection_confidence, 0.0);
    }

    #[test]
    fn query_result_keeps_unmodelled_fields() {
        let r: QueryResult = serde_json::from_str(
            r#"{"action":"input.welcome","intent":{"name":"projects/p/agent/intents/1","displayName":"Default Welcome Intent","isFallback":false},"sentimentAnalysisResult":{"queryTextSentiment":{"score":0.3}}}"#,
        )
        .unwrap();
        assert_eq!(r.intent_name(), Some("Default Welcome Intent"));
        assert_eq!(r.action(), Some("input.welcome"));
        assert!(r.extra.contains_key("sentimentAnalysisResult"));
        assert!(r.intent.unwrap().extra.contains_key("isFallback"));
    }
}
