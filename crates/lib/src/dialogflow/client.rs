//! Dialogflow ES v2 REST client (https://dialogflow.googleapis.com/v2 by default).

use super::struct_value::ParameterFormat;
use super::types::{DetectIntentRequest, DetectIntentResponse, QueryResult};
use async_trait::async_trait;

pub const DEFAULT_ENDPOINT: &str = "https://dialogflow.googleapis.com/v2";

#[derive(Debug, thiserror::Error)]
pub enum DialogflowError {
    #[error("dialogflow request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("dialogflow api error: {status} {body}")]
    Api { status: u16, body: String },
    #[error("dialogflow response has no queryResult")]
    MissingQueryResult,
}

/// NLU backend the middleware queries. Implemented by [`DialogflowClient`]; tests and
/// embedders can supply their own.
#[async_trait]
pub trait NluBackend: Send + Sync {
    /// Detect the intent of one text query. Called at most once per message.
    async fn detect_intent(
        &self,
        request: &DetectIntentRequest,
    ) -> Result<QueryResult, DialogflowError>;
}

/// Client for the Dialogflow sessions API.
#[derive(Clone)]
pub struct DialogflowClient {
    base_url: String,
    access_token: Option<String>,
    client: reqwest::Client,
}

impl DialogflowClient {
    pub fn new(base_url: Option<String>, access_token: Option<String>) -> Self {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        Self {
            base_url,
            access_token,
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST /{session}:detectIntent — classify one text query.
    pub async fn detect_intent(
        &self,
        request: &DetectIntentRequest,
    ) -> Result<QueryResult, DialogflowError> {
        let url = format!("{}/{}:detectIntent", self.base_url, request.session);
        let mut req = self.client.post(&url).json(request);
        if let Some(ref token) = self.access_token {
            req = req.bearer_auth(token);
        }
        let res = req.send().await?;
        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(DialogflowError::Api { status, body });
        }
        let data: DetectIntentResponse = res.json().await?;
        log::debug!(
            "dialogflow detectIntent ok: response_id={}",
            data.response_id.as_deref().unwrap_or("-")
        );
        let mut result = data.query_result.ok_or(DialogflowError::MissingQueryResult)?;
        result.parameters_format = ParameterFormat::Plain;
        Ok(result)
    }
}

#[async_trait]
impl NluBackend for DialogflowClient {
    async fn detect_intent(
        &self,
        request: &DetectIntentRequest,
    ) -> Result<QueryResult, DialogflowError> {
        DialogflowClient::detect_intent(self, request).await
    }
}
