use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::{debug, warn};

use wayfarer_core::nlu::{NluError, NluRecognizer, RecognizerResult};
use wayfarer_core::NluConfig;

use crate::wire::{PredictionRequest, PredictionResponse};

const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

#[derive(Debug, Error)]
pub enum NluClientError {
    #[error("nlu configuration is missing `{0}`")]
    MissingSetting(&'static str),
    #[error("could not build the http client: {0}")]
    Http(String),
}

/// HTTP client for the NLU prediction endpoint. Transport and decode
/// failures surface as `NluError`; the dialog downgrades them to "intent
/// unknown" for the turn.
#[derive(Debug)]
pub struct HttpNluClient {
    client: reqwest::Client,
    endpoint: String,
    app_id: String,
    api_key: Option<SecretString>,
}

impl HttpNluClient {
    pub fn from_config(config: &NluConfig) -> Result<Self, NluClientError> {
        let endpoint =
            config.endpoint.clone().ok_or(NluClientError::MissingSetting("endpoint"))?;
        let app_id = config.app_id.clone().ok_or(NluClientError::MissingSetting("app_id"))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| NluClientError::Http(error.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_owned(),
            app_id,
            api_key: config.api_key.clone(),
        })
    }

    fn predict_url(&self) -> String {
        format!("{}/apps/{}/predict", self.endpoint, self.app_id)
    }

    async fn query(&self, utterance: &str) -> Result<RecognizerResult, NluError> {
        let mut request =
            self.client.post(self.predict_url()).json(&PredictionRequest { query: utterance });
        if let Some(api_key) = &self.api_key {
            request = request.header(SUBSCRIPTION_KEY_HEADER, api_key.expose_secret());
        }

        let response = request
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|error| NluError(error.to_string()))?;
        let prediction: PredictionResponse =
            response.json().await.map_err(|error| NluError(error.to_string()))?;

        debug!(intents = prediction.intents.len(), "nlu prediction received");
        Ok(prediction.into())
    }
}

#[async_trait]
impl NluRecognizer for HttpNluClient {
    async fn recognize(&self, utterance: &str) -> Result<RecognizerResult, NluError> {
        self.query(utterance).await.map_err(|error| {
            warn!(%error, "nlu prediction request failed");
            error
        })
    }
}
