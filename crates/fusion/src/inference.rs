//! HTTP inference-endpoint classification backend.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use coinpulse_core::config::ModelConfig;

use crate::sentiment::{ModelError, Sentiment, SentimentModel};

/// Sentiment model served over a text-classification HTTP endpoint.
pub struct HttpSentimentModel {
    client: Client,
    url: String,
    model: String,
}

impl HttpSentimentModel {
    pub fn new(config: &ModelConfig) -> Self {
        Self {
            client: Client::new(),
            url: config.url.clone(),
            model: config.model.clone(),
        }
    }
}

#[derive(Serialize)]
struct ClassifyRequest {
    model: String,
    inputs: Vec<String>,
}

#[derive(Deserialize)]
struct ClassifyResponse {
    results: Vec<ClassifyResult>,
}

#[derive(Deserialize)]
struct ClassifyResult {
    label: String,
    score: f64,
}

#[async_trait]
impl SentimentModel for HttpSentimentModel {
    async fn classify_batch(&self, texts: &[&str]) -> Result<Vec<Sentiment>, ModelError> {
        let request = ClassifyRequest {
            model: self.model.clone(),
            inputs: texts.iter().map(|s| s.to_string()).collect(),
        };

        let response = self
            .client
            .post(format!("{}/classify", self.url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Api(format!("{status}: {body}")));
        }

        let parsed: ClassifyResponse = response.json().await?;

        if parsed.results.len() != texts.len() {
            return Err(ModelError::BatchMismatch {
                sent: texts.len(),
                received: parsed.results.len(),
            });
        }

        parsed
            .results
            .into_iter()
            .map(|r| {
                Ok(Sentiment {
                    label: r.label.parse()?,
                    score: r.score,
                })
            })
            .collect()
    }
}
