use super::types::*;
use crate::{Error, Result, config::Config};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Inference call into the externally hosted model.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    async fn predict(&self, input_text: &str) -> Result<Value>;
}

pub struct HttpModelBackend {
    client: reqwest::Client,
    predict_url: String,
    api_key: Option<String>,
    target: String,
    data_file_name: String,
}

impl HttpModelBackend {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.model.timeout_secs))
            .build()?;

        let predict_url = format!(
            "{}/models/{}/predict",
            config.model.base_url.trim_end_matches('/'),
            config.model_name
        );

        debug!("Model backend endpoint: {}", predict_url);

        Ok(Self {
            client,
            predict_url,
            api_key: config.model.api_key.clone(),
            target: config.target.clone(),
            data_file_name: config.data_file_name.clone(),
        })
    }

    pub fn predict_url(&self) -> &str {
        &self.predict_url
    }
}

#[async_trait]
impl ModelBackend for HttpModelBackend {
    async fn predict(&self, input_text: &str) -> Result<Value> {
        let body = BackendPredictRequest {
            input_text: input_text.to_string(),
            target: self.target.clone(),
            data_file_name: self.data_file_name.clone(),
        };

        let mut req_builder = self.client.post(&self.predict_url).json(&body);
        if let Some(key) = &self.api_key {
            req_builder = req_builder.bearer_auth(key);
        }

        let response = req_builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::model(format!(
                "{} returned {}: {}",
                self.predict_url, status, text
            )));
        }

        let result: Value = response.json().await?;
        debug!("Model backend answered with status {}", status);

        Ok(result)
    }
}
