//! API client for a running assessment server

use anyhow::{Context, Result};
use assess_lib::{AssessmentRequest, AssessmentResult, PricingSnapshot, SourceKind};
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Error body returned by the server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("API error ({status}) {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },
}

/// API client for the assessment server
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        Self::decode(response).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;

        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let (code, message) = match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(parsed) => (parsed.code, parsed.error),
                Err(_) => ("unknown".to_string(), body),
            };
            return Err(ClientError::Api {
                status: status.as_u16(),
                code,
                message,
            }
            .into());
        }

        response.json().await.context("Failed to parse response")
    }

    /// Submit a workbook; `None` lets the server detect the source kind
    pub async fn submit_assessment(
        &self,
        request: &AssessmentRequest,
        source: Option<SourceKind>,
    ) -> Result<AssessmentResult> {
        let path = match source {
            Some(kind) => format!("api/v1/assessments/{}", kind),
            None => "api/v1/assessments".to_string(),
        };
        self.post(&path, request).await
    }

    pub async fn pricing(&self) -> Result<PricingSnapshot> {
        self.get("api/v1/pricing").await
    }
}
