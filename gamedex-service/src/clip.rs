//! CLIP classifier client.
//!
//! The pretrained vision-language model is consumed as a black box behind
//! an HTTP inference endpoint: an image plus a candidate label list go in,
//! ranked (label, probability) pairs come out. Nothing model-specific
//! leaks past this module.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

#[derive(Debug, thiserror::Error)]
pub enum ClipError {
    #[error("Connection failed to classifier at {url}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Classification failed (status {status}): {message}")]
    Inference { status: u16, message: String },

    #[error("Invalid response from classifier: {0}")]
    InvalidResponse(#[from] reqwest::Error),
}

/// One ranked candidate label
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    image: String,
    labels: &'a [String],
}

#[derive(Deserialize)]
struct ClassifyResponse {
    scores: Vec<LabelScore>,
}

/// Client for the CLIP inference sidecar
#[derive(Clone)]
pub struct ClipClient {
    client: Client,
    base_url: String,
}

impl ClipClient {
    /// Create a new classifier client
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("gamedex/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Check if the classifier endpoint is reachable
    pub async fn health_check(&self) -> bool {
        let url = format!("{}/health", self.base_url);

        match self.client.get(&url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                warn!(error = %e, "Classifier health check failed");
                false
            }
        }
    }

    /// Rank candidate labels against an image.
    ///
    /// Results are returned sorted by descending score regardless of the
    /// order the endpoint produced them in.
    pub async fn classify(
        &self,
        image: &[u8],
        labels: &[String],
    ) -> Result<Vec<LabelScore>, ClipError> {
        let url = format!("{}/classify", self.base_url);
        let request = ClassifyRequest {
            image: BASE64.encode(image),
            labels,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ClipError::Connection {
                url: url.clone(),
                source: e,
            })?;

        if !response.status().is_success() {
            return Err(ClipError::Inference {
                status: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let body: ClassifyResponse = response.json().await?;
        let mut scores = body.scores;
        scores.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(scores)
    }
}
