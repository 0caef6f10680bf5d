use crate::recognize::error::RecognitionError;
use crate::recognize::protocol::{parse_response, RecognitionRequest, ResultRecord};
use crate::settings::Settings;
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use std::time::Duration;

const USER_AGENT: &str = concat!("sketch_calc/", env!("CARGO_PKG_VERSION"));
const MAX_ERROR_BODY: usize = 512;

/// Anything that can turn a captured sketch into result records.
pub trait RecognitionService: Send + Sync {
    fn recognize(&self, request: &RecognitionRequest)
        -> Result<Vec<ResultRecord>, RecognitionError>;
}

pub struct HttpRecognitionService {
    client: Client,
    endpoint: String,
}

impl HttpRecognitionService {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("build recognition http client")?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Uses a caller-configured client, e.g. one with custom proxy rules.
    pub fn with_client(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(settings.endpoint.clone(), settings.request_timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl RecognitionService for HttpRecognitionService {
    fn recognize(
        &self,
        request: &RecognitionRequest,
    ) -> Result<Vec<ResultRecord>, RecognitionError> {
        let body = serde_json::to_vec(request)
            .map_err(|e| RecognitionError::Transport(format!("serialize request: {e}")))?;

        tracing::debug!(
            endpoint = %self.endpoint,
            image_len = request.image.len(),
            vars = request.dict_of_vars.len(),
            "posting sketch for recognition"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(body)
            .send()
            .map_err(|e| RecognitionError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let mut text = response.text().unwrap_or_default();
            if text.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !text.is_char_boundary(cut) {
                    cut -= 1;
                }
                text.truncate(cut);
            }
            return Err(RecognitionError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let bytes = response
            .bytes()
            .map_err(|e| RecognitionError::Transport(format!("read response body: {e}")))?;
        let records = parse_response(&bytes)?;
        tracing::debug!(records = records.len(), "recognition response parsed");
        Ok(records)
    }
}
