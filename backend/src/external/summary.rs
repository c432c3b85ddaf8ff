//! Text-summary client
//!
//! Client for the hosted text-generation service that turns a slice of
//! loom data into a human-readable report. The service is opaque: we
//! send the report type, the fields of interest and the data as a JSON
//! string, and all we rely on in the answer is the summary text.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Client for the text-summary service
#[derive(Clone)]
pub struct SummaryClient {
    api_endpoint: String,
    api_key: String,
    http_client: Client,
}

/// Request for a generated summary
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRequest {
    /// The type of report to generate, e.g. "trends" or "anomalies".
    pub report_type: String,
    /// The data fields the report should focus on, e.g. "Width", "Mtrs".
    pub data_fields: Vec<String>,
    /// The loom data in JSON format.
    pub loom_data: String,
}

/// Response from the text-summary service
#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub summary: String,
}

impl SummaryClient {
    /// Create a new summary client
    pub fn new(api_endpoint: String, api_key: String) -> Self {
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            api_endpoint,
            api_key,
            http_client,
        }
    }

    /// Create a client from environment variables
    pub fn from_env() -> Option<Self> {
        let api_endpoint = std::env::var("LOOM__SUMMARY__API_ENDPOINT").ok()?;
        let api_key = std::env::var("LOOM__SUMMARY__API_KEY").ok()?;

        Some(Self::new(api_endpoint, api_key))
    }

    pub fn is_configured(&self) -> bool {
        !self.api_endpoint.is_empty()
    }

    /// Request a summary of the given loom data
    pub async fn generate(&self, request: SummaryRequest) -> AppResult<SummaryResponse> {
        if !self.is_configured() {
            return Err(AppError::SummaryServiceError(
                "summary service endpoint is not configured".to_string(),
            ));
        }

        let response = self
            .http_client
            .post(&self.api_endpoint)
            .header("x-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::SummaryServiceError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::SummaryServiceError(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        let result: SummaryResponse = response
            .json()
            .await
            .map_err(|e| AppError::SummaryServiceError(format!("Failed to parse response: {}", e)))?;

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_shape() {
        let request = SummaryRequest {
            report_type: "trends".to_string(),
            data_fields: vec!["Width".to_string(), "Mtrs".to_string()],
            loom_data: "[]".to_string(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["reportType"], "trends");
        assert_eq!(json["dataFields"][1], "Mtrs");
        assert_eq!(json["loomData"], "[]");
    }

    #[test]
    fn test_response_only_needs_summary() {
        let response: SummaryResponse =
            serde_json::from_str(r#"{"summary": "Output is stable.", "model": "x"}"#).unwrap();
        assert_eq!(response.summary, "Output is stable.");
    }

    #[test]
    fn test_unconfigured_client() {
        let client = SummaryClient::new(String::new(), String::new());
        assert!(!client.is_configured());
    }
}
