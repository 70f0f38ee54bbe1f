//! Submission of generated stacks to an external validation service.

use serde::{Deserialize, Serialize};

use strata_util::errors::StrataError;

/// The service's acknowledgement of a submitted stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionResponse {
    pub inspection_id: String,
}

pub trait ValidationService {
    /// Submit `payload` to `destination`, returning the assigned inspection.
    fn submit(
        &self,
        destination: &str,
        payload: &serde_json::Value,
    ) -> miette::Result<InspectionResponse>;
}

/// JSON-over-HTTP client for a validation service.
pub struct HttpValidationService {
    client: reqwest::blocking::Client,
}

impl HttpValidationService {
    pub fn new() -> miette::Result<Self> {
        let client = crate::http_client()?;
        Ok(Self { client })
    }
}

impl ValidationService for HttpValidationService {
    fn submit(
        &self,
        destination: &str,
        payload: &serde_json::Value,
    ) -> miette::Result<InspectionResponse> {
        let resp = self
            .client
            .post(destination)
            .json(payload)
            .send()
            .map_err(|e| StrataError::Network {
                message: format!("Failed to submit to {destination}: {e}"),
            })?;

        if !resp.status().is_success() {
            return Err(StrataError::Network {
                message: format!("HTTP {} from {destination}", resp.status()),
            }
            .into());
        }

        resp.json::<InspectionResponse>().map_err(|e| {
            StrataError::Network {
                message: format!("Unexpected response from {destination}: {e}"),
            }
            .into()
        })
    }
}
