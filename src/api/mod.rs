//! HTTP client for the remote birthcare facility service.
//!
//! All facility-scoped endpoints live under `api/birthcare/{facility_id}/`
//! and answer JSON, usually wrapped in a `{success, data}` envelope. The
//! envelope is not guaranteed; older endpoints return the payload bare,
//! so unwrapping tolerates both shapes.

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use crate::error::Error;

/// Thin wrapper around a shared `reqwest::Client` with base URL and
/// bearer-token injection.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, Error> {
        // Url::join drops the last path segment unless the base ends in '/'.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };

        Ok(Self {
            http: Client::new(),
            base_url: Url::parse(&normalized)?,
            token,
        })
    }

    pub fn from_settings(settings: &crate::config::ApiSettings) -> Result<Self, Error> {
        Self::new(&settings.base_url, settings.token.clone())
    }

    fn endpoint(&self, facility_id: &str, path: &str) -> Result<Url, Error> {
        if facility_id.trim().is_empty() {
            return Err(Error::MissingFacility);
        }
        let joined = format!(
            "api/birthcare/{}/{}",
            facility_id,
            path.trim_start_matches('/')
        );
        Ok(self.base_url.join(&joined)?)
    }

    /// Issue a facility-scoped GET and unwrap the response envelope.
    pub async fn get(
        &self,
        facility_id: &str,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Envelope, Error> {
        let url = self.endpoint(facility_id, path)?;
        let request_id = Uuid::new_v4();
        debug!(%request_id, %url, "GET");

        let mut request = self.http.get(url.clone());
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(%request_id, %status, path = url.path(), "request failed");
            return Err(Error::Status {
                status,
                path: url.path().to_string(),
            });
        }

        let body: Value = response.json().await?;
        Ok(Envelope::from_body(body))
    }
}

/// Unwrapped `{success, data}` response envelope.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub success: bool,
    pub data: Value,
}

impl Envelope {
    /// Interpret a response body. A JSON object carrying `success` or
    /// `data` keys is treated as the standard envelope; anything else is
    /// taken as the payload itself.
    pub fn from_body(body: Value) -> Self {
        match &body {
            Value::Object(map) if map.contains_key("success") || map.contains_key("data") => {
                let success = map.get("success").and_then(Value::as_bool).unwrap_or(true);
                let data = map.get("data").cloned().unwrap_or(Value::Null);
                Self { success, data }
            }
            _ => Self {
                success: true,
                data: body,
            },
        }
    }

    /// The payload as an array, if it is structurally one.
    pub fn rows(&self) -> Option<&[Value]> {
        self.data.as_array().map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_unwraps_standard_shape() {
        let env = Envelope::from_body(json!({"success": true, "data": [1, 2]}));
        assert!(env.success);
        assert_eq!(env.rows().map(<[Value]>::len), Some(2));
    }

    #[test]
    fn envelope_reports_explicit_failure() {
        let env = Envelope::from_body(json!({"success": false, "message": "nope"}));
        assert!(!env.success);
        assert!(env.data.is_null());
    }

    #[test]
    fn bare_body_is_used_as_data() {
        let env = Envelope::from_body(json!([{"id": 1}]));
        assert!(env.success);
        assert_eq!(env.rows().map(<[Value]>::len), Some(1));
    }

    #[test]
    fn missing_facility_id_is_rejected() {
        let client = ApiClient::new("http://localhost:8000", None).unwrap();
        assert!(matches!(
            client.endpoint("  ", "patients"),
            Err(Error::MissingFacility)
        ));
    }

    #[test]
    fn endpoint_paths_are_facility_scoped() {
        let client = ApiClient::new("http://localhost:8000", None).unwrap();
        let url = client.endpoint("fac-1", "/patient-admissions").unwrap();
        assert_eq!(url.path(), "/api/birthcare/fac-1/patient-admissions");
    }
}
