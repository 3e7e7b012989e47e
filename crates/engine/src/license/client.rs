//! Remote licensing API client.
//!
//! Talks to the KeyForge public endpoints over HTTPS POST with JSON
//! bodies. Every outcome is terminal for the request that triggered it:
//! no retries, and network failures come back as an invalid check with a
//! fixed message rather than an error.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, instrument, warn};
use url::Url;
use uuid::Uuid;

use ship_restrict_core::LicenseCheck;

use crate::config::{EngineConfig, LICENSE_HTTP_TIMEOUT};
use crate::store::SettingsStore;

use super::rate_limit::CallBudget;

/// Message returned when the call budget is exhausted.
pub const RATE_LIMIT_ERROR: &str =
    "Too many validation attempts. Please try again in 5 minutes.";

/// Message returned when the license server cannot be reached.
pub const UNREACHABLE_ERROR: &str = "Could not reach license server.";

/// Remote licensing API, as a seam for tests.
pub trait LicenseApi: Send + Sync {
    /// Validate the key, or activate it when `activate` is set (key
    /// changed or was previously invalid).
    fn validate_or_activate(
        &self,
        key: &str,
        activate: bool,
    ) -> impl Future<Output = LicenseCheck> + Send;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LicenseRequest<'a> {
    license_key: &'a str,
    product_id: &'a str,
    device_identifier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    device_name: Option<String>,
}

/// Client for the remote licensing service.
pub struct LicenseClient {
    http: reqwest::Client,
    endpoint: Url,
    product_id: String,
    device_name: String,
    settings: Arc<dyn SettingsStore>,
    budget: CallBudget,
}

impl LicenseClient {
    /// Create a client with the fixed outbound timeout baked in.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(
        config: &EngineConfig,
        settings: Arc<dyn SettingsStore>,
        budget: CallBudget,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(LICENSE_HTTP_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            endpoint: config.license_endpoint.clone(),
            product_id: config.product_id.clone(),
            device_name: config.site.device_name(),
            settings,
            budget,
        })
    }

    /// The persisted per-installation device identifier, generated once.
    ///
    /// If persisting a fresh identifier fails, the call proceeds with the
    /// unpersisted value; the next call simply generates another.
    fn device_identifier(&self) -> Uuid {
        match self.settings.device_id() {
            Ok(Some(id)) => id,
            Ok(None) => {
                let id = Uuid::new_v4();
                if let Err(error) = self.settings.set_device_id(id) {
                    warn!(%error, "Could not persist device identifier");
                }
                id
            }
            Err(error) => {
                warn!(%error, "Could not read device identifier");
                Uuid::new_v4()
            }
        }
    }

    fn action_url(&self, activate: bool) -> String {
        let action = if activate { "activate" } else { "validate" };
        format!(
            "{}/licenses/{action}",
            self.endpoint.as_str().trim_end_matches('/')
        )
    }

    #[instrument(skip(self, key))]
    async fn call(&self, key: &str, activate: bool) -> LicenseCheck {
        if !self.budget.try_claim() {
            debug!("License call rejected by call budget");
            return LicenseCheck::invalid(RATE_LIMIT_ERROR, &self.product_id);
        }

        let body = LicenseRequest {
            license_key: key,
            product_id: &self.product_id,
            device_identifier: self.device_identifier().to_string(),
            device_name: activate.then(|| self.device_name.clone()),
        };

        let response = self
            .http
            .post(self.action_url(activate))
            .json(&body)
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(error) => {
                warn!(%error, "License server unreachable");
                return LicenseCheck::invalid(UNREACHABLE_ERROR, &self.product_id);
            }
        };

        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        interpret_response(activate, status, &text, &self.product_id)
    }
}

impl LicenseApi for LicenseClient {
    fn validate_or_activate(
        &self,
        key: &str,
        activate: bool,
    ) -> impl Future<Output = LicenseCheck> + Send {
        self.call(key, activate)
    }
}

/// Decode one terminal response into a check outcome.
///
/// Any 2xx status is a success envelope: an empty or non-object body is
/// success, activation success needs no fields, and validation success
/// requires a truthy `isValid`/`valid` field. Non-2xx is always invalid
/// with a synthesized server-error message.
fn interpret_response(activate: bool, status: u16, body: &str, product_id: &str) -> LicenseCheck {
    let data: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let message = data
        .as_ref()
        .and_then(|value| value.get("message"))
        .and_then(serde_json::Value::as_str)
        .map(ToString::to_string);

    if !(200..300).contains(&status) {
        let mut error = format!("License server error ({status}).");
        if let Some(message) = message {
            error.push(' ');
            error.push_str(&message);
        }
        return LicenseCheck::invalid(error, product_id);
    }

    let Some(data) = data.filter(serde_json::Value::is_object) else {
        // Empty or non-object body on 2xx; the activate endpoint responds
        // this way on success.
        return LicenseCheck::valid(product_id);
    };

    if activate {
        return LicenseCheck::valid(product_id);
    }

    if truthy(data.get("isValid")) || truthy(data.get("valid")) {
        return LicenseCheck::valid(product_id);
    }

    LicenseCheck::invalid(
        message.unwrap_or_else(|| "License invalid.".to_string()),
        product_id,
    )
}

fn truthy(value: Option<&serde_json::Value>) -> bool {
    match value {
        Some(serde_json::Value::Bool(flag)) => *flag,
        Some(serde_json::Value::Number(number)) => number.as_i64().is_some_and(|n| n != 0),
        _ => false,
    }
}
