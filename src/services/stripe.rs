//! Stripe checkout sessions and webhook verification.
//!
//! Without an API key the client runs in test mode and fabricates checkout
//! URLs; without a webhook secret, events are acknowledged unprocessed.

use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;

use crate::config::settings::StripeSettings;
use crate::modules::subscription::model::SubscriptionPlan;

type HmacSha256 = Hmac<Sha256>;

/// Maximum age of a signed webhook, in seconds.
const SIGNATURE_TOLERANCE: i64 = 300;

#[derive(Error, Debug)]
pub enum BillingError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Stripe API error: {0}")]
    ApiError(String),
    #[error("Invalid signature")]
    InvalidSignature,
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct StripeSessionResponse {
    id: String,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    message: String,
}

#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookData,
}

#[derive(Debug, Deserialize)]
pub struct WebhookData {
    pub object: serde_json::Value,
}

/// What a verified event asks the service to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingAction {
    ChangePlan { user_id: String, plan_id: String },
    Ignore,
}

impl WebhookEvent {
    pub fn action(&self) -> Result<BillingAction, BillingError> {
        let object = &self.data.object;
        match self.event_type.as_str() {
            "checkout.session.completed" => {
                let user_id = object["client_reference_id"]
                    .as_str()
                    .or_else(|| object["metadata"]["user_id"].as_str())
                    .ok_or_else(|| BillingError::InvalidPayload("missing client_reference_id".into()))?;
                let plan_id = object["metadata"]["plan_id"]
                    .as_str()
                    .ok_or_else(|| BillingError::InvalidPayload("missing metadata.plan_id".into()))?;
                Ok(BillingAction::ChangePlan {
                    user_id: user_id.to_string(),
                    plan_id: plan_id.to_string(),
                })
            }
            "customer.subscription.deleted" => {
                let user_id = object["metadata"]["user_id"]
                    .as_str()
                    .ok_or_else(|| BillingError::InvalidPayload("missing metadata.user_id".into()))?;
                Ok(BillingAction::ChangePlan {
                    user_id: user_id.to_string(),
                    plan_id: "free".to_string(),
                })
            }
            _ => Ok(BillingAction::Ignore),
        }
    }
}

#[derive(Clone)]
pub struct StripeClient {
    client: Client,
    settings: StripeSettings,
}

impl StripeClient {
    pub fn new(settings: StripeSettings) -> Self {
        Self {
            client: Client::new(),
            settings,
        }
    }

    pub fn test_mode(&self) -> bool {
        self.settings.api_key.is_none()
    }

    pub fn verifies_webhooks(&self) -> bool {
        self.settings.webhook_secret.is_some()
    }

    pub async fn create_checkout_session(
        &self,
        plan: &SubscriptionPlan,
        user_id: &str,
    ) -> Result<CheckoutSession, BillingError> {
        let Some(api_key) = self.settings.api_key.as_deref() else {
            return Ok(CheckoutSession {
                id: format!("test_session_{}_{}", plan.id, user_id),
                url: format!("https://example.com/checkout?plan={}&user={}", plan.id, user_id),
            });
        };

        let unit_amount = (plan.price_monthly * 100.0).round() as i64;
        let form: Vec<(&str, String)> = vec![
            ("mode", "subscription".to_string()),
            ("payment_method_types[0]", "card".to_string()),
            ("line_items[0][quantity]", "1".to_string()),
            ("line_items[0][price_data][currency]", "usd".to_string()),
            ("line_items[0][price_data][unit_amount]", unit_amount.to_string()),
            ("line_items[0][price_data][recurring][interval]", "month".to_string()),
            (
                "line_items[0][price_data][product_data][name]",
                format!("Code Translator - {} Plan", plan.name),
            ),
            (
                "line_items[0][price_data][product_data][description]",
                format!("Monthly subscription to {} plan", plan.name),
            ),
            ("success_url", self.settings.success_url.clone()),
            ("cancel_url", self.settings.cancel_url.clone()),
            ("client_reference_id", user_id.to_string()),
            ("metadata[plan_id]", plan.id.to_string()),
            ("metadata[user_id]", user_id.to_string()),
            ("subscription_data[metadata][plan_id]", plan.id.to_string()),
            ("subscription_data[metadata][user_id]", user_id.to_string()),
        ];

        let response = self
            .client
            .post(format!("{}/checkout/sessions", self.settings.api_base))
            .basic_auth(api_key, Option::<&str>::None)
            .form(&form)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            if let Ok(error_response) = serde_json::from_str::<StripeErrorResponse>(&error_text) {
                return Err(BillingError::ApiError(error_response.error.message));
            }
            return Err(BillingError::ApiError(error_text));
        }

        let session: StripeSessionResponse = response.json().await?;
        Ok(CheckoutSession {
            url: session.url.unwrap_or_default(),
            id: session.id,
        })
    }

    /// Checks the `Stripe-Signature` header against the raw body and parses
    /// the event. Callers must only invoke this when a secret is configured.
    pub fn construct_event(&self, payload: &[u8], signature_header: &str) -> Result<WebhookEvent, BillingError> {
        let secret = self
            .settings
            .webhook_secret
            .as_deref()
            .ok_or(BillingError::InvalidSignature)?;
        verify_signature(payload, signature_header, secret, Utc::now().timestamp())?;
        serde_json::from_slice(payload).map_err(|e| BillingError::InvalidPayload(e.to_string()))
    }
}

/// Header format: `t=<unix seconds>,v1=<hex hmac>[,v1=...]`. Any matching
/// `v1` entry within the tolerance window passes.
pub fn verify_signature(payload: &[u8], header: &str, secret: &str, now: i64) -> Result<(), BillingError> {
    let mut timestamp = None;
    let mut candidates = Vec::new();
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
            Some(("v1", value)) => candidates.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(BillingError::InvalidSignature)?;
    if (now - timestamp).abs() > SIGNATURE_TOLERANCE {
        return Err(BillingError::InvalidSignature);
    }

    for candidate in candidates {
        let Ok(expected) = hex::decode(candidate) else {
            continue;
        };
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|_| BillingError::InvalidSignature)?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        if mac.verify_slice(&expected).is_ok() {
            return Ok(());
        }
    }

    Err(BillingError::InvalidSignature)
}

#[cfg(test)]
pub(crate) fn sign_for_tests(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(format!("{timestamp}.").as_bytes());
    mac.update(payload);
    format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
}
