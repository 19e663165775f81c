use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CheckoutRequest {
    #[validate(length(min = 1, message = "Plan id is required"))]
    pub plan_id: String,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub success: bool,
    /// `None` when no payment is needed and the plan was switched directly.
    pub checkout_url: Option<String>,
    pub session_id: Option<String>,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub success: bool,
    pub message: String,
}
