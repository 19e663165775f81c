use serde::{Deserialize, Serialize};
use validator::Validate;

use super::model::SubscriptionPlan;

#[derive(Debug, Serialize)]
pub struct PlansResponse {
    pub success: bool,
    pub plans: Vec<SubscriptionPlan>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SubscribeRequest {
    #[validate(length(min = 1, message = "Plan id is required"))]
    pub plan_id: String,
    pub payment_method: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubscribeResponse {
    pub success: bool,
    pub message: String,
    pub subscription_id: String,
}
