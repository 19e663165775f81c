use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    Json,
};
use bson::oid::ObjectId;
use tracing::{info, warn};
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::modules::auth::guard::{ApiKeyAuth, Principal};
use crate::modules::billing::schema::{CheckoutRequest, CheckoutResponse, WebhookResponse};
use crate::modules::subscription::controller::{change_plan, lookup_plan, plan_catalog};
use crate::modules::subscription::schema::PlansResponse;
use crate::services::stripe::{BillingAction, BillingError};
use crate::AppState;

const SIGNATURE_HEADER: &str = "stripe-signature";

fn billing_error(e: BillingError) -> ApiError {
    match e {
        BillingError::InvalidSignature => ApiError::Validation("Invalid signature".to_string()),
        BillingError::InvalidPayload(m) => ApiError::Validation(format!("Invalid payload: {m}")),
        other => ApiError::Upstream(other.to_string()),
    }
}

pub async fn list_plans(_auth: ApiKeyAuth) -> Json<PlansResponse> {
    Json(plan_catalog())
}

pub async fn checkout(
    State(state): State<AppState>,
    ApiKeyAuth(principal): ApiKeyAuth,
    Json(payload): Json<CheckoutRequest>,
) -> ApiResult<Json<CheckoutResponse>> {
    payload.validate()?;
    let Principal::User(identity) = principal else {
        return Err(ApiError::Validation(
            "Service API keys cannot purchase subscriptions".to_string(),
        ));
    };
    let plan = lookup_plan(&payload.plan_id)?;

    if plan.price_monthly <= 0.0 {
        let user_id = identity.object_id()?;
        change_plan(&state, &user_id, plan, None).await?;
        return Ok(Json(CheckoutResponse {
            success: true,
            checkout_url: None,
            session_id: None,
            message: format!("Switched to the {} plan", plan.name),
        }));
    }

    let session = state
        .stripe
        .create_checkout_session(plan, &identity.user_id)
        .await
        .map_err(billing_error)?;
    info!(
        user_id = %identity.user_id,
        plan_id = plan.id,
        test_mode = state.stripe.test_mode(),
        "checkout session created"
    );

    Ok(Json(CheckoutResponse {
        success: true,
        checkout_url: Some(session.url),
        session_id: Some(session.id),
        message: "Checkout session created".to_string(),
    }))
}

pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<WebhookResponse>> {
    if !state.stripe.verifies_webhooks() {
        warn!("webhook secret not configured, acknowledging event unprocessed");
        return Ok(Json(WebhookResponse {
            success: true,
            message: "Webhook received (test mode)".to_string(),
        }));
    }

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Validation("Missing Stripe-Signature header".to_string()))?;
    let event = state
        .stripe
        .construct_event(&body, signature)
        .map_err(billing_error)?;

    match event.action().map_err(billing_error)? {
        BillingAction::ChangePlan { user_id, plan_id } => {
            let user_oid = ObjectId::parse_str(&user_id)
                .map_err(|_| ApiError::Validation(format!("Invalid user id: {user_id}")))?;
            let plan = lookup_plan(&plan_id)?;
            change_plan(&state, &user_oid, plan, Some("stripe".to_string())).await?;
            info!(event_type = %event.event_type, user_id = %user_id, plan_id = plan.id, "webhook processed");
        }
        BillingAction::Ignore => {
            info!(event_type = %event.event_type, "webhook event ignored");
        }
    }

    Ok(Json(WebhookResponse {
        success: true,
        message: "Webhook processed".to_string(),
    }))
}
