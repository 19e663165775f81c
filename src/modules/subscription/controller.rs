use axum::{extract::State, Json};
use bson::oid::ObjectId;
use tracing::info;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::modules::auth::{cache, guard::BearerAuth};
use crate::modules::subscription::{
    crud::SubscriptionCrud,
    model::{find_plan, Subscription, SubscriptionPlan, PLANS},
    schema::{PlansResponse, SubscribeRequest, SubscribeResponse},
};
use crate::modules::users::crud::UserCrud;
use crate::AppState;

pub fn plan_catalog() -> PlansResponse {
    PlansResponse {
        success: true,
        plans: PLANS.to_vec(),
    }
}

pub fn lookup_plan(plan_id: &str) -> ApiResult<&'static SubscriptionPlan> {
    find_plan(plan_id).ok_or_else(|| ApiError::Validation(format!("Invalid plan: {plan_id}")))
}

/// Moves a user onto `plan`: swaps the active subscription, mirrors the plan
/// on the user row and drops the user's cached API-key identity.
pub async fn change_plan(
    state: &AppState,
    user_id: &ObjectId,
    plan: &SubscriptionPlan,
    payment_method: Option<String>,
) -> ApiResult<ObjectId> {
    let users = UserCrud::new(&state.db);
    let user = users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let subscription_id = SubscriptionCrud::new(&state.db)
        .replace_active(Subscription::new(*user_id, plan.id, payment_method))
        .await?
        .ok_or_else(|| ApiError::Internal("insert returned no subscription id".to_string()))?;
    users.set_account_type(user_id, plan.id).await?;
    cache::invalidate(&state.redis, &user.api_key).await;

    info!(user_id = %user_id, plan_id = plan.id, "subscription changed");
    Ok(subscription_id)
}

pub async fn list_plans() -> Json<PlansResponse> {
    Json(plan_catalog())
}

pub async fn subscribe(
    State(state): State<AppState>,
    auth: BearerAuth,
    Json(payload): Json<SubscribeRequest>,
) -> ApiResult<Json<SubscribeResponse>> {
    payload.validate()?;
    let plan = lookup_plan(&payload.plan_id)?;
    let user_id = auth.user_id()?;

    let subscription_id = change_plan(&state, &user_id, plan, payload.payment_method).await?;

    Ok(Json(SubscribeResponse {
        success: true,
        message: format!("Subscribed to the {} plan", plan.name),
        subscription_id: subscription_id.to_hex(),
    }))
}
