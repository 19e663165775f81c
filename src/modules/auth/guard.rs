//! Request authentication.
//!
//! API-key routes take [`ApiKeyAuth`], session routes take [`BearerAuth`].
//! Both reject with 401 before the handler body runs.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::modules::auth::cache;
use crate::modules::subscription::crud::SubscriptionCrud;
use crate::modules::users::crud::UserCrud;
use crate::services::token::Claims;
use crate::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Owner id shared by every static service key.
const SERVICE_OWNER: &str = "service";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Hex form of the user's ObjectId.
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub plan_id: String,
    pub translation_limit: i64,
}

impl UserIdentity {
    pub fn object_id(&self) -> ApiResult<ObjectId> {
        ObjectId::parse_str(&self.user_id)
            .map_err(|_| ApiError::Internal(format!("malformed user id {}", self.user_id)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    /// A key from the static allow-list: no quota, nothing recorded.
    Service,
    User(UserIdentity),
}

impl Principal {
    pub fn owner_id(&self) -> &str {
        match self {
            Principal::Service => SERVICE_OWNER,
            Principal::User(identity) => &identity.user_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authorization {
    Granted(Principal),
    Denied,
}

/// Resolves an `X-API-Key` value. Order: static allow-list, Redis cache, then
/// an active user with an active subscription.
pub async fn authorize_api_key(state: &AppState, api_key: Option<&str>) -> ApiResult<Authorization> {
    let Some(api_key) = api_key.map(str::trim).filter(|k| !k.is_empty()) else {
        return Ok(Authorization::Denied);
    };

    if state.settings.api_keys.iter().any(|k| k == api_key) {
        return Ok(Authorization::Granted(Principal::Service));
    }

    if let Some(identity) = cache::get(&state.redis, api_key).await {
        return Ok(Authorization::Granted(Principal::User(identity)));
    }

    let Some(user) = UserCrud::new(&state.db).find_active_by_api_key(api_key).await? else {
        return Ok(Authorization::Denied);
    };
    let Some(user_id) = user.id else {
        return Ok(Authorization::Denied);
    };
    let Some(subscription) = SubscriptionCrud::new(&state.db).find_active(&user_id).await? else {
        debug!(user_id = %user_id, "api key owner has no active subscription");
        return Ok(Authorization::Denied);
    };

    let plan = subscription.plan();
    let identity = UserIdentity {
        user_id: user_id.to_hex(),
        username: user.username,
        email: user.email,
        plan_id: plan.id.to_string(),
        translation_limit: plan.translation_limit,
    };
    cache::put(&state.redis, api_key, &identity).await;

    Ok(Authorization::Granted(Principal::User(identity)))
}

pub struct ApiKeyAuth(pub Principal);

impl FromRequestParts<AppState> for ApiKeyAuth {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let api_key = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok());

        match authorize_api_key(state, api_key).await? {
            Authorization::Granted(principal) => Ok(ApiKeyAuth(principal)),
            Authorization::Denied => Err(ApiError::invalid_api_key()),
        }
    }
}

pub struct BearerAuth(pub Claims);

/// Every bearer failure answers the same way; the cause only goes to the log.
fn invalid_token() -> ApiError {
    ApiError::Unauthorized("Invalid token".to_string())
}

impl BearerAuth {
    pub fn user_id(&self) -> ApiResult<ObjectId> {
        ObjectId::parse_str(&self.0.user_id).map_err(|_| invalid_token())
    }
}

impl FromRequestParts<AppState> for BearerAuth {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .ok_or_else(|| {
                debug!("request carries no bearer token");
                invalid_token()
            })?;

        state.tokens.verify(token).map(BearerAuth).map_err(|e| {
            debug!(error = %e, "bearer token rejected");
            invalid_token()
        })
    }
}
