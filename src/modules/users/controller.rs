use axum::{extract::State, http::StatusCode, Json};
use tracing::{error, info};
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::modules::auth::guard::BearerAuth;
use crate::modules::subscription::crud::SubscriptionCrud;
use crate::modules::subscription::model::{Subscription, DEFAULT_PLAN};
use crate::modules::users::{
    crud::{is_duplicate_key, UserCrud},
    model::{Profile, User},
    schema::{
        LoginRequest, LoginResponse, ProfileResponse, RegisterRequest, RegisterResponse,
        SubscriptionSummary, UpdateProfileRequest,
    },
};
use crate::services::token::{hash_password, verify_password};
use crate::AppState;

fn already_registered() -> ApiError {
    ApiError::Conflict("Username or email already exists".to_string())
}

fn invalid_credentials() -> ApiError {
    ApiError::Unauthorized("Invalid credentials".to_string())
}

async fn load_active_user(users: &UserCrud, user_id: &bson::oid::ObjectId) -> ApiResult<User> {
    let user = users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    if !user.is_active {
        return Err(ApiError::Forbidden("Account is disabled".to_string()));
    }
    Ok(user)
}

fn rfc3339(t: bson::DateTime) -> String {
    t.try_to_rfc3339_string().unwrap_or_default()
}

fn to_profile_response(user: &User, subscription: Option<&Subscription>) -> ProfileResponse {
    ProfileResponse {
        success: true,
        user_id: user.id_hex(),
        username: user.username.clone(),
        email: user.email.clone(),
        api_key: user.api_key.clone(),
        account_type: user.account_type.clone(),
        first_name: user.profile.first_name.clone(),
        last_name: user.profile.last_name.clone(),
        company: user.profile.company.clone(),
        website: user.profile.website.clone(),
        created_at: user.created_at_rfc3339(),
        last_login: user.last_login_rfc3339(),
        subscription: subscription.map(|s| SubscriptionSummary {
            plan_id: s.plan_id.clone(),
            plan_name: s.plan().name.to_string(),
            start_date: rfc3339(s.start_date),
            end_date: rfc3339(s.end_date),
        }),
    }
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    payload.validate()?;

    let users = UserCrud::new(&state.db);
    if users.exists(&payload.username, &payload.email).await? {
        return Err(already_registered());
    }

    let password_hash = hash_password(&payload.password).map_err(|e| ApiError::Internal(e.to_string()))?;
    let profile = Profile {
        first_name: payload.first_name,
        last_name: payload.last_name,
        ..Profile::default()
    };
    let user = User::new(payload.username, payload.email, password_hash, profile);
    let api_key = user.api_key.clone();

    // A concurrent registration can pass `exists` and still lose on the index.
    let user_id = match users.create(user).await {
        Ok(id) => id.ok_or_else(|| ApiError::Internal("insert returned no user id".to_string()))?,
        Err(e) if is_duplicate_key(&e) => return Err(already_registered()),
        Err(e) => return Err(e.into()),
    };

    if let Err(e) = SubscriptionCrud::new(&state.db)
        .replace_active(Subscription::new(user_id, DEFAULT_PLAN, None))
        .await
    {
        if let Err(cleanup) = users.delete(&user_id).await {
            error!(user_id = %user_id, error = %cleanup, "could not remove user after failed subscription");
        }
        return Err(e.into());
    }

    info!(user_id = %user_id, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            message: "User registered successfully".to_string(),
            user_id: user_id.to_hex(),
            api_key,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    payload.validate()?;

    let users = UserCrud::new(&state.db);
    let user = users
        .find_by_login(&payload.username_or_email)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(invalid_credentials)?;

    if !verify_password(&payload.password, &user.password_hash) {
        return Err(invalid_credentials());
    }
    let user_id = user.id.ok_or_else(invalid_credentials)?;

    users.touch_last_login(&user_id).await?;
    let token = state.tokens.issue(&user_id.to_hex(), &user.username, &user.email);
    info!(user_id = %user_id, "user logged in");

    Ok(Json(LoginResponse {
        success: true,
        token,
        user_id: user_id.to_hex(),
        username: user.username,
        email: user.email,
        api_key: user.api_key,
    }))
}

pub async fn get_profile(State(state): State<AppState>, auth: BearerAuth) -> ApiResult<Json<ProfileResponse>> {
    let user_id = auth.user_id()?;
    let user = load_active_user(&UserCrud::new(&state.db), &user_id).await?;
    let subscription = SubscriptionCrud::new(&state.db).find_active(&user_id).await?;

    Ok(Json(to_profile_response(&user, subscription.as_ref())))
}

pub async fn update_profile(
    State(state): State<AppState>,
    auth: BearerAuth,
    Json(payload): Json<UpdateProfileRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    payload.validate()?;
    let user_id = auth.user_id()?;

    let users = UserCrud::new(&state.db);
    let mut user = load_active_user(&users, &user_id).await?;

    let profile = &mut user.profile;
    if let Some(first_name) = payload.first_name {
        profile.first_name = Some(first_name);
    }
    if let Some(last_name) = payload.last_name {
        profile.last_name = Some(last_name);
    }
    if let Some(company) = payload.company {
        profile.company = Some(company);
    }
    if let Some(website) = payload.website {
        profile.website = Some(website);
    }

    users.update_profile(&user_id, &user.profile).await?;
    let subscription = SubscriptionCrud::new(&state.db).find_active(&user_id).await?;

    Ok(Json(to_profile_response(&user, subscription.as_ref())))
}
