use axum::{
    extract::{Query, State},
    Json,
};
use bson::oid::ObjectId;
use chrono::Utc;
use mongodb::Database;
use tracing::{info, warn};
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::modules::auth::guard::{ApiKeyAuth, BearerAuth, Principal};
use crate::modules::subscription::crud::SubscriptionCrud;
use crate::modules::subscription::model::{find_plan, SubscriptionPlan, DEFAULT_PLAN, PLANS};
use crate::modules::translation::{
    crud::TranslationCrud,
    model::{period_start, TranslationRecord, Usage},
    schema::{
        FeedbackRequest, FeedbackResponse, HistoryQuery, HistoryResponse, LimitResponse,
        Remaining, TranslateRequest, TranslateResponse, TranslationEntry,
    },
};
use crate::AppState;

const DEFAULT_PAGE: i64 = 10;
const MAX_PAGE: i64 = 100;

async fn monthly_usage(db: &Database, user_id: &ObjectId, limit: i64) -> ApiResult<Usage> {
    let used = TranslationCrud::new(db)
        .count_since(user_id, period_start(Utc::now()))
        .await?;
    Ok(Usage::new(limit, used as i64))
}

/// Quota gate for API-key callers. `None` is a service key: unlimited and
/// nothing gets recorded for it.
pub(crate) async fn check_limit(db: &Database, principal: &Principal) -> ApiResult<Option<(ObjectId, Usage)>> {
    let Principal::User(identity) = principal else {
        return Ok(None);
    };
    let user_id = identity.object_id()?;
    let usage = monthly_usage(db, &user_id, identity.translation_limit).await?;
    if usage.exhausted() {
        warn!(user_id = %identity.user_id, used = usage.used, limit = usage.limit, "translation limit reached");
        return Err(ApiError::LimitReached {
            limit: usage.limit,
            used: usage.used,
        });
    }
    Ok(Some((user_id, usage)))
}

pub(crate) async fn record_translation(db: &Database, record: TranslationRecord) -> ApiResult<()> {
    let user_id = record.user_id;
    let (source, target) = (record.source_language.clone(), record.target_language.clone());
    TranslationCrud::new(db).create(record).await?;
    info!(user_id = %user_id, source = %source, target = %target, "translation recorded");
    Ok(())
}

async fn current_plan(db: &Database, user_id: &ObjectId) -> ApiResult<&'static SubscriptionPlan> {
    let plan = match SubscriptionCrud::new(db).find_active(user_id).await? {
        Some(subscription) => subscription.plan(),
        None => find_plan(DEFAULT_PLAN).unwrap_or(&PLANS[0]),
    };
    Ok(plan)
}

fn to_entry(record: &TranslationRecord) -> TranslationEntry {
    TranslationEntry {
        id: record.id.map(|id| id.to_hex()).unwrap_or_default(),
        source_code: record.source_code.clone(),
        translated_code: record.translated_code.clone(),
        source_language: record.source_language.clone(),
        target_language: record.target_language.clone(),
        feedback: record.feedback.clone(),
        created_at: record.created_at_rfc3339(),
    }
}

pub async fn translate(
    State(state): State<AppState>,
    ApiKeyAuth(principal): ApiKeyAuth,
    Json(payload): Json<TranslateRequest>,
) -> ApiResult<Json<TranslateResponse>> {
    payload.validate()?;
    let (source, target) = payload
        .languages()
        .ok_or_else(|| ApiError::Validation("Unsupported language".to_string()))?;

    let quota = check_limit(&state.db, &principal).await?;

    let translator = state.translator();
    let model = payload.model.as_deref();
    let translated_code = translator
        .translate(&payload.source_code, source.as_str(), target.as_str(), model)
        .await;
    let feedback = translator
        .feedback(&payload.source_code, &translated_code, source.as_str(), target.as_str(), model)
        .await;

    let translations_remaining = match quota {
        None => Remaining::unlimited(),
        Some((user_id, usage)) => {
            let record = TranslationRecord::new(
                user_id,
                payload.source_code.clone(),
                translated_code.clone(),
                source.as_str().to_string(),
                target.as_str().to_string(),
                Some(feedback.clone()),
            );
            record_translation(&state.db, record).await?;
            Remaining::Count((usage.remaining - 1).max(0))
        }
    };

    Ok(Json(TranslateResponse {
        translated_code,
        feedback,
        translations_remaining,
    }))
}

pub async fn feedback(
    State(state): State<AppState>,
    ApiKeyAuth(principal): ApiKeyAuth,
    Json(payload): Json<FeedbackRequest>,
) -> ApiResult<Json<FeedbackResponse>> {
    payload.validate()?;
    // Gated like a translation but not counted as one.
    check_limit(&state.db, &principal).await?;

    let feedback = state
        .translator()
        .feedback(
            &payload.source_code,
            &payload.translated_code,
            &payload.source_language,
            &payload.target_language,
            payload.model.as_deref(),
        )
        .await;

    Ok(Json(FeedbackResponse { feedback }))
}

pub async fn history(
    State(state): State<AppState>,
    auth: BearerAuth,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<HistoryResponse>> {
    let user_id = auth.user_id()?;
    let limit = query.limit.unwrap_or(DEFAULT_PAGE).clamp(1, MAX_PAGE);
    let offset = query.offset.unwrap_or(0);

    let crud = TranslationCrud::new(&state.db);
    let records = crud.find_for_user(&user_id, limit, offset).await?;
    let total_count = crud.count_for_user(&user_id).await?;

    Ok(Json(HistoryResponse {
        success: true,
        translations: records.iter().map(to_entry).collect(),
        total_count,
        limit,
        offset,
    }))
}

pub async fn limit(State(state): State<AppState>, auth: BearerAuth) -> ApiResult<Json<LimitResponse>> {
    let user_id = auth.user_id()?;
    let plan = current_plan(&state.db, &user_id).await?;
    let usage = monthly_usage(&state.db, &user_id, plan.translation_limit).await?;

    Ok(Json(LimitResponse {
        success: true,
        plan_id: plan.id.to_string(),
        limit: usage.limit,
        used: usage.used,
        remaining: usage.remaining,
    }))
}
