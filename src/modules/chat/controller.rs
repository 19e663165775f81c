use axum::{
    extract::{Query, State},
    Json,
};
use tracing::debug;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::modules::auth::guard::ApiKeyAuth;
use crate::modules::chat::schema::{ChatRequest, ChatResponse, HistoryQuery, HistoryResponse};
use crate::modules::translation::controller::{check_limit, record_translation};
use crate::modules::translation::model::TranslationRecord;
use crate::services::assistant::ChatTranslation;
use crate::services::conversation::ConversationTurn;
use crate::AppState;

pub async fn chat(
    State(state): State<AppState>,
    ApiKeyAuth(principal): ApiKeyAuth,
    Json(payload): Json<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    payload.validate()?;

    let owner = principal.owner_id();
    let assistant = state.assistant();
    let store = &state.conversations;

    // A translation asked for in chat spends quota like `/translate` does.
    let translation = ChatTranslation::detect(&payload.message);
    let quota = match translation {
        Some(_) => check_limit(&state.db, &principal).await?,
        None => None,
    };

    let existing = match payload.conversation_id.as_deref() {
        Some(id) => store.lock(id, owner).await.map(|guard| (id.to_string(), guard)),
        None => None,
    };

    // Unknown, foreign or absent ids all start a fresh conversation.
    let (conversation_id, mut conversation) = match existing {
        Some(found) => found,
        None => {
            let id = store.open(owner, &assistant.greeting()).await;
            debug!(conversation_id = %id, "conversation opened");
            let guard = store
                .lock(&id, owner)
                .await
                .ok_or_else(|| ApiError::Internal(format!("conversation {id} vanished")))?;
            (id, guard)
        }
    };

    let response = match &translation {
        Some(request) => {
            let (translated, reply) = assistant.translate(request).await;
            if let Some((user_id, _)) = quota {
                let record = TranslationRecord::new(
                    user_id,
                    request.code.clone(),
                    translated,
                    request.source.as_str().to_string(),
                    request.target.as_str().to_string(),
                    None,
                );
                record_translation(&state.db, record).await?;
            }
            reply
        }
        None => assistant.chat(&conversation.turns(), &payload.message).await,
    };
    conversation.append(ConversationTurn::user(payload.message));
    conversation.append(ConversationTurn::assistant(response.clone()));

    Ok(Json(ChatResponse {
        response,
        conversation_id,
    }))
}

pub async fn new_chat(State(state): State<AppState>, ApiKeyAuth(principal): ApiKeyAuth) -> Json<ChatResponse> {
    let greeting = state.assistant().greeting();
    let conversation_id = state.conversations.open(principal.owner_id(), &greeting).await;

    Json(ChatResponse {
        response: greeting,
        conversation_id,
    })
}

pub async fn history(
    State(state): State<AppState>,
    ApiKeyAuth(principal): ApiKeyAuth,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<HistoryResponse>> {
    let owner = principal.owner_id();

    match query.conversation_id {
        Some(conversation_id) => {
            let history = state
                .conversations
                .snapshot(&conversation_id, owner)
                .await
                .ok_or_else(|| ApiError::NotFound("Conversation not found".to_string()))?;
            Ok(Json(HistoryResponse::One {
                conversation_id,
                history,
            }))
        }
        None => Ok(Json(HistoryResponse::All {
            conversations: state.conversations.list_for(owner).await,
        })),
    }
}
