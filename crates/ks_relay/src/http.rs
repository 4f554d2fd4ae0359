//! JSON-over-HTTP surface.
//!
//! Routes:
//!   POST   /api/keys              register or rotate the caller's key
//!   GET    /api/messages          list the caller's messages (redacted)
//!   POST   /api/messages          send a message
//!   PUT    /api/messages/:id      re-seal and replace a body
//!   DELETE /api/messages/:id      delete a message

use axum::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequestParts, Path, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use ks_proto::api::{
    DeleteMessageResponse, ErrorResponse, SendMessageRequest, SendMessageResponse,
    UpdateMessageRequest, UpdateMessageResponse, UploadKeyRequest, UploadKeyResponse,
};
use ks_proto::{Message, MessageId};
use zeroize::Zeroizing;

use crate::auth::{token_from_headers, CallerId};
use crate::error::RelayError;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/keys", post(upload_key))
        .route("/api/messages", get(list_messages).post(send_message))
        .route(
            "/api/messages/:id",
            put(update_message).delete(delete_message),
        )
        .with_state(state)
}

#[async_trait]
impl FromRequestParts<AppState> for CallerId {
    type Rejection = RelayError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = token_from_headers(&parts.headers).ok_or(RelayError::Unauthenticated)?;
        state.verifier.verify(token)
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        if self.is_client_fault() {
            tracing::debug!(target: "ks_relay", code = self.code(), error = %self, "request rejected");
        } else {
            tracing::error!(target: "ks_relay", code = self.code(), error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: self.public_message(),
            code: self.code().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

fn status_for(err: &RelayError) -> StatusCode {
    match err {
        RelayError::InvalidRecipient
        | RelayError::EmptyBody
        | RelayError::InvalidRequest(_)
        | RelayError::InvalidKeyMaterial(_) => StatusCode::BAD_REQUEST,
        RelayError::Unauthenticated => StatusCode::UNAUTHORIZED,
        RelayError::NotFoundOrUnauthorized => StatusCode::NOT_FOUND,
        RelayError::KeyNotFound(_) | RelayError::RecipientKeyMissing(_) => {
            StatusCode::PRECONDITION_FAILED
        }
        RelayError::PlaintextTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        RelayError::KeyFormat(_) | RelayError::Encryption(_) => StatusCode::INTERNAL_SERVER_ERROR,
        RelayError::Persistence(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, RelayError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| RelayError::InvalidRequest(e.body_text()))
}

fn message_id(raw: &str) -> Result<MessageId, RelayError> {
    raw.parse()
        .map_err(|_| RelayError::InvalidRequest("invalid message id".into()))
}

async fn upload_key(
    State(state): State<AppState>,
    caller: CallerId,
    payload: Result<Json<UploadKeyRequest>, JsonRejection>,
) -> Result<Json<UploadKeyResponse>, RelayError> {
    let req = json_body(payload)?;
    let fingerprint = state.service.upload_key(caller, &req.public_key).await?;
    Ok(Json(UploadKeyResponse {
        status: "Public key stored".into(),
        user_id: caller.user_id(),
        fingerprint,
    }))
}

async fn list_messages(
    State(state): State<AppState>,
    caller: CallerId,
) -> Result<Json<Vec<Message>>, RelayError> {
    Ok(Json(state.service.list(caller).await?))
}

async fn send_message(
    State(state): State<AppState>,
    caller: CallerId,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SendMessageResponse>), RelayError> {
    let req = json_body(payload)?;
    let body = Zeroizing::new(req.body);
    let message = state.service.send(caller, req.recipient_id, &body).await?;
    Ok((
        StatusCode::CREATED,
        Json(SendMessageResponse {
            status: "Message sent".into(),
            message,
        }),
    ))
}

async fn update_message(
    State(state): State<AppState>,
    caller: CallerId,
    Path(raw_id): Path<String>,
    payload: Result<Json<UpdateMessageRequest>, JsonRejection>,
) -> Result<Json<UpdateMessageResponse>, RelayError> {
    let id = message_id(&raw_id)?;
    let req = json_body(payload)?;
    let body = Zeroizing::new(req.body);
    let message = state.service.update(caller, id, &body).await?;
    Ok(Json(UpdateMessageResponse {
        status: "Message updated".into(),
        message,
    }))
}

async fn delete_message(
    State(state): State<AppState>,
    caller: CallerId,
    Path(raw_id): Path<String>,
) -> Result<Json<DeleteMessageResponse>, RelayError> {
    let id = message_id(&raw_id)?;
    state.service.delete(caller, id).await?;
    Ok(Json(DeleteMessageResponse {
        status: "Message deleted".into(),
    }))
}
