//! Realtime channel.
//!
//! A single WebSocket endpoint authenticated at handshake time; inbound
//! events share the security posture of the HTTP side (credential check,
//! per-connection rate limiting, payload validation) but carry it over a
//! message stream.

pub mod events;

use std::collections::HashMap;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::Response;

use crate::middleware::auth::resolve_token;
use crate::middleware::rate_limit::FixedWindowLimiter;
use crate::modules::auth::model::Principal;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::jwt::verify_token;
use events::{Envelope, validate_event};

/// Token resolution for the handshake, in priority order: `?token=` query
/// parameter (browsers cannot set WebSocket headers), then the
/// `Authorization` header, then the session cookie.
fn handshake_token(params: &HashMap<String, String>, headers: &HeaderMap) -> Option<String> {
    if let Some(token) = params.get("token") {
        let token = token.trim();
        if !token.is_empty() {
            return Some(token.to_string());
        }
    }
    resolve_token(headers)
}

/// `GET /ws`: authenticate, then upgrade. Rejections happen before the
/// upgrade so an unauthenticated client never holds a socket.
pub async fn ws_handler(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, AppError> {
    let token = handshake_token(&params, &headers).ok_or_else(AppError::auth_required)?;
    let claims = verify_token(&token, &state.jwt_config)?;
    let principal = Principal::from_claims(&claims).ok_or_else(AppError::invalid_token)?;

    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(user_id = %principal.id, conn_id = %conn_id, "realtime connection accepted");

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, principal, conn_id)))
}

async fn handle_socket(mut socket: WebSocket, state: AppState, principal: Principal, conn_id: String) {
    let limiter_key = format!("user:{}", principal.id);

    while let Some(message) = socket.recv().await {
        let message = match message {
            Ok(m) => m,
            Err(_) => break,
        };

        let text = match message {
            Message::Text(text) => text,
            Message::Close(_) => break,
            // Pings are answered by the protocol layer.
            _ => continue,
        };

        if let Some(reply) =
            process_message(&state.realtime_limiter, &limiter_key, &principal, &text)
        {
            send(&mut socket, reply).await;
        }
    }

    tracing::info!(user_id = %principal.id, conn_id = %conn_id, "realtime connection closed");
}

/// One inbound frame through the full event pipeline: limiter, envelope
/// parse, payload validation, dispatch. Returns the reply to send back, if
/// any; rate-limited and invalid events produce an `error` envelope and the
/// event itself is dropped.
fn process_message(
    limiter: &FixedWindowLimiter,
    limiter_key: &str,
    principal: &Principal,
    text: &str,
) -> Option<Envelope> {
    if !limiter.consume(limiter_key).allowed {
        tracing::warn!(
            user_id = %principal.id,
            "realtime rate limit exceeded, dropping event"
        );
        return Some(Envelope::error("RATE_LIMITED", "Too many events"));
    }

    let envelope: Envelope = match serde_json::from_str(text) {
        Ok(envelope) => envelope,
        Err(_) => return Some(Envelope::error("BAD_EVENT", "Malformed event envelope")),
    };

    if let Err(reason) = validate_event(&envelope.event, envelope.payload.as_ref()) {
        tracing::warn!(
            user_id = %principal.id,
            event = %envelope.event,
            "rejected realtime event"
        );
        return Some(Envelope::error("BAD_EVENT", &reason));
    }

    dispatch(principal, envelope)
}

fn dispatch(principal: &Principal, envelope: Envelope) -> Option<Envelope> {
    match envelope.event.as_str() {
        "ping" => Some(Envelope::new("pong", None)),
        "notification:read" => {
            // Validation already guaranteed the id parses.
            let id = envelope
                .payload
                .as_ref()
                .and_then(|p| p.get("notificationId"))
                .and_then(events::parse_entity_id)?;
            tracing::debug!(user_id = %principal.id, notification_id = %id, "notification marked read");
            Some(Envelope::new(
                "notification:read:ack",
                Some(serde_json::json!({ "notificationId": id })),
            ))
        }
        _ => None,
    }
}

async fn send(socket: &mut WebSocket, envelope: Envelope) {
    if let Ok(text) = serde_json::to_string(&envelope) {
        // A send failure means the peer is gone; recv() will observe it.
        let _ = socket.send(Message::Text(text.into())).await;
    }
}
