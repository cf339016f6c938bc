//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! dispatching incoming commands and forwarding filtered events.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{WsCommand, WsMessage, WsMessageType};
use super::subscription::SubscriptionManager;
use crate::api::dto::{PoolDto, SummaryDto};
use crate::domain::{PoolEvent, PoolId};
use crate::service::PoolService;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and dispatches them.
/// - Forwards matching events from the [`broadcast::Receiver`] to the client.
pub async fn run_connection(
    socket: WebSocket,
    mut event_rx: broadcast::Receiver<PoolEvent>,
    pool_service: Arc<PoolService>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut subs = SubscriptionManager::new();

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = handle_text_message(&text, &mut subs, &pool_service).await;
                        if let Some(json) = encode(&reply)
                            && ws_tx.send(Message::text(json)).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            event = event_rx.recv() => {
                match event {
                    Ok(pool_event) => {
                        if !subs.matches(pool_event.pool_id()) {
                            continue;
                        }
                        let payload = match serde_json::to_value(&pool_event) {
                            Ok(payload) => payload,
                            Err(err) => {
                                tracing::warn!(error = %err, "event not serializable");
                                continue;
                            }
                        };
                        let msg = WsMessage::new(
                            uuid::Uuid::new_v4().to_string(),
                            WsMessageType::Event,
                            payload,
                        );
                        if let Some(json) = encode(&msg)
                            && ws_tx.send(Message::text(json)).await.is_err() {
                                break;
                            }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

fn encode(msg: &WsMessage) -> Option<String> {
    serde_json::to_string(msg)
        .inspect_err(|err| tracing::warn!(error = %err, "ws message not serializable"))
        .ok()
}

/// Splits raw IDs into valid pool IDs and the wildcard flag. Malformed
/// slugs are dropped.
fn parse_pool_ids(raw: &[String]) -> (Vec<PoolId>, bool) {
    let mut ids = Vec::with_capacity(raw.len());
    let mut wildcard = false;
    for s in raw {
        if s == "*" {
            wildcard = true;
        } else if let Ok(id) = PoolId::new(s.as_str()) {
            ids.push(id);
        }
    }
    (ids, wildcard)
}

/// Handles a text message from the client and builds the reply.
async fn handle_text_message(
    text: &str,
    subs: &mut SubscriptionManager,
    pool_service: &PoolService,
) -> WsMessage {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return WsMessage::error("", 400, "malformed JSON");
    };
    if msg.msg_type != WsMessageType::Command {
        return WsMessage::error(msg.id, 400, "expected a command message");
    }
    let Ok(command) = serde_json::from_value::<WsCommand>(msg.payload) else {
        return WsMessage::error(msg.id, 404, "unknown command");
    };

    match command {
        WsCommand::Subscribe { pool_ids } => {
            let (ids, wildcard) = parse_pool_ids(&pool_ids);
            subs.subscribe(&ids, wildcard);
            WsMessage::new(
                msg.id,
                WsMessageType::Response,
                serde_json::json!({
                    "subscribed": ids.iter().map(ToString::to_string).collect::<Vec<_>>(),
                    "count": subs.count(),
                    "wildcard": subs.is_subscribed_all(),
                }),
            )
        }
        WsCommand::Unsubscribe { pool_ids } => {
            let (ids, wildcard) = parse_pool_ids(&pool_ids);
            subs.unsubscribe(&ids, wildcard);
            WsMessage::new(
                msg.id,
                WsMessageType::Response,
                serde_json::json!({
                    "unsubscribed": ids.iter().map(ToString::to_string).collect::<Vec<_>>(),
                    "remaining_count": subs.count(),
                    "wildcard": subs.is_subscribed_all(),
                }),
            )
        }
        WsCommand::GetState { pool_id } => {
            let Ok(id) = PoolId::new(pool_id.as_str()) else {
                return WsMessage::error(msg.id, 404, format!("pool not found: {pool_id}"));
            };
            match pool_service.get_pool(&id).await {
                Ok(pool) => match serde_json::to_value(PoolDto::from(&pool)) {
                    Ok(payload) => WsMessage::new(msg.id, WsMessageType::Response, payload),
                    Err(err) => WsMessage::error(msg.id, 500, err.to_string()),
                },
                Err(err) => WsMessage::error(msg.id, err.status_code().as_u16(), err.to_string()),
            }
        }
        WsCommand::GetSummary => {
            let summary = pool_service.summary().await;
            match serde_json::to_value(SummaryDto::new(summary, pool_service.stake())) {
                Ok(payload) => WsMessage::new(msg.id, WsMessageType::Response, payload),
                Err(err) => WsMessage::error(msg.id, 500, err.to_string()),
            }
        }
    }
}
