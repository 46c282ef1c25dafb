use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::RwLock;
use uuid::Uuid;

use velora_core::chat::rules::ChatContext;
use velora_core::chat::session::ChatSession;
use velora_core::chat::wire::{self, ClientFrame, ServerFrame, INVALID_FORMAT_MESSAGE};

use crate::AppState;

/// Connected chat clients, keyed by the id in the socket path. A reconnect
/// with the same id replaces the previous entry.
#[derive(Debug, Clone, Default)]
pub struct ChatHub {
    clients: Arc<RwLock<HashMap<String, Uuid>>>,
}

impl ChatHub {
    pub async fn connect(&self, client_id: &str) -> Uuid {
        let connection_id = Uuid::new_v4();
        let mut clients = self.clients.write().await;
        if clients.insert(client_id.to_string(), connection_id).is_some() {
            tracing::debug!(client_id, "chat client reconnected; replacing previous connection");
        }
        tracing::info!(client_id, %connection_id, total = clients.len(), "chat client connected");
        connection_id
    }

    /// Only removes the entry if it still belongs to `connection_id`.
    pub async fn disconnect(&self, client_id: &str, connection_id: Uuid) {
        let mut clients = self.clients.write().await;
        if clients.get(client_id) == Some(&connection_id) {
            clients.remove(client_id);
        }
        tracing::info!(client_id, %connection_id, remaining = clients.len(), "chat client disconnected");
    }

    pub async fn len(&self) -> usize {
        self.clients.read().await.len()
    }
}

pub async fn ws_chat(
    ws: WebSocketUpgrade,
    Path(client_id): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, client_id, state))
}

async fn handle_socket(mut socket: WebSocket, client_id: String, state: AppState) {
    let connection_id = state.hub.connect(&client_id).await;
    let mut session = ChatSession::new(state.session_config.clone(), StdRng::from_entropy());

    'conn: while let Some(msg) = socket.recv().await {
        let msg = match msg {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(%client_id, error = %e, "chat socket receive failed");
                break;
            }
        };

        match msg {
            Message::Text(txt) => {
                for out in process_frame(&state, &mut session, &txt) {
                    if !out.delay.is_zero() {
                        tokio::time::sleep(out.delay).await;
                    }
                    let frame = out.frame.stamped(Utc::now());
                    if socket.send(Message::Text(frame.to_json())).await.is_err() {
                        break 'conn;
                    }
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    state.hub.disconnect(&client_id, connection_id).await;
}

/// A frame to send after waiting `delay`. Bot replies are stamped at send
/// time, not when they were computed.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Outbound {
    pub(crate) delay: Duration,
    pub(crate) frame: PendingFrame,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PendingFrame {
    BotResponse(String),
    Ready(ServerFrame),
}

impl PendingFrame {
    fn stamped(self, now: DateTime<Utc>) -> ServerFrame {
        match self {
            Self::BotResponse(message) => ServerFrame::bot_response(message, now),
            Self::Ready(frame) => frame,
        }
    }
}

fn immediate(frame: ServerFrame) -> Outbound {
    Outbound {
        delay: Duration::ZERO,
        frame: PendingFrame::Ready(frame),
    }
}

pub(crate) fn process_frame(state: &AppState, session: &mut ChatSession, text: &str) -> Vec<Outbound> {
    let frame = match wire::parse_client_frame(text) {
        Ok(f) => f,
        Err(e) => {
            tracing::warn!(error = %e, "invalid chat frame");
            return vec![immediate(ServerFrame::error(INVALID_FORMAT_MESSAGE))];
        }
    };

    match frame {
        ClientFrame::Chat { message, ticker } => {
            let selected = ticker.as_deref().and_then(|t| state.known_bundle(t));
            let ctx = ChatContext {
                selected: selected.as_ref().map(|(s, _)| *s),
                quote: selected.as_ref().map(|(_, b)| b),
            };

            let pending = match session.handle_message(&message, &ctx) {
                Ok(p) => p,
                Err(e) => return vec![immediate(ServerFrame::error(e.to_string()))],
            };
            tracing::debug!(rule = ?pending.reply.kind, delay_ms = pending.delay.as_millis() as u64, "chat reply queued");

            let mut out = vec![Outbound {
                delay: pending.delay,
                frame: PendingFrame::BotResponse(pending.reply.text),
            }];
            match session.reply_delivered() {
                Ok(Some(question)) => out.push(immediate(ServerFrame::quiz(&question))),
                Ok(None) => {}
                Err(e) => out.push(immediate(ServerFrame::error(e.to_string()))),
            }
            out
        }
        ClientFrame::QuizAnswer { answer } => match session.submit_answer(answer) {
            Ok(feedback) => vec![immediate(ServerFrame::feedback(&feedback, session.score()))],
            Err(e) => vec![immediate(ServerFrame::error(e.to_string()))],
        },
    }
}
