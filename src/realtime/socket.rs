//! WebSocket endpoint for room subscriptions

use super::{Room, RoomEvent};
use crate::server::state::AppState;
use crate::utils::error::AppError;
use actix_web::{HttpRequest, HttpResponse, web};
use actix_ws::{AggregatedMessage, Session};
use futures::StreamExt;
use serde::Deserialize;
use std::collections::HashSet;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct SocketQuery {
    token: Option<String>,
}

/// Client → server control messages
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    JoinWorkspace { id: Uuid },
    LeaveWorkspace { id: Uuid },
    JoinProject { id: Uuid },
    LeaveProject { id: Uuid },
}

impl ClientMessage {
    /// Apply the message to a session's room set
    pub fn apply(self, rooms: &mut HashSet<Room>) {
        match self {
            ClientMessage::JoinWorkspace { id } => {
                rooms.insert(Room::Workspace(id));
            }
            ClientMessage::LeaveWorkspace { id } => {
                rooms.remove(&Room::Workspace(id));
            }
            ClientMessage::JoinProject { id } => {
                rooms.insert(Room::Project(id));
            }
            ClientMessage::LeaveProject { id } => {
                rooms.remove(&Room::Project(id));
            }
        }
    }
}

/// `GET /api/socket?token=<jwt>`
pub async fn socket(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Payload,
    query: web::Query<SocketQuery>,
) -> Result<HttpResponse, actix_web::Error> {
    let token = query
        .token
        .as_deref()
        .ok_or_else(|| AppError::unauthorized("Authentication error"))?;
    let user = state
        .auth
        .authenticate_token(token)
        .await
        .map_err(|_| AppError::unauthorized("Authentication error"))?;

    let (response, session, stream) = actix_ws::handle(&req, body)?;
    let stream = stream.aggregate_continuations();
    let events = state.events.subscribe();

    info!("User connected: {}", user.name);
    actix_web::rt::spawn(run_session(user.id, session, stream, events));

    Ok(response)
}

async fn run_session(
    user_id: Uuid,
    mut session: Session,
    mut stream: actix_ws::AggregatedMessageStream,
    mut events: tokio::sync::broadcast::Receiver<RoomEvent>,
) {
    let mut rooms = HashSet::from([Room::User(user_id)]);

    loop {
        tokio::select! {
            msg = stream.next() => {
                match msg {
                    Some(Ok(AggregatedMessage::Text(text))) => {
                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(message) => message.apply(&mut rooms),
                            Err(e) => debug!("Ignoring socket message: {}", e),
                        }
                    }
                    Some(Ok(AggregatedMessage::Ping(bytes))) => {
                        if session.pong(&bytes).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(AggregatedMessage::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!("Socket protocol error: {}", e);
                        break;
                    }
                }
            }
            event = events.recv() => {
                match event {
                    Ok(event) if rooms.contains(&event.room) => {
                        let frame = match serde_json::to_string(&event) {
                            Ok(frame) => frame,
                            Err(_) => continue,
                        };
                        if session.text(frame).await.is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        debug!("Socket for {} lagged, {} events dropped", user_id, skipped);
                        break;
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    let _ = session.close(None).await;
    info!("User disconnected: {}", user_id);
}
