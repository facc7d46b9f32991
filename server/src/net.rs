use crate::game::Command;
use crate::hub::{Gateway, Hub};
use crate::rooms::RoomStore;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use superfarmer_protocol::*;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RoomStore>,
    pub hub: Arc<Hub>,
}

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| {
        let my_id = Uuid::new_v4();
        let span = info_span!("conn", id = %my_id);
        handle_socket(socket, state, my_id).instrument(span)
    })
}

async fn handle_socket(socket: WebSocket, state: AppState, my_id: Uuid) {
    let (mut sender, mut receiver) = socket.split();
    let mut rx_out = state.hub.register(my_id);
    info!(clients = state.hub.len(), "client connected");

    tokio::spawn(
        async move {
            while let Some(msg) = rx_out.recv().await {
                let text = match serde_json::to_string(&msg) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(error = %e, "failed to encode outbound message");
                        continue;
                    }
                };
                if sender.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
        }
        .in_current_span(),
    );

    state.hub.send_to(my_id, ServerToClient::Hello { your_id: my_id });
    state.hub.send_to(
        my_id,
        ServerToClient::RoomList {
            rooms: state.store.summaries(),
        },
    );

    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            Message::Text(t) => match serde_json::from_str::<ClientToServer>(&t) {
                Ok(cmd) => route_cmd(cmd, &state, my_id),
                Err(e) => {
                    warn!(error = %e, "bad json");
                    state.hub.send_to(
                        my_id,
                        ServerToClient::Error {
                            message: "bad json".into(),
                        },
                    );
                }
            },
            Message::Close(_) => break,
            _ => {}
        }
    }

    if state.store.disconnect(my_id, state.hub.as_ref()) {
        state.store.publish_room_list(state.hub.as_ref());
    }
    state.hub.unregister(my_id);
    info!("client disconnected");
}

fn route_cmd(cmd: ClientToServer, state: &AppState, my_id: Uuid) {
    debug!(?cmd, "command");

    let (room, cmd) = match cmd {
        ClientToServer::JoinGame { game_id, name } => (game_id, Command::Join { name }),
        ClientToServer::StartGame { game_id } => (game_id, Command::Start),
        ClientToServer::Exchange {
            game_id,
            exchange_type,
        } => (game_id, Command::Exchange { exchange_type }),
        ClientToServer::FinishExchange { game_id } => (game_id, Command::FinishExchange),
        ClientToServer::RollDice { game_id } => (game_id, Command::RollDice),
        ClientToServer::ListRooms => {
            state.hub.send_to(
                my_id,
                ServerToClient::RoomList {
                    rooms: state.store.summaries(),
                },
            );
            return;
        }
    };

    match state.store.dispatch(&room, my_id, cmd, state.hub.as_ref()) {
        Ok(true) => state.store.publish_room_list(state.hub.as_ref()),
        Ok(false) => {}
        Err(e) => {
            debug!(room = %room, reason = %e, "action rejected");
            state.hub.send_to(my_id, e.to_client());
        }
    }
}
