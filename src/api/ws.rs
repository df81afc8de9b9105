// =============================================================================
// WebSocket Handler — Push-based dashboard updates
// =============================================================================
//
// Clients connect to `/api/v1/ws` and receive:
//   1. The latest Dashboard immediately on connect (if one exists).
//   2. The full Dashboard again every 500 ms poll where the state_version
//      has changed since the last push.
//
// Each push is wrapped in a small envelope carrying the state version and a
// per-connection sequence number so clients can detect gaps.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures_util::{Sink, SinkExt, StreamExt};
use serde::Serialize;
use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};

use crate::app_state::AppState;
use crate::dashboard::Dashboard;

/// Poll period for state-version changes.
const PUSH_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Serialize)]
struct PushEnvelope<'a> {
    state_version: u64,
    sequence: u64,
    dashboard: &'a Dashboard,
}

/// Axum handler for the WebSocket upgrade request.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    info!("WebSocket connection accepted, upgrading");
    ws.on_upgrade(move |socket| handle_ws_connection(socket, state))
}

// =============================================================================
// Connection handler
// =============================================================================

/// Runs the push loop and the receive loop concurrently via `tokio::select!`
/// until the client goes away.
async fn handle_ws_connection(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    let mut sequence: u64 = 0;
    let mut last_sent_version = state.current_state_version();

    if let Err(e) = send_dashboard(&mut sender, &state, &mut sequence).await {
        warn!(error = %e, "Failed to send initial WebSocket dashboard");
        return;
    }

    let mut push_interval = interval(PUSH_INTERVAL);

    loop {
        tokio::select! {
            _ = push_interval.tick() => {
                let current_version = state.current_state_version();
                if current_version != last_sent_version {
                    match send_dashboard(&mut sender, &state, &mut sequence).await {
                        Ok(_) => last_sent_version = current_version,
                        Err(e) => {
                            debug!(error = %e, "WebSocket send failed, disconnecting");
                            break;
                        }
                    }
                }
            }

            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if let Err(e) = sender.send(Message::Pong(data)).await {
                            debug!(error = %e, "Failed to send Pong, disconnecting");
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!("WebSocket closed by client");
                        break;
                    }
                    Some(Ok(_)) => {
                        // Inbound text/binary is ignored; the feed is read-only.
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "WebSocket receive error, disconnecting");
                        break;
                    }
                }
            }
        }
    }

    debug!(sent = sequence, "WebSocket connection finished");
}

// =============================================================================
// Helpers
// =============================================================================

/// Send the latest dashboard, if one has been published.
///
/// Returns whether a message went out. Serialisation failures are logged and
/// treated as "nothing sent" rather than as a disconnect.
async fn send_dashboard<S>(
    sender: &mut S,
    state: &AppState,
    sequence: &mut u64,
) -> Result<bool, axum::Error>
where
    S: Sink<Message, Error = axum::Error> + Unpin,
{
    let Some(dashboard) = state.dashboard() else {
        return Ok(false);
    };

    let envelope = PushEnvelope {
        state_version: state.current_state_version(),
        sequence: *sequence + 1,
        dashboard: &dashboard,
    };

    let json = match serde_json::to_string(&envelope) {
        Ok(json) => json,
        Err(e) => {
            warn!(error = %e, "Failed to serialize dashboard");
            return Ok(false);
        }
    };

    sender.send(Message::Text(json)).await?;
    *sequence += 1;
    debug!(version = envelope.state_version, seq = *sequence, "WebSocket dashboard sent");
    Ok(true)
}
