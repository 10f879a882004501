//! WebSocket session against the realtime endpoint.
//!
//! Thin collaborator: connects, registers with the token and location ids,
//! emits a heartbeat every 25 seconds, and forwards inbound text frames
//! into a channel for the runtime. On close or error the session task ends,
//! heartbeats stop, and the runtime keeps rendering while records age out.

use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, trace, warn};

use crate::config::VizConfig;
use crate::VizError;

/// Outbound control messages.
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
enum OutboundMessage {
    /// Sent once, immediately upon connection
    #[serde(rename = "realtime_register")]
    Register { token: String, locations: Vec<i64> },
    /// Periodic liveness signal
    #[serde(rename = "realtime_heartbeat")]
    Heartbeat,
}

/// Handle to a live session task.
pub struct Session {
    handle: JoinHandle<()>,
}

impl Session {
    /// Abort the session task, closing the connection.
    pub fn shutdown(&self) {
        self.handle.abort();
    }
}

/// Connect, register, and start the session task.
///
/// Returns the session handle and the receiver the runtime consumes.
/// Inbound bursts beyond the channel capacity apply backpressure to the
/// socket read, never to the render loop.
pub async fn connect(config: &VizConfig) -> Result<(Session, mpsc::Receiver<String>), VizError> {
    let (socket, _response) = connect_async(config.url.as_str()).await?;
    info!(url = %config.url, "opened websocket connection");

    let (mut sink, mut stream) = socket.split();

    let register = serde_json::to_string(&OutboundMessage::Register {
        token: config.token.clone(),
        locations: config.locations.clone(),
    })?;
    sink.send(Message::Text(register)).await?;
    debug!(locations = ?config.locations, "sent register message");

    // Pre-encode so the session task has no fallible serialization.
    let heartbeat_frame = serde_json::to_string(&OutboundMessage::Heartbeat)?;
    let heartbeat_period = config.heartbeat_period;

    let (tx, rx) = mpsc::channel(256);

    let handle = tokio::spawn(async move {
        let start = tokio::time::Instant::now() + heartbeat_period;
        let mut heartbeat = tokio::time::interval_at(start, heartbeat_period);

        loop {
            tokio::select! {
                _ = heartbeat.tick() => {
                    if let Err(error) = sink.send(Message::Text(heartbeat_frame.clone())).await {
                        warn!(%error, "heartbeat send failed, closing session");
                        break;
                    }
                    trace!("sent heartbeat");
                }
                frame = stream.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        if tx.send(text).await.is_err() {
                            debug!("runtime dropped its receiver, closing session");
                            break;
                        }
                    }
                    Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {
                        trace!("ignoring ping/pong frame");
                    }
                    Some(Ok(Message::Binary(payload))) => {
                        trace!(len = payload.len(), "ignoring binary frame");
                    }
                    Some(Ok(Message::Close(close))) => {
                        debug!(?close, "server closed the stream");
                        break;
                    }
                    Some(Ok(Message::Frame(_))) => {}
                    Some(Err(error)) => {
                        warn!(%error, "websocket read failed, closing session");
                        break;
                    }
                    None => {
                        debug!("websocket stream ended");
                        break;
                    }
                }
            }
        }
    });

    Ok((Session { handle }, rx))
}
