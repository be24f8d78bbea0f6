//! WebSocket session

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast;
use tokio::time::Duration;

use crate::core::ServerState;
use crate::message::{ControlFrame, OutboundFrame, RealtimeEvent};

const PING_INTERVAL_SECS: u64 = 30;

#[derive(Debug, Default, Deserialize)]
pub struct WsQuery {
    /// 只接收该桌相关的事件
    table: Option<i64>,
}

/// GET /api/events/ws
pub async fn handle_ws(
    State(state): State<ServerState>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| ws_session(socket, state, query.table))
}

async fn ws_session(socket: WebSocket, state: ServerState, table: Option<i64>) {
    let (mut sink, mut stream) = socket.split();
    let bus = state.message_bus().clone();
    // 先订阅再发 ready，ready 之后发布的事件不会漏掉
    let mut rx = bus.subscribe();
    let shutdown = bus.shutdown_token().clone();

    tracing::info!(table = ?table, subscribers = bus.subscriber_count(), "Event subscriber connected");

    let ready = ControlFrame::Ready {
        poll_interval_secs: state.config.poll_interval_secs,
    };
    if send_frame(&mut sink, &ready.into()).await.is_err() {
        return;
    }

    let mut ping_interval = tokio::time::interval(Duration::from_secs(PING_INTERVAL_SECS));
    ping_interval.tick().await; // skip immediate

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                let _ = sink.send(Message::Close(None)).await;
                break;
            }

            _ = ping_interval.tick() => {
                if sink.send(Message::Ping(vec![].into())).await.is_err() {
                    break;
                }
            }

            received = rx.recv() => {
                match next_step(received, table) {
                    Step::Send(frame) => {
                        if send_frame(&mut sink, &frame).await.is_err() {
                            break;
                        }
                    }
                    Step::Skip => {}
                    Step::Stop => break,
                }
            }

            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    // 客户端消息不承载语义
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    tracing::info!(table = ?table, "Event subscriber disconnected");
}

/// Outcome of one receive from the bus
#[derive(Debug, PartialEq)]
enum Step {
    Send(OutboundFrame),
    /// 与本连接的桌号无关
    Skip,
    Stop,
}

fn next_step(
    received: Result<RealtimeEvent, broadcast::error::RecvError>,
    table: Option<i64>,
) -> Step {
    match received {
        Ok(event) => frame_for(event, table).map_or(Step::Skip, Step::Send),
        Err(broadcast::error::RecvError::Lagged(n)) => {
            tracing::warn!(table = ?table, lagged = n, "Event subscriber lagged, requesting resync");
            Step::Send(ControlFrame::Resync {}.into())
        }
        Err(broadcast::error::RecvError::Closed) => Step::Stop,
    }
}

/// Apply the per-connection table filter
fn frame_for(event: RealtimeEvent, table: Option<i64>) -> Option<OutboundFrame> {
    match table {
        Some(t) if !event.concerns_table(t) => None,
        _ => Some(event.into()),
    }
}

async fn send_frame<S>(sink: &mut S, frame: &OutboundFrame) -> Result<(), ()>
where
    S: futures::Sink<Message, Error = axum::Error> + Unpin,
{
    let json = serde_json::to_string(frame).map_err(|_| ())?;
    sink.send(Message::Text(json.into())).await.map_err(|_| ())
}
