// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Live notifications for clients showing grouping data.
//!
//! Events only say that something changed. Clients re-fetch whatever views
//! they hold when told those views are stale; nothing is executed over the
//! socket.

use crate::dialogs::DialogId;
use axum::{
    extract::{
        State as AxumState, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures::{SinkExt, stream::StreamExt};
use plotgroup_api::{CachedView, DialogObserver, Operation, SeasonContext, SubmitGroupsResponse};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Maximum number of events to buffer in the broadcast channel.
/// If clients cannot keep up, older events will be dropped.
const EVENT_BUFFER_SIZE: usize = 100;

/// Live event types.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveEvent {
    /// Groups were created from a dialog.
    GroupsCreated {
        dialog_id: DialogId,
        cluster_id: String,
        season_id: String,
        groups_created: usize,
        warnings: Vec<String>,
    },
    /// Cached views of a season are stale.
    ViewsInvalidated {
        cluster_id: String,
        season_id: String,
        views: Vec<CachedView>,
    },
    /// A dialog round-trip failed.
    DialogFailed {
        dialog_id: DialogId,
        operation: Operation,
        message: String,
    },
    /// Connection confirmation (sent on initial connect).
    Connected {
        /// Server timestamp (ISO 8601).
        timestamp: String,
    },
}

/// Fans live events out to every connected client.
#[derive(Clone)]
pub struct LiveEventBroadcaster {
    tx: broadcast::Sender<LiveEvent>,
}

impl LiveEventBroadcaster {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(EVENT_BUFFER_SIZE);
        Self { tx }
    }

    /// Broadcasts an event. With no clients connected the event is dropped.
    pub fn broadcast(&self, event: &LiveEvent) {
        match self.tx.send(event.clone()) {
            Ok(count) => {
                debug!(?event, receivers = count, "Broadcast live event");
            }
            Err(_) => {
                debug!(?event, "No receivers for live event");
            }
        }
    }

    /// Subscribes to events sent from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<LiveEvent> {
        self.tx.subscribe()
    }
}

impl Default for LiveEventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Relays one dialog's notifications as live events.
pub struct LiveObserver<'a> {
    pub broadcaster: &'a LiveEventBroadcaster,
    pub dialog_id: DialogId,
    pub context: &'a SeasonContext,
}

impl DialogObserver for LiveObserver<'_> {
    fn groups_created(&self, response: &SubmitGroupsResponse) {
        info!(
            dialog_id = %self.dialog_id,
            groups_created = response.groups_created,
            "Announcing created groups"
        );
        self.broadcaster.broadcast(&LiveEvent::GroupsCreated {
            dialog_id: self.dialog_id,
            cluster_id: self.context.cluster_id.clone(),
            season_id: self.context.season_id.clone(),
            groups_created: response.groups_created,
            warnings: response.warnings.clone(),
        });
    }

    fn invalidate(&self, views: &[CachedView]) {
        self.broadcaster.broadcast(&LiveEvent::ViewsInvalidated {
            cluster_id: self.context.cluster_id.clone(),
            season_id: self.context.season_id.clone(),
            views: views.to_vec(),
        });
    }

    fn failed(&self, operation: Operation, message: &str) {
        self.broadcaster.broadcast(&LiveEvent::DialogFailed {
            dialog_id: self.dialog_id,
            operation,
            message: message.to_string(),
        });
    }
}

/// Upgrades the connection to a WebSocket and streams live events.
pub async fn live_events_handler(
    ws: WebSocketUpgrade,
    AxumState(broadcaster): AxumState<Arc<LiveEventBroadcaster>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, broadcaster))
}

async fn handle_socket(socket: WebSocket, broadcaster: Arc<LiveEventBroadcaster>) {
    info!("Client connected to live event stream");

    let (mut sender, mut receiver) = socket.split();
    let mut rx: broadcast::Receiver<LiveEvent> = broadcaster.subscribe();

    let connected_event: LiveEvent = LiveEvent::Connected {
        timestamp: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Iso8601::DEFAULT)
            .unwrap_or_else(|_| String::from("unknown")),
    };

    if let Ok(json) = serde_json::to_string(&connected_event)
        && sender.send(Message::Text(json.into())).await.is_err()
    {
        warn!("Failed to send connection confirmation");
        return;
    }

    let mut send_task = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(json) => {
                        if sender.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        error!(?e, "Failed to serialize live event");
                    }
                },
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Live event client lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Text(_) | Message::Binary(_)) => {
                    warn!("Received unexpected message from client, ignoring");
                }
                Ok(Message::Close(_)) => {
                    debug!("Client sent close frame");
                    break;
                }
                Ok(Message::Ping(_) | Message::Pong(_)) => {}
                Err(e) => {
                    error!(?e, "WebSocket receive error");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => {
            debug!("Send task completed");
            recv_task.abort();
        }
        _ = &mut recv_task => {
            debug!("Receive task completed");
            send_task.abort();
        }
    }

    info!("Client disconnected from live event stream");
}
