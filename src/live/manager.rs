//! Owner of the single live channel.
//!
//! At most one channel is connecting or open at any time. Every close that is
//! not a shutdown schedules exactly one reconnect after the fixed delay; there
//! is no backoff and no attempt limit. Frames are decoded here and handed to
//! subscribers in arrival order.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::sync::{broadcast, watch};
use tokio::task::AbortHandle;
use tokio::time::{interval, timeout, MissedTickBehavior};

use crate::config::LiveConfig;
use crate::error::TransportError;
use crate::metrics::{ChannelMetrics, EventMetrics};

use super::channel::{Channel, ChannelId, ChannelSnapshot, ChannelState, CloseReason};
use super::connector::{Connector, FrameSink, FrameStream, LiveConnection};
use super::message::{ClientMessage, LiveEvent};
use super::subscription::{SubscriberRegistry, SubscriptionHandle};

/// Upper bound on a graceful close of the outbound half
const CLOSE_TIMEOUT_MS: u64 = 1000;

struct ManagerState {
    channel: Option<Channel>,
    next_id: u64,
    reconnect_attempts: u32,
    opens: u64,
    reconnect_timer: Option<AbortHandle>,
    shut_down: bool,
}

pub struct ConnectionManager {
    config: LiveConfig,
    connector: Arc<dyn Connector>,
    state: Mutex<ManagerState>,
    subscribers: Arc<SubscriberRegistry>,
    status: watch::Sender<ChannelSnapshot>,
    shutdown: broadcast::Sender<()>,
}

impl ConnectionManager {
    pub fn new(config: LiveConfig, connector: Arc<dyn Connector>) -> Self {
        let (status, _) = watch::channel(ChannelSnapshot::idle());
        let (shutdown, _) = broadcast::channel(1);

        Self {
            config,
            connector,
            state: Mutex::new(ManagerState {
                channel: None,
                next_id: 0,
                reconnect_attempts: 0,
                opens: 0,
                reconnect_timer: None,
                shut_down: false,
            }),
            subscribers: Arc::new(SubscriberRegistry::new()),
            status,
            shutdown,
        }
    }

    /// Register a handler for every decoded live event
    pub fn on_event<F>(&self, handler: F) -> SubscriptionHandle
    where
        F: Fn(&LiveEvent) + Send + Sync + 'static,
    {
        self.subscribers.subscribe(Arc::new(handler))
    }

    /// Watch channel state changes
    pub fn subscribe_status(&self) -> watch::Receiver<ChannelSnapshot> {
        self.status.subscribe()
    }

    pub fn snapshot(&self) -> ChannelSnapshot {
        self.status.borrow().clone()
    }

    pub fn is_open(&self) -> bool {
        self.snapshot().is_open()
    }

    /// Start a connection attempt.
    ///
    /// No-op (returns false) while a channel is connecting or open, or after
    /// shutdown. A pending reconnect timer is cancelled by an explicit connect.
    pub fn connect(self: &Arc<Self>) -> bool {
        let id = {
            let mut state = self.lock_state();
            if state.shut_down {
                tracing::debug!("Connect ignored after shutdown");
                return false;
            }
            if let Some(channel) = state.channel.as_ref().filter(|c| c.state.is_live()) {
                tracing::debug!(
                    channel = %channel.id,
                    state = %channel.state,
                    "Connect ignored, channel already live"
                );
                return false;
            }
            if let Some(timer) = state.reconnect_timer.take() {
                timer.abort();
            }

            state.next_id += 1;
            let id = ChannelId(state.next_id);
            state.channel = Some(Channel::connecting(id));
            self.publish(&state);
            id
        };

        ChannelMetrics::record_connect_attempt();
        tracing::info!(channel = %id, url = %self.config.url, "Opening live channel");

        let manager = Arc::clone(self);
        tokio::spawn(async move { manager.run_channel(id).await });
        true
    }

    /// Close the channel and cancel any pending reconnect. Later `connect`
    /// calls are ignored.
    pub fn shutdown(&self) {
        {
            let mut state = self.lock_state();
            if state.shut_down {
                return;
            }
            state.shut_down = true;

            if let Some(timer) = state.reconnect_timer.take() {
                timer.abort();
            }
            if let Some(channel) = state.channel.as_mut().filter(|c| c.state.is_live()) {
                channel.mark_closed();
                ChannelMetrics::record_closed(CloseReason::Shutdown.label());
            }
            self.publish(&state);
        }

        // No receivers simply means no channel task is running
        let _ = self.shutdown.send(());
        tracing::info!("Live channel shut down");
    }

    async fn run_channel(self: Arc<Self>, id: ChannelId) {
        let mut shutdown_rx = self.shutdown.subscribe();

        let opened = tokio::select! {
            _ = shutdown_rx.recv() => Err(CloseReason::Shutdown),
            result = self.connector.open(&self.config.url) => result.map_err(CloseReason::OpenFailed),
        };

        let LiveConnection {
            mut sink,
            mut stream,
        } = match opened {
            Ok(connection) => connection,
            Err(reason) => {
                self.handle_close(id, reason);
                return;
            }
        };

        if !self.mark_open(id) {
            let _ = timeout(Duration::from_millis(CLOSE_TIMEOUT_MS), sink.close()).await;
            self.handle_close(id, CloseReason::Shutdown);
            return;
        }

        let reason = self
            .drive(id, &mut sink, &mut stream, &mut shutdown_rx)
            .await;

        match timeout(Duration::from_millis(CLOSE_TIMEOUT_MS), sink.close()).await {
            Ok(Err(e)) => tracing::debug!(channel = %id, error = %e, "Error closing live channel"),
            Err(_) => tracing::debug!(channel = %id, "Timed out closing live channel"),
            Ok(Ok(())) => {}
        }

        self.handle_close(id, reason);
    }

    /// Pump the open channel until it closes. Returns why it closed.
    async fn drive(
        &self,
        id: ChannelId,
        sink: &mut FrameSink,
        stream: &mut FrameStream,
        shutdown_rx: &mut broadcast::Receiver<()>,
    ) -> CloseReason {
        // The first tick completes immediately, so a keep-alive goes out on open
        let mut keepalive = interval(self.config.keepalive_interval());
        keepalive.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = shutdown_rx.recv() => {
                    return CloseReason::Shutdown;
                }
                _ = keepalive.tick() => {
                    if let Err(e) = send_keepalive(sink).await {
                        return CloseReason::Error(e);
                    }
                    tracing::trace!(channel = %id, "Keep-alive sent");
                }
                frame = stream.next() => match frame {
                    Some(Ok(text)) => self.handle_frame(id, &text),
                    Some(Err(e)) => return CloseReason::Error(e),
                    None => return CloseReason::RemoteClosed,
                },
            }
        }
    }

    fn handle_frame(&self, id: ChannelId, text: &str) {
        EventMetrics::record_received();

        let event = match LiveEvent::decode(text) {
            Ok(event) => event,
            Err(e) => {
                EventMetrics::record_malformed();
                tracing::warn!(channel = %id, error = %e, "Dropping malformed live message");
                return;
            }
        };

        {
            let mut state = self.lock_state();
            if let Some(channel) = state.channel.as_mut().filter(|c| c.id == id) {
                channel.touch();
            }
            self.publish(&state);
        }

        tracing::debug!(channel = %id, kind = event.kind().as_str(), "Live event received");
        self.subscribers.emit(&event);
    }

    /// Transition `Connecting -> Open` if `id` is still the current attempt
    fn mark_open(&self, id: ChannelId) -> bool {
        let mut state = self.lock_state();
        if state.shut_down {
            return false;
        }
        match state.channel.as_mut() {
            Some(channel) if channel.id == id && channel.state == ChannelState::Connecting => {
                channel.mark_open();
            }
            _ => return false,
        }

        state.reconnect_attempts = 0;
        state.opens += 1;
        self.publish(&state);
        ChannelMetrics::record_opened();
        tracing::info!(channel = %id, "Live channel open");
        true
    }

    /// Record the end of channel `id` and schedule a reconnect unless shutting
    /// down. Closes of an already replaced or closed channel are ignored.
    fn handle_close(self: &Arc<Self>, id: ChannelId, reason: CloseReason) {
        let mut state = self.lock_state();

        match state.channel.as_mut() {
            Some(channel) if channel.id == id && channel.state.is_live() => channel.mark_closed(),
            _ => return,
        }
        ChannelMetrics::record_closed(reason.label());

        match &reason {
            CloseReason::OpenFailed(e) | CloseReason::Error(e) => {
                tracing::warn!(channel = %id, error = %e, "Live channel closed");
            }
            CloseReason::RemoteClosed => {
                tracing::info!(channel = %id, "Live channel closed by server");
            }
            CloseReason::Shutdown => {
                tracing::debug!(channel = %id, "Live channel closed for shutdown");
            }
        }

        if state.shut_down {
            self.publish(&state);
            return;
        }

        state.reconnect_attempts += 1;
        let delay = self.config.reconnect_delay();
        let manager = Arc::downgrade(self);
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(manager) = manager.upgrade() {
                manager.reconnect_due();
            }
        });
        state.reconnect_timer = Some(timer.abort_handle());

        ChannelMetrics::record_reconnect_scheduled();
        tracing::info!(
            attempt = state.reconnect_attempts,
            delay_secs = delay.as_secs(),
            "Live channel reconnect scheduled"
        );
        self.publish(&state);
    }

    fn reconnect_due(self: &Arc<Self>) {
        self.lock_state().reconnect_timer = None;
        self.connect();
    }

    fn publish(&self, state: &ManagerState) {
        let snapshot = match state.channel.as_ref() {
            Some(channel) => ChannelSnapshot {
                id: Some(channel.id),
                state: channel.state,
                last_activity: Some(channel.last_activity),
                reconnect_attempts: state.reconnect_attempts,
                opens: state.opens,
            },
            None => ChannelSnapshot::idle(),
        };
        self.status.send_replace(snapshot);
    }

    fn lock_state(&self) -> MutexGuard<'_, ManagerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn send_keepalive(sink: &mut FrameSink) -> Result<(), TransportError> {
    let frame =
        serde_json::to_string(&ClientMessage::Ping).map_err(|e| TransportError::Send(e.to_string()))?;
    sink.send(frame).await?;
    ChannelMetrics::record_keepalive();
    Ok(())
}
