//! Channel identity, state and read-only snapshots

use std::fmt;

use tokio::time::Instant;

use crate::error::TransportError;

/// Identity of one connection attempt. Every attempt gets a fresh id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(pub(crate) u64);

impl ChannelId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Connecting,
    Open,
    Closed,
}

impl ChannelState {
    /// Connecting or open; a new attempt must not start while this holds
    pub fn is_live(&self) -> bool {
        !matches!(self, ChannelState::Closed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelState::Connecting => "connecting",
            ChannelState::Open => "open",
            ChannelState::Closed => "closed",
        }
    }
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One connection attempt. Moves forward through
/// `Connecting -> Open -> Closed` and is never reopened.
#[derive(Debug, Clone)]
pub(crate) struct Channel {
    pub(crate) id: ChannelId,
    pub(crate) state: ChannelState,
    pub(crate) last_activity: Instant,
}

impl Channel {
    pub(crate) fn connecting(id: ChannelId) -> Self {
        Self {
            id,
            state: ChannelState::Connecting,
            last_activity: Instant::now(),
        }
    }

    pub(crate) fn mark_open(&mut self) {
        if self.state == ChannelState::Connecting {
            self.state = ChannelState::Open;
            self.touch();
        }
    }

    pub(crate) fn mark_closed(&mut self) {
        self.state = ChannelState::Closed;
    }

    pub(crate) fn touch(&mut self) {
        self.last_activity = Instant::now();
    }
}

/// Read-only view of the manager's channel
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSnapshot {
    /// `None` until the first attempt starts
    pub id: Option<ChannelId>,
    pub state: ChannelState,
    /// Monotonic stamp of the last open or parsed message
    pub last_activity: Option<Instant>,
    pub reconnect_attempts: u32,
    /// Successful opens so far; above one means the channel was re-opened
    pub opens: u64,
}

impl ChannelSnapshot {
    pub(crate) fn idle() -> Self {
        Self {
            id: None,
            state: ChannelState::Closed,
            last_activity: None,
            reconnect_attempts: 0,
            opens: 0,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state == ChannelState::Open
    }
}

/// Why a channel instance ended
#[derive(Debug, Clone, PartialEq)]
pub enum CloseReason {
    OpenFailed(TransportError),
    Error(TransportError),
    RemoteClosed,
    Shutdown,
}

impl CloseReason {
    pub fn label(&self) -> &'static str {
        match self {
            CloseReason::OpenFailed(_) => "open_failed",
            CloseReason::Error(_) => "error",
            CloseReason::RemoteClosed => "remote_closed",
            CloseReason::Shutdown => "shutdown",
        }
    }
}
