//! Live channel: connection lifecycle, keep-alive, reconnect and event fan-out

mod channel;
mod connector;
mod manager;
mod memory;
mod message;
mod subscription;

pub use channel::{ChannelId, ChannelSnapshot, ChannelState, CloseReason};
pub use connector::{Connector, FrameSink, FrameStream, LiveConnection, WsConnector};
pub use manager::ConnectionManager;
pub use memory::{MemoryAcceptor, MemoryConnector, MemoryPeer};
pub use message::{ClientMessage, EventKind, LiveEvent, ServerMessage, StockAlert};
pub use subscription::{EventHandler, SubscriberRegistry, SubscriptionHandle};
