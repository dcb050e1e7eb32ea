//! In-memory live channel connector.
//!
//! Each `open` creates a pair of unbounded channels and hands the server side
//! to a `MemoryAcceptor`, so a test can play the server: push frames, read the
//! client's keep-alives, fail or close the connection. Nothing touches the
//! network.

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::channel::mpsc as frames;
use futures::{FutureExt, SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::error::TransportError;

use super::connector::{Connector, LiveConnection};
use super::message::ServerMessage;

/// In-memory connector.
///
/// Opens succeed immediately unless `refuse_next` was called or an open delay
/// is configured.
pub struct MemoryConnector {
    accepted: mpsc::UnboundedSender<MemoryPeer>,
    open_delay: Option<Duration>,
    /// Number of upcoming opens that fail
    refusals: AtomicU32,
    /// Every open call, refused or not
    opens: AtomicUsize,
    /// Opens that produced a connection
    established: AtomicUsize,
}

impl MemoryConnector {
    /// Create a connector and the acceptor that receives its connections
    pub fn new() -> (Self, MemoryAcceptor) {
        let (accepted, incoming) = mpsc::unbounded_channel();
        let connector = Self {
            accepted,
            open_delay: None,
            refusals: AtomicU32::new(0),
            opens: AtomicUsize::new(0),
            established: AtomicUsize::new(0),
        };
        (connector, MemoryAcceptor { incoming })
    }

    /// Delay every open by `delay` before it resolves
    pub fn with_open_delay(mut self, delay: Duration) -> Self {
        self.open_delay = Some(delay);
        self
    }

    /// Make the next `count` opens fail
    pub fn refuse_next(&self, count: u32) {
        self.refusals.store(count, Ordering::SeqCst);
    }

    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn open(&self, url: &str) -> Result<LiveConnection, TransportError> {
        self.opens.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.open_delay {
            tokio::time::sleep(delay).await;
        }

        let refused = self
            .refusals
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if refused {
            return Err(TransportError::Open(format!("{}: connection refused", url)));
        }

        let (to_server, from_client) = frames::unbounded::<String>();
        let (to_client, from_server) = frames::unbounded::<Result<String, TransportError>>();

        let peer = MemoryPeer {
            index: self.established.fetch_add(1, Ordering::SeqCst),
            to_client: Some(to_client),
            from_client,
        };
        self.accepted
            .send(peer)
            .map_err(|_| TransportError::Open(format!("{}: no acceptor", url)))?;

        let sink = to_server.sink_map_err(|e| TransportError::Send(e.to_string()));

        Ok(LiveConnection {
            sink: Box::pin(sink),
            stream: Box::pin(from_server),
        })
    }
}

/// Receives the server side of every connection the connector establishes
pub struct MemoryAcceptor {
    incoming: mpsc::UnboundedReceiver<MemoryPeer>,
}

impl MemoryAcceptor {
    /// Wait for the next established connection
    pub async fn accept(&mut self) -> Option<MemoryPeer> {
        self.incoming.recv().await
    }
}

/// Server side of one in-memory connection
pub struct MemoryPeer {
    index: usize,
    to_client: Option<frames::UnboundedSender<Result<String, TransportError>>>,
    from_client: frames::UnboundedReceiver<String>,
}

impl MemoryPeer {
    /// Zero-based position among established connections
    pub fn index(&self) -> usize {
        self.index
    }

    /// Send a raw text frame to the client. Returns false once closed.
    pub fn push(&self, text: impl Into<String>) -> bool {
        match &self.to_client {
            Some(tx) => tx.unbounded_send(Ok(text.into())).is_ok(),
            None => false,
        }
    }

    pub fn push_message(&self, message: &ServerMessage) -> bool {
        match serde_json::to_string(message) {
            Ok(text) => self.push(text),
            Err(_) => false,
        }
    }

    /// Deliver a receive error to the client
    pub fn fail(&self, reason: &str) -> bool {
        match &self.to_client {
            Some(tx) => tx
                .unbounded_send(Err(TransportError::Receive(reason.to_string())))
                .is_ok(),
            None => false,
        }
    }

    /// End the client's inbound stream as a remote close would
    pub fn close(&mut self) {
        self.to_client = None;
    }

    /// Stop accepting client frames; later client sends fail
    pub fn stop_reading(&mut self) {
        self.from_client.close();
    }

    /// Next frame the client sent, or `None` once the client side is gone
    pub async fn recv(&mut self) -> Option<String> {
        self.from_client.next().await
    }

    /// A frame the client already sent, without waiting
    pub fn try_recv(&mut self) -> Option<String> {
        self.from_client.next().now_or_never().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_frames_flow_both_ways() {
        let (connector, mut acceptor) = MemoryConnector::new();
        let mut connection = connector.open("ws://memory").await.unwrap();
        let mut peer = acceptor.accept().await.unwrap();
        assert_eq!(peer.index(), 0);

        connection.sink.send("hello".to_string()).await.unwrap();
        assert_eq!(peer.recv().await.as_deref(), Some("hello"));

        assert!(peer.push("world"));
        assert_eq!(connection.stream.next().await, Some(Ok("world".to_string())));

        peer.close();
        assert!(!peer.push("late"));
        assert_eq!(connection.stream.next().await, None);
    }

    #[tokio::test]
    async fn test_refused_opens() {
        let (connector, _acceptor) = MemoryConnector::new();
        connector.refuse_next(1);

        assert!(matches!(
            connector.open("ws://memory").await,
            Err(TransportError::Open(_))
        ));
        assert!(connector.open("ws://memory").await.is_ok());
        assert_eq!(connector.open_count(), 2);
    }

    #[tokio::test]
    async fn test_stop_reading_fails_client_sends() {
        let (connector, mut acceptor) = MemoryConnector::new();
        let mut connection = connector.open("ws://memory").await.unwrap();
        let mut peer = acceptor.accept().await.unwrap();

        peer.stop_reading();
        let result = connection.sink.send("ping".to_string()).await;
        assert!(matches!(result, Err(TransportError::Send(_))));
        assert!(peer.try_recv().is_none());
    }
}
