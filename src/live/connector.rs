//! Opening the live channel.
//!
//! A `Connector` turns a URL into a pair of text-frame halves. The manager
//! never sees the socket type, so the WebSocket client and the in-memory
//! connector used by tests are interchangeable.

use std::pin::Pin;

use async_trait::async_trait;
use futures::future;
use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio_tungstenite::tungstenite::Message;

use crate::error::TransportError;

/// Outbound half: accepts text frames
pub type FrameSink = Pin<Box<dyn Sink<String, Error = TransportError> + Send>>;

/// Inbound half: yields text frames until the peer goes away
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<String, TransportError>> + Send>>;

/// An established live connection split into its two halves
pub struct LiveConnection {
    pub sink: FrameSink,
    pub stream: FrameStream,
}

#[async_trait]
pub trait Connector: Send + Sync {
    async fn open(&self, url: &str) -> Result<LiveConnection, TransportError>;
}

/// WebSocket connector backed by tokio-tungstenite
#[derive(Debug, Default, Clone)]
pub struct WsConnector;

impl WsConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn open(&self, url: &str) -> Result<LiveConnection, TransportError> {
        let (socket, _response) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| TransportError::Open(e.to_string()))?;

        let (sink, stream) = socket.split();

        let sink = sink
            .sink_map_err(|e| TransportError::Send(e.to_string()))
            .with(|text: String| future::ready(Ok::<_, TransportError>(Message::Text(text))));

        // Only text frames carry events; ping/pong/binary are handled or ignored here
        let stream = stream.filter_map(|frame| {
            future::ready(match frame {
                Ok(Message::Text(text)) => Some(Ok(text)),
                Ok(_) => None,
                Err(e) => Some(Err(TransportError::Receive(e.to_string()))),
            })
        });

        Ok(LiveConnection {
            sink: Box::pin(sink),
            stream: Box::pin(stream),
        })
    }
}
