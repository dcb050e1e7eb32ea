use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::records::{ActivityRecord, DashboardStats};

/// Messages sent from client to server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    Ping,
}

/// Messages sent from server to client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "STATS_UPDATE")]
    StatsUpdate { stats: DashboardStats },
    #[serde(rename = "NEW_ACTIVITY")]
    NewActivity { activity: ActivityRecord },
    #[serde(rename = "STOCK_ALERT")]
    StockAlert {
        #[serde(rename = "productName")]
        product_name: String,
        stock: i64,
    },
    #[serde(rename = "pong", alias = "PONG")]
    Pong,
    /// Any kind this client does not know yet
    #[serde(other)]
    Unknown,
}

/// Low-stock warning pushed by the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockAlert {
    pub product_name: String,
    pub stock: i64,
}

impl StockAlert {
    pub fn message(&self) -> String {
        format!(
            "Low stock alert: {} ({} remaining)",
            self.product_name, self.stock
        )
    }
}

/// A typed event received over the live channel
#[derive(Debug, Clone, PartialEq)]
pub enum LiveEvent {
    StatsUpdate(DashboardStats),
    ActivityCreated(ActivityRecord),
    StockAlert(StockAlert),
    Pong,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    StatsUpdate,
    ActivityCreated,
    StockAlert,
    Pong,
    Unknown,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::StatsUpdate => "stats_update",
            EventKind::ActivityCreated => "activity_created",
            EventKind::StockAlert => "stock_alert",
            EventKind::Pong => "pong",
            EventKind::Unknown => "unknown",
        }
    }
}

impl LiveEvent {
    /// Decode one text frame
    pub fn decode(text: &str) -> Result<Self, ParseError> {
        let message: ServerMessage = serde_json::from_str(text)?;
        Ok(message.into())
    }

    pub fn kind(&self) -> EventKind {
        match self {
            LiveEvent::StatsUpdate(_) => EventKind::StatsUpdate,
            LiveEvent::ActivityCreated(_) => EventKind::ActivityCreated,
            LiveEvent::StockAlert(_) => EventKind::StockAlert,
            LiveEvent::Pong => EventKind::Pong,
            LiveEvent::Unknown => EventKind::Unknown,
        }
    }
}

impl From<ServerMessage> for LiveEvent {
    fn from(message: ServerMessage) -> Self {
        match message {
            ServerMessage::StatsUpdate { stats } => LiveEvent::StatsUpdate(stats),
            ServerMessage::NewActivity { activity } => LiveEvent::ActivityCreated(activity),
            ServerMessage::StockAlert {
                product_name,
                stock,
            } => LiveEvent::StockAlert(StockAlert {
                product_name,
                stock,
            }),
            ServerMessage::Pong => LiveEvent::Pong,
            ServerMessage::Unknown => LiveEvent::Unknown,
        }
    }
}
