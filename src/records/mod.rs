//! Records exchanged with the resource API and the live channel.
//!
//! Field names follow the server's camelCase JSON; identifiers arrive as `_id`.
//! Optional fields default so a partially populated record still decodes.
//! Counters and amounts also accept `null`, and amounts accept numeric
//! strings, since the server does not always fill or type them.

mod lenient;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const INQUIRY_PREVIEW_CHARS: usize = 50;

/// Headline numbers shown on the dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardStats {
    #[serde(deserialize_with = "lenient::amount")]
    pub total_value: f64,
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub total_customers: u64,
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub total_inquiries: u64,
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub total_products: u64,
}

/// What an activity entry is about
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Order,
    Customer,
    Product,
    Inquiry,
    User,
    #[default]
    #[serde(other)]
    Other,
}

impl ActivityKind {
    /// Icon name used by the feed renderer
    pub fn icon(&self) -> &'static str {
        match self {
            ActivityKind::Order => "shopping-cart",
            ActivityKind::Customer => "user-plus",
            ActivityKind::Product => "box",
            ActivityKind::Inquiry => "envelope",
            ActivityKind::User => "user-shield",
            ActivityKind::Other => "info-circle",
        }
    }
}

/// One entry of the recent-activity feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    #[serde(rename = "type", default)]
    pub kind: ActivityKind,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ActivityRecord {
    /// Entries without a message are not shown in the feed
    pub fn is_displayable(&self) -> bool {
        !self.message.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
}

/// Body of a product create or update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    pub category: String,
    pub price: f64,
    pub stock: i64,
    pub description: String,
    pub image_url: String,
}

impl From<&Product> for ProductDraft {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            category: product.category.clone(),
            price: product.price,
            stock: product.stock,
            description: product.description.clone(),
            image_url: product.image_url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub total: f64,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub order_count: u64,
}

/// A contact-form inquiry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inquiry {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<String>,
}

impl Inquiry {
    pub fn status(&self) -> &str {
        self.status.as_deref().unwrap_or("pending")
    }

    /// First 50 characters of the message, with an ellipsis when cut
    pub fn preview(&self) -> String {
        match self.message.as_deref() {
            None | Some("") => "No message".to_string(),
            Some(message) => {
                let mut chars = message.chars();
                let head: String = chars.by_ref().take(INQUIRY_PREVIEW_CHARS).collect();
                if chars.next().is_some() {
                    format!("{}...", head)
                } else {
                    head
                }
            }
        }
    }
}

/// Store settings shown in the settings section. Held locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSettings {
    pub store_name: String,
    pub store_email: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            store_name: "BuildMart".to_string(),
            store_email: "contact@buildmart.com".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stats_tolerate_missing_fields() {
        let stats: DashboardStats =
            serde_json::from_value(json!({ "totalValue": 1520.5, "totalProducts": 12 })).unwrap();
        assert_eq!(stats.total_value, 1520.5);
        assert_eq!(stats.total_products, 12);
        assert_eq!(stats.total_customers, 0);
    }

    #[test]
    fn test_stats_tolerate_null_and_numeric_strings() {
        let stats: DashboardStats = serde_json::from_value(json!({
            "totalValue": null,
            "totalCustomers": null,
            "totalInquiries": 2,
            "totalProducts": null
        }))
        .unwrap();
        assert_eq!(stats, DashboardStats { total_inquiries: 2, ..Default::default() });

        let stats: DashboardStats =
            serde_json::from_value(json!({ "totalValue": "1520.50", "totalProducts": 3 })).unwrap();
        assert_eq!(stats.total_value, 1520.5);
        assert_eq!(stats.total_products, 3);
    }

    #[test]
    fn test_non_numeric_amount_is_rejected() {
        let result = serde_json::from_value::<DashboardStats>(json!({ "totalValue": "lots" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_customer_and_order_tolerate_nulls() {
        let customer: Customer = serde_json::from_value(json!({
            "_id": "c1",
            "name": "Ana",
            "orderCount": null
        }))
        .unwrap();
        assert_eq!(customer.order_count, 0);

        let order: Order =
            serde_json::from_value(json!({ "_id": "o1", "total": "42.10" })).unwrap();
        assert_eq!(order.total, 42.1);
        let order: Order = serde_json::from_value(json!({ "_id": "o2", "total": null })).unwrap();
        assert_eq!(order.total, 0.0);
    }

    #[test]
    fn test_activity_kind_falls_back_to_other() {
        let record: ActivityRecord = serde_json::from_value(json!({
            "type": "refund",
            "message": "Refund issued",
            "timestamp": "2024-05-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(record.kind, ActivityKind::Other);
        assert_eq!(record.kind.icon(), "info-circle");
        assert!(record.is_displayable());
    }

    #[test]
    fn test_activity_without_message_is_hidden() {
        let record: ActivityRecord = serde_json::from_value(json!({ "type": "order" })).unwrap();
        assert_eq!(record.kind.icon(), "shopping-cart");
        assert!(!record.is_displayable());
    }

    #[test]
    fn test_product_uses_underscore_id() {
        let product: Product = serde_json::from_value(json!({
            "_id": "665f",
            "name": "Claw Hammer",
            "category": "tools",
            "price": 19.99,
            "stock": 40,
            "imageUrl": "https://cdn.example/hammer.png"
        }))
        .unwrap();
        assert_eq!(product.id, "665f");
        assert_eq!(product.image_url, "https://cdn.example/hammer.png");
        assert_eq!(ProductDraft::from(&product).name, "Claw Hammer");
    }

    #[test]
    fn test_inquiry_preview_and_status() {
        let long = Inquiry {
            id: "1".to_string(),
            name: None,
            email: None,
            message: Some("x".repeat(60)),
            created_at: None,
            status: None,
        };
        assert_eq!(long.preview(), format!("{}...", "x".repeat(50)));
        assert_eq!(long.status(), "pending");

        let short = Inquiry {
            message: Some("Do you deliver?".to_string()),
            status: Some("answered".to_string()),
            ..long.clone()
        };
        assert_eq!(short.preview(), "Do you deliver?");
        assert_eq!(short.status(), "answered");

        let empty = Inquiry { message: None, ..long };
        assert_eq!(empty.preview(), "No message");
    }
}
