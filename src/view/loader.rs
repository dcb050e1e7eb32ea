use std::sync::Arc;

use serde_json::Value;

use crate::error::RequestError;
use crate::records::{ActivityRecord, DashboardStats, StoreSettings};
use crate::request::RequestClient;

use super::model::{DashboardView, SectionData};
use super::section::Section;

const STATS_PATH: &str = "/stats/dashboard";
const ACTIVITY_PATH: &str = "/activity/recent";
const PRODUCTS_PATH: &str = "/products";
const ORDERS_PATH: &str = "/orders";
const CUSTOMERS_PATH: &str = "/customers";
const INQUIRIES_PATH: &str = "/contacts";

/// Issues the pulls that populate each section
pub struct SectionLoader {
    requests: Arc<RequestClient>,
    feed_cap: usize,
}

impl SectionLoader {
    pub fn new(requests: Arc<RequestClient>, feed_cap: usize) -> Self {
        Self { requests, feed_cap }
    }

    pub async fn load(&self, section: Section) -> Result<SectionData, RequestError> {
        match section {
            Section::Dashboard => self.load_dashboard().await.map(SectionData::Dashboard),
            Section::Products => self
                .requests
                .get_json(PRODUCTS_PATH)
                .await
                .map(SectionData::Products),
            Section::Orders => self.requests.get_json(ORDERS_PATH).await.map(SectionData::Orders),
            Section::Customers => self
                .requests
                .get_json(CUSTOMERS_PATH)
                .await
                .map(SectionData::Customers),
            Section::Inquiries => self
                .requests
                .get_json(INQUIRIES_PATH)
                .await
                .map(SectionData::Inquiries),
            Section::Settings => Ok(SectionData::Settings(StoreSettings::default())),
        }
    }

    /// Stats first, then the activity feed
    async fn load_dashboard(&self) -> Result<DashboardView, RequestError> {
        let stats: DashboardStats = self.requests.get_json(STATS_PATH).await?;
        let raw: Option<Vec<Value>> = self.requests.get_json(ACTIVITY_PATH).await?;

        // One odd entry must not hide the whole feed
        let activity = raw
            .unwrap_or_default()
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<ActivityRecord>(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping unreadable activity entry");
                    None
                }
            })
            .collect();

        Ok(DashboardView::new(stats, activity, self.feed_cap))
    }
}
