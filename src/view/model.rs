//! View models held by the section controllers

use std::collections::VecDeque;

use crate::error::RequestError;
use crate::records::{
    ActivityRecord, Customer, DashboardStats, Inquiry, Order, Product, StoreSettings,
};

/// Dashboard model: headline stats plus a bounded, newest-first activity feed
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub stats: DashboardStats,
    activity: VecDeque<ActivityRecord>,
    feed_cap: usize,
}

impl DashboardView {
    /// Entries without a message are dropped; the rest are truncated to `feed_cap`
    pub fn new(stats: DashboardStats, activity: Vec<ActivityRecord>, feed_cap: usize) -> Self {
        let mut activity: VecDeque<ActivityRecord> = activity
            .into_iter()
            .filter(ActivityRecord::is_displayable)
            .collect();
        activity.truncate(feed_cap);
        Self {
            stats,
            activity,
            feed_cap,
        }
    }

    pub fn apply_stats(&mut self, stats: DashboardStats) {
        self.stats = stats;
    }

    /// Prepend a new entry, dropping the oldest past the cap
    pub fn push_activity(&mut self, record: ActivityRecord) {
        self.activity.push_front(record);
        self.activity.truncate(self.feed_cap);
    }

    pub fn activity(&self) -> impl Iterator<Item = &ActivityRecord> {
        self.activity.iter()
    }

    pub fn activity_len(&self) -> usize {
        self.activity.len()
    }

    pub fn feed_cap(&self) -> usize {
        self.feed_cap
    }
}

/// Loaded data of one section
#[derive(Debug, Clone, PartialEq)]
pub enum SectionData {
    Dashboard(DashboardView),
    Products(Vec<Product>),
    Orders(Vec<Order>),
    Customers(Vec<Customer>),
    Inquiries(Vec<Inquiry>),
    Settings(StoreSettings),
}

impl SectionData {
    pub fn as_dashboard(&self) -> Option<&DashboardView> {
        match self {
            SectionData::Dashboard(view) => Some(view),
            _ => None,
        }
    }

    pub fn as_dashboard_mut(&mut self) -> Option<&mut DashboardView> {
        match self {
            SectionData::Dashboard(view) => Some(view),
            _ => None,
        }
    }

    pub fn as_products(&self) -> Option<&[Product]> {
        match self {
            SectionData::Products(products) => Some(products),
            _ => None,
        }
    }

    pub fn as_orders(&self) -> Option<&[Order]> {
        match self {
            SectionData::Orders(orders) => Some(orders),
            _ => None,
        }
    }

    pub fn as_customers(&self) -> Option<&[Customer]> {
        match self {
            SectionData::Customers(customers) => Some(customers),
            _ => None,
        }
    }

    pub fn as_inquiries(&self) -> Option<&[Inquiry]> {
        match self {
            SectionData::Inquiries(inquiries) => Some(inquiries),
            _ => None,
        }
    }

    pub fn as_settings(&self) -> Option<&StoreSettings> {
        match self {
            SectionData::Settings(settings) => Some(settings),
            _ => None,
        }
    }

    /// Number of rows shown, for status output
    pub fn len(&self) -> usize {
        match self {
            SectionData::Dashboard(view) => view.activity_len(),
            SectionData::Products(rows) => rows.len(),
            SectionData::Orders(rows) => rows.len(),
            SectionData::Customers(rows) => rows.len(),
            SectionData::Inquiries(rows) => rows.len(),
            SectionData::Settings(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Controller state. `Idle -> Loading -> Ready | Error`; `retry` moves
/// `Error -> Loading`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ViewState {
    #[default]
    Idle,
    Loading,
    Ready(SectionData),
    Error(RequestError),
}

impl ViewState {
    pub fn status(&self) -> ViewStatus {
        match self {
            ViewState::Idle => ViewStatus::Idle,
            ViewState::Loading => ViewStatus::Loading,
            ViewState::Ready(_) => ViewStatus::Ready,
            ViewState::Error(_) => ViewStatus::Error,
        }
    }

    pub fn data(&self) -> Option<&SectionData> {
        match self {
            ViewState::Ready(data) => Some(data),
            _ => None,
        }
    }
}

/// State without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewStatus {
    Idle,
    Loading,
    Ready,
    Error,
}

impl ViewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewStatus::Idle => "idle",
            ViewStatus::Loading => "loading",
            ViewStatus::Ready => "ready",
            ViewStatus::Error => "error",
        }
    }
}
