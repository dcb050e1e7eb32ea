//! Dispatch of live events to the section that cares about them.
//!
//! Stats and activity only touch the dashboard model, and only while the
//! dashboard is active and loaded. Nothing is buffered for inactive
//! sections: a freshly activated section pulls its own data. Stock alerts
//! become warnings regardless of the active section.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};

use crate::live::LiveEvent;
use crate::metrics::EventMetrics;
use crate::notice::{Notice, NoticeSink};
use crate::view::SectionCoordinator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// A view model was updated
    Applied,
    /// A notice was raised
    Notified,
    /// Liveness only
    Heartbeat,
    /// Nobody was interested
    Skipped,
}

impl RouteOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteOutcome::Applied => "applied",
            RouteOutcome::Notified => "notified",
            RouteOutcome::Heartbeat => "heartbeat",
            RouteOutcome::Skipped => "skipped",
        }
    }
}

pub struct EventRouter {
    sections: Arc<SectionCoordinator>,
    notices: Arc<dyn NoticeSink>,
    last_pong: Mutex<Option<DateTime<Utc>>>,
}

impl EventRouter {
    pub fn new(sections: Arc<SectionCoordinator>, notices: Arc<dyn NoticeSink>) -> Self {
        Self {
            sections,
            notices,
            last_pong: Mutex::new(None),
        }
    }

    pub fn route(&self, event: &LiveEvent) -> RouteOutcome {
        let outcome = match event {
            LiveEvent::StatsUpdate(stats) => {
                let stats = stats.clone();
                self.applied(self.sections.apply_to_dashboard(|view| view.apply_stats(stats)))
            }
            LiveEvent::ActivityCreated(record) => {
                if record.is_displayable() {
                    let record = record.clone();
                    self.applied(
                        self.sections
                            .apply_to_dashboard(|view| view.push_activity(record)),
                    )
                } else {
                    RouteOutcome::Skipped
                }
            }
            LiveEvent::StockAlert(alert) => {
                self.notices.notify(Notice::warning(alert.message()));
                RouteOutcome::Notified
            }
            LiveEvent::Pong => {
                *self.last_pong.lock().unwrap_or_else(PoisonError::into_inner) = Some(Utc::now());
                RouteOutcome::Heartbeat
            }
            LiveEvent::Unknown => RouteOutcome::Skipped,
        };

        EventMetrics::record_routed(event.kind().as_str(), outcome.as_str());
        tracing::trace!(
            kind = event.kind().as_str(),
            outcome = outcome.as_str(),
            "Live event routed"
        );
        outcome
    }

    /// When the server last answered a keep-alive
    pub fn last_pong(&self) -> Option<DateTime<Utc>> {
        *self.last_pong.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn applied(&self, applied: bool) -> RouteOutcome {
        if applied {
            RouteOutcome::Applied
        } else {
            RouteOutcome::Skipped
        }
    }
}
