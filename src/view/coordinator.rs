use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::metrics::SectionMetrics;
use crate::notice::{Notice, NoticeSink};
use crate::records::StoreSettings;

use super::controller::{PullOutcome, ViewController};
use super::loader::SectionLoader;
use super::model::{DashboardView, SectionData};
use super::section::Section;

/// Owns one controller per section and the single active section.
///
/// Switching sections deactivates the previous controller under the same
/// lock that records the new active section, so at no point are two
/// controllers active.
pub struct SectionCoordinator {
    controllers: Vec<Arc<ViewController>>,
    active: Mutex<Section>,
    loader: SectionLoader,
    notices: Arc<dyn NoticeSink>,
}

impl SectionCoordinator {
    pub fn new(loader: SectionLoader, notices: Arc<dyn NoticeSink>) -> Self {
        Self {
            controllers: Section::ALL
                .iter()
                .map(|section| Arc::new(ViewController::new(*section)))
                .collect(),
            active: Mutex::new(Section::Dashboard),
            loader,
            notices,
        }
    }

    pub fn controller(&self, section: Section) -> &Arc<ViewController> {
        &self.controllers[section.index()]
    }

    pub fn active(&self) -> Section {
        *self.lock_active()
    }

    /// Make `section` active and pull its data.
    ///
    /// Re-activating the active section preempts its in-flight pull.
    #[tracing::instrument(name = "section.activate", skip(self), fields(section = %section))]
    pub async fn activate(&self, section: Section) -> PullOutcome {
        let generation = {
            let mut active = self.lock_active();
            if *active != section {
                self.controller(*active).deactivate();
            }
            *active = section;
            self.controller(section).begin_load()
        };

        SectionMetrics::record_activation(section.as_str());
        self.pull(section, generation).await
    }

    /// Re-pull `section` after a failure. No-op unless it is active and in
    /// the `Error` state.
    #[tracing::instrument(name = "section.retry", skip(self), fields(section = %section))]
    pub async fn retry(&self, section: Section) -> PullOutcome {
        let generation = {
            let active = self.lock_active();
            if *active != section {
                return PullOutcome::NotRetryable;
            }
            match self.controller(section).begin_retry() {
                Some(generation) => generation,
                None => {
                    tracing::debug!("Retry ignored, section is not in error");
                    return PullOutcome::NotRetryable;
                }
            }
        };

        self.pull(section, generation).await
    }

    /// Re-pull whatever section is active
    pub async fn refresh(&self) -> PullOutcome {
        let section = self.active();
        tracing::info!(section = %section, "Refreshing active section");
        self.activate(section).await
    }

    /// Apply a live update to the dashboard model. Returns false when the
    /// dashboard is not active or not loaded.
    pub fn apply_to_dashboard<F>(&self, apply: F) -> bool
    where
        F: FnOnce(&mut DashboardView),
    {
        let active = self.lock_active();
        if *active != Section::Dashboard {
            return false;
        }
        self.controller(Section::Dashboard)
            .apply_live(|data| match data.as_dashboard_mut() {
                Some(view) => {
                    apply(view);
                    true
                }
                None => false,
            })
    }

    /// Store settings are held locally; saving replaces the loaded copy
    pub fn save_settings(&self, settings: StoreSettings) -> bool {
        let saved = self
            .controller(Section::Settings)
            .apply_live(|data| match data {
                SectionData::Settings(current) => {
                    *current = settings;
                    true
                }
                _ => false,
            });

        if saved {
            self.notices.notify(Notice::success("Settings saved successfully"));
        }
        saved
    }

    async fn pull(&self, section: Section, generation: u64) -> PullOutcome {
        let controller = self.controller(section);
        let result = tokio::select! {
            result = self.loader.load(section) => result,
            _ = controller.superseded(generation) => {
                // Dropping the load cancels its remaining attempts
                SectionMetrics::record_stale_discarded();
                tracing::debug!(section = %section, generation, "Pull superseded, abandoning");
                return PullOutcome::Stale;
            }
        };
        let outcome = controller.complete(generation, result);

        if let PullOutcome::Failed(e) = &outcome {
            tracing::warn!(section = %section, error = %e, "Section pull failed");
            self.notices.notify(Notice::error(load_failure_message(section)));
        }
        outcome
    }

    fn lock_active(&self) -> MutexGuard<'_, Section> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn load_failure_message(section: Section) -> String {
    match section {
        Section::Dashboard => "Failed to load dashboard data".to_string(),
        other => format!("Failed to load {}", other),
    }
}
