//! Per-section view state machine.
//!
//! Each activation or retry takes a new generation. A pull result is applied
//! only if its generation is still current and the controller is still
//! active; anything else is stale and dropped.

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use crate::error::RequestError;
use crate::metrics::SectionMetrics;

use super::model::{SectionData, ViewState, ViewStatus};
use super::section::Section;

/// Result of resolving a pull
#[derive(Debug, Clone, PartialEq)]
pub enum PullOutcome {
    Ready,
    Failed(RequestError),
    /// A newer activation or a deactivation happened first
    Stale,
    /// `retry` outside the `Error` state
    NotRetryable,
}

struct ControllerInner {
    generation: u64,
    active: bool,
    state: ViewState,
}

pub struct ViewController {
    section: Section,
    inner: Mutex<ControllerInner>,
    generations: watch::Sender<u64>,
}

impl ViewController {
    pub fn new(section: Section) -> Self {
        Self {
            section,
            inner: Mutex::new(ControllerInner {
                generation: 0,
                active: false,
                state: ViewState::Idle,
            }),
            generations: watch::Sender::new(0),
        }
    }

    pub fn section(&self) -> Section {
        self.section
    }

    pub fn state(&self) -> ViewState {
        self.lock().state.clone()
    }

    pub fn status(&self) -> ViewStatus {
        self.lock().state.status()
    }

    pub fn is_active(&self) -> bool {
        self.lock().active
    }

    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Mark active and enter `Loading`. Returns the generation the pull must
    /// present on completion.
    pub fn begin_load(&self) -> u64 {
        let mut inner = self.lock();
        inner.generation += 1;
        inner.active = true;
        inner.state = ViewState::Loading;
        self.generations.send_replace(inner.generation);
        tracing::debug!(
            section = %self.section,
            generation = inner.generation,
            "Section loading"
        );
        inner.generation
    }

    /// `Error -> Loading` for the active controller; `None` in any other state
    pub fn begin_retry(&self) -> Option<u64> {
        let mut inner = self.lock();
        if !inner.active || !matches!(inner.state, ViewState::Error(_)) {
            return None;
        }
        inner.generation += 1;
        inner.state = ViewState::Loading;
        self.generations.send_replace(inner.generation);
        Some(inner.generation)
    }

    /// Resolves once `generation` is no longer current, so a pull that lost
    /// the race can be abandoned mid-retry
    pub fn superseded(&self, generation: u64) -> impl Future<Output = ()> + Send + 'static {
        let mut generations = self.generations.subscribe();
        async move {
            let moved_on = generations
                .wait_for(|current| *current != generation)
                .await
                .is_ok();
            if !moved_on {
                std::future::pending::<()>().await;
            }
        }
    }

    /// Apply a pull result if `generation` is still current
    pub fn complete(
        &self,
        generation: u64,
        result: Result<SectionData, RequestError>,
    ) -> PullOutcome {
        let mut inner = self.lock();
        if !inner.active || inner.generation != generation {
            SectionMetrics::record_stale_discarded();
            tracing::debug!(
                section = %self.section,
                generation,
                current = inner.generation,
                "Discarding stale pull result"
            );
            return PullOutcome::Stale;
        }

        match result {
            Ok(data) => {
                inner.state = ViewState::Ready(data);
                PullOutcome::Ready
            }
            Err(e) => {
                inner.state = ViewState::Error(e.clone());
                PullOutcome::Failed(e)
            }
        }
    }

    /// Leave the active set. Any in-flight pull becomes stale.
    pub fn deactivate(&self) {
        let mut inner = self.lock();
        if !inner.active {
            return;
        }
        inner.active = false;
        inner.generation += 1;
        self.generations.send_replace(inner.generation);
        if matches!(inner.state, ViewState::Loading) {
            inner.state = ViewState::Idle;
        }
        tracing::debug!(section = %self.section, "Section deactivated");
    }

    /// Mutate loaded data in place. Only applies while active and `Ready`.
    pub fn apply_live<F>(&self, apply: F) -> bool
    where
        F: FnOnce(&mut SectionData) -> bool,
    {
        let mut inner = self.lock();
        if !inner.active {
            return false;
        }
        match &mut inner.state {
            ViewState::Ready(data) => apply(data),
            _ => false,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ControllerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::StoreSettings;

    fn settings() -> SectionData {
        SectionData::Settings(StoreSettings::default())
    }

    fn failure() -> RequestError {
        RequestError::Status {
            status: 500,
            message: "Request failed with status 500".to_string(),
        }
    }

    #[test]
    fn test_load_to_ready() {
        let controller = ViewController::new(Section::Settings);
        assert_eq!(controller.status(), ViewStatus::Idle);

        let generation = controller.begin_load();
        assert_eq!(controller.status(), ViewStatus::Loading);
        assert_eq!(controller.complete(generation, Ok(settings())), PullOutcome::Ready);
        assert_eq!(controller.status(), ViewStatus::Ready);
    }

    #[test]
    fn test_load_to_error_then_retry() {
        let controller = ViewController::new(Section::Orders);
        let generation = controller.begin_load();

        assert_eq!(
            controller.complete(generation, Err(failure())),
            PullOutcome::Failed(failure())
        );
        assert_eq!(controller.state(), ViewState::Error(failure()));

        let retry = controller.begin_retry().unwrap();
        assert!(retry > generation);
        assert_eq!(controller.status(), ViewStatus::Loading);
        assert_eq!(controller.complete(retry, Ok(settings())), PullOutcome::Ready);
    }

    #[test]
    fn test_retry_is_noop_outside_error() {
        let controller = ViewController::new(Section::Orders);
        assert!(controller.begin_retry().is_none());

        let generation = controller.begin_load();
        assert!(controller.begin_retry().is_none());

        controller.complete(generation, Ok(settings()));
        assert!(controller.begin_retry().is_none());
        assert_eq!(controller.status(), ViewStatus::Ready);
    }

    #[test]
    fn test_second_activation_preempts_first() {
        let controller = ViewController::new(Section::Products);
        let first = controller.begin_load();
        let second = controller.begin_load();

        assert_eq!(controller.complete(first, Ok(settings())), PullOutcome::Stale);
        assert_eq!(controller.status(), ViewStatus::Loading);
        assert_eq!(controller.complete(second, Ok(settings())), PullOutcome::Ready);
    }

    #[test]
    fn test_deactivation_discards_in_flight_pull() {
        let controller = ViewController::new(Section::Products);
        let generation = controller.begin_load();
        controller.deactivate();

        assert!(!controller.is_active());
        assert_eq!(controller.status(), ViewStatus::Idle);
        assert_eq!(controller.complete(generation, Err(failure())), PullOutcome::Stale);
        assert_eq!(controller.status(), ViewStatus::Idle);
    }

    #[test]
    fn test_apply_live_requires_active_ready() {
        let controller = ViewController::new(Section::Settings);
        assert!(!controller.apply_live(|_| true));

        let generation = controller.begin_load();
        assert!(!controller.apply_live(|_| true));

        controller.complete(generation, Ok(settings()));
        assert!(controller.apply_live(|data| data.as_settings().is_some()));

        controller.deactivate();
        assert!(!controller.apply_live(|_| true));
        assert_eq!(controller.status(), ViewStatus::Ready);
    }

    #[tokio::test]
    async fn test_superseded_resolves_on_new_generation() {
        use futures::FutureExt;

        let controller = ViewController::new(Section::Orders);
        let generation = controller.begin_load();

        let mut pending = Box::pin(controller.superseded(generation));
        assert!((&mut pending).now_or_never().is_none());

        controller.begin_load();
        assert!(pending.now_or_never().is_some());

        // Deactivation supersedes too, even when observed late
        let current = controller.generation();
        controller.deactivate();
        assert!(controller.superseded(current).now_or_never().is_some());
    }
}
