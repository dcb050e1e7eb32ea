//! The console context.
//!
//! Owns one of each component and wires them together: live events flow
//! from the connection manager through the router into the section
//! coordinator, and a re-opened channel triggers a refresh of the active
//! section.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::JoinHandle;

use crate::auth::{AdminGate, CredentialProvider, StaticCredential};
use crate::catalog::CatalogService;
use crate::config::Settings;
use crate::error::ConsoleError;
use crate::live::{ConnectionManager, Connector, SubscriptionHandle, WsConnector};
use crate::notice::NoticeSink;
use crate::request::{HttpTransport, ReqwestTransport, RequestClient};
use crate::router::EventRouter;
use crate::view::{PullOutcome, Section, SectionCoordinator, SectionLoader};

pub struct Console {
    settings: Arc<Settings>,
    requests: Arc<RequestClient>,
    connection: Arc<ConnectionManager>,
    sections: Arc<SectionCoordinator>,
    router: Arc<EventRouter>,
    catalog: Arc<CatalogService>,
    subscription: Mutex<Option<SubscriptionHandle>>,
    watcher: Mutex<Option<JoinHandle<()>>>,
}

impl Console {
    pub fn new(
        settings: Settings,
        transport: Arc<dyn HttpTransport>,
        connector: Arc<dyn Connector>,
        credentials: Arc<dyn CredentialProvider>,
        notices: Arc<dyn NoticeSink>,
    ) -> Self {
        let requests = Arc::new(RequestClient::new(&settings.api, transport, credentials));
        let connection = Arc::new(ConnectionManager::new(settings.live.clone(), connector));
        let sections = Arc::new(SectionCoordinator::new(
            SectionLoader::new(requests.clone(), settings.dashboard.activity_feed_cap),
            notices.clone(),
        ));
        let router = Arc::new(EventRouter::new(sections.clone(), notices.clone()));
        let catalog = Arc::new(CatalogService::new(
            requests.clone(),
            sections.clone(),
            notices,
        ));

        Self {
            settings: Arc::new(settings),
            requests,
            connection,
            sections,
            router,
            catalog,
            subscription: Mutex::new(None),
            watcher: Mutex::new(None),
        }
    }

    /// Production wiring: reqwest, WebSocket and the configured token
    pub fn from_settings(
        settings: Settings,
        notices: Arc<dyn NoticeSink>,
    ) -> Result<Self, ConsoleError> {
        let transport = ReqwestTransport::new(settings.api.timeout())
            .map_err(|e| ConsoleError::HttpClient(e.to_string()))?;
        let credentials = Arc::new(StaticCredential::new(settings.auth.token.clone()));

        Ok(Self::new(
            settings,
            Arc::new(transport),
            Arc::new(WsConnector::new()),
            credentials,
            notices,
        ))
    }

    pub fn admin_gate(&self) -> AdminGate {
        AdminGate::new(self.requests.clone())
    }

    /// Subscribe the router, open the live channel and show the dashboard
    pub async fn start(&self) -> PullOutcome {
        let router = self.router.clone();
        let handle = self.connection.on_event(move |event| {
            router.route(event);
        });
        if let Some(previous) = self.lock_subscription().replace(handle) {
            previous.unsubscribe();
        }

        if self.settings.live.refresh_on_reconnect {
            let watcher = self.spawn_reconnect_refresh();
            if let Some(previous) = self
                .watcher
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .replace(watcher)
            {
                previous.abort();
            }
        }

        self.connection.connect();
        self.sections.activate(Section::Dashboard).await
    }

    /// Switch the visible section
    pub async fn show(&self, section: Section) -> PullOutcome {
        self.sections.activate(section).await
    }

    /// Retry the active section after a failed pull
    pub async fn retry(&self) -> PullOutcome {
        self.sections.retry(self.sections.active()).await
    }

    pub fn shutdown(&self) {
        self.connection.shutdown();
        if let Some(handle) = self.lock_subscription().take() {
            handle.unsubscribe();
        }
        if let Some(watcher) = self
            .watcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            watcher.abort();
        }
        tracing::info!("Console stopped");
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn requests(&self) -> &Arc<RequestClient> {
        &self.requests
    }

    pub fn connection(&self) -> &Arc<ConnectionManager> {
        &self.connection
    }

    pub fn sections(&self) -> &Arc<SectionCoordinator> {
        &self.sections
    }

    pub fn router(&self) -> &Arc<EventRouter> {
        &self.router
    }

    pub fn catalog(&self) -> &Arc<CatalogService> {
        &self.catalog
    }

    /// Re-pull the active section whenever the channel opens for the second
    /// time or later. The open counter survives coalesced status updates.
    fn spawn_reconnect_refresh(&self) -> JoinHandle<()> {
        let mut status = self.connection.subscribe_status();
        let sections = self.sections.clone();

        tokio::spawn(async move {
            let mut refreshed_for = 1;
            while status.changed().await.is_ok() {
                let snapshot = status.borrow_and_update().clone();
                if !snapshot.is_open() || snapshot.opens <= refreshed_for {
                    continue;
                }
                refreshed_for = snapshot.opens;

                if let Some(id) = snapshot.id {
                    tracing::info!(channel = %id, "Live channel re-opened, refreshing");
                }
                sections.refresh().await;
            }
        })
    }

    fn lock_subscription(&self) -> std::sync::MutexGuard<'_, Option<SubscriptionHandle>> {
        self.subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
