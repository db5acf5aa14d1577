//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use healthlink_auth::{AccessTicketBroker, CallerResolver, PasscodeGuard, SubscriptionBroker};
use healthlink_cache::{RegistrySweeper, build_registry};
use healthlink_core::config::AppConfig;
use healthlink_core::result::AppResult;
use healthlink_core::traits::TicketRegistry;
use healthlink_core::types::LinkId;
use healthlink_database::DatabasePool;
use healthlink_database::repositories::{
    AccessLogRepository, EndpointRepository, FileRepository, LinkRepository, UserRepository,
};
use healthlink_realtime::RealtimeEngine;
use healthlink_service::{
    EndpointTokenManager, LinkService, ManifestBuilder, ManifestService, SubscriptionService,
    TokenClient,
};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// SQLite connection pool
    pub db: DatabasePool,
    /// Live subscription engine
    pub realtime: RealtimeEngine,

    // ── Auth ─────────────────────────────────────────────────
    /// Resolves the owner behind management calls
    pub caller: CallerResolver,

    // ── Services ─────────────────────────────────────────────
    /// Owner-facing link management
    pub links: Arc<LinkService>,
    /// Recipient-facing manifest and ticketed resolution
    pub manifests: Arc<ManifestService>,
    /// Subscription tickets and live sessions
    pub subscriptions: Arc<SubscriptionService>,

    // ── Ticket registries (swept in the background) ──────────
    access_tickets: Arc<dyn TicketRegistry<LinkId>>,
    subscription_tickets: Arc<dyn TicketRegistry<Vec<LinkId>>>,
}

impl AppState {
    /// Wire repositories, brokers, and services over `db`.
    ///
    /// OAuth token requests go through `token_client`.
    pub fn new(
        config: AppConfig,
        db: DatabasePool,
        token_client: Arc<dyn TokenClient>,
    ) -> AppResult<Self> {
        let pool = db.pool().clone();
        let base_url = config.server.base_url().to_string();

        let access_tickets = build_registry::<LinkId>(&config.tickets)?;
        let subscription_tickets = build_registry::<Vec<LinkId>>(&config.tickets)?;
        let realtime = RealtimeEngine::new(config.realtime.clone());

        let links = LinkRepository::new(pool.clone(), &base_url);
        let files = FileRepository::new(pool.clone());
        let endpoints = EndpointRepository::new(pool.clone());
        let users = UserRepository::new(pool.clone());
        let access_log = AccessLogRepository::new(pool, realtime.publisher());

        let tokens = Arc::new(EndpointTokenManager::new(
            endpoints.clone(),
            token_client,
            &config.endpoints,
        ));

        let link_service = LinkService::new(
            links.clone(),
            files.clone(),
            users,
            access_log.clone(),
            Arc::clone(&tokens),
            config.storage.file_size_max_bytes,
        );
        let manifest_service = ManifestService::new(
            PasscodeGuard::new(links.clone()),
            AccessTicketBroker::new(Arc::clone(&access_tickets), config.tickets.access_ttl()),
            files,
            endpoints,
            tokens,
            access_log,
            ManifestBuilder::new(&base_url),
            config.storage.embedded_length_max,
        );
        let subscription_service = SubscriptionService::new(
            SubscriptionBroker::new(
                Arc::clone(&subscription_tickets),
                links.clone(),
                config.tickets.subscription_ttl(),
            ),
            links.clone(),
            realtime.clone(),
            &base_url,
        );

        Ok(Self {
            caller: CallerResolver::new(links, &config.auth),
            config: Arc::new(config),
            db,
            realtime,
            links: Arc::new(link_service),
            manifests: Arc::new(manifest_service),
            subscriptions: Arc::new(subscription_service),
            access_tickets,
            subscription_tickets,
        })
    }

    /// Registries the background sweeper should purge.
    pub fn ticket_registries(&self) -> Vec<Arc<dyn RegistrySweeper>> {
        vec![
            Arc::new(Arc::clone(&self.access_tickets)),
            Arc::new(Arc::clone(&self.subscription_tickets)),
        ]
    }
}
