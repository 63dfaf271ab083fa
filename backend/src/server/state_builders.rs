//! Explicit constructor injection for every port the server needs.
//!
//! Adapters are built here from validated settings and handed to the domain
//! services; nothing is looked up at runtime.

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr, eyre};
use mockable::{Clock, DefaultClock};
use tracing::info;

use library_api::domain::ports::{OnCallLookup, OnCallSource, RosterCache};
use library_api::domain::{
    CachePrimer, CachePrimerConfig, CachePrimerHandle, CachedOnCallLookup, OnCallLookupConfig,
    OnCallServerStatus,
};
use library_api::inbound::http::state::{HttpState, HttpStatePorts, OnCallRouting};
use library_api::outbound::cache::{RedisCacheConfig, RedisRosterCache};
use library_api::outbound::directory::HttpOnCallDirectory;
use library_api::outbound::persistence::{
    DbPool, DieselBookRepository, PoolConfig, run_pending_migrations,
};
use library_api::settings::RuntimeSettings;

/// Wired application state plus the running primer.
pub struct AppServices {
    /// Shared handler state.
    pub http_state: web::Data<HttpState>,
    /// Running primer, stopped after the server exits.
    pub primer: CachePrimerHandle,
}

async fn build_book_repository(settings: &RuntimeSettings) -> Result<Arc<DieselBookRepository>> {
    run_pending_migrations(&settings.database_url)
        .await
        .wrap_err("failed to migrate the book store")?;
    let pool = DbPool::new(
        PoolConfig::new(settings.database_url.as_str())
            .with_max_size(settings.db_max_connections),
    )
    .await
    .wrap_err("failed to build the book store pool")?;
    Ok(Arc::new(DieselBookRepository::new(pool)))
}

async fn build_roster_cache(
    settings: &RuntimeSettings,
    clock: Arc<dyn Clock>,
) -> Result<Arc<dyn RosterCache>> {
    let config = RedisCacheConfig::new(settings.redis_url.as_str())
        .with_connection_timeout(settings.operation_timeout);
    let cache = RedisRosterCache::connect(config, clock)
        .await
        .wrap_err("failed to configure the roster cache")?;
    Ok(Arc::new(cache))
}

fn build_directory(
    settings: &RuntimeSettings,
    clock: Arc<dyn Clock>,
) -> Result<Arc<dyn OnCallSource>> {
    let directory = HttpOnCallDirectory::new(
        settings.directory_url.clone(),
        settings.operation_timeout,
        clock,
    )
    .wrap_err("failed to build the directory client")?;
    Ok(Arc::new(directory))
}

/// Build adapters, start the primer, and assemble handler state.
///
/// # Errors
///
/// Fails when migrations, the database pool, or an adapter cannot be set up.
pub async fn build_services(settings: &RuntimeSettings) -> Result<AppServices> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let books = build_book_repository(settings).await?;
    let cache = build_roster_cache(settings, Arc::clone(&clock)).await?;
    let source = build_directory(settings, Arc::clone(&clock))?;

    let lookup: Arc<dyn OnCallLookup> = Arc::new(CachedOnCallLookup::new(
        Arc::clone(&cache),
        Arc::clone(&source),
        OnCallLookupConfig {
            ttl: settings.cache_ttl,
            operation_timeout: settings.operation_timeout,
        },
    ));

    let primer = Arc::new(CachePrimer::new(
        Arc::clone(&cache),
        source,
        CachePrimerConfig {
            keys: settings.roster_keys.clone(),
            refresh_interval: settings.refresh_interval,
            ttl: settings.cache_ttl,
            operation_timeout: settings.operation_timeout,
        },
    ))
    .spawn();

    let routing = OnCallRouting::new(settings.roster_keys.clone(), primer.trigger())
        .ok_or_else(|| eyre!("no roster keys configured"))?;
    let status = Arc::new(OnCallServerStatus::new(
        Arc::clone(&lookup),
        Arc::clone(&clock),
        routing.default_key().clone(),
    ));

    info!(
        keys = settings.roster_keys.len(),
        refresh_secs = settings.refresh_interval.as_secs(),
        "roster primer started"
    );

    let http_state = web::Data::new(HttpState::new(
        HttpStatePorts {
            books: books.clone(),
            book_commands: books,
            on_call: lookup,
            status,
            roster_cache: cache,
            clock,
        },
        routing,
    ));
    Ok(AppServices { http_state, primer })
}
