//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the database pool, the ordering engine over that pool, the
//! event bus live viewers subscribe to, and the shutdown token every stream
//! session watches.

use std::time::Duration;

use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::events::EventBus;
use crate::events::stream::DEFAULT_HEARTBEAT;
use crate::ordering::{OrderingEngine, PgPositionStore};

/// Settings for `GET /api/boards/{id}/events` sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSettings {
    pub heartbeat: Duration,
    /// Capacity of the channel between a session task and its response body.
    pub transport_buffer: usize,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self { heartbeat: DEFAULT_HEARTBEAT, transport_buffer: 16 }
    }
}

/// Shared application state, injected into Axum handlers via State extractor.
/// Every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub ordering: OrderingEngine<PgPositionStore>,
    pub bus: EventBus,
    pub shutdown: CancellationToken,
    pub stream: StreamSettings,
}

impl AppState {
    #[must_use]
    pub fn new(pool: PgPool, bus: EventBus, stream: StreamSettings) -> Self {
        let ordering = OrderingEngine::new(PgPositionStore::new(pool.clone()));
        Self { pool, ordering, bus, shutdown: CancellationToken::new(), stream }
    }

    #[must_use]
    pub fn from_config(pool: PgPool, config: &Config) -> Self {
        let stream = StreamSettings { heartbeat: config.stream_heartbeat, transport_buffer: config.stream_buffer };
        Self::new(pool, EventBus::new(config.stream_buffer), stream)
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
