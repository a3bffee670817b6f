use std::sync::Arc;

use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web::{Data, ServiceConfig};

use crate::{
    auth::policy::AccessGate,
    config::Config,
    store::Store,
    utils::{email_registry::EmailRegistry, revoked_sessions::RevokedSessions},
};

pub type Limiter = Arc<Governor<PeerIpKeyExtractor, NoOpMiddleware>>;

/// Per-peer-IP quotas. Built once so every worker shares the same buckets.
#[derive(Clone)]
pub struct RateLimits {
    pub login: Limiter,
    pub signup: Limiter,
    pub protected: Limiter,
}

fn build_limiter(requests_per_min: u32) -> Limiter {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap_or_default();
    Arc::new(Governor::new(&cfg))
}

impl RateLimits {
    pub fn from_config(config: &Config) -> Self {
        Self {
            login: build_limiter(config.rate_login_per_min),
            signup: build_limiter(config.rate_signup_per_min),
            protected: build_limiter(config.rate_protected_per_min),
        }
    }
}

/// Process-wide shared state, registered as separate `app_data` entries so
/// handlers extract only what they use.
#[derive(Clone)]
pub struct AppState {
    pub config: Data<Config>,
    pub store: Data<dyn Store>,
    pub gate: Data<AccessGate>,
    pub registry: Data<EmailRegistry>,
    pub revoked: Data<RevokedSessions>,
    pub limits: RateLimits,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn Store>) -> Self {
        let revoked = RevokedSessions::new(config.session_ttl as u64);
        let limits = RateLimits::from_config(&config);
        Self {
            config: Data::new(config),
            store: Data::from(store),
            gate: Data::new(AccessGate::default()),
            registry: Data::new(EmailRegistry::default()),
            revoked: Data::new(revoked),
            limits,
        }
    }

    pub fn register(&self, cfg: &mut ServiceConfig) {
        cfg.app_data(self.config.clone())
            .app_data(self.store.clone())
            .app_data(self.gate.clone())
            .app_data(self.registry.clone())
            .app_data(self.revoked.clone());
    }
}
