use std::sync::Arc;

use crate::audit::store::AuditStore;
use crate::config::audit::AuditConfig;
use crate::config::cors::CorsConfig;
use crate::config::csrf::CsrfConfig;
use crate::config::jwt::JwtConfig;
use crate::config::rate_limit::RateLimitConfig;
use crate::directory::Directory;
use crate::middleware::rate_limit::FixedWindowLimiter;

/// Shared application state, cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub jwt_config: JwtConfig,
    pub csrf_config: CsrfConfig,
    pub cors_config: CorsConfig,
    pub rate_limit_config: RateLimitConfig,
    pub audit_config: AuditConfig,
    pub directory: Arc<dyn Directory>,
    pub audit_store: Arc<dyn AuditStore>,
    pub http_limiter: Arc<FixedWindowLimiter>,
    pub realtime_limiter: Arc<FixedWindowLimiter>,
}

impl AppState {
    pub fn new(directory: Arc<dyn Directory>, audit_store: Arc<dyn AuditStore>) -> Self {
        let rate_limit_config = RateLimitConfig::from_env();
        Self {
            jwt_config: JwtConfig::from_env(),
            csrf_config: CsrfConfig::from_env(),
            cors_config: CorsConfig::from_env(),
            http_limiter: Arc::new(FixedWindowLimiter::new(
                rate_limit_config.http_window,
                rate_limit_config.http_max,
            )),
            realtime_limiter: Arc::new(FixedWindowLimiter::new(
                rate_limit_config.realtime_window,
                rate_limit_config.realtime_max,
            )),
            rate_limit_config,
            audit_config: AuditConfig::from_env(),
            directory,
            audit_store,
        }
    }
}
