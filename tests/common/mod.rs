use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use campusgate::audit::store::MemoryAuditStore;
use campusgate::config::audit::AuditConfig;
use campusgate::config::cors::CorsConfig;
use campusgate::config::csrf::CsrfConfig;
use campusgate::config::jwt::JwtConfig;
use campusgate::config::rate_limit::RateLimitConfig;
use campusgate::directory::memory::MemoryDirectory;
use campusgate::directory::UserRecord;
use campusgate::ids::EntityId;
use campusgate::middleware::rate_limit::FixedWindowLimiter;
use campusgate::modules::auth::model::Role;
use campusgate::router::build_router;
use campusgate::state::AppState;
use campusgate::utils::cookies::SameSite;
use campusgate::utils::jwt::create_access_token;

pub const TEST_SECRET: &str = "integration-test-secret";

pub struct TestApp {
    pub router: Router,
    pub directory: Arc<MemoryDirectory>,
    pub audit: Arc<MemoryAuditStore>,
    pub jwt_config: JwtConfig,
}

pub fn build_app(rate_limit: RateLimitConfig) -> TestApp {
    let directory = Arc::new(MemoryDirectory::new());
    let audit = Arc::new(MemoryAuditStore::new());
    let jwt_config = JwtConfig {
        secret: TEST_SECRET.to_string(),
        access_token_expiry: 3600,
    };

    let state = AppState {
        jwt_config: jwt_config.clone(),
        csrf_config: CsrfConfig {
            cookie_name: "XSRF-TOKEN".to_string(),
            header_names: ["x-csrf-token", "x-xsrf-token"],
            same_site: SameSite::Lax,
            secure: false,
            max_age: 604800,
            exempt_paths: vec![
                "/api/auth/login".to_string(),
                "/api/auth/csrf-token".to_string(),
                "/health".to_string(),
            ],
        },
        cors_config: CorsConfig {
            allowed_origins: vec!["http://localhost:5173".to_string()],
        },
        http_limiter: Arc::new(FixedWindowLimiter::new(
            rate_limit.http_window,
            rate_limit.http_max,
        )),
        realtime_limiter: Arc::new(FixedWindowLimiter::new(
            rate_limit.realtime_window,
            rate_limit.realtime_max,
        )),
        rate_limit_config: rate_limit,
        audit_config: AuditConfig::default(),
        directory: directory.clone(),
        audit_store: audit.clone(),
    };

    TestApp {
        router: build_router(state),
        directory,
        audit,
        jwt_config,
    }
}

pub fn default_app() -> TestApp {
    build_app(RateLimitConfig::default())
}

impl TestApp {
    pub fn seed_user(&self, id: i64, role: Role, school_id: Option<i64>) -> String {
        let email = format!("user{id}@example.com");
        // Cost 4 keeps bcrypt fast enough for tests.
        let hash = bcrypt::hash("correct horse", 4).unwrap();
        self.directory.add_user(UserRecord {
            id: EntityId(id),
            email: email.clone(),
            password_hash: hash,
            role,
            school_id: school_id.map(EntityId),
        });
        email
    }

    pub fn token_for(&self, id: i64, role: Role, school_id: Option<i64>) -> String {
        create_access_token(EntityId(id), role, school_id.map(EntityId), &self.jwt_config).unwrap()
    }

    /// Detached audit writes race the response; give them a beat to land.
    pub async fn settle(&self) {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}
