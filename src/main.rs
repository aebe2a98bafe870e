use std::net::SocketAddr;
use std::sync::Arc;

use campusgate::audit::store::PgAuditStore;
use campusgate::config::database::init_db_pool;
use campusgate::directory::postgres::PgDirectory;
use campusgate::logging::init_tracing;
use campusgate::router::build_router;
use campusgate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let _guard = init_tracing();

    let pool = init_db_pool().await;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let state = AppState::new(
        Arc::new(PgDirectory::new(pool.clone())),
        Arc::new(PgAuditStore::new(pool)),
    );

    let app = build_router(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
