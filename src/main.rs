use std::net::SocketAddr;

use anyhow::Context;
use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*};

use contact_desk::api::{self, AppState};
use contact_desk::config::{self, Config, StoreConfig};
use contact_desk::store::{self, PgStore};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    config::load_dotenv();

    let config = Config::from_env().context("failed to load configuration")?;

    let (filter, filter_error) = config.log_filter();
    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    if let Some(e) = filter_error {
        warn!(rust_log = %config.rust_log, error = %e, "invalid RUST_LOG, falling back to info");
    }

    let store_config = config.store();
    match &store_config {
        StoreConfig::Hosted { .. } => info!("using hosted database (DATABASE_URL)"),
        StoreConfig::Local(local) => {
            info!(host = %local.host, port = local.port, database = %local.database, "using local database")
        }
    }
    let store = PgStore::connect_lazy(&store_config).context("failed to configure database pool")?;

    // Routes are served while the tables are still being created.
    tokio::spawn(store::bootstrap(store.clone()));

    let app = api::app(AppState::new(store, config.admin_password.clone()), &config.static_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(production = config.is_production(), "server is running");
    info!("local access: http://localhost:{}", config.port);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
