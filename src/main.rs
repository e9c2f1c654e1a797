use expeditions::{api, config::Config, db::init_db, DataSource, Orchestrator, Repository};
use expeditions::SubgraphDataSource;
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let pool = match init_db(&config.database_path).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };

    let datasource: Arc<dyn DataSource> = match SubgraphDataSource::new(
        config.subgraph_url.clone(),
        config.subgraph_timeout,
        config.subgraph_max_elapsed,
    ) {
        Ok(ds) => Arc::new(ds),
        Err(e) => {
            eprintln!("Failed to build subgraph client: {}", e);
            std::process::exit(1);
        }
    };

    let repo = Arc::new(Repository::new(pool));
    let orchestrator = Arc::new(Orchestrator::new(
        repo.clone(),
        datasource,
        config.min_claimable_usd,
    ));

    let app = api::create_router(api::AppState::new(repo, orchestrator));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!(
        %addr,
        subgraph = %config.subgraph_url,
        min_claimable_usd = %config.min_claimable_usd,
        "Expeditions service listening"
    );

    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
