use dotenvy::dotenv;
use storefront_service::{build_server, create_pool, run_migrations, AppConfig, AppState};

fn startup_error(e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(e.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(startup_error)?;
    if !config.production {
        log::warn!("running outside production: test vendor login is enabled");
    }

    let pool = create_pool(
        &config.database_url,
        config.db_pool_size,
        config.db_connect_timeout_secs,
    )
    .map_err(startup_error)?;
    let state = AppState::from_config(&config, pool.clone()).map_err(startup_error)?;
    let readiness = state.readiness.clone();

    log::info!("Starting server at http://{}:{}", config.host, config.port);
    let server = build_server(state, &config.host, config.port)?;
    let handle = server.handle();

    // Serve liveness while migrations run; readiness flips once they are done.
    tokio::spawn(async move {
        match tokio::task::spawn_blocking(move || run_migrations(&pool)).await {
            Ok(Ok(())) => readiness.mark_ready(),
            Ok(Err(e)) => {
                log::error!("{}", e);
                handle.stop(true).await;
            }
            Err(e) => {
                log::error!("migration task failed: {}", e);
                handle.stop(true).await;
            }
        }
    });

    server.await
}
