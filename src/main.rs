use seatline::config::Config;
use seatline::engine::Engine;
use seatline::server::serve;
use seatline::store::PgStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let config = Config::from_env()?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let store = PgStore::new(&config.database_url, config.database_max_connections).await?;
    let engine = Engine::new(store)?.with_retry_policy(config.retry_policy());

    serve(engine, config.listen_addr).await;

    Ok(())
}
