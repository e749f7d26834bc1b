use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;

use govtally_common::Config;
use govtally_events::EventLog;
use govtally_indexer::{EventRouter, VoteReducer};
use govtally_state::PgEntityStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("govtally=info".parse()?))
        .init();

    info!("govtally indexer starting...");

    let config = Config::from_env();
    config.log_redacted();

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;

    // Run migrations
    govtally_events::store::migrate(&pool).await?;
    govtally_state::migrate(&pool).await?;

    let log = EventLog::new(pool.clone());
    let store: Arc<dyn govtally_state::EntityStore> = Arc::new(PgEntityStore::new(pool));
    let reducer = VoteReducer::new(store.clone());
    let router = EventRouter::new(log, reducer, store, config.batch_size);

    info!(checkpoint = router.checkpoint().await?, "Resuming from checkpoint");

    router.run(Duration::from_millis(config.poll_ms)).await
}
