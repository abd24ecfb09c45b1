//! Producer - publishes to the inlet exchange as fast as the broker allows.

use anyhow::Result;

use rmq_throughput::app;
use rmq_throughput::types::AppConfig;
use rmq_throughput::worker::WorkerRole;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    app::init_tracing();

    let config = AppConfig::load()?;
    let cancel = app::shutdown_token();

    app::run(WorkerRole::Producer, config, cancel).await
}
