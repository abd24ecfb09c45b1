//! Process bootstrap shared by the `producer` and `consumer` binaries.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use crate::api::{self, AppState};
use crate::connector::connect;
use crate::messaging::{AmqpDialer, BrokerSession, Payload};
use crate::telemetry::{Meter, UNIT_MESSAGES, UNIT_RATE};
use crate::types::AppConfig;
use crate::worker::{Consumer, Producer, WorkerRole};

/// Install the global tracing subscriber.
///
/// Filter comes from `RUST_LOG`; `LOG_FORMAT=json` switches to JSON lines.
pub fn init_tracing() {
    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "rmq_throughput=info,tower_http=debug".into()),
        ))
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer()))
        .init();
}

/// Token cancelled on Ctrl-C or SIGTERM.
pub fn shutdown_token() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();

    tokio::spawn(async move {
        wait_for_signal().await;
        info!("Shutdown requested");
        trigger.cancel();
    });

    token
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "Cannot listen for SIGTERM");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = terminate.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

/// Connect, register telemetry and run `role` until `cancel` fires.
pub async fn run(role: WorkerRole, config: AppConfig, cancel: CancellationToken) -> Result<()> {
    let instance_id = Uuid::new_v4();
    info!(
        %role,
        %instance_id,
        broker = %config.broker.uri,
        "Starting {} v{}",
        role,
        env!("CARGO_PKG_VERSION")
    );

    let policy = config.retry.to_policy()?;
    let connection = match connect(&AmqpDialer::new(), &config.broker.uri, &policy, &cancel).await {
        Ok(connection) => connection,
        Err(e) if e.is_cancelled() => {
            info!(attempts = e.attempts(), "Stopped before a broker connection was established");
            return Ok(());
        }
        Err(e) => return Err(e).context("could not connect to the broker"),
    };

    let session = BrokerSession::open(connection, &config.broker.exchange).await?;

    let meter = Arc::new(Meter::new(config.telemetry.meter_name.clone()));
    let instruments = role.instruments();
    let counter = meter.create_counter(instruments.counter, UNIT_MESSAGES, instruments.counter_description);
    meter.create_gauge_from_counter(instruments.gauge, counter.accessor(), UNIT_RATE, instruments.gauge_description);

    let telemetry_cancel = cancel.child_token();
    let observer = meter.spawn_observer(config.telemetry.sample_interval(), telemetry_cancel.clone());

    let http = config.telemetry.http_port.map(|port| {
        let state = Arc::new(AppState::new(Arc::clone(&meter), role, instance_id));
        let cancel = telemetry_cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = api::serve(port, state, cancel).await {
                error!(error = %e, port, "Metrics endpoint failed");
            }
        })
    });

    let outcome = match role {
        WorkerRole::Producer => {
            let payload = Payload::seeded(
                config.producer.payload_size,
                config.producer.buffer_size,
                config.producer.seed,
            );
            Producer::new(session.publisher(), counter.clone(), payload)
                .with_interval(config.producer.publish_interval())
                .run(&cancel)
                .await
        }
        WorkerRole::Consumer => {
            let tag = format!("{}-{}", role, instance_id);
            match session.subscribe(&tag, cancel.clone()).await {
                Ok(mut inbound) => Consumer::new(counter.clone()).run(&mut inbound).await,
                Err(e) => Err(e),
            }
        }
    };

    telemetry_cancel.cancel();
    let _ = observer.await;
    if let Some(http) = http {
        let _ = http.await;
    }

    if let Err(e) = session.close().await {
        warn!(error = %e, "Failed to close broker session cleanly");
    }

    let total = outcome.with_context(|| format!("{} loop failed", role))?;
    info!(%role, total, final_count = counter.get(), "Worker stopped");
    Ok(())
}
