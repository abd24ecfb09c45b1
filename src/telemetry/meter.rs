//! Named instruments and the periodic observer that samples them.

use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::counter::MessageCounter;
use super::rate_gauge::RateGauge;

/// Name, unit and description of a registered instrument.
#[derive(Debug, Clone, Serialize)]
pub struct InstrumentInfo {
    pub name: String,
    pub unit: String,
    pub description: String,
}

impl InstrumentInfo {
    fn new(name: &str, unit: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            unit: unit.to_string(),
            description: description.to_string(),
        }
    }
}

/// Latest observation of one gauge.
#[derive(Debug, Clone, Serialize)]
pub struct GaugeReading {
    pub name: String,
    pub value: f64,
    pub observed_at: DateTime<Utc>,
}

struct RegisteredGauge {
    info: InstrumentInfo,
    gauge: RateGauge,
    last: Mutex<Option<GaugeReading>>,
}

/// Point-in-time view of every instrument in a meter.
#[derive(Debug, Clone, Serialize)]
pub struct MeterSnapshot {
    pub meter: String,
    pub counters: Vec<CounterSnapshot>,
    pub gauges: Vec<GaugeSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CounterSnapshot {
    #[serde(flatten)]
    pub info: InstrumentInfo,
    pub value: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GaugeSnapshot {
    #[serde(flatten)]
    pub info: InstrumentInfo,
    pub last: Option<GaugeReading>,
}

/// Registry of counters and rate gauges for one process.
pub struct Meter {
    name: String,
    counters: RwLock<Vec<(InstrumentInfo, MessageCounter)>>,
    gauges: RwLock<Vec<Arc<RegisteredGauge>>>,
}

impl Meter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            counters: RwLock::new(Vec::new()),
            gauges: RwLock::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a monotonic counter.
    pub fn create_counter(&self, name: &str, unit: &str, description: &str) -> MessageCounter {
        let counter = MessageCounter::new();
        self.counters
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push((InstrumentInfo::new(name, unit, description), counter.clone()));
        counter
    }

    /// Register a gauge reporting the rate of change of `accessor`.
    ///
    /// The baseline is taken at registration, so the first observation
    /// already covers the interval since this call.
    pub fn create_gauge_from_counter<F>(
        &self,
        name: &str,
        accessor: F,
        unit: &str,
        description: &str,
    ) where
        F: Fn() -> u64 + Send + Sync + 'static,
    {
        self.register_gauge(name, RateGauge::seeded(accessor), unit, description);
    }

    /// Register an already constructed gauge.
    pub fn register_gauge(&self, name: &str, gauge: RateGauge, unit: &str, description: &str) {
        self.gauges
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(Arc::new(RegisteredGauge {
                info: InstrumentInfo::new(name, unit, description),
                gauge,
                last: Mutex::new(None),
            }));
    }

    /// Sample every gauge once.
    pub fn observe(&self) -> Vec<GaugeReading> {
        let gauges: Vec<_> = self
            .gauges
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();

        gauges
            .iter()
            .map(|registered| {
                let rate = registered.gauge.sample();
                info!(gauge = %registered.info.name, rate, unit = %registered.info.unit, "Current rate");
                let reading = GaugeReading {
                    name: registered.info.name.clone(),
                    value: rate,
                    observed_at: Utc::now(),
                };
                *registered.last.lock().unwrap_or_else(|e| e.into_inner()) = Some(reading.clone());
                reading
            })
            .collect()
    }

    /// Observe all gauges every `period` until `cancel` fires.
    pub fn spawn_observer(self: &Arc<Self>, period: Duration, cancel: CancellationToken) -> JoinHandle<()> {
        let meter = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // the first tick completes immediately
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        meter.observe();
                    }
                }
            }
            debug!(meter = %meter.name, "Meter observer stopped");
        })
    }

    pub fn snapshot(&self) -> MeterSnapshot {
        let counters = self
            .counters
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(info, counter)| CounterSnapshot {
                info: info.clone(),
                value: counter.get(),
            })
            .collect();

        let gauges = self
            .gauges
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|registered| GaugeSnapshot {
                info: registered.info.clone(),
                last: registered
                    .last
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .clone(),
            })
            .collect();

        MeterSnapshot {
            meter: self.name.clone(),
            counters,
            gauges,
        }
    }
}

impl std::fmt::Debug for Meter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Meter").field("name", &self.name).finish_non_exhaustive()
    }
}
