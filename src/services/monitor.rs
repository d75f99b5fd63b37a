use std::sync::{Arc, Weak};
use std::time::Duration;

use metrics::{counter, gauge};
use tokio::sync::{mpsc, watch, Mutex};
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::errors::MonitorError;
use crate::models::{TradingStatus, UserPositions, UserTrades};
use crate::polymarket::data_client::{DataClient, DEFAULT_TRADE_LIMIT};

use super::change_detector::ChangeDetector;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(30_000);

/// Configuration for the account monitor.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub target_address: String,
    pub poll_interval: Duration,
    /// Accepted for compatibility; polling is the only transport.
    pub enable_websocket: bool,
    pub trade_limit: u32,
}

impl MonitorConfig {
    pub fn new(target_address: impl Into<String>) -> Self {
        Self {
            target_address: target_address.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            enable_websocket: false,
            trade_limit: DEFAULT_TRADE_LIMIT,
        }
    }
}

/// Receives snapshots and cycle errors. Called at most once per cycle and
/// from the monitor's task, so implementations must not block.
pub trait StatusObserver: Send + Sync {
    fn on_update(&self, status: &TradingStatus);

    fn on_error(&self, error: &MonitorError) {
        tracing::error!(error = %error, "Monitor cycle failed");
    }
}

#[derive(Debug, Clone)]
pub enum MonitorEvent {
    Update(TradingStatus),
    Error(String),
}

/// Observer that forwards events into a bounded channel. A full channel
/// drops the event rather than stalling the timer.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: mpsc::Sender<MonitorEvent>,
}

impl ChannelObserver {
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<MonitorEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    fn forward(&self, event: MonitorEvent) {
        if let Err(e) = self.tx.try_send(event) {
            tracing::warn!(error = %e, "Dropping monitor event");
        }
    }
}

impl StatusObserver for ChannelObserver {
    fn on_update(&self, status: &TradingStatus) {
        self.forward(MonitorEvent::Update(status.clone()));
    }

    fn on_error(&self, error: &MonitorError) {
        tracing::error!(error = %error, "Monitor cycle failed");
        self.forward(MonitorEvent::Error(error.to_string()));
    }
}

enum Lifecycle {
    Idle,
    Running { stop_tx: watch::Sender<bool> },
}

struct CycleState {
    last_delivered: Option<TradingStatus>,
    detector: ChangeDetector,
}

struct Inner {
    client: DataClient,
    config: MonitorConfig,
    observer: Arc<dyn StatusObserver>,
    lifecycle: Mutex<Lifecycle>,
    cycle: Mutex<CycleState>,
}

/// Polls one account and notifies the observer when its status changes
/// significantly. Cloned handles share the same state.
#[derive(Clone)]
pub struct Monitor {
    inner: Arc<Inner>,
}

impl Monitor {
    pub fn new(
        client: DataClient,
        config: MonitorConfig,
        observer: Arc<dyn StatusObserver>,
    ) -> Result<Self, MonitorError> {
        if config.target_address.trim().is_empty() {
            return Err(MonitorError::MissingTargetAddress);
        }
        if config.poll_interval.is_zero() {
            return Err(MonitorError::InvalidPollInterval);
        }
        if config.enable_websocket {
            tracing::warn!("WebSocket updates are not implemented, falling back to polling");
        }

        Ok(Self {
            inner: Arc::new(Inner {
                client,
                config,
                observer,
                lifecycle: Mutex::new(Lifecycle::Idle),
                cycle: Mutex::new(CycleState {
                    last_delivered: None,
                    detector: ChangeDetector::new(),
                }),
            }),
        })
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.inner.config
    }

    /// Run one cycle immediately, then keep polling every `poll_interval`
    /// until [`Monitor::stop`]. Calling this while running only warns.
    pub async fn start(&self) {
        let stop_rx = {
            let mut lifecycle = self.inner.lifecycle.lock().await;
            if matches!(*lifecycle, Lifecycle::Running { .. }) {
                tracing::warn!(
                    address = %self.inner.config.target_address,
                    "Monitor already running"
                );
                return;
            }
            let (stop_tx, stop_rx) = watch::channel(false);
            *lifecycle = Lifecycle::Running { stop_tx };
            stop_rx
        };

        tracing::info!(
            address = %self.inner.config.target_address,
            interval_ms = self.inner.config.poll_interval.as_millis() as u64,
            "Monitor started"
        );

        self.inner.run_scheduled_cycle().await;

        tokio::spawn(run_timer(
            Arc::downgrade(&self.inner),
            self.inner.config.poll_interval,
            stop_rx,
        ));
    }

    /// Stop scheduling cycles. A cycle already in flight still completes.
    pub async fn stop(&self) {
        let mut lifecycle = self.inner.lifecycle.lock().await;
        let previous = std::mem::replace(&mut *lifecycle, Lifecycle::Idle);
        if let Lifecycle::Running { stop_tx } = previous {
            stop_tx.send_replace(true);
            tracing::info!(
                address = %self.inner.config.target_address,
                "Monitor stopped"
            );
        }
    }

    pub async fn is_running(&self) -> bool {
        matches!(*self.inner.lifecycle.lock().await, Lifecycle::Running { .. })
    }

    /// Run one fetch-and-evaluate cycle outside the timer and return the
    /// snapshot. Errors go to the observer and are also returned.
    pub async fn get_status(&self) -> Result<TradingStatus, MonitorError> {
        match self.inner.run_cycle().await {
            Ok(status) => Ok(status),
            Err(e) => {
                self.inner.report_error(&e);
                Err(e)
            }
        }
    }

    /// The snapshot most recently delivered to the observer.
    pub async fn last_delivered(&self) -> Option<TradingStatus> {
        self.inner.cycle.lock().await.last_delivered.clone()
    }
}

/// The timer only holds a weak handle. Dropping every `Monitor` drops the
/// stop sender in `Inner`, which ends the loop.
async fn run_timer(inner: Weak<Inner>, period: Duration, mut stop_rx: watch::Receiver<bool>) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            changed = stop_rx.changed() => {
                if changed.is_err() || *stop_rx.borrow() {
                    break;
                }
            }
            _ = ticker.tick() => {
                let Some(inner) = inner.upgrade() else {
                    break;
                };
                inner.run_scheduled_cycle().await;
            }
        }
    }

    tracing::debug!("Monitor timer exited");
}

impl Inner {
    /// Timer-driven cycle: errors stay with the observer.
    async fn run_scheduled_cycle(&self) {
        if let Err(e) = self.run_cycle().await {
            self.report_error(&e);
        }
    }

    fn report_error(&self, error: &MonitorError) {
        counter!("polywatch_cycle_errors_total").increment(1);
        self.observer.on_error(error);
    }

    async fn run_cycle(&self) -> Result<TradingStatus, MonitorError> {
        counter!("polywatch_cycles_total").increment(1);
        let address = self.config.target_address.as_str();

        let (positions, trades) = tokio::join!(
            self.client.get_user_positions(address),
            self.client.get_user_trades(address, self.config.trade_limit),
        );

        let positions = positions.unwrap_or_else(|e| {
            counter!("polywatch_fetch_failures_total", "kind" => "positions").increment(1);
            tracing::warn!(
                error = %e,
                address = %address,
                "Positions fetch failed, using empty set"
            );
            UserPositions::empty(address)
        });
        let trades = trades.unwrap_or_else(|e| {
            counter!("polywatch_fetch_failures_total", "kind" => "trades").increment(1);
            tracing::warn!(
                error = %e,
                address = %address,
                "Trades fetch failed, using empty set"
            );
            UserTrades::empty(address)
        });

        let status = TradingStatus::from_parts(address, positions, trades);
        gauge!("polywatch_open_positions").set(status.total_positions as f64);

        let reason = {
            let mut guard = self.cycle.lock().await;
            let state = &mut *guard;
            let reason = state
                .detector
                .evaluate(state.last_delivered.as_ref(), &status);
            if reason.is_some() {
                state.last_delivered = Some(status.clone());
            }
            reason
        };

        match reason {
            Some(reason) => {
                counter!("polywatch_updates_total").increment(1);
                tracing::info!(
                    address = %address,
                    reason = ?reason,
                    positions = status.total_positions,
                    total_value = %status.total_value,
                    trades = status.recent_trades.len(),
                    "Account status changed"
                );
                self.observer.on_update(&status);
            }
            None => {
                tracing::debug!(address = %address, "No significant change");
            }
        }

        Ok(status)
    }
}
