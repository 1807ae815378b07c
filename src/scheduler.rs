use crate::model::{ModelId, OrderStatus};
use crate::storage::KioskStorage;
use log::{debug, error, info};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep};

#[derive(Debug, Clone, Copy)]
pub struct SchedulerConfig {
    /// How long an order stays PENDING before it is fulfilled.
    pub fulfill_after: Duration,
    /// Sweep cadence. Must be materially shorter than `fulfill_after` so
    /// the sweep can pick up orders whose timer was lost to a restart.
    pub sweep_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            fulfill_after: Duration::from_secs(10),
            sweep_interval: Duration::from_secs(2),
        }
    }
}

/// Handle for arming per-order fulfillment timers. Cheap to clone; intake
/// keeps one so every durably created order gets its timer before the
/// caller sees the new id.
pub struct FulfillmentTimers<S: KioskStorage> {
    storage: Arc<S>,
    fulfill_after: Duration,
    shutdown: watch::Sender<bool>,
}

impl<S: KioskStorage> Clone for FulfillmentTimers<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            fulfill_after: self.fulfill_after,
            shutdown: self.shutdown.clone(),
        }
    }
}

impl<S: KioskStorage> FulfillmentTimers<S> {
    /// Arm the per-order timer. The timer is an optimization: if it is
    /// lost (restart, shutdown, storage hiccup on firing) the periodic
    /// sweep still converges the order.
    pub fn arm(&self, order_id: ModelId) {
        let storage = Arc::clone(&self.storage);
        let delay = self.fulfill_after;
        let mut shutdown = self.shutdown.subscribe();
        tokio::spawn(async move {
            if *shutdown.borrow() {
                return;
            }
            tokio::select! {
                _ = sleep(delay) => {
                    match storage
                        .set_status_if(order_id, OrderStatus::Pending, OrderStatus::Fulfilled)
                        .await
                    {
                        Ok(0) => debug!("Order {} was already fulfilled", order_id),
                        Ok(_) => info!("Fulfilled order {}", order_id),
                        // No immediate retry: the next sweep cycle picks
                        // the order up once the threshold has elapsed.
                        Err(e) => error!("Fulfillment timer for order {} failed: {}", order_id, e),
                    }
                }
                _ = shutdown.changed() => {
                    debug!("Fulfillment timer for order {} cancelled by shutdown", order_id);
                }
            }
        });
    }
}

/// Process-scoped fulfillment lifecycle: one periodic sweep task plus the
/// timers handle. All coordination between the two triggers is delegated
/// to the storage layer's conditional updates.
pub struct FulfillmentScheduler<S: KioskStorage> {
    timers: FulfillmentTimers<S>,
    sweep: JoinHandle<()>,
    shutdown: watch::Sender<bool>,
}

impl<S: KioskStorage> FulfillmentScheduler<S> {
    pub fn start(storage: Arc<S>, config: SchedulerConfig) -> Self {
        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let sweep_storage = Arc::clone(&storage);
        let fulfill_after = config.fulfill_after;
        let sweep = tokio::spawn(async move {
            info!(
                "Starting fulfillment sweep every {:?} (threshold {:?})",
                config.sweep_interval, fulfill_after
            );
            // The first tick fires immediately, which doubles as restart
            // recovery for orders that expired while the process was down.
            let mut ticker = interval(config.sweep_interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match sweep_storage.fulfill_expired(fulfill_after).await {
                            Ok(0) => debug!("Sweep found no expired orders"),
                            Ok(n) => info!("Sweep fulfilled {} orders", n),
                            Err(e) => error!("Fulfillment sweep failed: {}", e),
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        debug!("Fulfillment sweep stopping");
                        break;
                    }
                }
            }
        });
        Self {
            timers: FulfillmentTimers {
                storage,
                fulfill_after: config.fulfill_after,
                shutdown: shutdown.clone(),
            },
            sweep,
            shutdown,
        }
    }

    pub fn timers(&self) -> FulfillmentTimers<S> {
        self.timers.clone()
    }

    /// Stop the sweep and cancel armed timers. Not required for
    /// correctness (the conditional updates make a late firing harmless),
    /// only to avoid dangling work during tests and shutdown.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.sweep.await {
            error!("Fulfillment sweep task ended abnormally: {}", e);
        }
    }
}
