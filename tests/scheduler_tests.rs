use resto_kiosk::model::{Category, ModelId, OrderItem, OrderStatus};
use resto_kiosk::scheduler::{FulfillmentScheduler, SchedulerConfig};
use resto_kiosk::sqlite_storage::SqliteKioskStorage;
use resto_kiosk::storage::KioskStorage;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};

fn fast_config() -> SchedulerConfig {
    SchedulerConfig {
        fulfill_after: Duration::from_millis(100),
        sweep_interval: Duration::from_millis(50),
    }
}

fn snapshot() -> Vec<OrderItem> {
    vec![OrderItem {
        id: 1,
        name: "Classic Burger".to_string(),
        category: Category::Burger,
        price: 5.0,
        qty: 1,
    }]
}

async fn setup_test_db() -> Arc<SqliteKioskStorage> {
    let storage = Arc::new(
        SqliteKioskStorage::new("sqlite::memory:")
            .await
            .expect("Failed to create storage"),
    );
    storage
        .initialize_schema()
        .await
        .expect("Failed to initialize schema");
    storage
}

async fn wait_for_status(
    storage: &SqliteKioskStorage,
    id: ModelId,
    status: OrderStatus,
    timeout: Duration,
) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        let order = storage.get_order(id).await.expect("order must exist");
        if order.status == status {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        sleep(Duration::from_millis(25)).await;
    }
}

#[tokio::test]
async fn test_per_order_timer_fulfills() -> Result<(), Box<dyn Error + Send + Sync>> {
    let storage = setup_test_db().await;

    // Sweep pushed far out so only the timer can act.
    let scheduler = FulfillmentScheduler::start(
        Arc::clone(&storage),
        SchedulerConfig {
            fulfill_after: Duration::from_millis(100),
            sweep_interval: Duration::from_secs(3600),
        },
    );
    let timers = scheduler.timers();

    let id = storage.create_order(&snapshot(), 5.0, 0.0).await?;
    timers.arm(id);

    assert_eq!(storage.get_order(id).await?.status, OrderStatus::Pending);
    assert!(
        wait_for_status(&storage, id, OrderStatus::Fulfilled, Duration::from_secs(2)).await,
        "timer should have fulfilled the order"
    );

    scheduler.stop().await;
    Ok(())
}

#[tokio::test]
async fn test_sweep_fulfills_without_a_timer() -> Result<(), Box<dyn Error + Send + Sync>> {
    let storage = setup_test_db().await;

    // An order whose timer was never armed, as after a process restart.
    let id = storage.create_order(&snapshot(), 5.0, 0.0).await?;

    let scheduler = FulfillmentScheduler::start(Arc::clone(&storage), fast_config());
    assert!(
        wait_for_status(&storage, id, OrderStatus::Fulfilled, Duration::from_secs(2)).await,
        "sweep should have fulfilled the order"
    );

    scheduler.stop().await;
    Ok(())
}

#[tokio::test]
async fn test_restart_recovery_on_durable_database() -> Result<(), Box<dyn Error + Send + Sync>> {
    let dir = tempfile::tempdir()?;
    let url = format!(
        "sqlite://{}?mode=rwc",
        dir.path().join("kiosk.db").display()
    );

    // First process life: order created, no timer fires before "death".
    let storage = Arc::new(SqliteKioskStorage::new(&url).await?);
    storage.initialize_schema().await?;
    let id = storage.create_order(&snapshot(), 5.0, 0.0).await?;
    drop(storage);

    // Second life: a fresh storage handle and scheduler over the same file.
    let reopened = Arc::new(SqliteKioskStorage::new(&url).await?);
    let scheduler = FulfillmentScheduler::start(Arc::clone(&reopened), fast_config());
    assert!(
        wait_for_status(&reopened, id, OrderStatus::Fulfilled, Duration::from_secs(2)).await,
        "sweep should converge orders that predate the process"
    );

    scheduler.stop().await;
    Ok(())
}

#[tokio::test]
async fn test_concurrent_triggers_fulfill_exactly_once() -> Result<(), Box<dyn Error + Send + Sync>>
{
    let storage = setup_test_db().await;
    let id = storage.create_order(&snapshot(), 5.0, 0.0).await?;

    // Timer and sweep racing on the same order, modeled as two concurrent
    // conditional transitions.
    let first = {
        let storage = Arc::clone(&storage);
        tokio::spawn(async move {
            storage
                .set_status_if(id, OrderStatus::Pending, OrderStatus::Fulfilled)
                .await
                .expect("conditional update failed")
        })
    };
    let second = {
        let storage = Arc::clone(&storage);
        tokio::spawn(async move {
            storage
                .set_status_if(id, OrderStatus::Pending, OrderStatus::Fulfilled)
                .await
                .expect("conditional update failed")
        })
    };

    let affected = first.await? + second.await?;
    assert_eq!(affected, 1, "exactly one trigger wins the transition");
    assert_eq!(storage.get_order(id).await?.status, OrderStatus::Fulfilled);

    Ok(())
}

#[tokio::test]
async fn test_stop_halts_sweep_and_timers() -> Result<(), Box<dyn Error + Send + Sync>> {
    let storage = setup_test_db().await;

    let scheduler = FulfillmentScheduler::start(Arc::clone(&storage), fast_config());
    let timers = scheduler.timers();
    scheduler.stop().await;

    let id = storage.create_order(&snapshot(), 5.0, 0.0).await?;
    timers.arm(id);

    sleep(Duration::from_millis(400)).await;
    assert_eq!(
        storage.get_order(id).await?.status,
        OrderStatus::Pending,
        "nothing should fire after stop"
    );

    Ok(())
}
