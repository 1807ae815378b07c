use crate::error::BoxedError;
use crate::model::{Category, MenuItem, ModelId, Order, OrderItem, OrderStatus};
use async_trait::async_trait;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeOrder {
    OldestFirst,
    NewestFirst,
}

/// Persistence seam between intake, the scheduler and the kitchen screen.
///
/// Both fulfillment triggers go through the two conditional updates, which
/// only apply while the current status still matches `from`. That row-level
/// compare-and-set is the whole concurrency story: timers and sweeps may
/// fire in any order and any interleaving stays correct.
#[async_trait]
pub trait KioskStorage: Sized + Send + Sync + 'static {
    async fn new(database_url: &str) -> Result<Self, BoxedError>;

    async fn initialize_schema(&self) -> Result<(), BoxedError>;

    /// Menu browse, id-ordered, optionally filtered by category.
    async fn menu_items(&self, category: Option<Category>) -> Result<Vec<MenuItem>, BoxedError>;

    /// Resolve a set of selected ids against the menu. Ids without a menu
    /// row simply do not appear in the result.
    async fn menu_items_by_ids(&self, ids: &[ModelId]) -> Result<Vec<MenuItem>, BoxedError>;

    /// Menu seeding. Admin-side menu management lives outside this core.
    async fn insert_menu_item(
        &self,
        name: &str,
        category: Category,
        price: f64,
    ) -> Result<ModelId, BoxedError>;

    /// Insert one order row in PENDING status with `order_time = now` and
    /// the item snapshot fixed at this moment. Returns the new id.
    async fn create_order(
        &self,
        items: &[OrderItem],
        total: f64,
        discount: f64,
    ) -> Result<ModelId, BoxedError>;

    async fn get_order(&self, id: ModelId) -> Result<Order, BoxedError>;

    /// Conditional single-row transition: set status to `to` only if it is
    /// still `from`. Returns rows affected; 0 means the order had already
    /// moved on, which callers treat as a successful no-op.
    async fn set_status_if(
        &self,
        id: ModelId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<u64, BoxedError>;

    /// Conditional bulk transition: every PENDING order whose `order_time`
    /// is at least `older_than` in the past becomes FULFILLED. Returns rows
    /// affected.
    async fn fulfill_expired(&self, older_than: Duration) -> Result<u64, BoxedError>;

    async fn list_by_status(
        &self,
        status: OrderStatus,
        order: TimeOrder,
        limit: Option<i64>,
    ) -> Result<Vec<Order>, BoxedError>;
}
