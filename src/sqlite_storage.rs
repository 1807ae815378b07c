use crate::error::BoxedError;
use crate::model::{Category, MenuItem, ModelId, Order, OrderItem, OrderStatus};
use crate::storage::{KioskStorage, TimeOrder};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, error, info};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{FromRow, SqlitePool};
use std::time::Duration;

pub struct SqliteKioskStorage {
    pool: SqlitePool,
}

#[derive(FromRow)]
struct MenuRow {
    id: i64,
    name: String,
    category: String,
    price: f64,
}

#[derive(FromRow)]
struct OrderRow {
    id: i64,
    items: String,
    total: f64,
    discount: f64,
    status: String,
    order_time: DateTime<Utc>,
}

impl MenuRow {
    fn into_menu_item(self) -> Result<MenuItem, BoxedError> {
        Ok(MenuItem {
            id: self.id,
            name: self.name,
            category: self.category.parse()?,
            price: self.price,
        })
    }
}

impl OrderRow {
    fn into_order(self) -> Result<Order, BoxedError> {
        Ok(Order {
            id: self.id,
            items: serde_json::from_str(&self.items)?,
            total: self.total,
            discount: self.discount,
            status: self.status.parse()?,
            order_time: self.order_time,
        })
    }
}

#[async_trait]
impl KioskStorage for SqliteKioskStorage {
    async fn new(database_url: &str) -> Result<Self, BoxedError> {
        // An in-memory database exists per connection, so the pool must
        // never open a second one or grow a fresh connection mid-test.
        let pool = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect(database_url)
                .await?
        } else {
            SqlitePool::connect(database_url).await?
        };
        Ok(Self { pool })
    }

    async fn initialize_schema(&self) -> Result<(), BoxedError> {
        let init_sql = include_str!("../resources/init.sql");
        sqlx::query(init_sql).execute(&self.pool).await?;
        Ok(())
    }

    async fn menu_items(&self, category: Option<Category>) -> Result<Vec<MenuItem>, BoxedError> {
        let rows = match category {
            Some(cat) => {
                sqlx::query_as::<_, MenuRow>(
                    "SELECT id, name, category, price FROM menu WHERE category = ? ORDER BY id",
                )
                .bind(cat.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, MenuRow>(
                    "SELECT id, name, category, price FROM menu ORDER BY id",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };
        rows.into_iter().map(MenuRow::into_menu_item).collect()
    }

    async fn menu_items_by_ids(&self, ids: &[ModelId]) -> Result<Vec<MenuItem>, BoxedError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT id, name, category, price FROM menu WHERE id IN ({}) ORDER BY id",
            placeholders
        );
        let mut query = sqlx::query_as::<_, MenuRow>(&sql);
        for id in ids {
            query = query.bind(*id);
        }
        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter().map(MenuRow::into_menu_item).collect()
    }

    async fn insert_menu_item(
        &self,
        name: &str,
        category: Category,
        price: f64,
    ) -> Result<ModelId, BoxedError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO menu (name, category, price) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(name)
        .bind(category.as_str())
        .bind(price)
        .fetch_one(&self.pool)
        .await?;
        debug!("Inserted menu item {} ({})", name, id);
        Ok(id)
    }

    async fn create_order(
        &self,
        items: &[OrderItem],
        total: f64,
        discount: f64,
    ) -> Result<ModelId, BoxedError> {
        debug!("Inserting order with {} items", items.len());
        let items_json = serde_json::to_string(items)?;
        match sqlx::query_scalar::<_, i64>(
            "INSERT INTO orders (items, total, discount, status, order_time) \
             VALUES (?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(items_json)
        .bind(total)
        .bind(discount)
        .bind(OrderStatus::Pending.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        {
            Ok(id) => {
                info!("Successfully created order {} (total {:.2})", id, total);
                Ok(id)
            }
            Err(e) => {
                error!("Failed to insert order: {}", e);
                Err(e.into())
            }
        }
    }

    async fn get_order(&self, id: ModelId) -> Result<Order, BoxedError> {
        let row = sqlx::query_as::<_, OrderRow>(
            "SELECT id, items, total, discount, status, order_time FROM orders WHERE id = ?",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        row.into_order()
    }

    async fn set_status_if(
        &self,
        id: ModelId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<u64, BoxedError> {
        let result = sqlx::query("UPDATE orders SET status = ? WHERE id = ? AND status = ?")
            .bind(to.as_str())
            .bind(id)
            .bind(from.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn fulfill_expired(&self, older_than: Duration) -> Result<u64, BoxedError> {
        let cutoff = Utc::now() - chrono::Duration::from_std(older_than)?;
        let result =
            sqlx::query("UPDATE orders SET status = ? WHERE status = ? AND order_time <= ?")
                .bind(OrderStatus::Fulfilled.as_str())
                .bind(OrderStatus::Pending.as_str())
                .bind(cutoff)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected())
    }

    async fn list_by_status(
        &self,
        status: OrderStatus,
        order: TimeOrder,
        limit: Option<i64>,
    ) -> Result<Vec<Order>, BoxedError> {
        let direction = match order {
            TimeOrder::OldestFirst => "ASC",
            TimeOrder::NewestFirst => "DESC",
        };
        // Secondary ordering by id keeps orders placed within the same
        // timestamp stable.
        let sql = match limit {
            Some(_) => format!(
                "SELECT id, items, total, discount, status, order_time FROM orders \
                 WHERE status = ? ORDER BY order_time {dir}, id {dir} LIMIT ?",
                dir = direction
            ),
            None => format!(
                "SELECT id, items, total, discount, status, order_time FROM orders \
                 WHERE status = ? ORDER BY order_time {dir}, id {dir}",
                dir = direction
            ),
        };
        let mut query = sqlx::query_as::<_, OrderRow>(&sql).bind(status.as_str());
        if let Some(n) = limit {
            query = query.bind(n);
        }
        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter().map(OrderRow::into_order).collect()
    }
}
