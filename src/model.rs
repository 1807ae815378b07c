use chrono::{serde::ts_seconds, DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type ModelId = i64;

/// Menu category. The combo discount looks at which of these are present
/// in an order, so the set of variants is load-bearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Burger,
    Fries,
    Drink,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Burger => "BURGER",
            Category::Fries => "FRIES",
            Category::Drink => "DRINK",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BURGER" => Ok(Category::Burger),
            "FRIES" => Ok(Category::Fries),
            "DRINK" => Ok(Category::Drink),
            other => Err(format!("unknown menu category: {}", other)),
        }
    }
}

/// Lifecycle of an order. PENDING transitions to FULFILLED exactly once
/// and never reverts; both transition paths go through a conditional
/// update keyed on the current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Pending,
    Fulfilled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Fulfilled => "FULFILLED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(OrderStatus::Pending),
            "FULFILLED" => Ok(OrderStatus::Fulfilled),
            other => Err(format!("unknown order status: {}", other)),
        }
    }
}

/// A purchasable item as it currently appears on the menu. Read-only from
/// the intake and scheduler side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: ModelId,
    pub name: String,
    pub category: Category,
    pub price: f64,
}

/// Snapshot of a menu item taken at order time, with the ordered quantity.
/// Stored denormalized on the order row so later menu edits never change
/// historical orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: ModelId,
    pub name: String,
    pub category: Category,
    pub price: f64,
    pub qty: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: ModelId,
    pub items: Vec<OrderItem>,
    pub total: f64,
    pub discount: f64,
    pub status: OrderStatus,
    #[serde(with = "ts_seconds")]
    pub order_time: DateTime<Utc>,
}
