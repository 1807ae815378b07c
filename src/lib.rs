use actix_web::{get, http::header, web, HttpResponse};
use serde::Deserialize;

pub mod config;
pub mod error;
pub mod intake;
pub mod model;
pub mod pricing;
pub mod scheduler;
pub mod sqlite_storage;
pub mod storage;

use intake::{OrderIntake, OrderSelection, Placement};
use model::{Category, OrderStatus};
use storage::{KioskStorage, TimeOrder};

/// How many fulfilled orders the kitchen screen shows.
pub const RECENT_FULFILLED_LIMIT: i64 = 10;

fn redirect_home() -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, "/"))
        .finish()
}

/// Place-order endpoint. The form carries `menu` checkboxes and `qty_<id>`
/// fields; both the happy path and an empty selection redirect back to the
/// menu, matching kiosk behavior.
pub async fn place_order<S: KioskStorage>(
    intake: web::Data<OrderIntake<S>>,
    form: web::Form<Vec<(String, String)>>,
) -> HttpResponse {
    let selection = OrderSelection::from_form(&form);
    match intake.place_order(selection).await {
        Ok(Placement::Placed(id)) => {
            log::debug!("Order {} accepted, redirecting to kitchen screen", id);
            redirect_home()
        }
        Ok(Placement::NoSelection) => redirect_home(),
        Err(e) => {
            log::error!("Failed to place order: {}", e);
            HttpResponse::InternalServerError().body(e.to_string())
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MenuQuery {
    pub cat: Option<String>,
}

/// Menu browse with an optional `cat` filter. `ALL` or anything that is
/// not a category falls back to the whole menu.
pub async fn menu<S: KioskStorage>(
    storage: web::Data<S>,
    query: web::Query<MenuQuery>,
) -> HttpResponse {
    let category = query
        .cat
        .as_deref()
        .and_then(|cat| cat.parse::<Category>().ok());
    match storage.menu_items(category).await {
        Ok(items) => HttpResponse::Ok().json(items),
        Err(e) => {
            log::error!("Failed to load menu: {}", e);
            HttpResponse::InternalServerError().body(e.to_string())
        }
    }
}

/// Kitchen screen: all pending orders, oldest first.
pub async fn pending_orders<S: KioskStorage>(storage: web::Data<S>) -> HttpResponse {
    match storage
        .list_by_status(OrderStatus::Pending, TimeOrder::OldestFirst, None)
        .await
    {
        Ok(orders) => HttpResponse::Ok().json(orders),
        Err(e) => {
            log::error!("Failed to list pending orders: {}", e);
            HttpResponse::InternalServerError().body(e.to_string())
        }
    }
}

/// Kitchen screen: the most recently fulfilled orders.
pub async fn fulfilled_orders<S: KioskStorage>(storage: web::Data<S>) -> HttpResponse {
    match storage
        .list_by_status(
            OrderStatus::Fulfilled,
            TimeOrder::NewestFirst,
            Some(RECENT_FULFILLED_LIMIT),
        )
        .await
    {
        Ok(orders) => HttpResponse::Ok().json(orders),
        Err(e) => {
            log::error!("Failed to list fulfilled orders: {}", e);
            HttpResponse::InternalServerError().body(e.to_string())
        }
    }
}

#[get("/health")]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().finish()
}
