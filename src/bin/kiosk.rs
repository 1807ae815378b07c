use actix_web::{web, App, HttpServer};
use clap::Parser;
use log::info;
use resto_kiosk::{
    config::KioskConfig,
    error::BoxedError,
    fulfilled_orders, health_check,
    intake::OrderIntake,
    menu,
    model::Category,
    pending_orders, place_order,
    scheduler::FulfillmentScheduler,
    sqlite_storage::SqliteKioskStorage,
    storage::KioskStorage,
};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to config file
    #[arg(short, long, default_value = "config/kiosk.toml")]
    config: String,
}

const DEFAULT_MENU: &[(&str, Category, f64)] = &[
    ("Classic Burger", Category::Burger, 5.0),
    ("Cheese Burger", Category::Burger, 6.5),
    ("Double Burger", Category::Burger, 7.5),
    ("Regular Fries", Category::Fries, 2.0),
    ("Large Fries", Category::Fries, 3.0),
    ("Cola", Category::Drink, 1.0),
    ("Lemonade", Category::Drink, 1.5),
];

async fn seed_menu_if_empty(storage: &SqliteKioskStorage) -> Result<(), BoxedError> {
    if !storage.menu_items(None).await?.is_empty() {
        return Ok(());
    }
    for (name, category, price) in DEFAULT_MENU {
        storage.insert_menu_item(name, *category, *price).await?;
    }
    info!("Seeded menu with {} items", DEFAULT_MENU.len());
    Ok(())
}

#[actix_web::main]
async fn main() -> Result<(), BoxedError> {
    let args = Args::parse();
    let config = KioskConfig::from_file(&args.config)?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    let storage = Arc::new(SqliteKioskStorage::new(&config.database_url).await?);
    storage.initialize_schema().await?;
    seed_menu_if_empty(&storage).await?;

    let scheduler = FulfillmentScheduler::start(Arc::clone(&storage), config.scheduler_config());
    let intake = web::Data::new(OrderIntake::new(Arc::clone(&storage), scheduler.timers()));
    let storage_data = web::Data::from(Arc::clone(&storage));

    info!("Starting kiosk at {}", config.server_address);
    HttpServer::new(move || {
        App::new()
            .app_data(intake.clone())
            .app_data(storage_data.clone())
            .service(health_check)
            .route("/", web::get().to(menu::<SqliteKioskStorage>))
            .route("/menu", web::get().to(menu::<SqliteKioskStorage>))
            .route("/order", web::post().to(place_order::<SqliteKioskStorage>))
            .route(
                "/orders/pending",
                web::get().to(pending_orders::<SqliteKioskStorage>),
            )
            .route(
                "/orders/fulfilled",
                web::get().to(fulfilled_orders::<SqliteKioskStorage>),
            )
    })
    .bind(&config.server_address)?
    .run()
    .await?;

    scheduler.stop().await;
    Ok(())
}
