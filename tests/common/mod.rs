#![allow(dead_code)]

use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};

use restro_backend::config::PricingConfig;
use restro_backend::entities::menu_item_entity as menu_items;
use restro_backend::models::{AddCartItemRequest, CreateOrderRequest, Identity};
use restro_backend::pricing::PricingPolicy;
use restro_backend::services::{CartService, KotService, OrderService};

pub struct TestApp {
    pub db: DatabaseConnection,
    pub orders: OrderService,
    pub cart: CartService,
    pub kot: KotService,
    pub pricing: PricingPolicy,
}

/// Fresh in-memory database with the real migrations applied. A single
/// connection keeps the in-memory database alive for the whole test.
pub async fn setup() -> TestApp {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options.max_connections(1).min_connections(1);
    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    let pricing = PricingPolicy::new(PricingConfig::default());
    TestApp {
        orders: OrderService::new(db.clone(), pricing.clone()),
        cart: CartService::new(db.clone(), pricing.clone()),
        kot: KotService::new(db.clone()),
        pricing,
        db,
    }
}

pub async fn seed_item(db: &DatabaseConnection, name: &str, price: i64) -> i64 {
    let item = menu_items::ActiveModel {
        name: Set(name.to_string()),
        price: Set(price),
        is_available: Set(true),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed menu item");
    item.id
}

pub fn guest_order_request(location: &str, contact: &str) -> CreateOrderRequest {
    CreateOrderRequest {
        custom_location: Some(location.to_string()),
        custom_contact: Some(contact.to_string()),
        custom_email: None,
        payment_type: None,
    }
}

/// Initialize a guest order and return its id.
pub async fn guest_order(app: &TestApp, contact: &str) -> i64 {
    let order = app
        .orders
        .initialize_order(
            Identity::Guest(contact.to_string()),
            guest_order_request("Patan", contact),
        )
        .await
        .expect("Failed to initialize order");
    order.id
}

pub fn add_request(order_id: i64, item_id: i64, quantity: Option<i32>) -> AddCartItemRequest {
    AddCartItemRequest {
        order_id,
        item_id,
        quantity,
    }
}
