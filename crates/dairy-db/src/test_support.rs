//! Fixtures shared by the service tests.

use dairy_core::order::CreateOrderRequest;
use dairy_core::{AddressInput, CartLine, Client, NewClient, NewProduct, Product};

use tempfile::TempDir;

use crate::{Database, DbConfig};

pub const TENANT: &str = "tenant-a";

/// Fresh in-memory database with migrations applied.
pub async fn test_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

/// WAL database file inside `dir`, for tests that need several connections.
pub async fn file_db(dir: &TempDir, max_connections: u32) -> Database {
    let config = DbConfig::new(dir.path().join("dairy.db")).max_connections(max_connections);
    Database::new(config).await.unwrap()
}

/// Product named "{sku} product" with `quantity` booked as initial stock.
pub async fn seed_product(db: &Database, tenant_id: &str, sku: &str, price_cents: i64, quantity: i64) -> Product {
    let input = NewProduct {
        name: format!("{sku} product"),
        sku: sku.to_string(),
        price_cents,
        cost_price_cents: price_cents / 2,
        initial_quantity: quantity,
        product_type: "Dairy".to_string(),
        unit: "pcs".to_string(),
    };
    db.catalog().create_product(tenant_id, &input, None).await.unwrap()
}

pub async fn seed_client(db: &Database, tenant_id: &str, name: &str) -> Client {
    let input = NewClient {
        name: name.to_string(),
        email: Some(format!("{}@example.com", name.to_lowercase())),
        phone: None,
    };
    db.clients().create_client(tenant_id, &input).await.unwrap()
}

pub fn address_input(label: &str) -> AddressInput {
    AddressInput {
        label: Some(label.to_string()),
        name: "Asha Patel".to_string(),
        phone: Some("+91 98765 43210".to_string()),
        line1: "12 Dairy Road".to_string(),
        line2: None,
        city: "Anand".to_string(),
        state: Some("Gujarat".to_string()),
        postal_code: Some("388001".to_string()),
        country: Some("IN".to_string()),
        is_default: false,
    }
}

/// Line-list order for an existing client, shipped to a new inline address.
pub fn order_request(client_id: &str, items: Vec<CartLine>) -> CreateOrderRequest {
    CreateOrderRequest {
        client_id: Some(client_id.to_string()),
        items: Some(items),
        shipping_address: Some(address_input("Home")),
        ..Default::default()
    }
}
