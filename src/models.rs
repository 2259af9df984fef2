use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: i64,
    pub image: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Category {
    pub name: String,
    pub image: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct User {
    pub username: String,
    pub password: String, // stored verbatim
}

/// One ledger entry. `items` is a snapshot of the products at purchase time.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PurchaseRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub items: Vec<Product>,
    pub name: Option<String>,
    pub address: Option<String>,
    pub contact: Option<String>,
    pub total: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placed_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize, Debug, Default)]
pub struct NewProduct {
    pub name: Option<String>,
    pub price: Option<i64>,
    pub image: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct NewCategory {
    pub name: Option<String>,
    pub image: Option<String>,
}

/// Buyer details from the checkout form. Absent fields are recorded as null.
#[derive(Deserialize, Debug, Default, Clone)]
pub struct OrderDetails {
    pub name: Option<String>,
    pub address: Option<String>,
    pub contact: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct SignUpInput {
    pub username: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

/// Login form. A missing field simply fails to match.
#[derive(Deserialize, Debug, Default)]
pub struct SignInInput {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub username: String,
}

#[derive(Deserialize, Debug, Default)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Serialize)]
pub struct Storefront {
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub search_query: String,
}

/// What a checkout page shows before the order is placed.
#[derive(Serialize)]
pub struct CheckoutPreview {
    pub items: Vec<Product>,
    pub total: i64,
}
