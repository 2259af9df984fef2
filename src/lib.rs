//! A small storefront over flat JSON files: browse the catalog, keep a cart in
//! the session, check out into a purchase ledger.

use actix_web::web;

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod orders;
pub mod session;

use auth::Auth;
use catalog::Catalog;
use config::Config;
use db::Database;
use orders::Orders;
use session::SessionKeys;

/// Shared handles given to every worker's `App`.
#[derive(Clone)]
pub struct Services {
    pub catalog: web::Data<Catalog>,
    pub orders: web::Data<Orders>,
    pub auth: web::Data<Auth>,
    pub keys: web::Data<SessionKeys>,
}

impl Services {
    pub fn new(config: &Config) -> Self {
        let db = Database::open(&config.data_dir);
        Services {
            catalog: web::Data::new(Catalog::new(&db)),
            orders: web::Data::new(Orders::new(&db)),
            auth: web::Data::new(Auth::new(&db)),
            keys: web::Data::new(SessionKeys::from_config(config)),
        }
    }

    pub fn session_middleware(&self) -> middleware::SessionMiddleware {
        middleware::SessionMiddleware::new(self.keys.get_ref().clone())
    }

    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.catalog.clone())
            .app_data(self.orders.clone())
            .app_data(self.auth.clone())
            .app_data(self.keys.clone())
            .configure(handlers::routes);
    }
}
