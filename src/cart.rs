use crate::catalog::Catalog;
use crate::models::Product;
use crate::session::Session;

/// Adds `product_id` unless it is already in the cart. Returns whether the cart changed.
pub fn add_item(session: &mut Session, product_id: i64) -> bool {
    if session.cart.contains(&product_id) {
        return false;
    }
    session.cart.push(product_id);
    true
}

/// Resolves the cart against the catalog in insertion order. Ids no longer in the catalog are skipped.
pub fn get_items(session: &Session, catalog: &Catalog) -> Vec<Product> {
    let products = catalog.list_products(None);
    session
        .cart
        .iter()
        .filter_map(|id| products.iter().find(|p| p.id == *id).cloned())
        .collect()
}

pub fn clear(session: &mut Session) {
    session.cart.clear();
}
