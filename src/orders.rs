use chrono::Utc;
use uuid::Uuid;

use crate::db::{Collection, Database, PURCHASES};
use crate::error::StoreError;
use crate::models::{OrderDetails, Product, PurchaseRecord};

/// Flat surcharge added to every order, whatever it contains.
pub const DELIVERY_FEE: i64 = 50;

pub fn price_order(items: &[Product]) -> i64 {
    items.iter().map(|item| item.price).sum::<i64>() + DELIVERY_FEE
}

/// The purchase ledger.
#[derive(Clone)]
pub struct Orders {
    purchases: Collection<PurchaseRecord>,
}

impl Orders {
    pub fn new(db: &Database) -> Self {
        Orders {
            purchases: db.collection(PURCHASES),
        }
    }

    /// Appends a new record. Clearing the cart, when the items came from one, is up to the caller.
    pub fn place_order(&self, items: Vec<Product>, details: OrderDetails) -> Result<PurchaseRecord, StoreError> {
        let record = PurchaseRecord {
            id: Some(Uuid::new_v4()),
            total: price_order(&items),
            items,
            name: details.name,
            address: details.address,
            contact: details.contact,
            placed_at: Some(Utc::now()),
        };

        self.purchases.update(|ledger| {
            ledger.push(record.clone());
            Ok(())
        })?;
        log::info!(
            "order placed: {} item(s), total {}",
            record.items.len(),
            record.total
        );
        Ok(record)
    }

    pub fn list_orders(&self) -> Vec<PurchaseRecord> {
        self.purchases.load()
    }

    /// Removes the entry at `index`, shifting later entries down. Out of range is a no-op.
    pub fn cancel_order(&self, index: usize) -> Result<bool, StoreError> {
        let removed = self.purchases.update_if_changed(|ledger| {
            if index < ledger.len() {
                Some(ledger.remove(index))
            } else {
                None
            }
        })?;
        if removed.is_some() {
            log::info!("order at index {} cancelled", index);
        }
        Ok(removed.is_some())
    }

    /// Removes the entry carrying `id`. Returns false when no entry has it.
    pub fn cancel_order_by_id(&self, id: Uuid) -> Result<bool, StoreError> {
        let removed = self.purchases.update_if_changed(|ledger| {
            let position = ledger.iter().position(|r| r.id == Some(id))?;
            Some(ledger.remove(position))
        })?;
        if removed.is_some() {
            log::info!("order {} cancelled", id);
        }
        Ok(removed.is_some())
    }
}
