use crate::db::{Collection, Database, CATEGORIES, PRODUCTS};
use crate::error::{StoreError, ValidationError};
use crate::models::{Category, NewCategory, NewProduct, Product};

/// Products and categories. Reads go straight to the flat files; additions are append-only.
#[derive(Clone)]
pub struct Catalog {
    products: Collection<Product>,
    categories: Collection<Category>,
}

impl Catalog {
    pub fn new(db: &Database) -> Self {
        Catalog {
            products: db.collection(PRODUCTS),
            categories: db.collection(CATEGORIES),
        }
    }

    /// Case-insensitive substring match on the name; a blank term lists everything.
    pub fn list_products(&self, search_term: Option<&str>) -> Vec<Product> {
        let products = self.products.load();
        let term = match search_term.map(|t| t.trim().to_lowercase()) {
            Some(term) if !term.is_empty() => term,
            _ => return products,
        };
        products
            .into_iter()
            .filter(|p| p.name.to_lowercase().contains(&term))
            .collect()
    }

    pub fn get_product(&self, id: i64) -> Result<Product, StoreError> {
        self.products
            .load()
            .into_iter()
            .find(|p| p.id == id)
            .ok_or(StoreError::NotFound("Product"))
    }

    pub fn list_categories(&self) -> Vec<Category> {
        self.categories.load()
    }

    /// The new product gets `count + 1` as its id.
    pub fn add_product(&self, input: NewProduct) -> Result<Product, StoreError> {
        let (name, price, image) = match (non_empty(input.name), input.price, non_empty(input.image)) {
            (Some(name), Some(price), Some(image)) => (name, price, image),
            _ => return Err(ValidationError::MissingProductFields.into()),
        };

        let product = self.products.update(|products| {
            let product = Product {
                id: products.len() as i64 + 1,
                name,
                price,
                image,
            };
            products.push(product.clone());
            Ok(product)
        })?;
        log::info!("added product {} ({})", product.id, product.name);
        Ok(product)
    }

    pub fn add_category(&self, input: NewCategory) -> Result<Category, StoreError> {
        let (name, image) = match (non_empty(input.name), non_empty(input.image)) {
            (Some(name), Some(image)) => (name, image),
            _ => return Err(ValidationError::MissingCategoryFields.into()),
        };

        let category = Category { name, image };
        self.categories.update(|categories| {
            categories.push(category.clone());
            Ok(())
        })?;
        log::info!("added category {}", category.name);
        Ok(category)
    }
}

fn non_empty(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.is_empty())
}
