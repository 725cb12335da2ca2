//! Catalog repository: products and categories.
//!
//! The cart and checkout services only read from here (`get`,
//! `get_available`); the write paths back the admin catalog CRUD.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use pizzeria_core::{CategoryId, ProductId};

use super::{RepositoryError, parse_decimal};
use crate::models::product::{Category, NewProduct, Product};

const SELECT_PRODUCT: &str = r"
    SELECT p.id, p.category_id, p.name, p.description, p.price,
           p.image_url, p.is_available, p.created_at, p.updated_at
    FROM products p
";

/// Repository for catalog database operations.
pub struct ProductRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a product by ID, available or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query(&format!("{SELECT_PRODUCT} WHERE p.id = ?"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.as_ref().map(map_product_row).transpose()
    }

    /// Get a product by ID, filtered on availability.
    ///
    /// Returns `None` for products that exist but are toggled off.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_available(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query(&format!(
            "{SELECT_PRODUCT} WHERE p.id = ? AND p.is_available = 1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.as_ref().map(map_product_row).transpose()
    }

    /// List all products, optionally filtered by category slug.
    ///
    /// Admin view: includes unavailable products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        category_slug: Option<&str>,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows = if let Some(slug) = category_slug {
            sqlx::query(&format!(
                "{SELECT_PRODUCT} JOIN categories c ON c.id = p.category_id \
                 WHERE c.slug = ? ORDER BY p.name"
            ))
            .bind(slug)
            .fetch_all(self.pool)
            .await?
        } else {
            sqlx::query(&format!("{SELECT_PRODUCT} ORDER BY p.name"))
                .fetch_all(self.pool)
                .await?
        };

        rows.iter().map(map_product_row).collect()
    }

    /// List available products, optionally filtered by category slug.
    ///
    /// Customer view.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_available(
        &self,
        category_slug: Option<&str>,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows = if let Some(slug) = category_slug {
            sqlx::query(&format!(
                "{SELECT_PRODUCT} JOIN categories c ON c.id = p.category_id \
                 WHERE c.slug = ? AND p.is_available = 1 ORDER BY p.name"
            ))
            .bind(slug)
            .fetch_all(self.pool)
            .await?
        } else {
            sqlx::query(&format!(
                "{SELECT_PRODUCT} WHERE p.is_available = 1 ORDER BY p.name"
            ))
            .fetch_all(self.pool)
            .await?
        };

        rows.iter().map(map_product_row).collect()
    }

    /// Create a new product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, new: &NewProduct) -> Result<Product, RepositoryError> {
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO products \
             (category_id, name, description, price, image_url, is_available, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(new.category_id)
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.price.to_string())
        .bind(&new.image_url)
        .bind(new.is_available)
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await?;

        Ok(Product {
            id: ProductId::new(result.last_insert_rowid()),
            category_id: new.category_id,
            name: new.name.clone(),
            description: new.description.clone(),
            price: new.price,
            image_url: new.image_url.clone(),
            is_available: new.is_available,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replace a product's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: ProductId,
        new: &NewProduct,
    ) -> Result<Product, RepositoryError> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE products SET category_id = ?, name = ?, description = ?, price = ?, \
             image_url = ?, is_available = ?, updated_at = ? WHERE id = ?",
        )
        .bind(new.category_id)
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.price.to_string())
        .bind(&new.image_url)
        .bind(new.is_available)
        .bind(now)
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Delete a product.
    ///
    /// Order items referencing it are cascade-deleted by the schema.
    ///
    /// # Returns
    ///
    /// Returns `true` if the product was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List all categories.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query("SELECT id, name, slug FROM categories ORDER BY name")
            .fetch_all(self.pool)
            .await?;

        rows.iter().map(map_category_row).collect()
    }

    /// Get a category by its slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_category_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query("SELECT id, name, slug FROM categories WHERE slug = ?")
            .bind(slug)
            .fetch_optional(self.pool)
            .await?;

        row.as_ref().map(map_category_row).transpose()
    }

    /// Create a new category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_category(
        &self,
        name: &str,
        slug: &str,
    ) -> Result<Category, RepositoryError> {
        let result = sqlx::query("INSERT INTO categories (name, slug) VALUES (?, ?)")
            .bind(name)
            .bind(slug)
            .execute(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    return RepositoryError::Conflict("category slug already exists".to_owned());
                }
                RepositoryError::Database(e)
            })?;

        Ok(Category {
            id: CategoryId::new(result.last_insert_rowid()),
            name: name.to_owned(),
            slug: slug.to_owned(),
        })
    }
}

/// Map a products row into a domain [`Product`].
fn map_product_row(row: &SqliteRow) -> Result<Product, RepositoryError> {
    let price: String = row.try_get("price")?;

    Ok(Product {
        id: row.try_get("id")?,
        category_id: row.try_get("category_id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        price: parse_decimal(&price, "products.price")?,
        image_url: row.try_get("image_url")?,
        is_available: row.try_get("is_available")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

fn map_category_row(row: &SqliteRow) -> Result<Category, RepositoryError> {
    Ok(Category {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        slug: row.try_get("slug")?,
    })
}
