//! Order repository for database operations.
//!
//! Orders are only ever created here, inside [`OrderRepository::create_from_cart`],
//! which is the single transactional boundary in the system: the order row,
//! its items, and its total are written all-or-nothing.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use pizzeria_core::{OrderId, OrderItemId, OrderStatus, ProductId, UserId};

use super::{RepositoryError, parse_decimal};
use crate::models::cart::Cart;
use crate::models::order::{Order, OrderItem, OrderWithItems};

const SELECT_ORDER: &str = r"
    SELECT id, customer_id, status, total_price, created_at, updated_at
    FROM orders
";

const SELECT_ITEMS: &str = r"
    SELECT id, order_id, product_id, quantity, price
    FROM order_items
    WHERE order_id = ?
    ORDER BY id
";

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Materialize a cart into a pending order, all-or-nothing.
    ///
    /// Within one transaction: inserts the order, re-checks each cart line
    /// against the catalog filtered on *current* availability, inserts an
    /// item per surviving line at the cart's *snapshot* price, and writes
    /// the decimal sum over the persisted items as the order total.
    ///
    /// Lines whose product is gone or unavailable are skipped, not fatal;
    /// their product IDs are returned so callers can warn. A cart whose
    /// lines are all skipped still produces an (empty, zero-total) order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any write fails; the
    /// transaction is rolled back and no order is visible.
    pub async fn create_from_cart(
        &self,
        customer: UserId,
        cart: &Cart,
    ) -> Result<(OrderWithItems, Vec<ProductId>), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO orders (customer_id, status, total_price, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(customer)
        .bind(OrderStatus::Pending.as_str())
        .bind(Decimal::ZERO.to_string())
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        let order_id = OrderId::new(result.last_insert_rowid());

        let mut total = Decimal::ZERO;
        let mut items = Vec::with_capacity(cart.len());
        let mut skipped = Vec::new();

        for (product_id, entry) in cart.iter() {
            // Availability is re-validated here; the price is not. The cart
            // snapshot is what the customer agreed to pay.
            let available: Option<i64> =
                sqlx::query_scalar("SELECT id FROM products WHERE id = ? AND is_available = 1")
                    .bind(product_id)
                    .fetch_optional(&mut *tx)
                    .await?;

            if available.is_none() {
                skipped.push(product_id);
                continue;
            }

            let result = sqlx::query(
                "INSERT INTO order_items (order_id, product_id, quantity, price) \
                 VALUES (?, ?, ?, ?)",
            )
            .bind(order_id)
            .bind(product_id)
            .bind(entry.quantity)
            .bind(entry.price.to_string())
            .execute(&mut *tx)
            .await?;

            total += entry.price * Decimal::from(entry.quantity);
            items.push(OrderItem {
                id: OrderItemId::new(result.last_insert_rowid()),
                order_id,
                product_id,
                quantity: entry.quantity,
                price: entry.price,
            });
        }

        sqlx::query("UPDATE orders SET total_price = ?, updated_at = ? WHERE id = ?")
            .bind(total.to_string())
            .bind(now)
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let order = Order {
            id: order_id,
            customer_id: customer,
            status: OrderStatus::Pending,
            total_price: total,
            created_at: now,
            updated_at: now,
        };

        Ok((OrderWithItems { order, items }, skipped))
    }

    /// Get an order by ID, without items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query(&format!("{SELECT_ORDER} WHERE id = ?"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.as_ref().map(map_order_row).transpose()
    }

    /// Get an order by ID with its items eagerly loaded.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_items(
        &self,
        id: OrderId,
    ) -> Result<Option<OrderWithItems>, RepositoryError> {
        let Some(order) = self.get(id).await? else {
            return Ok(None);
        };

        let items = self.items_for(order.id).await?;
        Ok(Some(OrderWithItems { order, items }))
    }

    /// List a customer's orders, newest first, items eagerly loaded.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_customer(
        &self,
        customer: UserId,
    ) -> Result<Vec<OrderWithItems>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "{SELECT_ORDER} WHERE customer_id = ? ORDER BY created_at DESC, id DESC"
        ))
        .bind(customer)
        .fetch_all(self.pool)
        .await?;

        self.with_items(&rows).await
    }

    /// List all orders, newest first, optionally filtered on exact status.
    ///
    /// The filter is matched verbatim against the stored status; an
    /// unrecognized value simply matches nothing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(
        &self,
        status_filter: Option<&str>,
    ) -> Result<Vec<OrderWithItems>, RepositoryError> {
        let rows = if let Some(status) = status_filter {
            sqlx::query(&format!(
                "{SELECT_ORDER} WHERE status = ? ORDER BY created_at DESC, id DESC"
            ))
            .bind(status)
            .fetch_all(self.pool)
            .await?
        } else {
            sqlx::query(&format!("{SELECT_ORDER} ORDER BY created_at DESC, id DESC"))
                .fetch_all(self.pool)
                .await?
        };

        self.with_items(&rows).await
    }

    /// Set an order's status.
    ///
    /// Any status may follow any other; there is no transition guard.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let result = sqlx::query("UPDATE orders SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(Utc::now())
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Recompute an order's total from its persisted items and store it.
    ///
    /// Checkout already writes this sum; this helper exists so the cached
    /// total can be re-derived from the items if ever needed. The two agree
    /// by construction since they sum the same rows.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn recalculate_total(&self, id: OrderId) -> Result<Decimal, RepositoryError> {
        let items = self.items_for(id).await?;
        let total: Decimal = items.iter().map(OrderItem::line_total).sum();

        let result = sqlx::query("UPDATE orders SET total_price = ?, updated_at = ? WHERE id = ?")
            .bind(total.to_string())
            .bind(Utc::now())
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(total)
    }

    /// Load the items for one order.
    async fn items_for(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let rows = sqlx::query(SELECT_ITEMS)
            .bind(order_id)
            .fetch_all(self.pool)
            .await?;

        rows.iter().map(map_item_row).collect()
    }

    /// Attach items to a page of order rows.
    async fn with_items(&self, rows: &[SqliteRow]) -> Result<Vec<OrderWithItems>, RepositoryError> {
        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let order = map_order_row(row)?;
            let items = self.items_for(order.id).await?;
            orders.push(OrderWithItems { order, items });
        }
        Ok(orders)
    }
}

/// Map an orders row into a domain [`Order`].
fn map_order_row(row: &SqliteRow) -> Result<Order, RepositoryError> {
    let status: String = row.try_get("status")?;
    let status = status.parse::<OrderStatus>().map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid status in database: {e}"))
    })?;

    let total: String = row.try_get("total_price")?;

    Ok(Order {
        id: row.try_get("id")?,
        customer_id: row.try_get("customer_id")?,
        status,
        total_price: parse_decimal(&total, "orders.total_price")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

fn map_item_row(row: &SqliteRow) -> Result<OrderItem, RepositoryError> {
    let price: String = row.try_get("price")?;

    Ok(OrderItem {
        id: row.try_get("id")?,
        order_id: row.try_get("order_id")?,
        product_id: row.try_get("product_id")?,
        quantity: row.try_get("quantity")?,
        price: parse_decimal(&price, "order_items.price")?,
    })
}
