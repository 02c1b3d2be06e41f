//! # Product Repository
//!
//! Products and their two stock pools.
//!
//! ## Stock Pools
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  products                                                               │
//! │  ┌────┬──────────┬────────────────┬────────────────┐                   │
//! │  │ id │ name     │ stock_sellable │ stock_supplies │                   │
//! │  ├────┼──────────┼────────────────┼────────────────┤                   │
//! │  │  7 │ Cera     │       5        │       1        │ ← defective return│
//! │  └────┴──────────┴────────────────┴────────────────┘                   │
//! │                                                                         │
//! │  Adjustments are deltas applied to one column:                         │
//! │     UPDATE products SET stock_supplies = stock_supplies + 1            │
//! │  never absolute writes, so concurrent adjustments compose.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use barberia_core::{Product, StockAdjustment, StockLevels, StockPool};
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists all products (active or not), sorted by name.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, price_cents, stock_sellable, stock_supplies, is_active
            FROM products
            ORDER BY name, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(product_from_row).collect()
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, price_cents, stock_sellable, stock_supplies, is_active
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(product_from_row).transpose()
    }

    /// Inserts a product keeping its id.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, price_cents, stock_sellable, stock_supplies, is_active, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(product.price_cents)
        .bind(product.stock.sellable)
        .bind(product.stock.supplies)
        .bind(product.is_active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Applies a stock adjustment to the pool it names.
    ///
    /// ## Returns
    /// * `Ok(StockLevels)` - Levels after the adjustment
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    ///
    /// Pools may go negative (units voided back out after being sold).
    pub async fn adjust_stock(&self, adjustment: &StockAdjustment) -> DbResult<StockLevels> {
        let delta = adjustment.direction.signed(adjustment.quantity);
        debug!(
            product_id = adjustment.product_id,
            pool = adjustment.pool.code(),
            delta,
            "Adjusting stock"
        );

        let sql = match adjustment.pool {
            StockPool::Sellable => {
                r#"
                UPDATE products
                SET stock_sellable = stock_sellable + ?2, updated_at = ?3
                WHERE id = ?1
                RETURNING stock_sellable, stock_supplies
                "#
            }
            StockPool::Supplies => {
                r#"
                UPDATE products
                SET stock_supplies = stock_supplies + ?2, updated_at = ?3
                WHERE id = ?1
                RETURNING stock_sellable, stock_supplies
                "#
            }
        };

        let row = sqlx::query(sql)
            .bind(adjustment.product_id)
            .bind(delta)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Product", adjustment.product_id))?;

        Ok(StockLevels {
            sellable: row.try_get("stock_sellable")?,
            supplies: row.try_get("stock_supplies")?,
        })
    }

    /// Counts active products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

fn product_from_row(row: &SqliteRow) -> DbResult<Product> {
    Ok(Product {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        price_cents: row.try_get("price_cents")?,
        stock: StockLevels {
            sellable: row.try_get("stock_sellable")?,
            supplies: row.try_get("stock_supplies")?,
        },
        is_active: row.try_get("is_active")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures::memory_db;
    use barberia_core::StockDirection;

    fn cera() -> Product {
        Product {
            id: 7,
            name: "Cera".to_string(),
            price_cents: 2_500_000,
            stock: StockLevels { sellable: 5, supplies: 0 },
            is_active: true,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = memory_db().await;
        db.products().insert(&cera()).await.unwrap();

        assert_eq!(db.products().get_by_id(7).await.unwrap(), Some(cera()));
        assert_eq!(db.products().list().await.unwrap().len(), 1);
        assert_eq!(db.products().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_adjustments_touch_one_pool() {
        let db = memory_db().await;
        db.products().insert(&cera()).await.unwrap();

        let levels = db
            .products()
            .adjust_stock(&StockAdjustment {
                product_id: 7,
                quantity: 1,
                direction: StockDirection::Increment,
                pool: StockPool::Supplies,
            })
            .await
            .unwrap();
        assert_eq!(levels, StockLevels { sellable: 5, supplies: 1 });

        let levels = db
            .products()
            .adjust_stock(&StockAdjustment {
                product_id: 7,
                quantity: 2,
                direction: StockDirection::Decrement,
                pool: StockPool::Sellable,
            })
            .await
            .unwrap();
        assert_eq!(levels, StockLevels { sellable: 3, supplies: 1 });
    }

    #[tokio::test]
    async fn test_adjust_unknown_product() {
        let db = memory_db().await;
        let err = db
            .products()
            .adjust_stock(&StockAdjustment {
                product_id: 99,
                quantity: 1,
                direction: StockDirection::Increment,
                pool: StockPool::Sellable,
            })
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
