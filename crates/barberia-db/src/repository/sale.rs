//! # Sale Repository
//!
//! Database operations for sales and their line items.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. INSERT (checkout, seed or import)                                  │
//! │     └── insert() → sales row + sale_lines rows, one transaction        │
//! │                                                                         │
//! │  2. READ-ONLY                                                          │
//! │     └── monetary columns and lines never change                        │
//! │                                                                         │
//! │  3. (OPTIONAL) VOID                                                    │
//! │     └── void() → status 'completada' → 'anulada', terminal             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use barberia_core::{LineKind, PaymentMethod, Sale, SaleLine, SaleStatus};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};

const SALE_COLUMNS: &str = r#"
    id, sale_number, client_id, document, date, payment_method,
    warranty_months, discount_percent,
    subtotal_cents, tax_cents, discount_cents, total_cents, status
"#;

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Lists every sale with its lines, newest first.
    ///
    /// Two queries: all sales, then all lines grouped in memory.
    pub async fn list(&self) -> DbResult<Vec<Sale>> {
        let sale_rows = sqlx::query(&format!(
            "SELECT {SALE_COLUMNS} FROM sales ORDER BY date DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        let line_rows = sqlx::query(
            r#"
            SELECT sale_id, kind, item_id, name, unit_price_cents, quantity
            FROM sale_lines
            ORDER BY sale_id, position
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut lines: HashMap<i64, Vec<SaleLine>> = HashMap::new();
        for row in &line_rows {
            let sale_id: i64 = row.try_get("sale_id")?;
            lines.entry(sale_id).or_default().push(line_from_row(row)?);
        }

        let sales = sale_rows
            .iter()
            .map(|row| {
                let mut sale = sale_from_row(row)?;
                sale.lines = lines.remove(&sale.id).unwrap_or_default();
                Ok(sale)
            })
            .collect::<DbResult<Vec<Sale>>>()?;

        debug!(count = sales.len(), "Loaded sales");
        Ok(sales)
    }

    /// Gets a sale (with lines) by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Sale>> {
        let Some(row) = sqlx::query(&format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        let mut sale = sale_from_row(&row)?;
        let line_rows = sqlx::query(
            r#"
            SELECT kind, item_id, name, unit_price_cents, quantity
            FROM sale_lines
            WHERE sale_id = ?1
            ORDER BY position
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        sale.lines = line_rows.iter().map(line_from_row).collect::<DbResult<_>>()?;

        Ok(Some(sale))
    }

    /// Inserts a sale and its lines in one transaction, keeping the sale id.
    pub async fn insert(&self, sale: &Sale) -> DbResult<()> {
        debug!(id = sale.id, sale_number = %sale.sale_number, lines = sale.lines.len(), "Inserting sale");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, sale_number, client_id, document, date, payment_method,
                warranty_months, discount_percent,
                subtotal_cents, tax_cents, discount_cents, total_cents,
                status, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6,
                ?7, ?8,
                ?9, ?10, ?11, ?12,
                ?13, ?14
            )
            "#,
        )
        .bind(sale.id)
        .bind(&sale.sale_number)
        .bind(sale.client_id)
        .bind(&sale.document)
        .bind(sale.date)
        .bind(sale.payment_method.code())
        .bind(sale.warranty_months)
        .bind(sale.discount_percent)
        .bind(sale.subtotal_cents)
        .bind(sale.tax_cents)
        .bind(sale.discount_cents)
        .bind(sale.total_cents)
        .bind(sale.status.as_str())
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        for (position, line) in sale.lines.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO sale_lines (
                    sale_id, position, kind, item_id, name, unit_price_cents, quantity
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(sale.id)
            .bind(position as i64)
            .bind(line.kind.code())
            .bind(line.item_id)
            .bind(&line.name)
            .bind(line.unit_price_cents)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Voids a completed sale.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - No completed sale with that id
    pub async fn void(&self, id: i64) -> DbResult<()> {
        debug!(id, "Voiding sale");

        let result = sqlx::query(
            r#"
            UPDATE sales SET
                status = 'anulada',
                updated_at = ?2
            WHERE id = ?1 AND status = 'completada'
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale (completada)", id));
        }

        Ok(())
    }

    /// Counts sales (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

fn sale_from_row(row: &SqliteRow) -> DbResult<Sale> {
    let status: String = row.try_get("status")?;
    let status = SaleStatus::from_wire(&status)
        .ok_or_else(|| DbError::invalid_value("sales", "status", status))?;

    let warranty_months: i64 = row.try_get("warranty_months")?;
    let warranty_months = u32::try_from(warranty_months)
        .map_err(|_| DbError::invalid_value("sales", "warranty_months", warranty_months.to_string()))?;
    let discount_percent: i64 = row.try_get("discount_percent")?;
    let discount_percent = u32::try_from(discount_percent)
        .map_err(|_| DbError::invalid_value("sales", "discount_percent", discount_percent.to_string()))?;

    let payment_method: String = row.try_get("payment_method")?;
    let date: DateTime<Utc> = row.try_get("date")?;

    Ok(Sale {
        id: row.try_get("id")?,
        sale_number: row.try_get("sale_number")?,
        client_id: row.try_get("client_id")?,
        document: row.try_get("document")?,
        date,
        payment_method: PaymentMethod::from_code(&payment_method),
        warranty_months,
        discount_percent,
        subtotal_cents: row.try_get("subtotal_cents")?,
        tax_cents: row.try_get("tax_cents")?,
        discount_cents: row.try_get("discount_cents")?,
        total_cents: row.try_get("total_cents")?,
        status,
        lines: Vec::new(),
    })
}

fn line_from_row(row: &SqliteRow) -> DbResult<SaleLine> {
    let kind: String = row.try_get("kind")?;
    let kind = LineKind::from_code(&kind).ok_or_else(|| DbError::invalid_value("sale_lines", "kind", kind))?;

    Ok(SaleLine {
        kind,
        item_id: row.try_get("item_id")?,
        name: row.try_get("name")?,
        unit_price_cents: row.try_get("unit_price_cents")?,
        quantity: row.try_get("quantity")?,
    })
}
