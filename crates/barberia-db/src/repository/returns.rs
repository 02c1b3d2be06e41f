//! # Return Repository
//!
//! The returns ledger. Store credit is never stored: it is derived from the
//! rows in this table every time it is needed.

use barberia_core::{NewReturn, Return, ReturnReason, ReturnStatus};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};

const RETURN_COLUMNS: &str = r#"
    id, sale_id, client_id, product_id, product_name, quantity,
    amount_cents, credit_cents, reason, reason_detail, observations,
    user_id, date, status
"#;

/// Repository for return database operations.
#[derive(Debug, Clone)]
pub struct ReturnRepository {
    pool: SqlitePool,
}

impl ReturnRepository {
    /// Creates a new ReturnRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReturnRepository { pool }
    }

    /// Lists every return in filing order.
    pub async fn list(&self) -> DbResult<Vec<Return>> {
        let rows = sqlx::query(&format!("SELECT {RETURN_COLUMNS} FROM returns ORDER BY date, id"))
            .fetch_all(&self.pool)
            .await?;

        let returns = rows.iter().map(return_from_row).collect::<DbResult<Vec<_>>>()?;
        debug!(count = returns.len(), "Loaded returns");
        Ok(returns)
    }

    /// Gets a return by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Return>> {
        let row = sqlx::query(&format!("SELECT {RETURN_COLUMNS} FROM returns WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(return_from_row).transpose()
    }

    /// Persists a confirmed return and returns the stored record.
    ///
    /// ## Returns
    /// * `Ok(Return)` - With its generated id and status `completada`
    /// * `Err(DbError::ForeignKeyViolation)` - The sale doesn't exist
    pub async fn insert(&self, new_return: &NewReturn) -> DbResult<Return> {
        debug!(
            sale_id = new_return.sale_id,
            product_id = new_return.product_id,
            quantity = new_return.quantity,
            "Inserting return"
        );

        let result = sqlx::query(
            r#"
            INSERT INTO returns (
                sale_id, client_id, product_id, product_name, quantity,
                amount_cents, credit_cents, reason, reason_detail, observations,
                user_id, date, status, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8, ?9, ?10,
                ?11, ?12, ?13, ?14
            )
            "#,
        )
        .bind(new_return.sale_id)
        .bind(new_return.client_id)
        .bind(new_return.product_id)
        .bind(&new_return.product_name)
        .bind(new_return.quantity)
        .bind(new_return.amount_cents)
        .bind(new_return.credit_cents)
        .bind(new_return.reason.code())
        .bind(&new_return.reason_detail)
        .bind(&new_return.observations)
        .bind(new_return.user_id)
        .bind(new_return.date)
        .bind(ReturnStatus::Completed.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(new_return.clone().into_return(result.last_insert_rowid()))
    }

    /// Inserts an existing record verbatim, id and status included (import).
    pub async fn insert_record(&self, record: &Return) -> DbResult<()> {
        debug!(id = record.id, status = %record.status, "Importing return");

        sqlx::query(
            r#"
            INSERT INTO returns (
                id, sale_id, client_id, product_id, product_name, quantity,
                amount_cents, credit_cents, reason, reason_detail, observations,
                user_id, date, status, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6,
                ?7, ?8, ?9, ?10, ?11,
                ?12, ?13, ?14, ?15
            )
            "#,
        )
        .bind(record.id)
        .bind(record.sale_id)
        .bind(record.client_id)
        .bind(record.product_id)
        .bind(&record.product_name)
        .bind(record.quantity)
        .bind(record.amount_cents)
        .bind(record.credit_cents)
        .bind(record.reason.code())
        .bind(&record.reason_detail)
        .bind(&record.observations)
        .bind(record.user_id)
        .bind(record.date)
        .bind(record.status.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Flips a completed return to `anulada`.
    ///
    /// The status guard makes the flip one-way even if two operators race.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - No completed return with that id
    pub async fn mark_voided(&self, id: i64) -> DbResult<()> {
        debug!(id, "Voiding return");

        let result = sqlx::query(
            r#"
            UPDATE returns SET
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
            return Err(DbError::not_found("Return (completada)", id));
        }

        Ok(())
    }
}

fn return_from_row(row: &SqliteRow) -> DbResult<Return> {
    let status: String = row.try_get("status")?;
    let status = ReturnStatus::from_wire(&status)
        .ok_or_else(|| DbError::invalid_value("returns", "status", status))?;
    let reason: String = row.try_get("reason")?;
    let reason = ReturnReason::from_code(&reason)
        .ok_or_else(|| DbError::invalid_value("returns", "reason", reason))?;
    let date: DateTime<Utc> = row.try_get("date")?;

    Ok(Return {
        id: row.try_get("id")?,
        sale_id: row.try_get("sale_id")?,
        client_id: row.try_get("client_id")?,
        product_id: row.try_get("product_id")?,
        product_name: row.try_get("product_name")?,
        quantity: row.try_get("quantity")?,
        amount_cents: row.try_get("amount_cents")?,
        credit_cents: row.try_get("credit_cents")?,
        reason,
        reason_detail: row.try_get("reason_detail")?,
        observations: row.try_get("observations")?,
        user_id: row.try_get("user_id")?,
        date,
        status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures::{cera_sale, memory_db};
    use chrono::TimeZone;

    fn defective_cera() -> NewReturn {
        NewReturn {
            sale_id: 1,
            client_id: 4,
            product_id: 7,
            product_name: "Cera".to_string(),
            quantity: 1,
            amount_cents: 2_500_000,
            credit_cents: 2_500_000,
            reason: ReturnReason::Defective,
            reason_detail: Some("envase roto".to_string()),
            observations: None,
            user_id: Some(2),
            date: Utc.with_ymd_and_hms(2026, 9, 10, 9, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_completes() {
        let db = memory_db().await;
        db.sales().insert(&cera_sale(1)).await.unwrap();

        let stored = db.returns().insert(&defective_cera()).await.unwrap();
        assert!(stored.id > 0);
        assert_eq!(stored.status, ReturnStatus::Completed);

        let all = db.returns().list().await.unwrap();
        assert_eq!(all, vec![stored.clone()]);
        assert_eq!(db.returns().get_by_id(stored.id).await.unwrap(), Some(stored));
    }

    #[tokio::test]
    async fn test_return_for_unknown_sale_is_rejected() {
        let db = memory_db().await;
        let err = db.returns().insert(&defective_cera()).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_mark_voided_only_once() {
        let db = memory_db().await;
        db.sales().insert(&cera_sale(1)).await.unwrap();
        let stored = db.returns().insert(&defective_cera()).await.unwrap();

        db.returns().mark_voided(stored.id).await.unwrap();
        let voided = db.returns().get_by_id(stored.id).await.unwrap().unwrap();
        assert_eq!(voided.status, ReturnStatus::Voided);

        assert!(db.returns().mark_voided(stored.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_import_keeps_id_and_status() {
        let db = memory_db().await;
        db.sales().insert(&cera_sale(1)).await.unwrap();

        let mut legacy = defective_cera().into_return(40);
        legacy.product_id = None;
        legacy.status = ReturnStatus::Pending;
        db.returns().insert_record(&legacy).await.unwrap();

        assert_eq!(db.returns().get_by_id(40).await.unwrap(), Some(legacy));
    }
}
