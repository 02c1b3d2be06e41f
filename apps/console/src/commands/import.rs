//! # Import Command
//!
//! Loads sales and returns exported by the old backend.
//!
//! ## Flow
//! ```text
//! sales.json ──► wire::parse_sales ───┐
//!                                     ├──► all records typed? ──► insert sales
//! returns.json ─► wire::parse_returns ┘          │ no                 │
//!                                                ▼                    ▼
//!                                        IMPORT_ERROR,         insert returns
//!                                        nothing written
//! ```
//!
//! Records whose id is already stored, and returns whose sale is unknown,
//! are skipped and counted rather than failing the whole import.

use std::path::Path;

use barberia_core::wire::{parse_returns, parse_sales};
use barberia_core::{Return, Sale};
use barberia_db::{Database, DbError};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};

/// Counts of what an import stored and skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub sales_imported: usize,
    pub sales_skipped: usize,
    pub returns_imported: usize,
    pub returns_skipped: usize,
}

impl ImportSummary {
    pub fn render(&self) -> String {
        format!(
            "Sales:   {} imported, {} skipped\nReturns: {} imported, {} skipped\n",
            self.sales_imported, self.sales_skipped, self.returns_imported, self.returns_skipped
        )
    }
}

fn read_file(path: &Path) -> ApiResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| ApiError::import(format!("Cannot read {}: {}", path.display(), e)))
}

/// Reads and imports the given export files.
pub async fn import_files(
    db: &Database,
    sales_path: Option<&Path>,
    returns_path: Option<&Path>,
) -> ApiResult<ImportSummary> {
    let sales_json = sales_path.map(read_file).transpose()?;
    let returns_json = returns_path.map(read_file).transpose()?;
    import_json(db, sales_json.as_deref(), returns_json.as_deref()).await
}

/// Imports raw JSON exports. Both documents are parsed before anything is
/// written.
pub async fn import_json(
    db: &Database,
    sales_json: Option<&str>,
    returns_json: Option<&str>,
) -> ApiResult<ImportSummary> {
    let sales: Vec<Sale> = sales_json.map(parse_sales).transpose()?.unwrap_or_default();
    let returns: Vec<Return> = returns_json.map(parse_returns).transpose()?.unwrap_or_default();

    let mut summary = ImportSummary::default();

    for sale in &sales {
        if !sale.totals_consistent() {
            warn!(sale_id = sale.id, "Imported sale totals do not add up");
        }
        match db.sales().insert(sale).await {
            Ok(()) => summary.sales_imported += 1,
            Err(DbError::UniqueViolation { field, .. }) => {
                warn!(sale_id = sale.id, %field, "Sale already stored; skipped");
                summary.sales_skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    for ret in &returns {
        match db.returns().insert_record(ret).await {
            Ok(()) => summary.returns_imported += 1,
            Err(DbError::UniqueViolation { field, .. }) => {
                warn!(return_id = ret.id, %field, "Return already stored; skipped");
                summary.returns_skipped += 1;
            }
            Err(DbError::ForeignKeyViolation { .. }) => {
                warn!(return_id = ret.id, sale_id = ret.sale_id, "Return for unknown sale; skipped");
                summary.returns_skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    info!(
        sales = summary.sales_imported,
        returns = summary.returns_imported,
        skipped = summary.sales_skipped + summary.returns_skipped,
        "Import finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use barberia_core::ReturnStatus;
    use barberia_db::DbConfig;

    const SALES: &str = r#"{ "$values": [{
        "Id": 1, "NumeroVenta": "V-0001", "ClienteId": 4,
        "Fecha": "2026-09-01T16:00:00Z", "GarantiaMeses": 1,
        "Subtotal": 25000, "Descuento": 0, "Total": 25000, "Estado": "Completada",
        "ProductosDetalle": [ { "ProductoId": 7, "Nombre": "Cera", "Cantidad": 1, "Precio": 25000 } ]
    }] }"#;

    const RETURNS: &str = r#"[
        { "id": 1, "ventaId": 1, "clienteId": 4, "productoId": 7, "nombreProducto": "Cera",
          "cantidad": 1, "motivoCategoria": "producto_defectuoso",
          "montoDevuelto": 25000, "estado": "anulado", "fecha": "2026-09-10T09:00:00Z" },
        { "id": 2, "ventaId": 99, "clienteId": 4, "cantidad": 1,
          "montoDevuelto": 1000, "fecha": "2026-09-10" }
    ]"#;

    #[tokio::test]
    async fn test_import_stores_typed_records() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let summary = import_json(&db, Some(SALES), Some(RETURNS)).await.unwrap();
        assert_eq!(summary.sales_imported, 1);
        assert_eq!(summary.returns_imported, 1);
        assert_eq!(summary.returns_skipped, 1);

        let stored = db.returns().get_by_id(1).await.unwrap().unwrap();
        assert_eq!(stored.status, ReturnStatus::Voided);
        assert_eq!(stored.credit_cents, 2_500_000);
        assert_eq!(db.sales().get_by_id(1).await.unwrap().unwrap().lines.len(), 1);

        // a second run skips everything already stored
        let again = import_json(&db, Some(SALES), Some(RETURNS)).await.unwrap();
        assert_eq!(again.sales_imported, 0);
        assert_eq!(again.sales_skipped, 1);
        assert_eq!(again.returns_skipped, 2);
    }

    #[tokio::test]
    async fn test_malformed_export_writes_nothing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let err = import_json(&db, Some(SALES), Some("[{ \"id\": 1 }]"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ImportError);
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }
}
