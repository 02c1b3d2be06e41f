//! # Return Service
//!
//! Drives the return workflow against the backend and keeps the snapshot
//! the console derives from.
//!
//! ## Creating a Return
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  propose_return(form, now)                                              │
//! │    └── gates run on the snapshot ───────────► PendingReturn             │
//! │                                                   │                     │
//! │  confirm_return(pending, confirmed)               │                     │
//! │    ├── confirmed == false ─────────────────► CANCELLED (no I/O)         │
//! │    ├── backend.insert_return ── fails ─────► error, nothing written     │
//! │    ├── stock.adjust_stock ───── fails ─────► logged, stage Persisted    │
//! │    ├── reload snapshot ──────── fails ─────► logged, snapshot_stale     │
//! │    └───────────────────────────────────────► ReturnOutcome              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A stock failure after the return is stored does not undo the return.
//! The outcome reports `stock_adjusted: false` so the operator can fix the
//! stock by hand. Likewise a failed reload after any completed change is
//! reported as `snapshot_stale: true`, never as a failed change.

use barberia_core::credit::{applicable_credit, balances_by_client, credit_balance, offers_credit};
use barberia_core::reconcile::{reconcile, ReconciledSale};
use barberia_core::returns::{
    self, check_sale_void, find_return, find_sale, plan_void, Confirmation, PendingReturn,
    QuantityPolicy, ReturnStage,
};
use barberia_core::validation::{parse_positive_id, ReturnForm};
use barberia_core::{Money, Return, ReturnValidationError, StockAdjustment};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::error::{ApiError, ApiResult};
use crate::service::backend::{ReturnBackend, StockService};
use crate::state::Snapshot;

// =============================================================================
// Outcomes
// =============================================================================

/// Result of a confirmed return creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnOutcome {
    #[serde(rename = "return")]
    pub record: Return,
    /// `StockAdjusted` when both steps succeeded, `Persisted` when only
    /// the return was stored.
    pub stage: ReturnStage,
    pub stock_adjusted: bool,
    pub adjustment: StockAdjustment,
    /// The return is stored but the views were not refreshed.
    pub snapshot_stale: bool,
}

/// Result of voiding a return.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoidOutcome {
    pub return_id: i64,
    /// Credit the client lost with this void.
    pub credit_reversed: Money,
    pub reversal: Option<StockAdjustment>,
    pub stock_adjusted: bool,
    pub snapshot_stale: bool,
}

/// Result of voiding a sale.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleVoidOutcome {
    pub sale_id: i64,
    pub snapshot_stale: bool,
}

/// A client's store credit, optionally measured against a new sale.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditSummary {
    pub client_id: i64,
    pub client_name: String,
    pub balance: Money,
    /// Whether the "use store credit" option is offered at checkout.
    pub offers_credit: bool,
    /// `min(sale_total, balance)` when a sale total was given.
    pub applicable: Option<Money>,
}

/// One row of the balances listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientBalance {
    pub client_id: i64,
    pub client_name: String,
    pub balance: Money,
}

// =============================================================================
// Service
// =============================================================================

/// Return workflow over a record store `B` and a stock service `S`.
#[derive(Debug)]
pub struct ReturnService<B, S> {
    backend: B,
    stock: S,
    policy: QuantityPolicy,
    snapshot: Snapshot,
}

impl<B: ReturnBackend, S: StockService> ReturnService<B, S> {
    /// Creates the service and loads the first snapshot.
    pub async fn load(backend: B, stock: S, policy: QuantityPolicy) -> ApiResult<Self> {
        let snapshot = Snapshot::load(&backend).await?;
        Ok(ReturnService {
            backend,
            stock,
            policy,
            snapshot,
        })
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn policy(&self) -> QuantityPolicy {
        self.policy
    }

    /// Reloads the snapshot after a change the backend already accepted.
    ///
    /// Returns `true` when the reload failed and the old snapshot is kept.
    async fn refresh_after_change(&mut self) -> bool {
        match Snapshot::load(&self.backend).await {
            Ok(snapshot) => {
                self.snapshot = snapshot;
                false
            }
            Err(e) => {
                error!(error = %e, "Snapshot reload failed after a completed change; views are stale");
                true
            }
        }
    }

    // -------------------------------------------------------------------------
    // Return creation
    // -------------------------------------------------------------------------

    /// Runs the gates on `form`. Nothing is written.
    pub fn propose_return(&self, form: &ReturnForm, now: DateTime<Utc>) -> ApiResult<PendingReturn> {
        let sale_id = parse_positive_id(&form.sale_id, ReturnValidationError::InvalidSaleId)?;
        let sale = find_sale(&self.snapshot.sales, sale_id)?;

        let pending = returns::propose(form, sale, &self.snapshot.returns, self.policy, now)
            .inspect_err(|e| debug!(sale_id, error = %e, "Return proposal rejected"))?;

        debug!(
            token = %pending.token(),
            sale_id,
            product_id = pending.validated().product_id,
            quantity = pending.validated().quantity,
            amount = %pending.amount(),
            "Return proposed"
        );
        Ok(pending)
    }

    /// Persists `pending` if the operator confirmed it, then moves the
    /// returned units into the pool the reason routes them to.
    pub async fn confirm_return(
        &mut self,
        pending: PendingReturn,
        confirmed: bool,
    ) -> ApiResult<ReturnOutcome> {
        let token = pending.token();
        let confirmation = if confirmed {
            Confirmation::accept(&pending)
        } else {
            Confirmation::decline(&pending)
        };

        let confirmed = returns::confirm(pending, confirmation).inspect_err(|_| {
            info!(%token, "Return cancelled by operator");
        })?;
        let (new_return, adjustment) = confirmed.into_parts();

        let record = self.backend.insert_return(&new_return).await.map_err(|e| {
            error!(sale_id = new_return.sale_id, error = %e, "Failed to persist return");
            ApiError::from(e)
        })?;
        info!(
            return_id = record.id,
            sale_id = record.sale_id,
            client_id = record.client_id,
            credit = %record.credit(),
            "Return persisted"
        );

        let stock_adjusted = self.apply_stock(record.id, adjustment).await;
        let snapshot_stale = self.refresh_after_change().await;

        Ok(ReturnOutcome {
            record,
            stage: if stock_adjusted {
                ReturnStage::StockAdjusted
            } else {
                ReturnStage::Persisted
            },
            stock_adjusted,
            adjustment,
            snapshot_stale,
        })
    }

    // -------------------------------------------------------------------------
    // Voiding
    // -------------------------------------------------------------------------

    /// Voids a completed return and reverses its stock movement.
    ///
    /// Already voided returns are rejected before anything is sent.
    pub async fn void_return(&mut self, id: i64) -> ApiResult<VoidOutcome> {
        let target = find_return(&self.snapshot.returns, id)?;
        let plan = plan_void(target)?;
        let credit_reversed = target.credit();

        self.backend.void_return(id).await.map_err(|e| {
            error!(return_id = id, error = %e, "Failed to void return");
            ApiError::from(e)
        })?;
        info!(return_id = id, credit = %credit_reversed, "Return voided");

        let stock_adjusted = match plan.stock {
            Some(reversal) => self.apply_stock(id, reversal).await,
            None => {
                warn!(return_id = id, "Return has no product id; stock not reversed");
                false
            }
        };

        let snapshot_stale = self.refresh_after_change().await;

        Ok(VoidOutcome {
            return_id: id,
            credit_reversed,
            reversal: plan.stock,
            stock_adjusted,
            snapshot_stale,
        })
    }

    /// Voids a completed sale. Its returns are left as they are.
    pub async fn void_sale(&mut self, id: i64) -> ApiResult<SaleVoidOutcome> {
        check_sale_void(find_sale(&self.snapshot.sales, id)?)?;

        self.backend.void_sale(id).await.map_err(|e| {
            error!(sale_id = id, error = %e, "Failed to void sale");
            ApiError::from(e)
        })?;
        info!(sale_id = id, "Sale voided");

        Ok(SaleVoidOutcome {
            sale_id: id,
            snapshot_stale: self.refresh_after_change().await,
        })
    }

    async fn apply_stock(&self, return_id: i64, adjustment: StockAdjustment) -> bool {
        match self.stock.adjust_stock(adjustment).await {
            Ok(levels) => {
                info!(
                    return_id,
                    product_id = adjustment.product_id,
                    pool = adjustment.pool.code(),
                    delta = adjustment.direction.signed(adjustment.quantity),
                    level = levels.get(adjustment.pool),
                    "Stock adjusted"
                );
                true
            }
            Err(e) => {
                error!(
                    return_id,
                    product_id = adjustment.product_id,
                    pool = adjustment.pool.code(),
                    quantity = adjustment.quantity,
                    error = %e,
                    "Stock adjustment failed; return stays recorded"
                );
                false
            }
        }
    }

    // -------------------------------------------------------------------------
    // Derived views
    // -------------------------------------------------------------------------

    /// Store credit of one client, optionally capped by a new sale total.
    pub fn client_credit(&self, client_id: i64, sale_total: Option<Money>) -> CreditSummary {
        let balance = credit_balance(&self.snapshot.returns, client_id);
        CreditSummary {
            client_id,
            client_name: self.snapshot.client_name(client_id),
            balance,
            offers_credit: offers_credit(balance),
            applicable: sale_total.map(|total| applicable_credit(total, balance)),
        }
    }

    /// Adjusted view of one sale.
    pub fn reconcile_sale(&self, sale_id: i64) -> ApiResult<ReconciledSale> {
        let sale = find_sale(&self.snapshot.sales, sale_id)?;
        Ok(reconcile(sale, &self.snapshot.returns))
    }

    /// Every client holding credit, largest balance first.
    pub fn client_balances(&self) -> Vec<ClientBalance> {
        let mut balances: Vec<ClientBalance> = balances_by_client(&self.snapshot.returns)
            .into_iter()
            .map(|(client_id, balance)| ClientBalance {
                client_id,
                client_name: self.snapshot.client_name(client_id),
                balance,
            })
            .collect();
        balances.sort_by(|a, b| b.balance.cmp(&a.balance).then(a.client_id.cmp(&b.client_id)));
        balances
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::service::backend::{MockReturnBackend, MockStockService};
    use barberia_core::{
        Client, LineKind, PaymentMethod, Product, ReturnReason, ReturnStatus, Sale, SaleLine,
        SaleStatus, StockLevels, StockPool,
    };
    use barberia_db::{Database, DbConfig, DbError};
    use chrono::TimeZone;

    fn sale_date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 9, 1, 16, 0, 0).unwrap()
    }

    fn today() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 9, 10, 9, 0, 0).unwrap()
    }

    /// Sale #1: one Cera at 25.000, one month of warranty.
    fn cera_sale() -> Sale {
        Sale {
            id: 1,
            sale_number: "V-0001".to_string(),
            client_id: 4,
            document: None,
            date: sale_date(),
            payment_method: PaymentMethod::Cash,
            warranty_months: 1,
            discount_percent: 0,
            subtotal_cents: 2_500_000,
            tax_cents: 0,
            discount_cents: 0,
            total_cents: 2_500_000,
            status: SaleStatus::Completed,
            lines: vec![SaleLine {
                kind: LineKind::Product,
                item_id: Some(7),
                name: "Cera".to_string(),
                unit_price_cents: 2_500_000,
                quantity: 1,
            }],
        }
    }

    fn form(quantity: &str, reason: &str) -> ReturnForm {
        ReturnForm {
            sale_id: "1".to_string(),
            client_id: "4".to_string(),
            product_id: "7".to_string(),
            quantity: quantity.to_string(),
            reason: reason.to_string(),
            ..ReturnForm::default()
        }
    }

    fn stored_return(id: i64, status: ReturnStatus) -> Return {
        Return {
            id,
            sale_id: 1,
            client_id: 4,
            product_id: Some(7),
            product_name: "Cera".to_string(),
            quantity: 1,
            amount_cents: 2_500_000,
            credit_cents: 2_500_000,
            reason: ReturnReason::Defective,
            reason_detail: None,
            observations: None,
            user_id: None,
            date: today(),
            status,
        }
    }

    fn mock_backend(sales: Vec<Sale>, returns: Vec<Return>) -> MockReturnBackend {
        let mut backend = MockReturnBackend::new();
        backend
            .expect_list_sales()
            .returning(move || Ok(sales.clone()));
        backend
            .expect_list_returns()
            .returning(move || Ok(returns.clone()));
        backend.expect_list_clients().returning(|| Ok(Vec::new()));
        backend.expect_list_products().returning(|| Ok(Vec::new()));
        backend
    }

    async fn memory_service() -> ReturnService<Database, Database> {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.clients()
            .insert(&Client {
                id: 4,
                name: "Mateo Giraldo".to_string(),
                document: None,
            })
            .await
            .unwrap();
        db.products()
            .insert(&Product {
                id: 7,
                name: "Cera".to_string(),
                price_cents: 2_500_000,
                stock: StockLevels { sellable: 5, supplies: 0 },
                is_active: true,
            })
            .await
            .unwrap();
        db.sales().insert(&cera_sale()).await.unwrap();

        ReturnService::load(db.clone(), db, QuantityPolicy::Outstanding)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_declined_confirmation_never_reaches_backend() {
        let mut backend = mock_backend(vec![cera_sale()], Vec::new());
        backend.expect_insert_return().never();
        let mut stock = MockStockService::new();
        stock.expect_adjust_stock().never();

        let mut service = ReturnService::load(backend, stock, QuantityPolicy::Outstanding)
            .await
            .unwrap();
        let pending = service
            .propose_return(&form("1", "producto_defectuoso"), today())
            .unwrap();

        let err = service.confirm_return(pending, false).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Cancelled);
    }

    #[tokio::test]
    async fn test_gate_failures_never_reach_backend() {
        let mut backend = mock_backend(vec![cera_sale()], Vec::new());
        backend.expect_insert_return().never();
        let service = ReturnService::load(backend, MockStockService::new(), QuantityPolicy::Outstanding)
            .await
            .unwrap();

        for quantity in ["0", "-1", "uno", "2"] {
            let err = service
                .propose_return(&form(quantity, "producto_defectuoso"), today())
                .unwrap_err();
            assert_eq!(err.code, ErrorCode::ValidationError, "quantity {quantity}");
            assert_eq!(err.field, Some("cantidad"));
        }

        let err = service.propose_return(&form("1", ""), today()).unwrap_err();
        assert_eq!(err.field, Some("motivoCategoria"));

        let mut unknown_sale = form("1", "otros");
        unknown_sale.sale_id = "99".to_string();
        let err = service.propose_return(&unknown_sale, today()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_expired_warranty_is_rejected_first() {
        let service = ReturnService::load(
            mock_backend(vec![cera_sale()], Vec::new()),
            MockStockService::new(),
            QuantityPolicy::Outstanding,
        )
        .await
        .unwrap();

        let late = Utc.with_ymd_and_hms(2026, 10, 1, 16, 0, 1).unwrap();
        // quantity is also invalid, but the warranty gate runs first
        let err = service.propose_return(&form("0", ""), late).unwrap_err();
        assert_eq!(err.field, Some("ventaId"));
        assert!(err.message.contains("expired"));
    }

    #[tokio::test]
    async fn test_stock_failure_keeps_persisted_return() {
        let mut backend = mock_backend(vec![cera_sale()], Vec::new());
        backend
            .expect_insert_return()
            .once()
            .withf(|r| r.product_id == 7 && r.credit_cents == 2_500_000)
            .returning(|r| Ok(r.clone().into_return(41)));
        let mut stock = MockStockService::new();
        stock
            .expect_adjust_stock()
            .once()
            .withf(|adj| adj.pool == StockPool::Supplies && adj.quantity == 1)
            .returning(|_| Err(DbError::QueryFailed("disk I/O error".to_string())));

        let mut service = ReturnService::load(backend, stock, QuantityPolicy::Outstanding)
            .await
            .unwrap();
        let pending = service
            .propose_return(&form("1", "producto_defectuoso"), today())
            .unwrap();
        let outcome = service.confirm_return(pending, true).await.unwrap();

        assert_eq!(outcome.record.id, 41);
        assert_eq!(outcome.stage, ReturnStage::Persisted);
        assert!(!outcome.stock_adjusted);
        assert!(!outcome.snapshot_stale);
    }

    #[tokio::test]
    async fn test_failed_reload_does_not_fail_a_stored_return() {
        let mut backend = MockReturnBackend::new();
        backend.expect_list_sales().returning(|| Ok(vec![cera_sale()]));
        backend.expect_list_clients().returning(|| Ok(Vec::new()));
        backend.expect_list_products().returning(|| Ok(Vec::new()));
        let mut loads = 0;
        backend.expect_list_returns().returning(move || {
            loads += 1;
            if loads == 1 {
                Ok(Vec::new())
            } else {
                Err(DbError::ConnectionFailed("database is locked".to_string()))
            }
        });
        backend
            .expect_insert_return()
            .once()
            .returning(|r| Ok(r.clone().into_return(42)));
        let mut stock = MockStockService::new();
        stock
            .expect_adjust_stock()
            .once()
            .returning(|_| Ok(StockLevels { sellable: 5, supplies: 1 }));

        let mut service = ReturnService::load(backend, stock, QuantityPolicy::Outstanding)
            .await
            .unwrap();
        let pending = service
            .propose_return(&form("1", "producto_defectuoso"), today())
            .unwrap();
        let outcome = service.confirm_return(pending, true).await.unwrap();

        assert_eq!(outcome.record.id, 42);
        assert_eq!(outcome.stage, ReturnStage::StockAdjusted);
        assert!(outcome.snapshot_stale);
        assert!(service.snapshot().returns.is_empty());
    }

    #[tokio::test]
    async fn test_return_for_another_client_never_reaches_backend() {
        let mut backend = mock_backend(vec![cera_sale()], Vec::new());
        backend.expect_insert_return().never();
        let service = ReturnService::load(backend, MockStockService::new(), QuantityPolicy::Outstanding)
            .await
            .unwrap();

        let mut other_client = form("1", "producto_defectuoso");
        other_client.client_id = "99".to_string();
        let err = service.propose_return(&other_client, today()).unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.field, Some("clienteId"));
    }

    #[tokio::test]
    async fn test_backend_failure_aborts_before_stock() {
        let mut backend = mock_backend(vec![cera_sale()], Vec::new());
        backend
            .expect_insert_return()
            .once()
            .returning(|_| Err(DbError::ConnectionFailed("offline".to_string())));
        let mut stock = MockStockService::new();
        stock.expect_adjust_stock().never();

        let mut service = ReturnService::load(backend, stock, QuantityPolicy::Outstanding)
            .await
            .unwrap();
        let pending = service
            .propose_return(&form("1", "cambio_opinion"), today())
            .unwrap();

        let err = service.confirm_return(pending, true).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }

    #[tokio::test]
    async fn test_void_already_voided_never_reaches_backend() {
        let mut backend = mock_backend(
            vec![cera_sale()],
            vec![stored_return(5, ReturnStatus::Voided)],
        );
        backend.expect_void_return().never();
        let mut stock = MockStockService::new();
        stock.expect_adjust_stock().never();

        let mut service = ReturnService::load(backend, stock, QuantityPolicy::Outstanding)
            .await
            .unwrap();

        let err = service.void_return(5).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);

        let err = service.void_return(6).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.message, "Could not identify return 6");
    }

    #[tokio::test]
    async fn test_void_pending_return_is_rejected() {
        let mut backend = mock_backend(
            vec![cera_sale()],
            vec![stored_return(5, ReturnStatus::Pending)],
        );
        backend.expect_void_return().never();

        let mut service = ReturnService::load(backend, MockStockService::new(), QuantityPolicy::Outstanding)
            .await
            .unwrap();
        let err = service.void_return(5).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
    }

    #[tokio::test]
    async fn test_void_reverses_the_pool_it_filled() {
        let mut backend = mock_backend(
            vec![cera_sale()],
            vec![stored_return(5, ReturnStatus::Completed)],
        );
        backend
            .expect_void_return()
            .once()
            .withf(|id| *id == 5)
            .returning(|_| Ok(()));
        let mut stock = MockStockService::new();
        stock
            .expect_adjust_stock()
            .once()
            .withf(|adj| adj.pool == StockPool::Supplies && adj.direction.signed(adj.quantity) == -1)
            .returning(|_| Ok(StockLevels { sellable: 5, supplies: 0 }));

        let mut service = ReturnService::load(backend, stock, QuantityPolicy::Outstanding)
            .await
            .unwrap();
        let outcome = service.void_return(5).await.unwrap();
        assert!(outcome.stock_adjusted);
        assert!(!outcome.snapshot_stale);
        assert_eq!(outcome.credit_reversed, Money::from_pesos(25_000));
    }

    #[tokio::test]
    async fn test_cera_scenario_end_to_end() {
        let mut service = memory_service().await;
        assert_eq!(service.client_credit(4, None).balance, Money::zero());

        let pending = service
            .propose_return(&form("1", "producto_defectuoso"), today())
            .unwrap();
        assert_eq!(pending.amount(), Money::from_pesos(25_000));

        let outcome = service.confirm_return(pending, true).await.unwrap();
        assert_eq!(outcome.stage, ReturnStage::StockAdjusted);
        assert_eq!(outcome.record.status, ReturnStatus::Completed);

        let credit = service.client_credit(4, Some(Money::from_pesos(18_000)));
        assert_eq!(credit.balance, Money::from_pesos(25_000));
        assert!(credit.offers_credit);
        assert_eq!(credit.applicable, Some(Money::from_pesos(18_000)));
        assert_eq!(credit.client_name, "Mateo Giraldo");

        let view = service.reconcile_sale(1).unwrap();
        assert_eq!(view.lines[0].adjusted_quantity, 0);
        assert_eq!(view.adjusted_subtotal(), Money::zero());
        assert_eq!(view.adjusted_total(), Money::zero());

        let cera = service.snapshot().product(7).unwrap();
        assert_eq!(cera.stock, StockLevels { sellable: 5, supplies: 1 });

        // voiding gives the credit and the insumo unit back
        let outcome = service.void_return(outcome.record.id).await.unwrap();
        assert!(outcome.stock_adjusted);
        assert_eq!(service.client_credit(4, None).balance, Money::zero());
        assert!(service.client_balances().is_empty());
        assert_eq!(
            service.snapshot().product(7).unwrap().stock,
            StockLevels { sellable: 5, supplies: 0 }
        );
        assert_eq!(service.reconcile_sale(1).unwrap().lines[0].adjusted_quantity, 1);

        let err = service.void_return(outcome.return_id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
    }

    #[tokio::test]
    async fn test_change_of_mind_goes_back_to_sellable() {
        let mut service = memory_service().await;
        let pending = service
            .propose_return(&form("1", "cambio_opinion"), today())
            .unwrap();
        service.confirm_return(pending, true).await.unwrap();

        assert_eq!(
            service.snapshot().product(7).unwrap().stock,
            StockLevels { sellable: 6, supplies: 0 }
        );
    }

    #[tokio::test]
    async fn test_cumulative_check_blocks_second_return() {
        let mut service = memory_service().await;
        let pending = service.propose_return(&form("1", "otros"), today()).unwrap();
        service.confirm_return(pending, true).await.unwrap();

        let err = service.propose_return(&form("1", "otros"), today()).unwrap_err();
        assert_eq!(err.field, Some("cantidad"));

        // with the check off only the sold quantity bounds the request
        service.policy = QuantityPolicy::SoldQuantity;
        assert!(service.propose_return(&form("1", "otros"), today()).is_ok());
    }

    #[tokio::test]
    async fn test_voided_sale_takes_no_returns() {
        let mut service = memory_service().await;
        let outcome = service.void_sale(1).await.unwrap();
        assert!(!outcome.snapshot_stale);

        let err = service.propose_return(&form("1", "otros"), today()).unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);

        let err = service.void_sale(1).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
    }

    #[tokio::test]
    async fn test_balances_sorted_by_amount() {
        let mut small = stored_return(1, ReturnStatus::Completed);
        small.client_id = 2;
        small.credit_cents = 900_000;
        let big = stored_return(2, ReturnStatus::Completed);
        let voided = stored_return(3, ReturnStatus::Voided);

        let service = ReturnService::load(
            mock_backend(vec![cera_sale()], vec![small, big, voided]),
            MockStockService::new(),
            QuantityPolicy::Outstanding,
        )
        .await
        .unwrap();

        let balances = service.client_balances();
        assert_eq!(balances.len(), 2);
        assert_eq!(balances[0].client_id, 4);
        assert_eq!(balances[0].balance, Money::from_pesos(25_000));
        assert_eq!(balances[1].client_name, "#2");
    }
}
