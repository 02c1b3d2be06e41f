//! # Domain Types
//!
//! Strongly-typed model the business logic runs on. Records from the backend
//! are converted into these by [`crate::wire`] before anything else sees them.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Sale       │   │     Return      │   │    Product      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id, number     │   │  id, sale_id    │   │  id, name       │       │
//! │  │  client_id      │◄──│  client_id      │   │  StockLevels    │       │
//! │  │  warranty       │   │  product_id     │──►│   sellable      │       │
//! │  │  lines[]        │   │  quantity       │   │   supplies      │       │
//! │  │  SaleStatus     │   │  ReturnStatus   │   └─────────────────┘       │
//! │  └─────────────────┘   │  ReturnReason ──┼──► StockPool               │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Lifecycles
//! Both sales and returns have exactly one allowed transition,
//! `Completed → Voided`. Everything else is rejected.

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Return Status
// =============================================================================

/// Canonical lifecycle state of a return (devolución).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ReturnStatus {
    /// Return accepted; generates store credit.
    Completed,
    /// Return cancelled; terminal.
    Voided,
    /// Awaiting processing.
    Pending,
    /// Processed by the back office.
    Processed,
}

impl ReturnStatus {
    /// Storage code for this status.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ReturnStatus::Completed => "completada",
            ReturnStatus::Voided => "anulada",
            ReturnStatus::Pending => "pendiente",
            ReturnStatus::Processed => "procesado",
        }
    }

    /// Normalizes a raw status string as seen on the wire.
    ///
    /// ```text
    /// activo | completada | completado  → Completed
    /// anulada | anulado                 → Voided
    /// pendiente                         → Pending
    /// procesado                         → Processed
    /// ```
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    pub fn from_wire(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "activo" | "activa" | "completada" | "completado" => Some(ReturnStatus::Completed),
            "anulada" | "anulado" => Some(ReturnStatus::Voided),
            "pendiente" => Some(ReturnStatus::Pending),
            "procesado" | "procesada" => Some(ReturnStatus::Processed),
            _ => None,
        }
    }

    /// Transition table: only `Completed → Voided` is allowed.
    pub const fn can_transition_to(&self, next: ReturnStatus) -> bool {
        matches!((self, next), (ReturnStatus::Completed, ReturnStatus::Voided))
    }

    /// Whether a return in this status contributes to store credit.
    #[inline]
    pub const fn generates_credit(&self) -> bool {
        matches!(self, ReturnStatus::Completed)
    }

    /// Whether a return in this status reduces the sale's remaining quantities.
    #[inline]
    pub const fn reduces_sale(&self) -> bool {
        !matches!(self, ReturnStatus::Voided)
    }
}

impl fmt::Display for ReturnStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Return Reason
// =============================================================================

/// Closed set of reason categories (motivo) a return can be filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ReturnReason {
    /// `producto_defectuoso`
    Defective,
    /// `error_compra`
    PurchaseError,
    /// `producto_vencido`
    Expired,
    /// `reaccion_alergica`
    AllergicReaction,
    /// `no_conforme`
    NotSatisfied,
    /// `cambio_opinion`
    ChangedMind,
    /// `otros`
    Other,
}

impl ReturnReason {
    /// Every reason, in form display order.
    pub const ALL: [ReturnReason; 7] = [
        ReturnReason::Defective,
        ReturnReason::PurchaseError,
        ReturnReason::Expired,
        ReturnReason::AllergicReaction,
        ReturnReason::NotSatisfied,
        ReturnReason::ChangedMind,
        ReturnReason::Other,
    ];

    /// Wire/storage code.
    pub const fn code(&self) -> &'static str {
        match self {
            ReturnReason::Defective => "producto_defectuoso",
            ReturnReason::PurchaseError => "error_compra",
            ReturnReason::Expired => "producto_vencido",
            ReturnReason::AllergicReaction => "reaccion_alergica",
            ReturnReason::NotSatisfied => "no_conforme",
            ReturnReason::ChangedMind => "cambio_opinion",
            ReturnReason::Other => "otros",
        }
    }

    /// Parses a reason code. The short form `defectuoso` used by older
    /// forms is accepted as an alias of `producto_defectuoso`.
    pub fn from_code(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "producto_defectuoso" | "defectuoso" => Some(ReturnReason::Defective),
            "error_compra" => Some(ReturnReason::PurchaseError),
            "producto_vencido" | "vencido" => Some(ReturnReason::Expired),
            "reaccion_alergica" => Some(ReturnReason::AllergicReaction),
            "no_conforme" => Some(ReturnReason::NotSatisfied),
            "cambio_opinion" => Some(ReturnReason::ChangedMind),
            "otros" => Some(ReturnReason::Other),
            _ => None,
        }
    }

    /// Human label shown in the console.
    pub const fn label(&self) -> &'static str {
        match self {
            ReturnReason::Defective => "Producto defectuoso",
            ReturnReason::PurchaseError => "Error en la compra",
            ReturnReason::Expired => "Producto vencido",
            ReturnReason::AllergicReaction => "Reacción alérgica",
            ReturnReason::NotSatisfied => "No conforme",
            ReturnReason::ChangedMind => "Cambio de opinión",
            ReturnReason::Other => "Otros",
        }
    }

    /// Stock pool that receives the returned units.
    ///
    /// Defective and expired units never go back on the shelf; they land in
    /// the insumos pool. Everything else is sellable again.
    pub const fn stock_pool(&self) -> StockPool {
        match self {
            ReturnReason::Defective | ReturnReason::Expired => StockPool::Supplies,
            _ => StockPool::Sellable,
        }
    }
}

impl fmt::Display for ReturnReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// =============================================================================
// Stock
// =============================================================================

/// The two disjoint stock pools tracked per product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StockPool {
    /// Sellable inventory (`ventas`).
    Sellable,
    /// Non-sellable pool for defective/expired units (`insumos`).
    Supplies,
}

impl StockPool {
    /// Wire code used by the stock collaborator.
    pub const fn code(&self) -> &'static str {
        match self {
            StockPool::Sellable => "ventas",
            StockPool::Supplies => "insumos",
        }
    }
}

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StockDirection {
    Increment,
    Decrement,
}

impl StockDirection {
    /// Signed delta for `quantity` units.
    pub const fn signed(&self, quantity: i64) -> i64 {
        match self {
            StockDirection::Increment => quantity,
            StockDirection::Decrement => -quantity,
        }
    }
}

/// A compensating stock movement produced by creating or voiding a return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StockAdjustment {
    pub product_id: i64,
    pub quantity: i64,
    pub direction: StockDirection,
    pub pool: StockPool,
}

/// Current stock of a product in both pools.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StockLevels {
    pub sellable: i64,
    pub supplies: i64,
}

impl StockLevels {
    /// Returns the level of one pool.
    pub const fn get(&self, pool: StockPool) -> i64 {
        match pool {
            StockPool::Sellable => self.sellable,
            StockPool::Supplies => self.supplies,
        }
    }

    /// Applies an adjustment to the matching pool.
    pub fn apply(&mut self, adjustment: &StockAdjustment) {
        let delta = adjustment.direction.signed(adjustment.quantity);
        match adjustment.pool {
            StockPool::Sellable => self.sellable += delta,
            StockPool::Supplies => self.supplies += delta,
        }
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// A barbershop client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: i64,
    pub name: String,
    /// National ID document number.
    pub document: Option<String>,
}

/// A product sold over the counter (wax, shampoo, razors...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price_cents: i64,
    pub stock: StockLevels,
    pub is_active: bool,
}

impl Product {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Sale
// =============================================================================

/// The status of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    Completed,
    /// Terminal.
    Voided,
}

impl SaleStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Completed => "completada",
            SaleStatus::Voided => "anulada",
        }
    }

    /// Normalizes a raw sale status from the wire.
    pub fn from_wire(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "activo" | "activa" | "completada" | "completado" => Some(SaleStatus::Completed),
            "anulada" | "anulado" => Some(SaleStatus::Voided),
            _ => None,
        }
    }

    /// Only `Completed → Voided` is allowed.
    pub const fn can_transition_to(&self, next: SaleStatus) -> bool {
        matches!((self, next), (SaleStatus::Completed, SaleStatus::Voided))
    }
}

impl fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the client paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
    /// Paid (fully or partly) with saldo a favor.
    StoreCredit,
}

impl PaymentMethod {
    pub const fn code(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "efectivo",
            PaymentMethod::Card => "tarjeta",
            PaymentMethod::Transfer => "transferencia",
            PaymentMethod::StoreCredit => "saldo_a_favor",
        }
    }

    /// Lenient parse; unknown methods fall back to cash like the front desk does.
    pub fn from_code(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "tarjeta" | "card" | "credito" | "debito" => PaymentMethod::Card,
            "transferencia" | "transfer" => PaymentMethod::Transfer,
            "saldo_a_favor" | "saldoafavor" | "saldo" => PaymentMethod::StoreCredit,
            _ => PaymentMethod::Cash,
        }
    }
}

/// What a sale line refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Product,
    Service,
    Package,
}

impl LineKind {
    pub const fn code(&self) -> &'static str {
        match self {
            LineKind::Product => "producto",
            LineKind::Service => "servicio",
            LineKind::Package => "paquete",
        }
    }

    pub fn from_code(raw: &str) -> Option<Self> {
        match raw {
            "producto" => Some(LineKind::Product),
            "servicio" => Some(LineKind::Service),
            "paquete" => Some(LineKind::Package),
            _ => None,
        }
    }
}

/// A line item frozen at sale time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleLine {
    pub kind: LineKind,
    /// Product, service or package id. `None` on legacy records that only
    /// carry a display name.
    pub item_id: Option<i64>,
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: i64,
}

impl SaleLine {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }

    #[inline]
    pub fn is_product(&self) -> bool {
        self.kind == LineKind::Product
    }
}

/// A completed (or voided) sale.
///
/// Monetary fields are fixed at creation; only `status` ever changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: i64,
    pub sale_number: String,
    pub client_id: i64,
    pub document: Option<String>,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub payment_method: PaymentMethod,
    /// Warranty window in months; 0 means no returns are accepted.
    pub warranty_months: u32,
    /// Discount percentage shown on the receipt.
    pub discount_percent: u32,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub status: SaleStatus,
    pub lines: Vec<SaleLine>,
}

impl Sale {
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    #[inline]
    pub fn discount(&self) -> Money {
        Money::from_cents(self.discount_cents)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// `total = subtotal + tax − discount`.
    pub fn totals_consistent(&self) -> bool {
        self.subtotal_cents + self.tax_cents - self.discount_cents == self.total_cents
    }

    /// Product lines in sale order.
    pub fn product_lines(&self) -> impl Iterator<Item = &SaleLine> {
        self.lines.iter().filter(|line| line.is_product())
    }

    /// Total quantity of `product_id` sold on this sale.
    pub fn sold_quantity(&self, product_id: i64) -> i64 {
        self.product_lines()
            .filter(|line| line.item_id == Some(product_id))
            .map(|line| line.quantity)
            .sum()
    }

    /// First product line for `product_id`.
    pub fn product_line(&self, product_id: i64) -> Option<&SaleLine> {
        self.product_lines().find(|line| line.item_id == Some(product_id))
    }

    /// Instant the warranty ends, or `None` when the sale has no warranty.
    ///
    /// Calendar months are added to the full timestamp, so a sale at
    /// 2026-01-31 10:00 with one month expires 2026-02-28 10:00.
    pub fn warranty_expires_at(&self) -> Option<DateTime<Utc>> {
        if self.warranty_months == 0 {
            return None;
        }
        self.date.checked_add_months(Months::new(self.warranty_months))
    }

    #[inline]
    pub fn is_voided(&self) -> bool {
        self.status == SaleStatus::Voided
    }
}

// =============================================================================
// Return
// =============================================================================

/// A client returning a quantity of one product from one sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Return {
    pub id: i64,
    pub sale_id: i64,
    pub client_id: i64,
    /// `None` on legacy records; reconciliation then matches by name.
    pub product_id: Option<i64>,
    pub product_name: String,
    pub quantity: i64,
    /// Monto devuelto.
    pub amount_cents: i64,
    /// Saldo a favor generated by this return.
    pub credit_cents: i64,
    pub reason: ReturnReason,
    pub reason_detail: Option<String>,
    pub observations: Option<String>,
    pub user_id: Option<i64>,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub status: ReturnStatus,
}

impl Return {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }

    #[inline]
    pub fn credit(&self) -> Money {
        Money::from_cents(self.credit_cents)
    }

    /// Unit price derived as `amount / quantity`.
    #[inline]
    pub fn unit_price(&self) -> Money {
        self.amount().per_unit(self.quantity)
    }
}

/// A validated, confirmed return ready to be persisted (no id yet).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewReturn {
    pub sale_id: i64,
    pub client_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub amount_cents: i64,
    pub credit_cents: i64,
    pub reason: ReturnReason,
    pub reason_detail: Option<String>,
    pub observations: Option<String>,
    pub user_id: Option<i64>,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
}

impl NewReturn {
    /// Materializes the stored record once the backend assigned an id.
    pub fn into_return(self, id: i64) -> Return {
        Return {
            id,
            sale_id: self.sale_id,
            client_id: self.client_id,
            product_id: Some(self.product_id),
            product_name: self.product_name,
            quantity: self.quantity,
            amount_cents: self.amount_cents,
            credit_cents: self.credit_cents,
            reason: self.reason,
            reason_detail: self.reason_detail,
            observations: self.observations,
            user_id: self.user_id,
            date: self.date,
            status: ReturnStatus::Completed,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_return_status_synonyms() {
        for raw in ["activo", "Completada", " completado "] {
            assert_eq!(ReturnStatus::from_wire(raw), Some(ReturnStatus::Completed));
        }
        assert_eq!(ReturnStatus::from_wire("ANULADO"), Some(ReturnStatus::Voided));
        assert_eq!(ReturnStatus::from_wire("pendiente"), Some(ReturnStatus::Pending));
        assert_eq!(ReturnStatus::from_wire("procesado"), Some(ReturnStatus::Processed));
        assert_eq!(ReturnStatus::from_wire("reembolsada"), None);
    }

    #[test]
    fn test_return_transition_table() {
        use ReturnStatus::*;
        assert!(Completed.can_transition_to(Voided));
        for (from, to) in [
            (Voided, Completed),
            (Voided, Voided),
            (Pending, Voided),
            (Processed, Voided),
            (Completed, Pending),
            (Completed, Completed),
        ] {
            assert!(!from.can_transition_to(to), "{from:?} -> {to:?}");
        }
    }

    #[test]
    fn test_reason_routes_to_pool() {
        assert_eq!(ReturnReason::Defective.stock_pool(), StockPool::Supplies);
        assert_eq!(ReturnReason::Expired.stock_pool(), StockPool::Supplies);
        assert_eq!(ReturnReason::ChangedMind.stock_pool(), StockPool::Sellable);
        assert_eq!(ReturnReason::PurchaseError.stock_pool(), StockPool::Sellable);
    }

    #[test]
    fn test_reason_codes_roundtrip_and_alias() {
        for reason in ReturnReason::ALL {
            assert_eq!(ReturnReason::from_code(reason.code()), Some(reason));
        }
        assert_eq!(ReturnReason::from_code("defectuoso"), Some(ReturnReason::Defective));
        assert_eq!(ReturnReason::from_code(""), None);
    }

    #[test]
    fn test_stock_levels_apply() {
        let mut levels = StockLevels { sellable: 4, supplies: 0 };
        levels.apply(&StockAdjustment {
            product_id: 7,
            quantity: 1,
            direction: StockDirection::Increment,
            pool: StockPool::Supplies,
        });
        assert_eq!(levels, StockLevels { sellable: 4, supplies: 1 });
        levels.apply(&StockAdjustment {
            product_id: 7,
            quantity: 3,
            direction: StockDirection::Decrement,
            pool: StockPool::Sellable,
        });
        assert_eq!(levels.get(StockPool::Sellable), 1);
    }

    #[test]
    fn test_warranty_expiry_adds_calendar_months() {
        let sale = Sale {
            id: 1,
            sale_number: "V-0001".to_string(),
            client_id: 3,
            document: None,
            date: Utc.with_ymd_and_hms(2026, 1, 31, 10, 0, 0).unwrap(),
            payment_method: PaymentMethod::Cash,
            warranty_months: 1,
            discount_percent: 0,
            subtotal_cents: 0,
            tax_cents: 0,
            discount_cents: 0,
            total_cents: 0,
            status: SaleStatus::Completed,
            lines: vec![],
        };
        assert_eq!(
            sale.warranty_expires_at(),
            Some(Utc.with_ymd_and_hms(2026, 2, 28, 10, 0, 0).unwrap())
        );

        let no_warranty = Sale { warranty_months: 0, ..sale };
        assert_eq!(no_warranty.warranty_expires_at(), None);
    }
}
