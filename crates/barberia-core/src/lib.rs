//! # barberia-core: Pure Business Logic for the Barbería Console
//!
//! Everything the console derives from sales and returns lives here as
//! pure functions over in-memory slices. No I/O, no clock reads: callers
//! pass `now` explicitly.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Barbería Console Architecture                      │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 apps/console (CLI + ReturnService)              │   │
//! │  │    load snapshot ──► derive ──► propose/confirm ──► reload      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ barberia-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌───────────┐ ┌──────────────┐ ┌──────────┐     │   │
//! │  │   │  credit  │ │ reconcile │ │   returns    │ │   wire   │     │   │
//! │  │   │  saldo a │ │ adjusted  │ │ gates, void, │ │ backend  │     │   │
//! │  │   │  favor   │ │ sale view │ │ stock routing│ │ records  │     │   │
//! │  │   └──────────┘ └───────────┘ └──────────────┘ └──────────┘     │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  barberia-db (Database Layer)                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Sale, Return, statuses, reasons, stock pools)
//! - [`money`] - Integer money
//! - [`error`] - Domain error types
//! - [`validation`] - Return creation gates
//! - [`credit`] - Store-credit aggregator
//! - [`reconcile`] - Sale reconciliation against returns
//! - [`returns`] - Propose/confirm workflow and voiding
//! - [`wire`] - Normalization of loosely-typed backend records
//!
//! ## Example Usage
//!
//! ```rust
//! use barberia_core::credit::credit_balance;
//! use barberia_core::Money;
//!
//! let balance = credit_balance(&[], 7);
//! assert_eq!(balance, Money::zero());
//! ```

pub mod credit;
pub mod error;
pub mod money;
pub mod reconcile;
pub mod returns;
pub mod types;
pub mod validation;
pub mod wire;

pub use error::{CoreError, ReturnValidationError, ValidationError};
pub use money::Money;
pub use types::*;

/// Closed set of reason codes accepted by the return form, in display order.
pub const RETURN_REASON_CODES: [&str; 7] = [
    "producto_defectuoso",
    "error_compra",
    "producto_vencido",
    "reaccion_alergica",
    "no_conforme",
    "cambio_opinion",
    "otros",
];
