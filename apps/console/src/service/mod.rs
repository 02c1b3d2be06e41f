//! # Service Module
//!
//! - [`backend`] - The record-store and stock traits, implemented for `Database`
//! - [`returns`] - `ReturnService`: propose/confirm, voiding, derived views

pub mod backend;
pub mod returns;

pub use backend::{ReturnBackend, StockService};
pub use returns::{
    ClientBalance, CreditSummary, ReturnOutcome, ReturnService, SaleVoidOutcome, VoidOutcome,
};
