//! # barberia-db: Database Layer for the Barbería Console
//!
//! SQLite storage for clients, products, sales and returns. The console
//! treats this crate as "the backend": it reads everything, derives views
//! in memory, and writes back only through the repositories here.
//!
//! ## Tables and Repositories
//! ```text
//! clients ─────────── ClientRepository    catalogue, names for views
//! products ────────── ProductRepository   stock_sellable | stock_supplies
//! sales + sale_lines ─ SaleRepository      insert in one tx, void (guarded)
//! returns ─────────── ReturnRepository    insert, import, void (guarded)
//!        ▲
//!        └── FK to sales; voided rows stay for history
//! ```
//!
//! Status, reason and line-kind columns store the wire codes
//! (`completada`, `producto_defectuoso`, `servicio`, ...). A row carrying
//! an unknown code fails with [`DbError::InvalidValue`] instead of being
//! guessed at.
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use barberia_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./barberia.db")).await?;
//!
//! let sales = db.sales().list().await?;
//! let returns = db.returns().list().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::client::ClientRepository;
pub use repository::product::ProductRepository;
pub use repository::returns::ReturnRepository;
pub use repository::sale::SaleRepository;
