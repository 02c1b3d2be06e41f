//! # Backend Seams
//!
//! The two collaborators the return workflow talks to: the record store
//! (sales, returns, clients, products) and the product-stock service.
//! [`Database`] implements both; tests substitute mocks.

use async_trait::async_trait;
use barberia_core::{Client, NewReturn, Product, Return, Sale, StockAdjustment, StockLevels};
use barberia_db::{Database, DbResult};

#[cfg(test)]
use mockall::automock;

/// Record store for the console.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ReturnBackend: Send + Sync {
    async fn list_sales(&self) -> DbResult<Vec<Sale>>;

    async fn list_returns(&self) -> DbResult<Vec<Return>>;

    async fn list_clients(&self) -> DbResult<Vec<Client>>;

    async fn list_products(&self) -> DbResult<Vec<Product>>;

    /// Persists a confirmed return; the stored record comes back with its id.
    async fn insert_return(&self, new_return: &NewReturn) -> DbResult<Return>;

    /// Flips a completed return to voided.
    async fn void_return(&self, id: i64) -> DbResult<()>;

    /// Flips a completed sale to voided.
    async fn void_sale(&self, id: i64) -> DbResult<()>;
}

/// Product-stock collaborator.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait StockService: Send + Sync {
    /// Applies one adjustment and returns the product's levels afterwards.
    async fn adjust_stock(&self, adjustment: StockAdjustment) -> DbResult<StockLevels>;
}

#[async_trait]
impl ReturnBackend for Database {
    async fn list_sales(&self) -> DbResult<Vec<Sale>> {
        self.sales().list().await
    }

    async fn list_returns(&self) -> DbResult<Vec<Return>> {
        self.returns().list().await
    }

    async fn list_clients(&self) -> DbResult<Vec<Client>> {
        self.clients().list().await
    }

    async fn list_products(&self) -> DbResult<Vec<Product>> {
        self.products().list().await
    }

    async fn insert_return(&self, new_return: &NewReturn) -> DbResult<Return> {
        self.returns().insert(new_return).await
    }

    async fn void_return(&self, id: i64) -> DbResult<()> {
        self.returns().mark_voided(id).await
    }

    async fn void_sale(&self, id: i64) -> DbResult<()> {
        self.sales().void(id).await
    }
}

#[async_trait]
impl StockService for Database {
    async fn adjust_stock(&self, adjustment: StockAdjustment) -> DbResult<StockLevels> {
        self.products().adjust_stock(&adjustment).await
    }
}
