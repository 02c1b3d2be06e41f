//! # Snapshot State
//!
//! Everything the console derives from, loaded in one go.
//!
//! ## Reload Cycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   load ──► Snapshot ──► derive (credit, reconcile, gates)               │
//! │    ▲                          │                                         │
//! │    │                          ▼                                         │
//! │    └──────────────── mutation succeeded                                 │
//! │                                                                         │
//! │  The snapshot is replaced wholesale after every successful mutation.   │
//! │  Nothing is patched in place, so derived figures can never drift from  │
//! │  the stored records.                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use barberia_core::{Client, Product, Return, Sale};
use barberia_db::DbResult;
use serde::Serialize;
use tracing::debug;

use crate::service::backend::ReturnBackend;

/// Sales, returns, clients and products as of the last load.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub sales: Vec<Sale>,
    pub returns: Vec<Return>,
    pub clients: Vec<Client>,
    pub products: Vec<Product>,
}

impl Snapshot {
    /// Loads all four collections concurrently; any failure fails the load.
    pub async fn load<B: ReturnBackend + ?Sized>(backend: &B) -> DbResult<Self> {
        let (sales, returns, clients, products) = tokio::try_join!(
            backend.list_sales(),
            backend.list_returns(),
            backend.list_clients(),
            backend.list_products(),
        )?;

        debug!(
            sales = sales.len(),
            returns = returns.len(),
            clients = clients.len(),
            products = products.len(),
            "Snapshot loaded"
        );

        Ok(Snapshot {
            sales,
            returns,
            clients,
            products,
        })
    }

    pub fn client(&self, id: i64) -> Option<&Client> {
        self.clients.iter().find(|c| c.id == id)
    }

    /// Client name for display, or `#id` when the client is unknown.
    pub fn client_name(&self, id: i64) -> String {
        self.client(id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| format!("#{id}"))
    }

    pub fn product(&self, id: i64) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }
}
