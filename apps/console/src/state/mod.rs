//! # State Module
//!
//! What the console holds between operations.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────────┐        ┌──────────────────────────────────┐  │
//! │  │   ConsoleConfig      │        │   Snapshot                       │  │
//! │  │                      │        │                                  │  │
//! │  │  database path       │        │  sales, returns,                 │  │
//! │  │  currency display    │        │  clients, products               │  │
//! │  │  quantity policy     │        │  (replaced after each mutation)  │  │
//! │  └──────────────────────┘        └──────────────────────────────────┘  │
//! │                                                                         │
//! │  • ConsoleConfig: read-only after startup                              │
//! │  • Snapshot: owned by the ReturnService, never patched in place        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod snapshot;

pub use config::ConsoleConfig;
pub use snapshot::Snapshot;
