//! # coursehub-database
//!
//! PostgreSQL connection management, embedded migrations, and the commerce
//! store traits with their two implementations: [`PgCommerceStore`] for
//! production and [`MemoryCommerceStore`] for tests and local demos.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod postgres;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryCommerceStore;
pub use postgres::PgCommerceStore;
pub use store::{
    CatalogStore, FanoutReport, GroupInsert, GroupStore, JoinResult, LedgerStore, OutboxStore,
    PromoStore, Stores, Transition,
};
