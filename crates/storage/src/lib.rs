//! Repository implementations for the order management system.
//!
//! Two backends implement the domain's repository traits:
//! - [`memory`] — `RwLock`-protected maps, used by tests and as the
//!   default server wiring.
//! - [`postgres`] — `sqlx`-backed, with idempotent aggregate saves
//!   (order row upsert, insert-if-absent items and history).

pub mod memory;
pub mod postgres;

pub use memory::{InMemoryOrderRepository, InMemoryUserRepository};
pub use postgres::{PostgresOrderRepository, PostgresUserRepository, run_migrations};
