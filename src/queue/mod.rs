//! Queue store for waiting players
//!
//! Players wait in one FIFO per role. Formation attempts remove them through
//! an `Allocation`, which puts them back untouched if the attempt fails.

pub mod allocation;
pub mod store;

pub use allocation::{Allocation, Savepoint};
pub use store::RoleQueues;
