// Application layer - use cases over the ledger tables.
// Every operation runs inside exactly one storage transaction.

pub mod error;
pub mod service;

pub use error::*;
pub use service::*;
