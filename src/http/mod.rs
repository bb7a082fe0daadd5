//! HTTP front-end for the ledger service.
//!
//! Thin JSON handlers over [`LedgerService`](crate::application::LedgerService);
//! all validation beyond request shape lives in the service.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;

pub use error::ErrorBody;
pub use router::build_router;
pub use server::serve;
