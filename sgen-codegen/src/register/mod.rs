//! Ownership ledger of generated files and its persistence

mod artifact_register;
mod ledger;
mod store;

pub use artifact_register::*;
pub use ledger::*;
pub use store::*;
