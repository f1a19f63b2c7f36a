//! Secret custody on top of the cipher engine.
//!
//! [`SecretStore`] keeps one token per account behind a readers-writer lock;
//! [`Vault`] is the shared handle request handlers call into.

mod service;
mod store;

pub use service::Vault;
pub use store::SecretStore;
