//! Core types for the `passage` authentication orchestrator.
//!
//! This crate carries the pieces every other `passage` crate agrees on: the
//! data models ([`User`], [`Account`], [`Provider`]), the store traits that
//! durable backends implement, and the error taxonomy separating recoverable
//! authentication failures from fatal faults.

pub mod env;
pub mod error;
pub mod models;
pub mod store;

// Re-exports for convenience
pub use error::{AuthError, AuthFailure, CryptoError};
pub use models::{Account, AccountId, Provider, SessionToken, User, UserId};
pub use store::{AccountStore, AuthStore, SessionStore, StoreError, UserStore};
