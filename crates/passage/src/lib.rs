//! `passage` — authentication orchestration core.
//!
//! Turns heterogeneous credential proofs (OAuth authorization codes,
//! email+password forms) into one canonical identity: strategies verify the
//! proof, the [`AccountLinker`] resolves it to a [`passage_core::User`]
//! (creating or linking accounts idempotently), and the caller establishes a
//! session from the result. Durable state lives behind the
//! [`passage_core::store`] traits; OAuth wire protocols behind
//! [`provider::ProviderClient`]; mail behind [`mailer::Mailer`].

pub mod authenticator;
pub mod crypto;
pub mod linker;
pub mod mailer;
pub mod provider;
pub mod strategy;
pub mod verification;

pub use authenticator::Authenticator;
pub use crypto::{PasswordHasher, ScryptHasher};
pub use linker::{AccountLinker, Resolution};
pub use mailer::{LogMailer, Mailer};
pub use provider::{ProviderClient, ProviderProfile, ProviderSettings};
pub use strategy::{AuthRequest, FormStrategy, OAuthStrategy, Strategy, StrategyId};
pub use verification::VerificationTokenService;

// The shared core types, re-exported so most callers need only this crate.
pub use passage_core::store::{AccountStore, AuthStore, SessionStore, StoreError, UserStore};
pub use passage_core::{
    Account, AccountId, AuthError, AuthFailure, Provider, SessionToken, User, UserId,
};
