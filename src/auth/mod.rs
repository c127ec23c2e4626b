//! Authentication module
//!
//! OAuth2 client-credentials exchange against the OpenTable identity
//! endpoint. The token is cached in the caller's state rather than in
//! memory, so the `CredentialManager` only decides whether the token it is
//! handed is still usable and fetches a new one when it is not.

mod authenticator;
mod types;

pub use authenticator::CredentialManager;
pub use types::{CachedToken, Credentials};
