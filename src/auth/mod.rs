//! Authentication and authorization: secret hashing, session resolution and
//! the role policy.

pub mod hasher;
pub mod policy;
pub mod session;

pub use hasher::{HashCost, SecretHasher};
pub use policy::{Decision, DenyReason, Operation, authorize, decide, require_account_manager};
pub use session::SessionResolver;
