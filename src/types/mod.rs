//! Domain types shared by the stores, the policy and the HTTP handlers.

pub mod account;
pub mod app;
pub mod validate;
pub mod vault;

pub use account::{Account, AccountId, AccountPatch, NewAccount, Role};
pub use app::{AppCategory, AppId};
pub use validate::ValidationError;
pub use vault::{EntryId, EntryKind, NewVaultEntry, VaultEntry, VaultEntryPatch};
