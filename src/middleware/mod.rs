pub mod auth;
pub mod request;

pub use auth::CurrentAccount;
pub use request::{EntityId, JsonBody, parse_body};
