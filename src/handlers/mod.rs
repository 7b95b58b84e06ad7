pub mod accounts;
pub mod apps;
pub mod session;
pub mod vault;
