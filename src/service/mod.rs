pub mod bootstrap;

pub use bootstrap::{BootstrapOutcome, initialize};
