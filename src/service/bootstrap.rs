use crate::config::SeedConfig;
use crate::db::sqlite::now;
use crate::db::{AccountStore, SessionStore};
use crate::types::{Account, NewAccount, Role};
use tracing::{info, warn};

#[derive(Debug)]
pub enum BootstrapOutcome {
    /// The account table was empty and the seed super-admin was created.
    Seeded(Account),
    AlreadyPopulated,
    /// Seeding failed; already logged, startup continues.
    Failed,
}

/// One-shot startup step, run after the schema is in place. Creates the seed
/// super-admin when no account exists and purges expired sessions. Safe to
/// call on a populated store, where it changes nothing but stale sessions.
pub async fn initialize(
    accounts: &AccountStore,
    sessions: &SessionStore,
    seed: &SeedConfig,
) -> BootstrapOutcome {
    match sessions.purge_expired(now()).await {
        Ok(0) => {}
        Ok(purged) => info!(purged, "removed expired sessions"),
        Err(e) => warn!(error = %e, "failed to purge expired sessions"),
    }

    let seed_account = NewAccount {
        login_id: seed.login_id.clone(),
        secret: seed.secret.clone(),
        display_name: Some(seed.display_name.clone()),
        role: Role::SuperAdmin,
    };

    match accounts.seed_if_empty(seed_account).await {
        Ok(Some(account)) => {
            info!(
                account_id = account.id,
                login_id = %account.login_id,
                "initialized seed super-admin account"
            );
            if seed.uses_default_secret() {
                warn!(
                    login_id = %account.login_id,
                    "seed account uses the default secret; change it after first login"
                );
            }
            BootstrapOutcome::Seeded(account)
        }
        Ok(None) => BootstrapOutcome::AlreadyPopulated,
        Err(e) => {
            warn!(error = %e, "could not initialize seed account");
            BootstrapOutcome::Failed
        }
    }
}
