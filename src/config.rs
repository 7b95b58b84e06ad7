use figment::Figment;
use figment::providers::{Env, Serialized};
use serde::{Deserialize, Serialize};

use crate::auth::HashCost;
use crate::error::LockboxError;

pub const ENV_PREFIX: &str = "LOCKBOX_";
pub const DEFAULT_SEED_LOGIN: &str = "admin";
pub const DEFAULT_SEED_SECRET: &str = "change-me-now";
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24 * 7;
/// Ten years.
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365 * 10;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub basic: BasicConfig,
    pub security: SecurityConfig,
    pub seed: SeedConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicConfig {
    pub listen_addr: String,
    pub database_url: String,
    pub loglevel: String,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_string(),
            database_url: "sqlite:data/lockbox.db".to_string(),
            loglevel: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub session_ttl_hours: i64,
    /// Drop the `Secure` flag on the session cookie (plain-HTTP development).
    pub insecure_cookie: bool,
    pub hash_memory_kib: u32,
    pub hash_iterations: u32,
    pub hash_parallelism: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        let cost = HashCost::default();
        Self {
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
            insecure_cookie: false,
            hash_memory_kib: cost.memory_kib,
            hash_iterations: cost.iterations,
            hash_parallelism: cost.parallelism,
        }
    }
}

impl SecurityConfig {
    pub fn hash_cost(&self) -> HashCost {
        HashCost {
            memory_kib: self.hash_memory_kib,
            iterations: self.hash_iterations,
            parallelism: self.hash_parallelism,
        }
    }

    /// Configured lifetime, clamped to `1..=MAX_SESSION_TTL_HOURS`.
    pub fn session_ttl(&self) -> chrono::Duration {
        let hours = self.session_ttl_hours.clamp(1, MAX_SESSION_TTL_HOURS);
        chrono::Duration::try_hours(hours)
            .unwrap_or_else(|| chrono::Duration::hours(DEFAULT_SESSION_TTL_HOURS))
    }
}

/// The account created on first start when no account exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub login_id: String,
    pub secret: String,
    pub display_name: String,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            login_id: DEFAULT_SEED_LOGIN.to_string(),
            secret: DEFAULT_SEED_SECRET.to_string(),
            display_name: "Super Admin".to_string(),
        }
    }
}

impl SeedConfig {
    pub fn uses_default_secret(&self) -> bool {
        self.secret == DEFAULT_SEED_SECRET
    }
}

impl Config {
    /// Defaults overlaid with `LOCKBOX_*` environment variables; nested keys
    /// use `__`, e.g. `LOCKBOX_BASIC__DATABASE_URL`.
    pub fn from_env() -> Result<Self, LockboxError> {
        Ok(Self::figment().extract()?)
    }

    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_nested_keys() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("LOCKBOX_BASIC__DATABASE_URL", "sqlite::memory:");
            jail.set_env("LOCKBOX_SECURITY__SESSION_TTL_HOURS", "2");
            jail.set_env("LOCKBOX_SEED__LOGIN_ID", "root");

            let cfg: Config = Config::figment().extract()?;
            assert_eq!(cfg.basic.database_url, "sqlite::memory:");
            assert_eq!(cfg.basic.listen_addr, "0.0.0.0:8000");
            assert_eq!(cfg.security.session_ttl(), chrono::Duration::hours(2));
            assert_eq!(cfg.seed.login_id, "root");
            assert!(cfg.seed.uses_default_secret());
            Ok(())
        });
    }

    #[test]
    fn defaults_use_argon2_default_cost() {
        let cfg = Config::default();
        assert_eq!(cfg.security.hash_cost(), HashCost::default());
        assert_eq!(cfg.seed.login_id, DEFAULT_SEED_LOGIN);
    }

    #[test]
    fn session_ttl_is_clamped() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("LOCKBOX_SECURITY__SESSION_TTL_HOURS", "10000000000");
            let cfg: Config = Config::figment().extract()?;
            assert_eq!(
                cfg.security.session_ttl(),
                chrono::Duration::hours(MAX_SESSION_TTL_HOURS)
            );

            jail.set_env("LOCKBOX_SECURITY__SESSION_TTL_HOURS", "-5");
            let cfg: Config = Config::figment().extract()?;
            assert_eq!(cfg.security.session_ttl(), chrono::Duration::hours(1));
            Ok(())
        });
    }
}
