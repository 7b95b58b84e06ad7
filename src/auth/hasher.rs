//! Argon2id hashing for account secrets.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use std::sync::Arc;

use crate::error::LockboxError;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    /// Memory cost in KiB
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashCost {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// Salted, deliberately slow one-way hasher. Each call draws a fresh salt, so
/// hashing the same plaintext twice yields different PHC strings.
#[derive(Debug, Clone)]
pub struct SecretHasher {
    params: Params,
    /// Hash of a random value under the same params, verified against when
    /// there is no stored hash so both login paths cost the same.
    decoy: Arc<str>,
}

impl SecretHasher {
    pub fn new(cost: HashCost) -> Result<Self, LockboxError> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|e| LockboxError::Hashing(format!("invalid Argon2 parameters: {e}")))?;
        let mut hasher = Self {
            params,
            decoy: Arc::from(""),
        };
        let decoy = hasher.hash(SaltString::generate(&mut OsRng).as_str())?;
        hasher.decoy = Arc::from(decoy);
        Ok(hasher)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash `plaintext` into a PHC string (algorithm, params, salt, digest).
    pub fn hash(&self, plaintext: &str) -> Result<String, LockboxError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| LockboxError::Hashing(e.to_string()))
    }

    /// Malformed stored hashes verify as `false`.
    pub fn verify(&self, plaintext: &str, phc: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(phc) else {
            return false;
        };
        self.argon2()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }

    /// `hash` on the blocking pool so request workers are not stalled.
    pub async fn hash_blocking(&self, plaintext: String) -> Result<String, LockboxError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(|e| LockboxError::Hashing(format!("hashing task failed: {e}")))?
    }

    pub async fn verify_blocking(&self, plaintext: String, phc: String) -> bool {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&plaintext, &phc))
            .await
            .unwrap_or(false)
    }

    /// Spend one full verification on the decoy hash. Always `false`.
    pub async fn verify_decoy(&self, plaintext: String) -> bool {
        let decoy = self.decoy.to_string();
        self.verify_blocking(plaintext, decoy).await;
        false
    }
}

#[cfg(test)]
pub(crate) fn cheap_hasher() -> SecretHasher {
    SecretHasher::new(HashCost {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    })
    .expect("cheap argon2 params are valid")
}
