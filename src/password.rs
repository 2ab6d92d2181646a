//! Peppered bcrypt hashing for user credentials.
//!
//! The plaintext is first run through HMAC-SHA256 keyed with the pepper, and
//! the hex digest is what bcrypt sees. A leaked hash table is useless without
//! the pepper, which never lives next to the hashes.

use std::sync::Arc;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::{error, warn};

use crate::config::{AppConfig, Environment};
use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

pub const PRODUCTION_COST: u32 = 14;
/// Lowest cost the bcrypt crate accepts.
pub const FAST_COST: u32 = 4;

#[derive(Clone)]
pub struct HasherConfig {
    pub pepper: Option<String>,
    pub cost: u32,
}

impl HasherConfig {
    pub fn new(environment: Environment, pepper: Option<String>) -> Self {
        Self {
            pepper,
            cost: cost_for(environment),
        }
    }

    pub fn from_app(config: &AppConfig) -> Self {
        Self::new(config.environment, config.pepper.clone())
    }
}

pub fn cost_for(environment: Environment) -> u32 {
    if environment.is_production() {
        PRODUCTION_COST
    } else {
        FAST_COST
    }
}

#[derive(Clone)]
pub struct PasswordHasher {
    pepper: Option<Arc<str>>,
    cost: u32,
}

impl PasswordHasher {
    pub fn new(config: HasherConfig) -> Self {
        Self {
            pepper: config.pepper.map(Arc::from),
            cost: config.cost,
        }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub async fn hash(&self, plain: &str) -> Result<String, AppError> {
        let peppered = self.pepper(plain)?;
        let cost = self.cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(peppered, cost))
            .await
            .map_err(|e| {
                error!(error = %e, "bcrypt hash task failed");
                AppError::Internal(e.to_string())
            })?
            .map_err(|e| {
                error!(error = %e, "bcrypt hash error");
                AppError::Internal(e.to_string())
            })
    }

    /// Never errors on a mismatch. A stored value that is not a bcrypt hash
    /// is treated as a mismatch too.
    pub async fn compare(&self, plain: &str, hash: &str) -> Result<bool, AppError> {
        let peppered = self.pepper(plain)?;
        let hash = hash.to_owned();
        let verified = tokio::task::spawn_blocking(move || bcrypt::verify(peppered, &hash))
            .await
            .map_err(|e| {
                error!(error = %e, "bcrypt verify task failed");
                AppError::Internal(e.to_string())
            })?;

        match verified {
            Ok(matches) => Ok(matches),
            Err(e) => {
                warn!(error = %e, "stored password is not a valid bcrypt hash");
                Ok(false)
            }
        }
    }

    fn pepper(&self, plain: &str) -> Result<String, AppError> {
        let pepper = self
            .pepper
            .as_deref()
            .ok_or_else(|| AppError::configuration("DATABASE_PEPPER is not set"))?;
        let mut mac = HmacSha256::new_from_slice(pepper.as_bytes())
            .map_err(|e| AppError::configuration(format!("invalid pepper: {e}")))?;
        mac.update(plain.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}
