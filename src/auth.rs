//! Admin credential check
//!
//! Maintenance operations require the configured admin password. The
//! comparison is exact string equality; both sides are reduced to SHA-256
//! digests first so the comparison time does not depend on where the
//! strings differ.

use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::RsvpError;

/// The configured shared secret
#[derive(Clone)]
pub struct AdminCredential {
    digest: [u8; 32],
}

impl AdminCredential {
    pub fn new(password: &str) -> Self {
        Self {
            digest: digest(password),
        }
    }

    /// Whether `supplied` equals the configured password
    pub fn verify(&self, supplied: &str) -> bool {
        let other = digest(supplied);
        self.digest
            .iter()
            .zip(other.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }

    /// Check an optional caller-supplied password
    pub fn authorize(&self, supplied: Option<&str>) -> Result<(), RsvpError> {
        match supplied {
            Some(password) if self.verify(password) => Ok(()),
            _ => Err(RsvpError::Unauthorized),
        }
    }
}

impl fmt::Debug for AdminCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AdminCredential(..)")
    }
}

fn digest(value: &str) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha256::digest(value.as_bytes()));
    out
}
