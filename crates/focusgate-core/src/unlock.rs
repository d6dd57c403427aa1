//! Emergency unlock: a rate-limited escape hatch out of a focus session.
//!
//! A grant is one-shot: it ends the current session and restarts the
//! cooldown clock, nothing more. Rejections are ordinary outcomes with a
//! reason string, never errors.

use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::settings::Settings;

/// External password primitive. The gate never sees plaintext policy --
/// it hands the supplied password and the stored hash to this seam.
pub trait PasswordVerifier {
    fn verify(&self, supplied: &str, stored_hash: &str) -> bool;
}

/// Salted SHA-256 verifier; the stored format is `salt_hex$digest_hex`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Verifier;

impl PasswordVerifier for Sha256Verifier {
    fn verify(&self, supplied: &str, stored_hash: &str) -> bool {
        let Some((salt_hex, digest_hex)) = stored_hash.split_once('$') else {
            return false;
        };
        let Ok(salt) = hex::decode(salt_hex) else {
            return false;
        };
        hex::encode(digest(&salt, supplied)) == digest_hex
    }
}

/// Produce a stored hash for `plain` with a fresh random salt.
pub fn hash_password(plain: &str) -> String {
    let mut salt = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);
    format!("{}${}", hex::encode(salt), hex::encode(digest(&salt, plain)))
}

fn digest(salt: &[u8], plain: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(plain.as_bytes());
    hasher.finalize().into()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnlockOutcome {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl UnlockOutcome {
    fn denied(reason: &str) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.to_string()),
        }
    }
}

/// Gate state: only the timestamp of the last grant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnlockGate {
    last_unlock: Option<DateTime<Utc>>,
}

impl UnlockGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request an unlock at `now`. On a grant the caller is expected to
    /// stop the running session; the gate only owns the cooldown clock.
    pub fn request(
        &mut self,
        settings: &Settings,
        now: DateTime<Utc>,
        supplied_password: Option<&str>,
        verifier: &dyn PasswordVerifier,
    ) -> UnlockOutcome {
        if !settings.blocked_page.allow_emergency_unlock {
            return UnlockOutcome::denied("Emergency unlock disabled");
        }

        if let Some(remaining) = self.cooldown_remaining_minutes(settings, now) {
            return UnlockOutcome::denied(&format!("Cooldown: {remaining} minutes remaining"));
        }

        if settings.password.enabled && !settings.password.password_hash.is_empty() {
            let Some(supplied) = supplied_password else {
                return UnlockOutcome::denied("Password required");
            };
            if !verifier.verify(supplied, &settings.password.password_hash) {
                return UnlockOutcome::denied("Incorrect password");
            }
        }

        self.last_unlock = Some(now);
        UnlockOutcome {
            allowed: true,
            reason: None,
        }
    }

    /// Whole minutes of cooldown left, rounded up. `None` when elapsed.
    fn cooldown_remaining_minutes(&self, settings: &Settings, now: DateTime<Utc>) -> Option<u32> {
        let last = self.last_unlock?;
        let cooldown_secs = i64::from(settings.blocked_page.emergency_cooldown_minutes) * 60;
        let elapsed = (now - last).num_seconds();
        if elapsed >= cooldown_secs {
            return None;
        }
        let left = cooldown_secs - elapsed;
        Some(((left + 59) / 60) as u32)
    }
}
