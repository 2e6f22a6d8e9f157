//! Local access gate.
//!
//! A plain comparison against a configured password that unlocks the session.
//! It has no expiry, lockout or hashing and is not a security boundary.

use crate::{Error, Result};

pub struct LocalGate {
    expected: Option<String>,
    unlocked: bool,
}

impl LocalGate {
    /// A gate with no configured password starts unlocked.
    pub fn new(expected: Option<String>) -> Self {
        let unlocked = expected.is_none();
        if unlocked {
            tracing::debug!("No site password configured; access gate disabled");
        }
        Self { expected, unlocked }
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    pub fn unlock(&mut self, attempt: &str) -> bool {
        if !self.unlocked {
            self.unlocked = self.expected.as_deref() == Some(attempt);
        }
        self.unlocked
    }

    /// Unlock with `attempt` or fail with [`Error::AccessDenied`].
    pub fn require(&mut self, attempt: Option<&str>) -> Result<()> {
        if self.is_unlocked() {
            return Ok(());
        }

        match attempt {
            Some(secret) if self.unlock(secret) => Ok(()),
            Some(_) => Err(Error::AccessDenied("incorrect password".to_string())),
            None => Err(Error::AccessDenied("password required".to_string())),
        }
    }
}
