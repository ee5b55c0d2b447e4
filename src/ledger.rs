//! At-most-once redemption bookkeeping.
//!
//! Each nonce moves from unseen to redeemed exactly once, and only through a
//! correct redemption. Wrong outputs and reused nonces are indistinguishable
//! to the caller.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use curve25519_dalek::ristretto::CompressedRistretto;
use subtle::ConstantTimeEq;

use crate::errors::{Error, Result};
use crate::keys::KeyPair;
use crate::voprf::{expected_output, Token};

/// The set of redeemed nonces. Append-only for the life of the process.
#[derive(Debug, Default)]
pub struct RedemptionLedger {
    redeemed: Mutex<HashSet<String>>,
}

impl RedemptionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Redeems `token` against `keypair`, consuming its nonce on success.
    ///
    /// The expected output is computed before taking the lock; the check
    /// and insert happen under it, so of two concurrent redemptions of one
    /// token exactly one succeeds.
    pub fn redeem(&self, keypair: &KeyPair, token: &Token) -> Result<()> {
        let expected = expected_output(keypair, token.nonce.as_bytes())?;
        if !outputs_match(&expected, &token.output) {
            return Err(Error::TokenInvalidOrUsed);
        }

        if self.lock().insert(token.nonce.clone()) {
            Ok(())
        } else {
            Err(Error::TokenInvalidOrUsed)
        }
    }

    pub fn is_redeemed(&self, nonce: &str) -> bool {
        self.lock().contains(nonce)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Every mutation is a single `insert`, so a poisoned set is still consistent.
    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.redeemed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn outputs_match(expected: &CompressedRistretto, submitted: &CompressedRistretto) -> bool {
    bool::from(expected.as_bytes()[..].ct_eq(&submitted.as_bytes()[..]))
}
