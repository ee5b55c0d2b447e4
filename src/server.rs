//! The issuer: key, evaluator, prover and redemption ledger in one context.

use rand_core::{CryptoRng, RngCore};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::dleq::{self, DleqProof};
use crate::errors::{Error, Result};
use crate::keys::{KeyPair, PublicKey};
use crate::ledger::RedemptionLedger;
use crate::voprf::{self, BlindedElement, EvaluatedElement, Token};

/// An evaluated element together with the proof that it was computed with
/// the published key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Evaluation {
    pub evaluated: EvaluatedElement,
    pub proof: DleqProof,
}

/// Server-side protocol state.
///
/// The keypair is created first and the empty ledger second; both live as
/// long as the server. Key rotation is not supported.
#[derive(Debug)]
pub struct Server {
    keypair: KeyPair,
    ledger: RedemptionLedger,
    max_nonce_len: usize,
}

impl Server {
    /// Builds a server from `config`, drawing a fresh key from the OS unless a
    /// seed is configured.
    pub fn new(config: &Config) -> Result<Self> {
        let keypair = match config.seed()? {
            Some(seed) => KeyPair::from_seed(seed),
            None => KeyPair::generate(&mut rand::rngs::OsRng),
        };
        Ok(Self::with_keypair(keypair, config))
    }

    pub fn with_keypair(keypair: KeyPair, config: &Config) -> Self {
        info!(public_key = %keypair.public_key().to_hex(), "issuer key ready");
        Server {
            keypair,
            ledger: RedemptionLedger::new(),
            max_nonce_len: config.max_nonce_len,
        }
    }

    pub fn public_key(&self) -> PublicKey {
        self.keypair.public_key()
    }

    /// Evaluates `blinded` and proves the evaluation used the published key.
    pub fn evaluate<R>(&self, blinded: &BlindedElement, csrng: &mut R) -> Evaluation
    where
        R: RngCore + CryptoRng,
    {
        let evaluated = voprf::evaluate(&self.keypair, blinded);
        let proof = dleq::prove_compact(
            csrng,
            dleq::ProveAssignments {
                k: &self.keypair.sk,
                K: self.keypair.pk.as_point(),
                B: blinded.as_point(),
                Y: evaluated.as_point(),
            },
        );
        debug!("evaluated blinded element");
        Evaluation { evaluated, proof }
    }

    /// Redeems `token`. Fails with [`Error::TokenInvalidOrUsed`] for both
    /// reused and forged tokens.
    pub fn redeem(&self, token: &Token) -> Result<()> {
        if token.nonce().len() > self.max_nonce_len {
            warn!(nonce_len = token.nonce().len(), "rejected oversized nonce");
            return Err(Error::TokenInvalidOrUsed);
        }
        let result = self.ledger.redeem(&self.keypair, token);
        match &result {
            Ok(()) => debug!(redeemed = self.ledger.len(), "token redeemed"),
            Err(err) => warn!(%err, "redemption rejected"),
        }
        result
    }

    pub fn ledger(&self) -> &RedemptionLedger {
        &self.ledger
    }
}
