//! The token holder: blinds nonces, checks issuer proofs and keeps a wallet.
//!
//! Here's how a client obtains and spends a token:
//! ```
//! use voprf_tokens::{Client, Config, Server};
//! let csrng = &mut rand::rngs::OsRng;
//!
//! let server = Server::new(&Config::default()).unwrap();
//! let client = Client::new(server.public_key());
//!
//! let (pending, blinded) = client.request("abc", csrng).unwrap();
//! let evaluation = server.evaluate(&blinded, csrng);
//! let token = pending.finalize(&client, &evaluation).unwrap();
//!
//! assert!(server.redeem(&token).is_ok());
//! assert!(server.redeem(&token).is_err());
//! ```

use std::collections::VecDeque;

use rand_core::{CryptoRng, RngCore};
use tracing::warn;

use crate::dleq;
use crate::errors::Result;
use crate::keys::PublicKey;
use crate::server::Evaluation;
use crate::voprf::{blind, unblind, BlindedElement, BlindingFactor, Token};

/// A client bound to one issuer public key.
#[derive(Clone, Copy, Debug)]
pub struct Client {
    public_key: PublicKey,
}

/// A token request awaiting the issuer's evaluation.
///
/// Holds the blinding factor; [`PendingToken::finalize`] consumes it, so each
/// factor unblinds exactly one evaluation of the element it produced.
pub struct PendingToken {
    nonce: String,
    blinded: BlindedElement,
    factor: BlindingFactor,
}

impl Client {
    pub fn new(public_key: PublicKey) -> Self {
        Client { public_key }
    }

    /// Starts a token request for `nonce`, returning the element to send.
    pub fn request<R>(&self, nonce: &str, csrng: &mut R) -> Result<(PendingToken, BlindedElement)>
    where
        R: RngCore + CryptoRng,
    {
        let (blinded, factor) = blind(nonce.as_bytes(), csrng)?;
        let pending = PendingToken {
            nonce: nonce.to_string(),
            blinded,
            factor,
        };
        Ok((pending, blinded))
    }

    /// Starts a request for a fresh random 32-byte nonce, hex-encoded.
    pub fn request_random<R>(&self, csrng: &mut R) -> Result<(PendingToken, BlindedElement)>
    where
        R: RngCore + CryptoRng,
    {
        let mut nonce = [0u8; 32];
        csrng.fill_bytes(&mut nonce);
        self.request(&hex::encode(nonce), csrng)
    }
}

impl PendingToken {
    pub fn nonce(&self) -> &str {
        &self.nonce
    }

    /// Verifies the issuer's proof and unblinds the evaluation into a token.
    pub fn finalize(self, client: &Client, evaluation: &Evaluation) -> Result<Token> {
        let verification = dleq::verify_compact(
            &evaluation.proof,
            dleq::VerifyAssignments {
                K: client.public_key.as_point(),
                B: self.blinded.as_point(),
                Y: evaluation.evaluated.as_point(),
            },
        );
        if let Err(err) = verification {
            warn!(%err, "issuer proof rejected");
            return Err(err);
        }
        let output = unblind(&evaluation.evaluated, &self.factor);
        Ok(Token::new(self.nonce, output.compress()))
    }
}

/// A wallet of issued, not yet spent tokens.
#[derive(Debug, Default)]
pub struct Wallet {
    tokens: VecDeque<Token>,
}

impl Wallet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Obtains `n` tokens with random nonces, calling `issue` once per
    /// blinded element. Tokens obtained before a failure are kept.
    pub fn issue_batch<R, F>(
        &mut self,
        client: &Client,
        n: usize,
        csrng: &mut R,
        mut issue: F,
    ) -> Result<()>
    where
        R: RngCore + CryptoRng,
        F: FnMut(&BlindedElement) -> Result<Evaluation>,
    {
        for _ in 0..n {
            let (pending, blinded) = client.request_random(csrng)?;
            let evaluation = issue(&blinded)?;
            self.tokens.push_back(pending.finalize(client, &evaluation)?);
        }
        Ok(())
    }

    /// Takes the oldest token out of the wallet.
    pub fn spend(&mut self) -> Option<Token> {
        self.tokens.pop_front()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::Config;
    use crate::errors::Error;
    use crate::keys::KeyPair;
    use crate::server::Server;

    #[test]
    fn it_works() {
        let mut csrng = rand::rngs::OsRng;
        let server = Server::new(&Config::default()).unwrap();
        let client = Client::new(server.public_key());

        let (pending, blinded) = client.request("abc", &mut csrng).unwrap();
        assert_eq!(pending.nonce(), "abc");
        let evaluation = server.evaluate(&blinded, &mut csrng);
        let token = pending.finalize(&client, &evaluation).unwrap();
        assert_eq!(token.nonce(), "abc");
        assert!(server.redeem(&token).is_ok());
    }

    #[test]
    fn it_rejects_an_evaluation_under_another_key() {
        let mut csrng = rand::rngs::OsRng;
        let honest = Server::new(&Config::default()).unwrap();
        let rogue = Server::new(&Config::default()).unwrap();
        let client = Client::new(honest.public_key());

        let (pending, blinded) = client.request("abc", &mut csrng).unwrap();
        let evaluation = rogue.evaluate(&blinded, &mut csrng);
        assert_eq!(pending.finalize(&client, &evaluation), Err(Error::InvalidProof));
    }

    #[test]
    fn it_rejects_an_evaluation_of_another_element() {
        let mut csrng = rand::rngs::OsRng;
        let server = Server::new(&Config::default()).unwrap();
        let client = Client::new(server.public_key());

        let (pending, _) = client.request("mine", &mut csrng).unwrap();
        let (_, other) = client.request("theirs", &mut csrng).unwrap();
        let evaluation = server.evaluate(&other, &mut csrng);
        assert!(pending.finalize(&client, &evaluation).is_err());
    }

    #[test]
    fn wallet_spends_each_token_once() {
        let mut csrng = rand::rngs::OsRng;
        let server = Server::with_keypair(KeyPair::from_seed([11u8; 32]), &Config::default());
        let client = Client::new(server.public_key());

        let mut wallet = Wallet::new();
        let mut issuer_rng = rand::rngs::OsRng;
        wallet
            .issue_batch(&client, 30, &mut csrng, |blinded| {
                Ok(server.evaluate(blinded, &mut issuer_rng))
            })
            .unwrap();
        assert_eq!(wallet.len(), 30);

        while let Some(token) = wallet.spend() {
            assert!(server.redeem(&token).is_ok());
        }
        assert!(wallet.is_empty());
        assert_eq!(server.ledger().len(), 30);
    }

    #[test]
    fn wallet_keeps_tokens_issued_before_a_failure() {
        let mut csrng = rand::rngs::OsRng;
        let server = Server::new(&Config::default()).unwrap();
        let client = Client::new(server.public_key());

        let mut wallet = Wallet::new();
        let mut issued = 0;
        let mut issuer_rng = rand::rngs::OsRng;
        let result = wallet.issue_batch(&client, 5, &mut csrng, |blinded| {
            issued += 1;
            if issued > 2 {
                Err(Error::InternalFailure("issuer unavailable"))
            } else {
                Ok(server.evaluate(blinded, &mut issuer_rng))
            }
        });
        assert_eq!(result, Err(Error::InternalFailure("issuer unavailable")));
        assert_eq!(wallet.len(), 2);
    }
}
