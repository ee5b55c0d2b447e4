//! The oblivious evaluation at the heart of the protocol.
//!
//! The client maps its nonce \\(t\\) to \\(T = H(t)\\), sends \\(B = rT\\),
//! receives \\(Y = kB\\) and recovers \\(r^{-1}Y = kT\\). The issuer never
//! sees \\(T\\), and \\(kT\\) does not depend on the blinding factor.

use std::convert::TryFrom;

use rand_core::{CryptoRng, RngCore};

use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::IsIdentity;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::group::{compressed_from_hex, point_from_hex, point_to_hex, random_nonzero_scalar};
use crate::hash::hash_to_group;
use crate::keys::KeyPair;

/// Longest nonce accepted anywhere in the protocol, in bytes.
pub const MAX_NONCE_LEN: usize = 1024;

/// The blinded element \\(B = rH(t)\\) sent to the issuer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlindedElement(pub(crate) RistrettoPoint);

/// The evaluated element \\(Y = kB\\) returned by the issuer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EvaluatedElement(pub(crate) RistrettoPoint);

/// The client's secret blinding factor \\(r\\).
///
/// Never serialized and never shown in debug output. A factor must be used
/// for exactly one unblind, with the element it blinded.
pub struct BlindingFactor(pub(crate) Scalar);

macro_rules! element_hex {
    ($name:ident) => {
        impl $name {
            pub fn to_hex(&self) -> String {
                point_to_hex(&self.0)
            }

            /// Decodes and validates an element, rejecting the identity.
            pub fn from_hex(s: &str) -> Result<Self> {
                let point = point_from_hex(s)?;
                if point.is_identity() {
                    return Err(Error::InvalidInput("element is the identity"));
                }
                Ok($name(point))
            }

            pub fn as_point(&self) -> &RistrettoPoint {
                &self.0
            }
        }
    };
}

element_hex!(BlindedElement);
element_hex!(EvaluatedElement);

/// A redeemable token: the nonce and its unblinded evaluation \\(kH(t)\\).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TokenWire", into = "TokenWire")]
pub struct Token {
    pub(crate) nonce: String,
    pub(crate) output: CompressedRistretto,
}

impl Token {
    pub fn new(nonce: String, output: CompressedRistretto) -> Self {
        Token { nonce, output }
    }

    pub fn nonce(&self) -> &str {
        &self.nonce
    }

    pub fn output(&self) -> &CompressedRistretto {
        &self.output
    }
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct TokenWire {
    nonce: String,
    output: String,
}

impl TryFrom<TokenWire> for Token {
    type Error = Error;

    fn try_from(wire: TokenWire) -> Result<Self> {
        Ok(Token {
            nonce: wire.nonce,
            output: compressed_from_hex(&wire.output)?,
        })
    }
}

impl From<Token> for TokenWire {
    fn from(token: Token) -> Self {
        TokenWire {
            nonce: token.nonce,
            output: hex::encode(token.output.as_bytes()),
        }
    }
}

/// Blinds `nonce` with a fresh factor \\(r \in [1, n-1]\\).
pub fn blind<R>(nonce: &[u8], csrng: &mut R) -> Result<(BlindedElement, BlindingFactor)>
where
    R: RngCore + CryptoRng,
{
    if nonce.len() > MAX_NONCE_LEN {
        return Err(Error::InvalidInput("nonce is too long"));
    }
    let hashed_nonce = hash_to_group(nonce)?;
    let r = random_nonzero_scalar(csrng);
    Ok((BlindedElement(r * hashed_nonce), BlindingFactor(r)))
}

/// Removes the blinding factor: \\(r^{-1}Y\\).
///
/// A factor from a different `blind` call yields a well-formed but useless
/// point, so callers must keep factors paired with their elements.
pub fn unblind(evaluated: &EvaluatedElement, factor: &BlindingFactor) -> RistrettoPoint {
    factor.0.invert() * evaluated.0
}

/// Evaluates the PRF obliviously: \\(Y = kB\\).
///
/// `blinded` was validated when it was decoded. The redemption ledger plays
/// no part in issuance.
pub fn evaluate(keypair: &KeyPair, blinded: &BlindedElement) -> EvaluatedElement {
    EvaluatedElement(keypair.sk * blinded.0)
}

/// The unblinded PRF output \\(kH(t)\\) the issuer expects for `nonce`.
pub(crate) fn expected_output(keypair: &KeyPair, nonce: &[u8]) -> Result<CompressedRistretto> {
    Ok((keypair.sk * hash_to_group(nonce)?).compress())
}
