//! This library implements single-use anonymous tokens from a verifiable
//! oblivious pseudorandom function over ristretto255.
//!
//! A client picks a nonce, blinds it and has the issuer evaluate the PRF on
//! the blinded element. The issuer attaches a DLEQ proof that it used the key
//! it publishes, so it cannot tag users with per-user keys. After unblinding,
//! the client holds a token that the issuer can check, exactly once, without
//! learning which issuance produced it.
//!
//! ```
//! use voprf_tokens::{Client, Config, Server};
//! let csrng = &mut rand::rngs::OsRng;
//!
//! let server = Server::new(&Config::default()).unwrap();
//! let client = Client::new(server.public_key());
//!
//! let (pending, blinded) = client.request_random(csrng).unwrap();
//! let evaluation = server.evaluate(&blinded, csrng);
//! let token = pending.finalize(&client, &evaluation).unwrap();
//! assert!(server.redeem(&token).is_ok());
//! ```

extern crate curve25519_dalek;
extern crate merlin;

mod errors;
pub use errors::{Error, Result};

pub mod api;
pub mod client;
pub mod config;
pub mod dleq;
pub mod group;
pub mod hash;
pub mod keys;
pub mod ledger;
pub mod server;
pub mod voprf;

pub use client::{Client, PendingToken, Wallet};
pub use config::Config;
pub use dleq::DleqProof;
pub use keys::{KeyPair, PublicKey};
pub use ledger::RedemptionLedger;
pub use server::{Evaluation, Server};
pub use voprf::{blind, evaluate, unblind, BlindedElement, BlindingFactor, EvaluatedElement, Token};
