//! Discrete-log-equality proofs binding an evaluation to the issuer key.
//!
//! A proof convinces the client that \\(Y = kB\\) for the same \\(k\\) with
//! \\(K = kG\\), without revealing \\(k\\). Without it, an issuer could use a
//! different key per user and later link redemptions to issuances.

#[allow(non_snake_case)]
pub mod proofs;
pub mod transcript;

pub use crate::dleq::proofs::*;
