use std::convert::TryFrom;

use rand_core::{CryptoRng, RngCore};

use curve25519_dalek::constants::{RISTRETTO_BASEPOINT_POINT, RISTRETTO_BASEPOINT_TABLE};
use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::VartimeMultiscalarMul;
use merlin::Transcript;
use serde::{Deserialize, Serialize};

use crate::dleq::transcript::DleqTranscript;
use crate::errors::Error;
use crate::group::{random_nonzero_scalar, scalar_from_hex, scalar_to_hex};

const DLEQ_LABEL: &[u8] = b"voprf-tokens DLEQ";

/// A compact Chaum-Pedersen proof \\((c, s)\\).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ProofWire", into = "ProofWire")]
pub struct DleqProof {
    /// The Fiat-Shamir challenge \\(c = H(G, K, B, Y, A, C)\\).
    pub(crate) c: Scalar,
    /// The response \\(s = r + ck\\).
    pub(crate) s: Scalar,
}

pub struct ProveAssignments<'a> {
    pub k: &'a Scalar,
    pub K: &'a RistrettoPoint,
    pub B: &'a RistrettoPoint,
    pub Y: &'a RistrettoPoint,
}

pub struct VerifyAssignments<'a> {
    pub K: &'a RistrettoPoint,
    pub B: &'a RistrettoPoint,
    pub Y: &'a RistrettoPoint,
}

fn statement_transcript(K: &RistrettoPoint, B: &RistrettoPoint, Y: &RistrettoPoint) -> Transcript {
    let mut transcript = Transcript::new(DLEQ_LABEL);
    transcript.domain_sep();
    transcript.append_point(b"G", &RISTRETTO_BASEPOINT_POINT);
    transcript.append_point(b"K", K);
    transcript.append_point(b"B", B);
    transcript.append_point(b"Y", Y);
    transcript
}

/// Proves that `Y = k * B` and `K = k * G` share the discrete log `k`.
pub fn prove_compact<R>(csrng: &mut R, assignments: ProveAssignments) -> DleqProof
where
    R: RngCore + CryptoRng,
{
    let mut transcript = statement_transcript(assignments.K, assignments.B, assignments.Y);

    // nonce is bound to the statement and witness as well as to csrng
    let mut rng = transcript
        .build_rng()
        .rekey_with_witness_bytes(b"witness", assignments.k.as_bytes())
        .finalize(csrng);
    let r = random_nonzero_scalar(&mut rng);

    let A = &r * &RISTRETTO_BASEPOINT_TABLE;
    let C = r * assignments.B;
    transcript.append_point(b"A", &A);
    transcript.append_point(b"C", &C);

    let c = transcript.get_challenge(b"challenge");
    let s = r + c * assignments.k;

    DleqProof { c, s }
}

/// Verifies `proof` by recomputing both commitments and the challenge.
pub fn verify_compact(proof: &DleqProof, assignments: VerifyAssignments) -> Result<(), Error> {
    let mut transcript = statement_transcript(assignments.K, assignments.B, assignments.Y);

    let minus_c = -proof.c;
    let A = RistrettoPoint::vartime_multiscalar_mul(
        &[proof.s, minus_c],
        &[RISTRETTO_BASEPOINT_POINT, *assignments.K],
    );
    let C = RistrettoPoint::vartime_multiscalar_mul(
        &[proof.s, minus_c],
        &[*assignments.B, *assignments.Y],
    );
    transcript.append_point(b"A", &A);
    transcript.append_point(b"C", &C);

    let expected_challenge = transcript.get_challenge(b"challenge");
    if expected_challenge == proof.c {
        Ok(())
    } else {
        Err(Error::InvalidProof)
    }
}

/// JSON shape of a proof: `{"c": <hex>, "s": <hex>}`.
#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProofWire {
    c: String,
    s: String,
}

impl TryFrom<ProofWire> for DleqProof {
    type Error = Error;

    fn try_from(wire: ProofWire) -> Result<Self, Error> {
        Ok(DleqProof {
            c: scalar_from_hex(&wire.c)?,
            s: scalar_from_hex(&wire.s)?,
        })
    }
}

impl From<DleqProof> for ProofWire {
    fn from(proof: DleqProof) -> Self {
        ProofWire {
            c: scalar_to_hex(&proof.c),
            s: scalar_to_hex(&proof.s),
        }
    }
}
