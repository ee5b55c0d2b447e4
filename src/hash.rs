//! Deterministic maps from byte strings into the group.

use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use sha2::{Digest, Sha512};

use crate::errors::{Error, Result};

const HASH_TO_GROUP_DST: &[u8] = b"voprf-tokens ristretto255 hash-to-group v1";

/// About one candidate in eight decodes.
const MAX_ATTEMPTS: usize = 512;

/// Hashes `input` to a group element by try-and-rehash.
///
/// The first 32 bytes of a SHA-512 digest are read as a compressed Ristretto
/// encoding. If they do not decode, the previous digest is hashed again. The
/// result is a pure function of `input`, and the discrete log of the output
/// with respect to the basepoint is unknown.
pub fn hash_to_group(input: &[u8]) -> Result<RistrettoPoint> {
    let mut digest = Sha512::new()
        .chain(HASH_TO_GROUP_DST)
        .chain(&(input.len() as u64).to_be_bytes())
        .chain(input)
        .result();

    for _ in 0..MAX_ATTEMPTS {
        let mut candidate = [0u8; 32];
        candidate.copy_from_slice(&digest[..32]);
        // canonical encodings never set the top bit
        candidate[31] &= 0x7f;
        if let Some(point) = CompressedRistretto(candidate).decompress() {
            return Ok(point);
        }
        digest = Sha512::new().chain(HASH_TO_GROUP_DST).chain(&digest).result();
    }

    Err(Error::InternalFailure("hash to group exhausted its attempts"))
}
