//! Canonical encodings for ristretto255 points and scalars.
//!
//! Points travel as the lowercase hex of their 32-byte compressed encoding.
//! Scalars travel as big-endian hex integers with no leading zero nibbles.
//! Both decoders are strict: anything that is not a canonical group element
//! or a reduced scalar is rejected rather than coerced.

use rand_core::{CryptoRng, RngCore};

use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use curve25519_dalek::scalar::Scalar;

use crate::errors::{Error, Result};

/// Length in bytes of a compressed point.
pub const POINT_LEN: usize = 32;

/// Samples a scalar uniformly from \\([1, n-1]\\).
pub fn random_nonzero_scalar<R>(csrng: &mut R) -> Scalar
where
    R: RngCore + CryptoRng,
{
    loop {
        let x = Scalar::random(csrng);
        if x != Scalar::zero() {
            return x;
        }
    }
}

/// Parses a compressed encoding from hex without decompressing it.
pub fn compressed_from_hex(s: &str) -> Result<CompressedRistretto> {
    let bytes = hex::decode(s).map_err(|_| Error::InvalidInput("point is not valid hex"))?;
    if bytes.len() != POINT_LEN {
        return Err(Error::InvalidInput("point has the wrong length"));
    }
    let mut arr = [0u8; POINT_LEN];
    arr.copy_from_slice(&bytes);
    Ok(CompressedRistretto(arr))
}

/// Parses and validates a point from its hex-encoded compressed form.
pub fn point_from_hex(s: &str) -> Result<RistrettoPoint> {
    compressed_from_hex(s)?
        .decompress()
        .ok_or(Error::InvalidInput("point is not a valid group element"))
}

pub fn point_to_hex(point: &RistrettoPoint) -> String {
    hex::encode(point.compress().as_bytes())
}

pub fn scalar_to_hex(scalar: &Scalar) -> String {
    let mut be = scalar.to_bytes();
    be.reverse();
    let digits = hex::encode(be);
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Parses a big-endian hex integer, rejecting values not below the group order.
pub fn scalar_from_hex(s: &str) -> Result<Scalar> {
    if s.is_empty() || s.len() > 2 * 32 {
        return Err(Error::InvalidInput("scalar has the wrong length"));
    }
    let padded = if s.len() % 2 == 1 {
        format!("0{}", s)
    } else {
        s.to_string()
    };
    let be = hex::decode(&padded).map_err(|_| Error::InvalidInput("scalar is not valid hex"))?;

    let mut le = [0u8; 32];
    for (dst, src) in le.iter_mut().zip(be.iter().rev()) {
        *dst = *src;
    }
    Scalar::from_canonical_bytes(le).ok_or(Error::InvalidInput("scalar is not reduced"))
}
