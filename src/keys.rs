use std::fmt;

use rand_chacha::ChaChaRng;
use rand_core::{CryptoRng, RngCore, SeedableRng};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use curve25519_dalek::constants::RISTRETTO_BASEPOINT_TABLE;
use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;

use crate::errors::Result;
use crate::group::{point_from_hex, point_to_hex, random_nonzero_scalar};

/// The issuer's long-lived signing key \\((k, K = kG)\\).
///
/// The private scalar never leaves the process, so there is no `Serialize`
/// implementation.
pub struct KeyPair {
    pub(crate) sk: Scalar,
    pub(crate) pk: PublicKey,
}

/// The issuer's public key \\(K \in \GG\\), published to clients.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicKey(pub(crate) RistrettoPoint);

impl KeyPair {
    pub fn generate<R>(csrng: &mut R) -> KeyPair
    where
        R: RngCore + CryptoRng,
    {
        let sk = random_nonzero_scalar(csrng);
        let pk = PublicKey(&sk * &RISTRETTO_BASEPOINT_TABLE);
        KeyPair { sk, pk }
    }

    /// Derives a keypair deterministically from a 32-byte seed.
    pub fn from_seed(seed: [u8; 32]) -> KeyPair {
        let mut rng = ChaChaRng::from_seed(seed);
        KeyPair::generate(&mut rng)
    }

    pub fn public_key(&self) -> PublicKey {
        self.pk
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("sk", &"<redacted>")
            .field("pk", &self.pk)
            .finish()
    }
}

impl<'a> From<&'a KeyPair> for PublicKey {
    fn from(kp: &'a KeyPair) -> PublicKey {
        kp.pk
    }
}

impl PublicKey {
    pub fn to_hex(&self) -> String {
        point_to_hex(&self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        point_from_hex(s).map(PublicKey)
    }

    pub fn as_point(&self) -> &RistrettoPoint {
        &self.0
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        PublicKey::from_hex(&s).map_err(de::Error::custom)
    }
}
