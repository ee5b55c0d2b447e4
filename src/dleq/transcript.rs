use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;
use merlin::Transcript;

pub trait DleqTranscript {
    /// Append a domain separator for a single DLEQ statement.
    fn domain_sep(&mut self);

    /// Append the canonical encoding of `point` with the given label.
    fn append_point(&mut self, label: &'static [u8], point: &RistrettoPoint);

    /// Compute a `label`ed challenge scalar from everything appended so far.
    fn get_challenge(&mut self, label: &'static [u8]) -> Scalar;
}

impl DleqTranscript for Transcript {
    fn domain_sep(&mut self) {
        self.append_message(b"dom-sep", b"dleq v1");
    }

    fn append_point(&mut self, label: &'static [u8], point: &RistrettoPoint) {
        self.append_message(label, point.compress().as_bytes());
    }

    fn get_challenge(&mut self, label: &'static [u8]) -> Scalar {
        let mut bytes = [0; 64];
        self.challenge_bytes(label, &mut bytes);
        Scalar::from_bytes_mod_order_wide(&bytes)
    }
}
