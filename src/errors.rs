use thiserror::Error;

/// Errors produced by the token protocol.
///
/// None of the variants carry key material or protocol secrets, so they are
/// safe to log on either side of the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// Malformed point or scalar encoding, or a missing request field.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// Redemption failed. Reused nonces and wrong outputs are reported alike.
    #[error("token invalid or already used")]
    TokenInvalidOrUsed,
    /// The evaluation proof did not verify against the issuer public key.
    #[error("proof verification failed")]
    InvalidProof,
    #[error("internal failure: {0}")]
    InternalFailure(&'static str),
}

impl Error {
    /// Whether the error is the caller's fault (as opposed to ours).
    pub fn is_client_fault(&self) -> bool {
        !matches!(self, Error::InternalFailure(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_internal_failures_are_our_fault() {
        assert!(Error::InvalidInput("x").is_client_fault());
        assert!(Error::TokenInvalidOrUsed.is_client_fault());
        assert!(Error::InvalidProof.is_client_fault());
        assert!(!Error::InternalFailure("x").is_client_fault());
    }
}
