use thiserror::Error;

/// Errors that can occur during signing and recovery
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Private key bytes are not a valid secp256k1 scalar
    #[error("Invalid private key")]
    InvalidPrivateKey,

    /// Hex string could not be decoded
    #[error("Invalid hex string: {0}")]
    InvalidHex(String),

    /// Signature does not have the expected 65 bytes
    #[error("Invalid signature length: {len} bytes, expected: {expected} bytes")]
    InvalidSignatureLength { len: usize, expected: usize },

    /// Recovery byte is not one of 0, 1, 27 or 28
    #[error("Invalid recovery id: {0}")]
    InvalidRecoveryId(u8),

    /// The underlying ECDSA implementation rejected the operation
    #[error("Signature error: {0}")]
    Signature(String),
}

impl From<k256::ecdsa::Error> for CryptoError {
    fn from(err: k256::ecdsa::Error) -> Self {
        Self::Signature(err.to_string())
    }
}
