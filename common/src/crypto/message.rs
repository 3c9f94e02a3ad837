use super::{
    error::CryptoError,
    hash::{hash_message, keccak256},
    wallet::{Wallet, SIGNATURE_SIZE},
};
use primitive_types::H256;
use rand::{CryptoRng, RngCore};

// Message signed by the credential fixture handed to signature-gated contracts
pub const FIXTURE_MESSAGE: &str = "test";

/// Credentials consumed by signature-gated contract calls
#[derive(Debug, Clone)]
pub struct SignedMessage {
    /// EIP-191 hash of the signed message
    pub message_hash: H256,
    /// 65 byte `r || s || v` signature
    pub signature_bytes: [u8; SIGNATURE_SIZE],
    /// Freshly generated signer
    pub wallet: Wallet,
    /// keccak256 of `signature_bytes`
    pub signature_hash: H256,
}

impl SignedMessage {
    /// Sign `message` with `wallet`
    pub fn sign(wallet: Wallet, message: &str) -> Result<Self, CryptoError> {
        let signature_bytes = wallet.sign_message(message)?;
        Ok(Self {
            message_hash: hash_message(message),
            signature_hash: keccak256(&signature_bytes),
            signature_bytes,
            wallet,
        })
    }
}

/// Generate a new key pair and sign [`FIXTURE_MESSAGE`] with it
pub fn signed_message<R: RngCore + CryptoRng>(rng: &mut R) -> Result<SignedMessage, CryptoError> {
    SignedMessage::sign(Wallet::random(rng), FIXTURE_MESSAGE)
}
