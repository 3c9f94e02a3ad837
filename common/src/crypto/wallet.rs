use super::{
    error::CryptoError,
    hash::{hash_message, keccak256},
};
use crate::Address;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use primitive_types::H256;
use rand::{CryptoRng, RngCore};
use std::fmt;

// r (32 bytes) || s (32 bytes) || v (1 byte)
pub const SIGNATURE_SIZE: usize = 65;

// Offset added to the recovery id in the `v` byte of message signatures
const RECOVERY_ID_OFFSET: u8 = 27;

/// Secp256k1 key pair with its derived account address
#[derive(Clone)]
pub struct Wallet {
    signing_key: SigningKey,
    address: Address,
}

impl Wallet {
    /// Generate a fresh key pair
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self::from_signing_key(SigningKey::random(rng))
    }

    pub fn from_private_key(bytes: &[u8]) -> Result<Self, CryptoError> {
        let signing_key =
            SigningKey::from_slice(bytes).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self::from_signing_key(signing_key))
    }

    /// Accepts the key with or without a `0x` prefix
    pub fn from_hex(key: &str) -> Result<Self, CryptoError> {
        let key = key.strip_prefix("0x").unwrap_or(key);
        let bytes = hex::decode(key).map_err(|e| CryptoError::InvalidHex(e.to_string()))?;
        Self::from_private_key(&bytes)
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let address = address_of(signing_key.verifying_key());
        Self {
            signing_key,
            address,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn private_key_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes().into()
    }

    /// Sign an already hashed 32 byte digest
    pub fn sign_hash(&self, hash: H256) -> Result<[u8; SIGNATURE_SIZE], CryptoError> {
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(hash.as_bytes())?;

        let mut bytes = [0u8; SIGNATURE_SIZE];
        bytes[..64].copy_from_slice(&signature.to_bytes());
        bytes[64] = recovery_id.to_byte() + RECOVERY_ID_OFFSET;
        Ok(bytes)
    }

    /// Sign `message` the way wallets do for `personal_sign`
    pub fn sign_message(
        &self,
        message: impl AsRef<[u8]>,
    ) -> Result<[u8; SIGNATURE_SIZE], CryptoError> {
        self.sign_hash(hash_message(message))
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Account address of a public key: last 20 bytes of keccak256 over the
/// uncompressed point without its 0x04 tag
pub fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    Address::from_slice(&hash.as_bytes()[12..])
}

/// Recover the address that produced `signature` over `hash`
pub fn recover_signer(hash: H256, signature: &[u8]) -> Result<Address, CryptoError> {
    if signature.len() != SIGNATURE_SIZE {
        return Err(CryptoError::InvalidSignatureLength {
            len: signature.len(),
            expected: SIGNATURE_SIZE,
        });
    }

    let v = signature[64];
    let recovery_byte = match v {
        0 | 1 => v,
        27 | 28 => v - RECOVERY_ID_OFFSET,
        _ => return Err(CryptoError::InvalidRecoveryId(v)),
    };
    let recovery_id =
        RecoveryId::from_byte(recovery_byte).ok_or(CryptoError::InvalidRecoveryId(v))?;
    let signature = Signature::from_slice(&signature[..64])?;
    let key = VerifyingKey::recover_from_prehash(hash.as_bytes(), &signature, recovery_id)?;
    Ok(address_of(&key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    // Well-known first development account key and its address
    const DEV_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const DEV_ADDRESS: &str = "f39fd6e51aad88f6f4ce6ab8827279cfffb92266";

    #[test]
    fn test_address_derivation() {
        let wallet = Wallet::from_hex(DEV_KEY).unwrap();
        assert_eq!(hex::encode(wallet.address().as_bytes()), DEV_ADDRESS);

        let prefixed = Wallet::from_hex(&format!("0x{}", DEV_KEY)).unwrap();
        assert_eq!(prefixed.address(), wallet.address());
        assert_eq!(hex::encode(prefixed.private_key_bytes()), DEV_KEY);
    }

    #[test]
    fn test_invalid_keys() {
        assert_eq!(
            Wallet::from_private_key(&[0u8; 32]).unwrap_err(),
            CryptoError::InvalidPrivateKey
        );
        assert!(matches!(
            Wallet::from_hex("not hex"),
            Err(CryptoError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_sign_and_recover() {
        let mut rng = StdRng::seed_from_u64(7);
        let wallet = Wallet::random(&mut rng);

        let signature = wallet.sign_message("test").unwrap();
        assert!(signature[64] == 27 || signature[64] == 28);

        let signer = recover_signer(hash_message("test"), &signature).unwrap();
        assert_eq!(signer, wallet.address());

        // A different message recovers a different address
        let other = recover_signer(hash_message("other"), &signature).unwrap();
        assert_ne!(other, wallet.address());
    }

    #[test]
    fn test_signing_is_deterministic() {
        let wallet = Wallet::from_hex(DEV_KEY).unwrap();
        assert_eq!(
            wallet.sign_message("test").unwrap(),
            wallet.sign_message("test").unwrap()
        );
    }

    #[test]
    fn test_recover_accepts_raw_recovery_id() {
        let wallet = Wallet::from_hex(DEV_KEY).unwrap();
        let mut signature = wallet.sign_message("test").unwrap();
        signature[64] -= RECOVERY_ID_OFFSET;
        assert_eq!(
            recover_signer(hash_message("test"), &signature).unwrap(),
            wallet.address()
        );
    }

    #[test]
    fn test_recover_rejects_malformed_signatures() {
        let hash = hash_message("test");
        assert_eq!(
            recover_signer(hash, &[0u8; 64]).unwrap_err(),
            CryptoError::InvalidSignatureLength {
                len: 64,
                expected: SIGNATURE_SIZE
            }
        );

        let wallet = Wallet::from_hex(DEV_KEY).unwrap();
        let mut signature = wallet.sign_message("test").unwrap();
        signature[64] = 5;
        assert_eq!(
            recover_signer(hash, &signature).unwrap_err(),
            CryptoError::InvalidRecoveryId(5)
        );
    }

    #[test]
    fn test_debug_hides_key() {
        let wallet = Wallet::from_hex(DEV_KEY).unwrap();
        let debug = format!("{:?}", wallet);
        assert!(debug.contains("address"));
        assert!(!debug.contains(DEV_KEY));
    }
}
