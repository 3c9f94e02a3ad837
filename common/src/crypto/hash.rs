use primitive_types::H256;
use sha3::{Digest, Keccak256};

pub const HASH_SIZE: usize = 32; // 32 bytes / 256 bits

// Prefix prepended by `personal_sign` style message signing (EIP-191 version 0x45)
pub const MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

// Hash a byte array using keccak256
#[inline(always)]
pub fn keccak256(value: &[u8]) -> H256 {
    let result: [u8; HASH_SIZE] = Keccak256::digest(value).into();
    H256(result)
}

/// Hash of `message` as signed by wallets: `keccak256(prefix || len || message)`
pub fn hash_message(message: impl AsRef<[u8]>) -> H256 {
    let message = message.as_ref();
    let mut hasher = Keccak256::new();
    hasher.update(MESSAGE_PREFIX.as_bytes());
    hasher.update(message.len().to_string().as_bytes());
    hasher.update(message);
    let result: [u8; HASH_SIZE] = hasher.finalize().into();
    H256(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak256_empty() {
        assert_eq!(
            hex::encode(keccak256(&[]).as_bytes()),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_hash_message_matches_manual_prefix() {
        let manual = keccak256(b"\x19Ethereum Signed Message:\n4test");
        assert_eq!(hash_message("test"), manual);
        assert_eq!(hash_message(b"test".to_vec()), manual);
    }

    #[test]
    fn test_hash_message_hello_world() {
        // Well-known value of hashMessage("Hello World")
        assert_eq!(
            hex::encode(hash_message("Hello World").as_bytes()),
            "a1de988600a42c4b4ab089b619297c17d53cffae5d5120d82d8a92d0bb3b78f2"
        );
    }
}
