// Credentials handed to signature-gated contracts

use evmctl_common::crypto::{hash_message, keccak256, signed_message, FIXTURE_MESSAGE};
use evmctl_testing_framework::prelude::*;
use rand::rngs::OsRng;

#[test]
fn test_fixture_signature_recovers_signer() {
    let signed = signed_message(&mut OsRng).unwrap();

    assert_eq!(signed.message_hash, hash_message(FIXTURE_MESSAGE));
    assert_eq!(signed.signature_bytes.len(), 65);
    assert!(matches!(signed.signature_bytes[64], 27 | 28));
    assert_eq!(signed.signature_hash, keccak256(&signed.signature_bytes));
    assert_eq!(
        recover_signer(signed.message_hash, &signed.signature_bytes).unwrap(),
        signed.wallet.address()
    );
}

#[test]
fn test_seeded_fixture_replays() {
    let env = DeterministicTestEnv::with_seed(0xa3f5c8e1b2d94706);
    let replay = DeterministicTestEnv::with_seed(env.seed());

    let first = signed_message_fixture(&env.rng).unwrap();
    let again = signed_message_fixture(&replay.rng).unwrap();
    assert_eq!(first.wallet.address(), again.wallet.address());
    assert_eq!(first.signature_bytes, again.signature_bytes);

    // The next fixture from the same stream is a different signer
    let next = signed_message_fixture(&env.rng).unwrap();
    assert_ne!(next.wallet.address(), first.wallet.address());
}

#[test]
fn test_tampered_signature_recovers_someone_else() {
    let env = DeterministicTestEnv::with_seed(77);
    let signed = signed_message_fixture(&env.rng).unwrap();

    let mut tampered = signed.signature_bytes;
    tampered[10] ^= 0xff;
    // Either not a valid signature at all, or one from a different key
    if let Ok(address) = recover_signer(signed.message_hash, &tampered) {
        assert_ne!(address, signed.wallet.address());
    }
}

#[tokio::test]
async fn test_fresh_signer_can_be_funded() {
    let env = DeterministicTestEnv::with_seed_and_start(78, 1_000_000);
    let (node, controller) = env.spawn();
    let signed = signed_message_fixture(&env.rng).unwrap();

    controller
        .send_value(node.accounts()[0], signed.wallet.address(), parse_units("0.5", 18).unwrap())
        .await
        .unwrap();
    assert_eq!(
        from_unit(controller.read_balance(signed.wallet.address()).await.unwrap()),
        "0.5"
    );
}
