//! Fixtures built from a seeded [`TestRng`]

use crate::controller::{ChainTimeController, ControlResult};
use crate::orchestrator::TestRng;
use evmctl_common::{
    crypto::{CryptoError, SignedMessage, Wallet, FIXTURE_MESSAGE},
    Address, U256,
};
use log::debug;

/// Fresh key pair signing the fixture message `"test"`
///
/// Same seed, same key, same signature.
pub fn signed_message_fixture(rng: &TestRng) -> Result<SignedMessage, CryptoError> {
    SignedMessage::sign(rng.wallet(), FIXTURE_MESSAGE)
}

/// Fresh key pair whose address received `amount` wei from `funder`
///
/// `funder` must be an account the node signs for.
pub async fn fund_wallet(
    controller: &ChainTimeController,
    rng: &TestRng,
    funder: Address,
    amount: U256,
) -> ControlResult<Wallet> {
    let wallet = rng.wallet();
    let tx_hash = controller
        .send_value(funder, wallet.address(), amount)
        .await?;
    debug!(
        "Funded {:?} with {} wei in {:?}",
        wallet.address(),
        amount,
        tx_hash
    );
    Ok(wallet)
}
