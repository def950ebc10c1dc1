//! Helpers to exercise the SDK without a node.
//!
//! [`mocked_client`] answers RPC requests with the responses pushed to the
//! returned [`Asserter`], in order. [`fixtures`] builds protocol records.

pub mod fixtures;

use alloy::{
    primitives::TxHash,
    providers::{Provider, ProviderBuilder},
    rpc::types::Log,
    transports::mock::Asserter,
};

use crate::{AlkahestClient, addresses::AddressConfig};

/// Read-only client over a mocked transport.
///
/// Transactions are sent as is, without filling gas, nonce or chain id. A
/// write consumes the transaction hash, then the receipt twice: once when
/// watching the pending transaction and once when fetching the receipt, see
/// [`push_mined`].
pub fn mocked_client(addresses: AddressConfig) -> (AlkahestClient, Asserter) {
    let asserter = Asserter::new();
    let provider = ProviderBuilder::new()
        .disable_recommended_fillers()
        .connect_mocked_client(asserter.clone())
        .erased();
    (AlkahestClient::read_only(provider, addresses), asserter)
}

/// Queues the responses of a write whose transaction is mined right away
/// with the given status and logs.
pub fn push_mined(asserter: &Asserter, tx_hash: TxHash, success: bool, logs: Vec<Log>) {
    let receipt = fixtures::receipt(tx_hash, success, logs);
    asserter.push_success(&tx_hash);
    asserter.push_success(&receipt);
    asserter.push_success(&receipt);
}
