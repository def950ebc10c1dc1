use alloy::{
    primitives::{Address, B256, Bloom, Bytes, TxHash},
    rpc::types::{Block, Log},
    sol_types::SolEvent,
};

use crate::{
    abi::Attestation,
    addresses::{AddressConfig, Contract},
};

/// Configuration with every protocol contract at a distinct address,
/// `0x1010..10` for the first one, `0x1111..11` for the second, etc.
pub fn addresses() -> AddressConfig {
    Contract::ALL
        .iter()
        .zip(0x10u8..)
        .fold(AddressConfig::default(), |config, (contract, byte)| {
            config.with(*contract, Address::repeat_byte(byte))
        })
}

/// Attestation made by the attester with the given data, created at
/// timestamp 1000 without expiration.
pub fn attestation(attester: Address, data: Bytes) -> Attestation {
    Attestation {
        uid: B256::repeat_byte(0xa1),
        schema: B256::repeat_byte(0x5c),
        time: 1000,
        expirationTime: 0,
        revocationTime: 0,
        refUID: B256::ZERO,
        recipient: Address::repeat_byte(0xbb),
        attester,
        revocable: true,
        data,
    }
}

/// Log of the event as returned by `eth_getLogs`.
pub fn rpc_log(address: Address, tx_hash: TxHash, log_index: u64, event: impl SolEvent) -> Log {
    Log {
        inner: alloy::primitives::Log { address, data: event.encode_log_data() },
        transaction_hash: Some(tx_hash),
        transaction_index: Some(0),
        log_index: Some(log_index),
        ..Default::default()
    }
}

/// Block as returned by `eth_getBlockByNumber`, without transactions.
pub fn block(number: u64, timestamp: u64) -> Block {
    let mut block: Block = Block::default();
    block.header.inner.number = number;
    block.header.inner.timestamp = timestamp;
    block
}

/// EIP-1559 transaction receipt as returned by `eth_getTransactionReceipt`.
pub fn receipt(tx_hash: TxHash, success: bool, logs: Vec<Log>) -> serde_json::Value {
    serde_json::json!({
        "type": "0x2",
        "status": if success { "0x1" } else { "0x0" },
        "cumulativeGasUsed": "0x5208",
        "logs": logs,
        "logsBloom": Bloom::ZERO,
        "transactionHash": tx_hash,
        "transactionIndex": "0x0",
        "blockHash": B256::repeat_byte(0xbc),
        "blockNumber": "0x10",
        "gasUsed": "0x5208",
        "effectiveGasPrice": "0x1",
        "from": Address::repeat_byte(0xbb),
        "to": Address::repeat_byte(0xcc),
        "contractAddress": null,
    })
}
