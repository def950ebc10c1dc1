mod event;

use std::fmt::Display;

use alloy::{
    primitives::{Address, B256, TxHash},
    rpc::types::TransactionReceipt,
    sol_types::SolEvent,
};
use chrono::{DateTime, Utc};
pub use event::*;

use crate::{
    abi::IEAS,
    error::{AlkahestError, Result},
};

/// UID of an EAS attestation or schema.
pub type Uid = B256;

/// Instant in chain history an event or read is up to date with.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Eq, Ord, Hash, Default)]
pub struct BlockInstant {
    block_number: u64,
    block_timestamp: u64,
}

impl BlockInstant {
    pub fn new(block_number: u64, block_timestamp: u64) -> Self {
        Self { block_number, block_timestamp }
    }

    pub fn block_number(&self) -> u64 { self.block_number }

    pub fn block_timestamp(&self) -> u64 { self.block_timestamp }

    pub fn next(&self) -> Self {
        Self { block_number: self.block_number + 1, block_timestamp: self.block_timestamp }
    }
}

impl Display for BlockInstant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.block_number > 0 {
            write!(f, "#{} @ {}", self.block_number, format_timestamp(self.block_timestamp))
        } else {
            write!(f, "{}", format_timestamp(self.block_timestamp))
        }
    }
}

/// Formats unix timestamp as UTC date and time.
pub fn format_timestamp(ts: u64) -> String {
    i64::try_from(ts)
        .ok()
        .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| ts.to_string())
}

/// Result of a mined transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxOutcome {
    /// Hash of the mined transaction.
    pub tx_hash: TxHash,
    /// UID of the first attestation EAS made within the transaction, if any.
    pub uid: Option<Uid>,
}

impl TxOutcome {
    /// Builds the outcome from a receipt, failing on reverted transactions.
    ///
    /// Only `Attested` events emitted by `eas` are taken into account.
    pub fn from_receipt(receipt: &TransactionReceipt, eas: Address) -> Result<Self> {
        if !receipt.status() {
            return Err(AlkahestError::Reverted(receipt.transaction_hash));
        }
        let uid = attested_uids(eas, receipt.inner.logs().iter().map(|log| &log.inner)).next();
        Ok(Self { tx_hash: receipt.transaction_hash, uid })
    }

    /// UID of the attestation the transaction was expected to make.
    pub fn attestation(&self) -> Result<Uid> {
        self.uid.ok_or(AlkahestError::NoAttestation(self.tx_hash))
    }
}

/// UIDs of attestations from `Attested` events emitted by `eas` found among
/// the logs.
///
/// Logs of other events or emitted by other contracts are skipped.
pub fn attested_uids<'a>(
    eas: Address,
    logs: impl IntoIterator<Item = &'a alloy::primitives::Log>,
) -> impl Iterator<Item = Uid> {
    logs.into_iter()
        .filter(move |log| log.address == eas)
        .filter(|log| log.topics().first() == Some(&IEAS::Attested::SIGNATURE_HASH))
        .filter_map(|log| IEAS::Attested::decode_log(log).ok())
        .map(|log| log.data.uid)
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{Log, b256};

    use super::*;
    use crate::abi::IERC20;

    fn attested(uid: Uid) -> IEAS::Attested {
        IEAS::Attested {
            recipient: Address::with_last_byte(1),
            attester: Address::with_last_byte(2),
            uid,
            schemaUID: B256::ZERO,
        }
    }

    #[test]
    fn test_attested_uids_skips_foreign_events() {
        let eas = Address::with_last_byte(8);
        let uid = b256!("0x1111111111111111111111111111111111111111111111111111111111111111");
        let transfer = IERC20::Transfer {
            from: Address::ZERO,
            to: Address::with_last_byte(1),
            value: alloy::primitives::U256::from(5),
        };
        let logs = [
            Log { address: Address::with_last_byte(9), data: transfer.encode_log_data() },
            Log { address: eas, data: attested(uid).encode_log_data() },
        ];

        assert_eq!(attested_uids(eas, &logs).collect::<Vec<_>>(), vec![uid]);
    }

    #[test]
    fn test_attested_uids_ignores_other_emitters() {
        let eas = Address::repeat_byte(0xea);
        let token = Address::repeat_byte(0x70);
        let forged = b256!("0xdead000000000000000000000000000000000000000000000000000000000000");
        let uid = b256!("0x1111111111111111111111111111111111111111111111111111111111111111");
        let logs = [
            Log { address: token, data: attested(forged).encode_log_data() },
            Log { address: eas, data: attested(uid).encode_log_data() },
        ];

        assert_eq!(attested_uids(eas, &logs).next(), Some(uid));
        assert_eq!(attested_uids(token, &logs).next(), Some(forged));
    }

    #[test]
    fn test_block_instant_display() {
        assert_eq!(BlockInstant::new(0, 0).to_string(), "1970-01-01 00:00:00");
        assert_eq!(BlockInstant::new(7, 86400).to_string(), "#7 @ 1970-01-02 00:00:00");
        assert_eq!(BlockInstant::new(7, 86400).next().block_number(), 8);
    }
}
