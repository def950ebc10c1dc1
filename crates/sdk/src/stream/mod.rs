//! Polling of contract events.

use std::time::Duration;

use alloy::{
    eips::BlockId,
    primitives::Address,
    providers::Provider,
    rpc::types::{Filter, Log},
    sol_types::{SolEvent, SolEventInterface},
};
use futures::{Stream, stream};

use crate::{
    error::{AlkahestError, Result},
    types,
};

/// Returns stream of events emitted by the given contracts, batched per block,
/// starting from the specified block.
///
/// Polls logs via the given [`Provider`] to produce strictly continuous
/// event sequence, with [`Provider`]-configured interval.
///
/// Logs that do not decode into `E` are skipped.
///
/// It is recommended to setup provider with
/// [`alloy::transports::layers::FallbackLayer`]
/// and/or [`alloy::transports::layers::RetryBackoffLayer`].
pub fn raw<E, P, S, SFut>(
    addresses: Vec<Address>,
    provider: P,
    from_block: u64,
    sleep: S,
) -> impl Stream<Item = Result<types::BlockEvents<types::EventContext<E>>>>
where
    E: SolEventInterface,
    P: Provider,
    S: Fn(Duration) -> SFut + Copy,
    SFut: Future<Output = ()>,
{
    let base_filter = Filter::new().address(addresses);
    stream::unfold((provider, from_block), move |(provider, mut block_num)| {
        let filter = base_filter.clone().from_block(block_num).to_block(block_num);
        async move {
            loop {
                // Some nodes produce empty response instead of error in case the
                // block in the filter does not exist yet, so checking the block
                // presence explicitly
                let result = futures::try_join!(
                    provider.get_block(BlockId::number(block_num)).into_future(),
                    provider.get_logs(&filter)
                )
                .map_err(AlkahestError::from)
                .and_then(|(block, logs)| {
                    let block_header = block
                        .ok_or(AlkahestError::InvalidRequest(
                            "block is not available yet".to_string(),
                        ))?
                        .header;
                    Ok(types::BlockEvents::new(
                        types::BlockInstant::new(block_num, block_header.timestamp),
                        decode_logs(&logs),
                    ))
                });
                if result.is_ok() {
                    block_num += 1;
                    return Some((result, (provider, block_num)));
                }
                if matches!(result, Err(AlkahestError::InvalidRequest(_))) {
                    // Block is not available yet
                    sleep(provider.client().poll_interval()).await;
                    continue;
                }
                return Some((result, (provider, block_num)));
            }
        }
    })
}

/// Decodes the logs into events with context, skipping unknown ones.
pub fn decode_logs<E: SolEventInterface>(logs: &[Log]) -> Vec<types::EventContext<E>> {
    logs.iter()
        .filter_map(|log| match E::decode_log(&log.inner) {
            Ok(decoded) => Some(types::EventContext::new(
                log.transaction_hash.unwrap_or_default(),
                log.transaction_index.unwrap_or_default(),
                log.log_index.unwrap_or_default(),
                decoded.data,
            )),
            Err(err) => {
                tracing::trace!(address = %log.inner.address, %err, "skipping log");
                None
            },
        })
        .collect()
}

/// Largest block range queried with a single `eth_getLogs` request.
pub const MAX_BLOCK_RANGE: u64 = 2_000;

/// Fetches the logs matching the filter within the inclusive block range,
/// splitting it into requests of at most [`MAX_BLOCK_RANGE`] blocks.
pub async fn get_logs_in_range<P: Provider>(
    provider: &P,
    filter: &Filter,
    from_block: u64,
    to_block: u64,
) -> Result<Vec<Log>> {
    let mut logs = Vec::new();
    let mut from = from_block;
    while from <= to_block {
        let to = to_block.min(from.saturating_add(MAX_BLOCK_RANGE - 1));
        logs.extend(provider.get_logs(&filter.clone().from_block(from).to_block(to)).await?);
        if to == u64::MAX {
            break;
        }
        from = to + 1;
    }
    Ok(logs)
}

/// Waits for the first log matching the filter to appear at or after
/// `from_block`, polling with [`Provider`]-configured interval.
///
/// Every poll scans only the blocks produced since the previous one, at most
/// [`MAX_BLOCK_RANGE`] blocks per request. The filter should select the event
/// signature of `E`, logs that do not decode are ignored.
pub async fn wait_for<E, P, S, SFut>(
    provider: &P,
    filter: Filter,
    from_block: u64,
    sleep: S,
) -> Result<types::EventContext<E>>
where
    E: SolEvent,
    P: Provider,
    S: Fn(Duration) -> SFut,
    SFut: Future<Output = ()>,
{
    let mut from = from_block;
    loop {
        let latest = provider.get_block_number().await?;
        if latest >= from {
            let to = latest.min(from.saturating_add(MAX_BLOCK_RANGE - 1));
            let logs = provider.get_logs(&filter.clone().from_block(from).to_block(to)).await?;
            let found = logs.iter().find_map(|log| {
                E::decode_log(&log.inner).ok().map(|decoded| {
                    types::EventContext::new(
                        log.transaction_hash.unwrap_or_default(),
                        log.transaction_index.unwrap_or_default(),
                        log.log_index.unwrap_or_default(),
                        decoded.data,
                    )
                })
            });
            if let Some(event) = found {
                return Ok(event);
            }
            tracing::trace!(from, to, "event not found yet");
            from = to.saturating_add(1);
            if to < latest {
                // Still catching up with the chain head
                continue;
            }
        }
        sleep(provider.client().poll_interval()).await;
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, pin::pin};

    use alloy::primitives::{B256, TxHash};
    use futures::StreamExt;

    use super::*;
    use crate::abi::TrustedOracleArbiter::{self, TrustedOracleArbiterEvents};
    use crate::testing::{self, fixtures};

    #[test]
    fn test_decode_logs_skips_foreign_events() {
        let obligation = B256::with_last_byte(1);
        let oracle = Address::with_last_byte(2);
        let arbiter = Address::with_last_byte(3);
        let logs = vec![
            fixtures::rpc_log(
                arbiter,
                TxHash::with_last_byte(1),
                0,
                TrustedOracleArbiter::ArbitrationRequested { obligation, oracle },
            ),
            fixtures::rpc_log(
                arbiter,
                TxHash::with_last_byte(1),
                1,
                crate::abi::IERC20::Approval {
                    owner: oracle,
                    spender: arbiter,
                    value: alloy::primitives::U256::ZERO,
                },
            ),
            fixtures::rpc_log(
                arbiter,
                TxHash::with_last_byte(2),
                2,
                TrustedOracleArbiter::ArbitrationMade { obligation, oracle, decision: true },
            ),
        ];

        let events = decode_logs::<TrustedOracleArbiterEvents>(&logs);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].log_index(), 0);
        assert!(matches!(
            events[0].event(),
            TrustedOracleArbiterEvents::ArbitrationRequested(e) if e.obligation == obligation
        ));
        assert_eq!(events[1].tx_hash(), TxHash::with_last_byte(2));
        assert!(matches!(
            events[1].event(),
            TrustedOracleArbiterEvents::ArbitrationMade(e) if e.decision
        ));
    }

    /// Tests blocks are yielded one by one, waiting for the ones not
    /// produced yet.
    #[tokio::test]
    async fn test_raw_continuity() {
        let addresses = fixtures::addresses();
        let (client, asserter) = testing::mocked_client(addresses.clone());
        let arbiter = addresses.trusted_oracle_arbiter;
        let obligation = B256::with_last_byte(1);
        let oracle = Address::with_last_byte(2);
        asserter.push_success(&fixtures::block(5, 500));
        asserter.push_success(&vec![fixtures::rpc_log(
            arbiter,
            TxHash::with_last_byte(1),
            0,
            TrustedOracleArbiter::ArbitrationRequested { obligation, oracle },
        )]);
        asserter.push_success(&serde_json::Value::Null);
        asserter.push_success(&Vec::<Log>::new());
        asserter.push_success(&serde_json::Value::Null);
        asserter.push_success(&Vec::<Log>::new());
        asserter.push_success(&fixtures::block(6, 512));
        asserter.push_success(&Vec::<Log>::new());

        let sleeps = Cell::new(0);
        let sleep = |_: Duration| {
            sleeps.set(sleeps.get() + 1);
            async {}
        };
        let mut events = pin!(raw::<TrustedOracleArbiterEvents, _, _, _>(
            vec![arbiter],
            client.provider().clone(),
            5,
            &sleep,
        ));

        let block = events.next().await.unwrap().unwrap();
        assert_eq!(block.instant(), types::BlockInstant::new(5, 500));
        assert_eq!(block.events().len(), 1);
        assert_eq!(sleeps.get(), 0);

        let block = events.next().await.unwrap().unwrap();
        assert_eq!(block.instant(), types::BlockInstant::new(6, 512));
        assert!(block.events().is_empty());
        assert_eq!(sleeps.get(), 2);
        assert!(asserter.read_q().is_empty());
    }

    #[tokio::test]
    async fn test_raw_error() {
        let addresses = fixtures::addresses();
        let (client, asserter) = testing::mocked_client(addresses.clone());
        asserter.push_failure_msg("node is down");

        let mut events = pin!(raw::<TrustedOracleArbiterEvents, _, _, _>(
            vec![addresses.trusted_oracle_arbiter],
            client.provider().clone(),
            5,
            |_| async {},
        ));
        assert!(matches!(events.next().await, Some(Err(AlkahestError::Transport(_)))));
    }
}
