//! Arbitration through `TrustedOracleArbiter`.
//!
//! Anyone can ask an oracle to arbitrate an obligation by emitting
//! `ArbitrationRequested`, the oracle answers with `arbitrate`, which emits
//! `ArbitrationMade` and records the decision the arbiter later reports to
//! escrow contracts.
//!
//! [`OracleClient::listen_and_arbitrate`] implements the oracle side:
//! it follows the arbiter events with [`stream::raw`], tracks the requests
//! addressed to the signer with [`ArbitrationTracker`] and submits the
//! decisions made by a user-provided async function.

use std::{collections::HashSet, pin::pin, time::Duration};

use alloy::{
    primitives::{Address, TxHash},
    rpc::types::Filter,
    sol_types::SolEvent,
};
use futures::{
    StreamExt,
    future::{self, Either},
};
use tokio_util::sync::CancellationToken;

use crate::{
    AlkahestClient,
    abi::{
        Attestation,
        TrustedOracleArbiter::{
            self, ArbitrationMade, ArbitrationRequested, TrustedOracleArbiterEvents,
            TrustedOracleArbiterInstance,
        },
    },
    addresses::Contract,
    error::Result,
    stream,
    types::{BlockEvents, EventContext, TxOutcome, Uid},
};

/// Arbitration decision submitted by the oracle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decision {
    pub obligation: Uid,
    pub decision: bool,
    pub tx_hash: TxHash,
}

#[cfg(feature = "display")]
impl tabled::Tabled for Decision {
    const LENGTH: usize = 3;

    fn fields(&self) -> Vec<std::borrow::Cow<'_, str>> {
        use colored::Colorize;

        vec![
            self.obligation.to_string().into(),
            if self.decision {
                "approved".green().to_string().into()
            } else {
                "rejected".red().to_string().into()
            },
            self.tx_hash.to_string().into(),
        ]
    }

    fn headers() -> Vec<std::borrow::Cow<'static, str>> {
        vec!["Obligation".into(), "Decision".into(), "Tx".into()]
    }
}

/// Options of [`OracleClient::listen_and_arbitrate`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ListenOptions {
    /// Block to catch up with past requests from, `None` to only handle
    /// requests made after the listener started.
    pub from_block: Option<u64>,
    /// Skip obligations the oracle has already arbitrated, even if
    /// arbitration is requested again.
    ///
    /// Arbitrations seen by the listener and approvals recorded on-chain are
    /// detected, rejections made before `from_block` are not.
    pub skip_arbitrated: bool,
}

/// Tracks arbitration requests addressed to an oracle.
///
/// Requests become pending in the order they were made, until taken or
/// answered by the oracle. Repeated requests for a pending obligation are
/// ignored.
#[derive(Clone, Debug)]
pub struct ArbitrationTracker {
    oracle: Address,
    pending: Vec<Uid>,
    arbitrated: HashSet<Uid>,
}

impl ArbitrationTracker {
    pub fn new(oracle: Address) -> Self {
        Self { oracle, pending: Vec::new(), arbitrated: HashSet::new() }
    }

    pub fn oracle(&self) -> Address { self.oracle }

    /// Obligations awaiting the oracle decision.
    pub fn pending(&self) -> &[Uid] { &self.pending }

    /// Indicates if the oracle has arbitrated the obligation within the
    /// processed events.
    pub fn is_arbitrated(&self, obligation: &Uid) -> bool { self.arbitrated.contains(obligation) }

    pub fn apply(&mut self, event: &TrustedOracleArbiterEvents) {
        match event {
            TrustedOracleArbiterEvents::ArbitrationRequested(e) if e.oracle == self.oracle => {
                if !self.pending.contains(&e.obligation) {
                    self.pending.push(e.obligation);
                }
            },
            TrustedOracleArbiterEvents::ArbitrationMade(e) if e.oracle == self.oracle => {
                self.pending.retain(|uid| *uid != e.obligation);
                self.arbitrated.insert(e.obligation);
            },
            _ => (),
        }
    }

    pub fn apply_block(&mut self, block: &BlockEvents<EventContext<TrustedOracleArbiterEvents>>) {
        block.events().iter().for_each(|ctx| self.apply(ctx.event()));
    }

    /// Removes and returns the pending obligations.
    pub fn take_pending(&mut self) -> Vec<Uid> { std::mem::take(&mut self.pending) }
}

/// Oracle operations of [`TrustedOracleArbiter`].
#[derive(Clone, Copy, Debug)]
pub struct OracleClient<'c> {
    client: &'c AlkahestClient,
}

impl AlkahestClient {
    pub fn oracle(&self) -> OracleClient<'_> { OracleClient::new(self) }
}

impl<'c> OracleClient<'c> {
    pub(crate) fn new(client: &'c AlkahestClient) -> Self { Self { client } }

    fn arbiter(&self) -> Result<TrustedOracleArbiterInstance<&'c alloy::providers::DynProvider>> {
        Ok(TrustedOracleArbiter::new(
            self.client.address(Contract::TrustedOracleArbiter)?,
            self.client.provider(),
        ))
    }

    /// Asks the oracle to arbitrate the obligation.
    pub async fn request_arbitration(&self, obligation: Uid, oracle: Address) -> Result<TxOutcome> {
        self.client.submit(self.arbiter()?.requestArbitration(obligation, oracle)).await
    }

    /// Records the decision of the signer, acting as an oracle.
    pub async fn arbitrate(&self, obligation: Uid, decision: bool) -> Result<TxOutcome> {
        self.client.submit(self.arbiter()?.arbitrate(obligation, decision)).await
    }

    /// Current decision of the oracle, `false` if not arbitrated yet.
    pub async fn decision(&self, obligation: Uid, oracle: Address) -> Result<bool> {
        Ok(self.arbiter()?.decisions(obligation, oracle).call().await?)
    }

    /// Arbitrations of the obligation made by the oracle since the block.
    pub async fn arbitrations(
        &self,
        obligation: Uid,
        oracle: Address,
        from_block: u64,
    ) -> Result<Vec<EventContext<ArbitrationMade>>> {
        let filter = self.arbitration_filter(obligation, oracle)?;
        let to_block = self.client.block_number().await?;
        let logs =
            stream::get_logs_in_range(self.client.provider(), &filter, from_block, to_block)
                .await?;
        Ok(stream::decode_logs::<TrustedOracleArbiterEvents>(&logs)
            .into_iter()
            .filter_map(|ctx| match ctx.event() {
                TrustedOracleArbiterEvents::ArbitrationMade(e) => Some(ctx.pass(e.clone())),
                _ => None,
            })
            .collect())
    }

    /// Waits for the oracle to arbitrate the obligation.
    pub async fn wait_for_arbitration<S, SFut>(
        &self,
        obligation: Uid,
        oracle: Address,
        from_block: u64,
        sleep: S,
    ) -> Result<EventContext<ArbitrationMade>>
    where
        S: Fn(Duration) -> SFut,
        SFut: Future<Output = ()>,
    {
        let filter = self.arbitration_filter(obligation, oracle)?;
        stream::wait_for(self.client.provider(), filter, from_block, sleep).await
    }

    fn arbitration_filter(&self, obligation: Uid, oracle: Address) -> Result<Filter> {
        Ok(Filter::new()
            .address(self.client.address(Contract::TrustedOracleArbiter)?)
            .event_signature(ArbitrationMade::SIGNATURE_HASH)
            .topic1(obligation)
            .topic2(oracle.into_word()))
    }

    /// Arbitrates requests addressed to the signer made since the block
    /// and not answered yet.
    pub async fn arbitrate_past<D, DFut>(
        &self,
        from_block: u64,
        skip_arbitrated: bool,
        mut decide: D,
    ) -> Result<Vec<Decision>>
    where
        D: FnMut(Attestation) -> DFut,
        DFut: Future<Output = Option<bool>>,
    {
        let mut tracker = ArbitrationTracker::new(self.client.signer());
        let to_block = self.client.block_number().await?;
        self.catch_up(&mut tracker, from_block, to_block).await?;
        Ok(self.process_pending(&mut tracker, skip_arbitrated, &mut decide).await)
    }

    /// Arbitrates requests addressed to the signer until cancelled, returning
    /// the decisions made.
    ///
    /// `decide` is called with the obligation attestation of every request
    /// and resolves to the decision, `None` leaves the request unanswered.
    /// Failures to fetch an obligation or to submit a decision are logged and
    /// the request is dropped; errors of the event stream end the listener.
    ///
    /// Cancellation is checked between blocks, requests being processed are
    /// answered first.
    pub async fn listen_and_arbitrate<D, DFut, S, SFut>(
        &self,
        options: ListenOptions,
        mut decide: D,
        sleep: S,
        cancel: &CancellationToken,
    ) -> Result<Vec<Decision>>
    where
        D: FnMut(Attestation) -> DFut,
        DFut: Future<Output = Option<bool>>,
        S: Fn(Duration) -> SFut + Copy,
        SFut: Future<Output = ()>,
    {
        let arbiter = self.client.address(Contract::TrustedOracleArbiter)?;
        let mut tracker = ArbitrationTracker::new(self.client.signer());
        let mut decisions = Vec::new();

        let latest = self.client.block_number().await?;
        if let Some(from_block) = options.from_block {
            self.catch_up(&mut tracker, from_block, latest).await?;
            decisions.extend(
                self.process_pending(&mut tracker, options.skip_arbitrated, &mut decide)
                    .await,
            );
        }

        tracing::info!(
            oracle = %tracker.oracle(),
            from_block = latest + 1,
            "listening for arbitration requests"
        );
        let mut events = pin!(stream::raw::<TrustedOracleArbiterEvents, _, _, _>(
            vec![arbiter],
            self.client.provider().clone(),
            latest + 1,
            sleep,
        ));
        loop {
            let next = match future::select(pin!(cancel.cancelled()), events.next()).await {
                Either::Left(_) => break,
                Either::Right((next, _)) => next,
            };
            let Some(block) = next else { break };
            let block = block?;
            tracker.apply_block(&block);
            if !tracker.pending().is_empty() {
                tracing::debug!(
                    instant = %block.instant(),
                    pending = tracker.pending().len(),
                    "new arbitration requests"
                );
                decisions.extend(
                    self.process_pending(&mut tracker, options.skip_arbitrated, &mut decide)
                        .await,
                );
            }
        }
        tracing::info!(decisions = decisions.len(), "listener stopped");
        Ok(decisions)
    }

    async fn catch_up(
        &self,
        tracker: &mut ArbitrationTracker,
        from_block: u64,
        to_block: u64,
    ) -> Result<()> {
        let filter = Filter::new()
            .address(self.client.address(Contract::TrustedOracleArbiter)?)
            .event_signature(vec![
                ArbitrationRequested::SIGNATURE_HASH,
                ArbitrationMade::SIGNATURE_HASH,
            ])
            .topic2(tracker.oracle().into_word());
        let logs =
            stream::get_logs_in_range(self.client.provider(), &filter, from_block, to_block)
                .await?;
        stream::decode_logs::<TrustedOracleArbiterEvents>(&logs)
            .iter()
            .for_each(|ctx| tracker.apply(ctx.event()));
        tracing::debug!(
            from_block,
            to_block,
            pending = tracker.pending().len(),
            "caught up with past requests"
        );
        Ok(())
    }

    async fn process_pending<D, DFut>(
        &self,
        tracker: &mut ArbitrationTracker,
        skip_arbitrated: bool,
        decide: &mut D,
    ) -> Vec<Decision>
    where
        D: FnMut(Attestation) -> DFut,
        DFut: Future<Output = Option<bool>>,
    {
        let mut decisions = Vec::new();
        for obligation in tracker.take_pending() {
            match self.process_request(tracker, obligation, skip_arbitrated, decide).await {
                Ok(Some(decision)) => decisions.push(decision),
                Ok(None) => (),
                Err(err) => tracing::warn!(%obligation, %err, "failed to arbitrate"),
            }
        }
        decisions
    }

    async fn process_request<D, DFut>(
        &self,
        tracker: &ArbitrationTracker,
        obligation: Uid,
        skip_arbitrated: bool,
        decide: &mut D,
    ) -> Result<Option<Decision>>
    where
        D: FnMut(Attestation) -> DFut,
        DFut: Future<Output = Option<bool>>,
    {
        if skip_arbitrated
            && (tracker.is_arbitrated(&obligation)
                || self.decision(obligation, tracker.oracle()).await?)
        {
            tracing::debug!(%obligation, "already arbitrated");
            return Ok(None);
        }
        let attestation = self.client.get_attestation(obligation).await?;
        let Some(decision) = decide(attestation).await else {
            tracing::debug!(%obligation, "no decision");
            return Ok(None);
        };
        let outcome = self.arbitrate(obligation, decision).await?;
        tracing::info!(%obligation, decision, tx_hash = %outcome.tx_hash, "arbitrated");
        Ok(Some(Decision { obligation, decision, tx_hash: outcome.tx_hash }))
    }
}

#[cfg(test)]
mod tests {
    use alloy::{
        primitives::{B256, Bytes, U64},
        transports::mock::Asserter,
    };
    use alloy_sol_types::SolValue;

    use super::*;
    use crate::{
        addresses::AddressConfig,
        testing::{self, fixtures},
    };

    fn requested(obligation: Uid, oracle: Address) -> TrustedOracleArbiterEvents {
        let event = ArbitrationRequested { obligation, oracle };
        TrustedOracleArbiterEvents::ArbitrationRequested(event)
    }

    fn made(obligation: Uid, oracle: Address, decision: bool) -> TrustedOracleArbiterEvents {
        let event = ArbitrationMade { obligation, oracle, decision };
        TrustedOracleArbiterEvents::ArbitrationMade(event)
    }

    #[test]
    fn test_tracker_requests_and_decisions() {
        let oracle = Address::with_last_byte(1);
        let other = Address::with_last_byte(2);
        let (a, b, c) =
            (B256::with_last_byte(0xa), B256::with_last_byte(0xb), B256::with_last_byte(0xc));
        let mut tracker = ArbitrationTracker::new(oracle);

        tracker.apply(&requested(a, oracle));
        tracker.apply(&requested(b, other));
        tracker.apply(&requested(c, oracle));
        tracker.apply(&requested(a, oracle));
        assert_eq!(tracker.pending(), &[a, c]);

        tracker.apply(&made(a, other, true));
        assert_eq!(tracker.pending(), &[a, c]);
        tracker.apply(&made(a, oracle, false));
        assert_eq!(tracker.pending(), &[c]);
        assert!(tracker.is_arbitrated(&a));
        assert!(!tracker.is_arbitrated(&c));

        assert_eq!(tracker.take_pending(), vec![c]);
        assert!(tracker.pending().is_empty());
    }

    #[test]
    fn test_tracker_block() {
        let oracle = Address::with_last_byte(1);
        let obligation = B256::with_last_byte(0xa);
        let block = BlockEvents::new(
            crate::types::BlockInstant::new(5, 100),
            vec![
                EventContext::new(TxHash::ZERO, 0, 0, requested(obligation, oracle)),
                EventContext::new(TxHash::ZERO, 1, 1, made(obligation, oracle, true)),
            ],
        );
        let mut tracker = ArbitrationTracker::new(oracle);
        tracker.apply_block(&block);
        assert!(tracker.pending().is_empty());
        assert!(tracker.is_arbitrated(&obligation));
    }

    #[tokio::test]
    async fn test_decision() {
        let (client, asserter) = testing::mocked_client(fixtures::addresses());
        asserter.push_success(&Bytes::from(true.abi_encode()));

        let decision = client
            .oracle()
            .decision(B256::with_last_byte(1), Address::with_last_byte(2))
            .await
            .unwrap();
        assert!(decision);
    }

    #[tokio::test]
    async fn test_skip_arbitrated_request() {
        let (client, asserter) = testing::mocked_client(fixtures::addresses());
        let (seen, approved) = (B256::with_last_byte(0xa), B256::with_last_byte(0xb));
        let mut tracker = ArbitrationTracker::new(client.signer());
        tracker.apply(&made(seen, client.signer(), false));
        // Approved before the tracked range
        asserter.push_success(&Bytes::from(true.abi_encode()));

        let mut calls = 0;
        let mut decide = |_: Attestation| {
            calls += 1;
            async { Some(true) }
        };
        for obligation in [seen, approved] {
            let decision = client
                .oracle()
                .process_request(&tracker, obligation, true, &mut decide)
                .await
                .unwrap();
            assert_eq!(decision, None);
        }
        assert_eq!(calls, 0);
        assert!(asserter.read_q().is_empty());
    }

    #[tokio::test]
    async fn test_no_decision() {
        let addresses = fixtures::addresses();
        let (client, asserter) = testing::mocked_client(addresses.clone());
        let attestation = fixtures::attestation(addresses.string_obligation, Bytes::new());
        asserter.push_success(&Bytes::from(attestation.abi_encode()));

        let mut seen = Vec::new();
        let decision = client
            .oracle()
            .process_request(
                &ArbitrationTracker::new(client.signer()),
                attestation.uid,
                false,
                &mut |a: Attestation| {
                    seen.push(a.uid);
                    async { None }
                },
            )
            .await
            .unwrap();
        assert_eq!(decision, None);
        assert_eq!(seen, vec![attestation.uid]);
    }

    fn arbiter_log(
        addresses: &AddressConfig,
        tx: u8,
        event: TrustedOracleArbiterEvents,
    ) -> alloy::rpc::types::Log {
        let (address, tx_hash) = (addresses.trusted_oracle_arbiter, TxHash::with_last_byte(tx));
        match event {
            TrustedOracleArbiterEvents::ArbitrationRequested(e) => {
                fixtures::rpc_log(address, tx_hash, 0, e)
            },
            TrustedOracleArbiterEvents::ArbitrationMade(e) => {
                fixtures::rpc_log(address, tx_hash, 0, e)
            },
        }
    }

    fn push_attestation(asserter: &Asserter, addresses: &AddressConfig, uid: Uid) {
        let mut attestation = fixtures::attestation(addresses.string_obligation, Bytes::new());
        attestation.uid = uid;
        asserter.push_success(&Bytes::from(attestation.abi_encode()));
    }

    #[tokio::test]
    async fn test_arbitrate_past() {
        let addresses = fixtures::addresses();
        let (client, asserter) = testing::mocked_client(addresses.clone());
        let oracle = client.signer();
        let (a, b, c) =
            (B256::with_last_byte(0xa), B256::with_last_byte(0xb), B256::with_last_byte(0xc));
        asserter.push_success(&U64::from(10));
        asserter.push_success(&vec![
            arbiter_log(&addresses, 1, requested(a, oracle)),
            arbiter_log(&addresses, 2, requested(b, oracle)),
            arbiter_log(&addresses, 3, requested(c, Address::with_last_byte(0xff))),
            arbiter_log(&addresses, 4, made(b, oracle, true)),
        ]);
        push_attestation(&asserter, &addresses, a);
        let tx_hash = TxHash::with_last_byte(0x20);
        testing::push_mined(&asserter, tx_hash, true, Vec::new());

        let decisions = client
            .oracle()
            .arbitrate_past(0, false, |attestation: Attestation| async move {
                Some(attestation.uid == a)
            })
            .await
            .unwrap();
        assert_eq!(decisions, vec![Decision { obligation: a, decision: true, tx_hash }]);
        assert!(asserter.read_q().is_empty());
    }

    /// Tests the listener answers past requests, then new ones, until
    /// cancelled.
    #[tokio::test]
    async fn test_listen_and_arbitrate() {
        let addresses = fixtures::addresses();
        let (client, asserter) = testing::mocked_client(addresses.clone());
        let oracle = client.signer();
        let (a, b, c) =
            (B256::with_last_byte(0xa), B256::with_last_byte(0xb), B256::with_last_byte(0xc));
        let cancel = CancellationToken::new();

        // Catch-up with requests up to block 10
        asserter.push_success(&U64::from(10));
        asserter.push_success(&vec![arbiter_log(&addresses, 1, requested(a, oracle))]);
        asserter.push_success(&Bytes::from(false.abi_encode()));
        push_attestation(&asserter, &addresses, a);
        testing::push_mined(&asserter, TxHash::with_last_byte(0x21), true, Vec::new());
        // Block 11 requests an obligation approved earlier
        asserter.push_success(&fixtures::block(11, 1100));
        asserter.push_success(&vec![arbiter_log(&addresses, 2, requested(b, oracle))]);
        asserter.push_success(&Bytes::from(true.abi_encode()));
        // Block 12 is not produced yet on the first poll
        asserter.push_success(&serde_json::Value::Null);
        asserter.push_success(&Vec::<alloy::rpc::types::Log>::new());
        asserter.push_success(&fixtures::block(12, 1200));
        asserter.push_success(&vec![arbiter_log(&addresses, 3, requested(c, oracle))]);
        asserter.push_success(&Bytes::from(false.abi_encode()));
        push_attestation(&asserter, &addresses, c);
        testing::push_mined(&asserter, TxHash::with_last_byte(0x22), true, Vec::new());

        let sleeps = std::cell::Cell::new(0);
        let decisions = client
            .oracle()
            .listen_and_arbitrate(
                ListenOptions { from_block: Some(0), skip_arbitrated: true },
                |attestation: Attestation| {
                    let cancel = cancel.clone();
                    async move {
                        if attestation.uid == c {
                            cancel.cancel();
                        }
                        Some(attestation.uid == c)
                    }
                },
                |_| {
                    sleeps.set(sleeps.get() + 1);
                    async {}
                },
                &cancel,
            )
            .await
            .unwrap();
        assert_eq!(
            decisions,
            vec![
                Decision { obligation: a, decision: false, tx_hash: TxHash::with_last_byte(0x21) },
                Decision { obligation: c, decision: true, tx_hash: TxHash::with_last_byte(0x22) },
            ]
        );
        assert_eq!(sleeps.get(), 1);
        assert!(asserter.read_q().is_empty());
    }

    #[tokio::test]
    async fn test_listen_cancelled_before_start() {
        let addresses = fixtures::addresses();
        let (client, asserter) = testing::mocked_client(addresses.clone());
        let cancel = CancellationToken::new();
        cancel.cancel();
        asserter.push_success(&U64::from(10));

        let decisions = client
            .oracle()
            .listen_and_arbitrate(
                ListenOptions::default(),
                |_: Attestation| async { Some(true) },
                |_| async {},
                &cancel,
            )
            .await
            .unwrap();
        assert!(decisions.is_empty());
        assert!(asserter.read_q().is_empty());
    }

    #[tokio::test]
    async fn test_arbitrations_in_bounded_range() {
        let addresses = fixtures::addresses();
        let (client, asserter) = testing::mocked_client(addresses.clone());
        let (obligation, oracle) = (B256::with_last_byte(0xa), Address::with_last_byte(1));
        asserter.push_success(&U64::from(stream::MAX_BLOCK_RANGE + 5));
        asserter.push_success(&Vec::<alloy::rpc::types::Log>::new());
        asserter.push_success(&vec![arbiter_log(&addresses, 1, made(obligation, oracle, true))]);

        let arbitrations = client.oracle().arbitrations(obligation, oracle, 0).await.unwrap();
        assert_eq!(arbitrations.len(), 1);
        assert!(arbitrations[0].event().decision);
        assert!(asserter.read_q().is_empty());
    }
}
