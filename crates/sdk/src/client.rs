use std::time::Duration;

use alloy::{
    contract::{CallBuilder, CallDecoder},
    network::EthereumWallet,
    primitives::Address,
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::client::RpcClient,
    signers::local::PrivateKeySigner,
    transports::layers::RetryBackoffLayer,
};

use crate::{
    addresses::{AddressConfig, Contract},
    error::Result,
    types::TxOutcome,
};

/// Entry point of the SDK.
///
/// Bundles a provider (with a wallet for writes), the address of the signing
/// account and the addresses of the protocol contracts. Per-concern APIs are
/// available through [`Self::erc20`], [`Self::oracle`], etc.
///
/// A client created with [`Self::read_only`] has no wallet and can only be
/// used for reads, writes are rejected by the node.
#[derive(Clone, derive_more::Debug)]
pub struct AlkahestClient {
    #[debug(skip)]
    provider: DynProvider,
    signer: Address,
    addresses: AddressConfig,
}

impl AlkahestClient {
    pub fn new(provider: DynProvider, signer: Address, addresses: AddressConfig) -> Self {
        Self { provider, signer, addresses }
    }

    pub fn read_only(provider: DynProvider, addresses: AddressConfig) -> Self {
        Self::new(provider, Address::ZERO, addresses)
    }

    /// Connects to the RPC endpoint with default retry policy and
    /// the wallet of the given signer.
    pub async fn connect(
        rpc_url: &str,
        signer: PrivateKeySigner,
        addresses: AddressConfig,
    ) -> Result<Self> {
        let client = RpcClient::builder()
            .layer(RetryBackoffLayer::new(10, 100, 200))
            .connect(rpc_url)
            .await?;
        client.set_poll_interval(Duration::from_millis(100));
        Ok(Self::with_client(client, signer, addresses))
    }

    /// Creates the client over preconfigured RPC client, e.g. with extra
    /// throttling or fallback layers.
    pub fn with_client(
        client: RpcClient,
        signer: PrivateKeySigner,
        addresses: AddressConfig,
    ) -> Self {
        let address = signer.address();
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_client(client)
            .erased();
        Self::new(provider, address, addresses)
    }

    pub fn provider(&self) -> &DynProvider { &self.provider }

    /// Account the transactions are sent from.
    pub fn signer(&self) -> Address { self.signer }

    pub fn addresses(&self) -> &AddressConfig { &self.addresses }

    pub(crate) fn address(&self, contract: Contract) -> Result<Address> {
        self.addresses.require(contract)
    }

    /// Current block number of the connected chain.
    pub async fn block_number(&self) -> Result<u64> { Ok(self.provider.get_block_number().await?) }

    /// Sends the transaction and waits for its receipt.
    ///
    /// The outcome carries the uid of the first attestation made by the
    /// configured EAS contract, if any.
    pub(crate) async fn submit<P, D>(&self, call: CallBuilder<P, D>) -> Result<TxOutcome>
    where
        P: Provider,
        D: CallDecoder,
    {
        let pending = call.send().await?;
        let tx_hash = *pending.tx_hash();
        tracing::debug!(%tx_hash, "transaction sent");
        let receipt = pending.get_receipt().await?;
        let outcome = TxOutcome::from_receipt(&receipt, self.addresses.eas)?;
        tracing::info!(%tx_hash, uid = ?outcome.uid, "transaction mined");
        Ok(outcome)
    }

    /// Sends the transaction creating an obligation, failing with
    /// [`crate::error::AlkahestError::NoAttestation`] if EAS has not attested it.
    pub(crate) async fn submit_obligation<P, D>(
        &self,
        call: CallBuilder<P, D>,
    ) -> Result<TxOutcome>
    where
        P: Provider,
        D: CallDecoder,
    {
        self.address(Contract::Eas)?;
        let outcome = self.submit(call).await?;
        outcome.attestation()?;
        Ok(outcome)
    }
}
