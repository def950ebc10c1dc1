use crate::{
    AlkahestClient,
    abi::{NativeTokenEscrowObligation, NativeTokenPaymentObligation},
    addresses::Contract,
    error::Result,
    types::{TxOutcome, Uid},
};

/// Escrow and payment obligations in the native token of the chain.
///
/// The amount is attached as transaction value, no approval is involved.
#[derive(Clone, Copy, Debug)]
pub struct NativeTokenClient<'c> {
    client: &'c AlkahestClient,
}

impl<'c> NativeTokenClient<'c> {
    pub(crate) fn new(client: &'c AlkahestClient) -> Self { Self { client } }

    pub async fn create_escrow(
        &self,
        data: NativeTokenEscrowObligation::ObligationData,
        expiration: u64,
    ) -> Result<TxOutcome> {
        let escrow = NativeTokenEscrowObligation::new(
            self.client.address(Contract::NativeTokenEscrowObligation)?,
            self.client.provider(),
        );
        let value = data.amount;
        self.client.submit_obligation(escrow.doObligation(data, expiration).value(value)).await
    }

    pub async fn pay(
        &self,
        data: NativeTokenPaymentObligation::ObligationData,
    ) -> Result<TxOutcome> {
        let payment = NativeTokenPaymentObligation::new(
            self.client.address(Contract::NativeTokenPaymentObligation)?,
            self.client.provider(),
        );
        let value = data.amount;
        self.client.submit_obligation(payment.doObligation(data).value(value)).await
    }

    pub async fn collect_escrow(&self, escrow: Uid, fulfillment: Uid) -> Result<TxOutcome> {
        let contract = NativeTokenEscrowObligation::new(
            self.client.address(Contract::NativeTokenEscrowObligation)?,
            self.client.provider(),
        );
        self.client.submit(contract.collectEscrow(escrow, fulfillment)).await
    }

    pub async fn reclaim_expired(&self, escrow: Uid) -> Result<TxOutcome> {
        let contract = NativeTokenEscrowObligation::new(
            self.client.address(Contract::NativeTokenEscrowObligation)?,
            self.client.provider(),
        );
        self.client.submit(contract.reclaimExpired(escrow)).await
    }

    pub async fn get_escrow(
        &self,
        uid: Uid,
    ) -> Result<NativeTokenEscrowObligation::ObligationData> {
        let contract = NativeTokenEscrowObligation::new(
            self.client.address(Contract::NativeTokenEscrowObligation)?,
            self.client.provider(),
        );
        Ok(contract.getObligationData(uid).call().await?)
    }
}
