use alloy::primitives::{Address, U256};

use crate::{
    AlkahestClient,
    abi::{ERC1155EscrowObligation, ERC1155PaymentObligation, IERC1155},
    addresses::Contract,
    error::Result,
    types::{TxOutcome, Uid},
};

/// ERC-1155 escrow and payment obligations.
///
/// ERC-1155 has no per-token allowance, so obligation contracts are approved
/// as operators of the whole collection.
#[derive(Clone, Copy, Debug)]
pub struct Erc1155Client<'c> {
    client: &'c AlkahestClient,
}

impl<'c> Erc1155Client<'c> {
    pub(crate) fn new(client: &'c AlkahestClient) -> Self { Self { client } }

    pub async fn balance_of(
        &self,
        token: Address,
        account: Address,
        token_id: U256,
    ) -> Result<U256> {
        Ok(IERC1155::new(token, self.client.provider())
            .balanceOf(account, token_id)
            .call()
            .await?)
    }

    pub async fn approve_all(
        &self,
        token: Address,
        operator: Contract,
        approved: bool,
    ) -> Result<TxOutcome> {
        let operator = self.client.address(operator)?;
        let erc1155 = IERC1155::new(token, self.client.provider());
        self.client.submit(erc1155.setApprovalForAll(operator, approved)).await
    }

    pub async fn approve_all_if_needed(
        &self,
        token: Address,
        operator: Contract,
    ) -> Result<Option<TxOutcome>> {
        let operator_address = self.client.address(operator)?;
        let approved = IERC1155::new(token, self.client.provider())
            .isApprovedForAll(self.client.signer(), operator_address)
            .call()
            .await?;
        if approved {
            return Ok(None);
        }
        self.approve_all(token, operator, true).await.map(Some)
    }

    pub async fn create_escrow(
        &self,
        data: ERC1155EscrowObligation::ObligationData,
        expiration: u64,
    ) -> Result<TxOutcome> {
        let escrow = ERC1155EscrowObligation::new(
            self.client.address(Contract::Erc1155EscrowObligation)?,
            self.client.provider(),
        );
        self.client.submit_obligation(escrow.doObligation(data, expiration)).await
    }

    pub async fn approve_and_create_escrow(
        &self,
        data: ERC1155EscrowObligation::ObligationData,
        expiration: u64,
    ) -> Result<TxOutcome> {
        self.approve_all_if_needed(data.token, Contract::Erc1155EscrowObligation)
            .await?;
        self.create_escrow(data, expiration).await
    }

    pub async fn pay(&self, data: ERC1155PaymentObligation::ObligationData) -> Result<TxOutcome> {
        let payment = ERC1155PaymentObligation::new(
            self.client.address(Contract::Erc1155PaymentObligation)?,
            self.client.provider(),
        );
        self.client.submit_obligation(payment.doObligation(data)).await
    }

    pub async fn approve_and_pay(
        &self,
        data: ERC1155PaymentObligation::ObligationData,
    ) -> Result<TxOutcome> {
        self.approve_all_if_needed(data.token, Contract::Erc1155PaymentObligation)
            .await?;
        self.pay(data).await
    }

    pub async fn collect_escrow(&self, escrow: Uid, fulfillment: Uid) -> Result<TxOutcome> {
        let contract = ERC1155EscrowObligation::new(
            self.client.address(Contract::Erc1155EscrowObligation)?,
            self.client.provider(),
        );
        self.client.submit(contract.collectEscrow(escrow, fulfillment)).await
    }

    pub async fn reclaim_expired(&self, escrow: Uid) -> Result<TxOutcome> {
        let contract = ERC1155EscrowObligation::new(
            self.client.address(Contract::Erc1155EscrowObligation)?,
            self.client.provider(),
        );
        self.client.submit(contract.reclaimExpired(escrow)).await
    }

    pub async fn get_escrow(&self, uid: Uid) -> Result<ERC1155EscrowObligation::ObligationData> {
        let contract = ERC1155EscrowObligation::new(
            self.client.address(Contract::Erc1155EscrowObligation)?,
            self.client.provider(),
        );
        Ok(contract.getObligationData(uid).call().await?)
    }
}
