use alloy::primitives::{Address, U256};

use crate::{
    AlkahestClient,
    abi::{ERC721EscrowObligation, ERC721PaymentObligation, IERC721},
    addresses::Contract,
    error::Result,
    types::{TxOutcome, Uid},
};

/// ERC-721 escrow and payment obligations.
#[derive(Clone, Copy, Debug)]
pub struct Erc721Client<'c> {
    client: &'c AlkahestClient,
}

impl<'c> Erc721Client<'c> {
    pub(crate) fn new(client: &'c AlkahestClient) -> Self { Self { client } }

    pub async fn owner_of(&self, token: Address, token_id: U256) -> Result<Address> {
        Ok(IERC721::new(token, self.client.provider()).ownerOf(token_id).call().await?)
    }

    /// Approves the obligation contract to transfer the particular token.
    pub async fn approve(
        &self,
        token: Address,
        token_id: U256,
        spender: Contract,
    ) -> Result<TxOutcome> {
        let spender = self.client.address(spender)?;
        let erc721 = IERC721::new(token, self.client.provider());
        self.client.submit(erc721.approve(spender, token_id)).await
    }

    /// Approves (or revokes) the obligation contract to transfer any token of
    /// the collection.
    pub async fn approve_all(
        &self,
        token: Address,
        operator: Contract,
        approved: bool,
    ) -> Result<TxOutcome> {
        let operator = self.client.address(operator)?;
        let erc721 = IERC721::new(token, self.client.provider());
        self.client.submit(erc721.setApprovalForAll(operator, approved)).await
    }

    /// Approves the token unless the obligation contract is already allowed to
    /// transfer it.
    pub async fn approve_if_needed(
        &self,
        token: Address,
        token_id: U256,
        spender: Contract,
    ) -> Result<Option<TxOutcome>> {
        let spender_address = self.client.address(spender)?;
        let erc721 = IERC721::new(token, self.client.provider());
        if erc721.getApproved(token_id).call().await? == spender_address
            || erc721
                .isApprovedForAll(self.client.signer(), spender_address)
                .call()
                .await?
        {
            return Ok(None);
        }
        self.approve(token, token_id, spender).await.map(Some)
    }

    /// Escrows the token until the demand of the arbiter is fulfilled.
    pub async fn create_escrow(
        &self,
        data: ERC721EscrowObligation::ObligationData,
        expiration: u64,
    ) -> Result<TxOutcome> {
        let escrow = ERC721EscrowObligation::new(
            self.client.address(Contract::Erc721EscrowObligation)?,
            self.client.provider(),
        );
        self.client.submit_obligation(escrow.doObligation(data, expiration)).await
    }

    pub async fn approve_and_create_escrow(
        &self,
        data: ERC721EscrowObligation::ObligationData,
        expiration: u64,
    ) -> Result<TxOutcome> {
        self.approve_if_needed(data.token, data.tokenId, Contract::Erc721EscrowObligation)
            .await?;
        self.create_escrow(data, expiration).await
    }

    /// Transfers the token to the payee.
    pub async fn pay(&self, data: ERC721PaymentObligation::ObligationData) -> Result<TxOutcome> {
        let payment = ERC721PaymentObligation::new(
            self.client.address(Contract::Erc721PaymentObligation)?,
            self.client.provider(),
        );
        self.client.submit_obligation(payment.doObligation(data)).await
    }

    pub async fn approve_and_pay(
        &self,
        data: ERC721PaymentObligation::ObligationData,
    ) -> Result<TxOutcome> {
        self.approve_if_needed(data.token, data.tokenId, Contract::Erc721PaymentObligation)
            .await?;
        self.pay(data).await
    }

    pub async fn collect_escrow(&self, escrow: Uid, fulfillment: Uid) -> Result<TxOutcome> {
        let contract = ERC721EscrowObligation::new(
            self.client.address(Contract::Erc721EscrowObligation)?,
            self.client.provider(),
        );
        self.client.submit(contract.collectEscrow(escrow, fulfillment)).await
    }

    pub async fn reclaim_expired(&self, escrow: Uid) -> Result<TxOutcome> {
        let contract = ERC721EscrowObligation::new(
            self.client.address(Contract::Erc721EscrowObligation)?,
            self.client.provider(),
        );
        self.client.submit(contract.reclaimExpired(escrow)).await
    }

    pub async fn get_escrow(&self, uid: Uid) -> Result<ERC721EscrowObligation::ObligationData> {
        let contract = ERC721EscrowObligation::new(
            self.client.address(Contract::Erc721EscrowObligation)?,
            self.client.provider(),
        );
        Ok(contract.getObligationData(uid).call().await?)
    }
}
