use alloy::primitives::{Address, U256};

use crate::{
    AlkahestClient,
    abi::{ERC20EscrowObligation, ERC20PaymentObligation, IERC20},
    addresses::Contract,
    error::Result,
    num,
    types::{TxOutcome, Uid},
};

/// ERC-20 escrow and payment obligations.
#[derive(Clone, Copy, Debug)]
pub struct Erc20Client<'c> {
    client: &'c AlkahestClient,
}

impl<'c> Erc20Client<'c> {
    pub(crate) fn new(client: &'c AlkahestClient) -> Self { Self { client } }

    /// Amount converter for the token, based on its `decimals()`.
    pub async fn converter(&self, token: Address) -> Result<num::Converter> {
        let decimals = IERC20::new(token, self.client.provider()).decimals().call().await?;
        Ok(num::Converter::new(decimals))
    }

    /// Token balance of the account.
    pub async fn balance_of(&self, token: Address, account: Address) -> Result<U256> {
        Ok(IERC20::new(token, self.client.provider()).balanceOf(account).call().await?)
    }

    /// Approves the obligation contract to spend the amount of the signer's
    /// tokens.
    pub async fn approve(
        &self,
        token: Address,
        spender: Contract,
        amount: U256,
    ) -> Result<TxOutcome> {
        let spender = self.client.address(spender)?;
        let erc20 = IERC20::new(token, self.client.provider());
        self.client.submit(erc20.approve(spender, amount)).await
    }

    /// Approves the obligation contract unless the current allowance already
    /// covers the amount.
    pub async fn approve_if_less(
        &self,
        token: Address,
        spender: Contract,
        amount: U256,
    ) -> Result<Option<TxOutcome>> {
        let spender_address = self.client.address(spender)?;
        let allowance = IERC20::new(token, self.client.provider())
            .allowance(self.client.signer(), spender_address)
            .call()
            .await?;
        if allowance >= amount {
            tracing::debug!(%token, %allowance, "allowance is sufficient");
            return Ok(None);
        }
        self.approve(token, spender, amount).await.map(Some)
    }

    /// Escrows the tokens until the demand of the arbiter is fulfilled.
    /// Tokens must be approved to [`Contract::Erc20EscrowObligation`].
    ///
    /// `expiration` is the unix timestamp the escrow can be reclaimed after,
    /// 0 for no expiration.
    pub async fn create_escrow(
        &self,
        data: ERC20EscrowObligation::ObligationData,
        expiration: u64,
    ) -> Result<TxOutcome> {
        let escrow = ERC20EscrowObligation::new(
            self.client.address(Contract::Erc20EscrowObligation)?,
            self.client.provider(),
        );
        self.client.submit_obligation(escrow.doObligation(data, expiration)).await
    }

    /// Approves (if needed) and escrows the tokens.
    pub async fn approve_and_create_escrow(
        &self,
        data: ERC20EscrowObligation::ObligationData,
        expiration: u64,
    ) -> Result<TxOutcome> {
        self.approve_if_less(data.token, Contract::Erc20EscrowObligation, data.amount)
            .await?;
        self.create_escrow(data, expiration).await
    }

    /// Pays the tokens to the payee.
    /// Tokens must be approved to [`Contract::Erc20PaymentObligation`].
    pub async fn pay(&self, data: ERC20PaymentObligation::ObligationData) -> Result<TxOutcome> {
        let payment = ERC20PaymentObligation::new(
            self.client.address(Contract::Erc20PaymentObligation)?,
            self.client.provider(),
        );
        self.client.submit_obligation(payment.doObligation(data)).await
    }

    /// Approves (if needed) and pays the tokens.
    pub async fn approve_and_pay(
        &self,
        data: ERC20PaymentObligation::ObligationData,
    ) -> Result<TxOutcome> {
        self.approve_if_less(data.token, Contract::Erc20PaymentObligation, data.amount)
            .await?;
        self.pay(data).await
    }

    /// Collects the escrowed tokens with the fulfillment attestation.
    pub async fn collect_escrow(&self, escrow: Uid, fulfillment: Uid) -> Result<TxOutcome> {
        let contract = ERC20EscrowObligation::new(
            self.client.address(Contract::Erc20EscrowObligation)?,
            self.client.provider(),
        );
        self.client.submit(contract.collectEscrow(escrow, fulfillment)).await
    }

    /// Returns escrowed tokens to the buyer after escrow expiration.
    pub async fn reclaim_expired(&self, escrow: Uid) -> Result<TxOutcome> {
        let contract = ERC20EscrowObligation::new(
            self.client.address(Contract::Erc20EscrowObligation)?,
            self.client.provider(),
        );
        self.client.submit(contract.reclaimExpired(escrow)).await
    }

    pub async fn get_escrow(&self, uid: Uid) -> Result<ERC20EscrowObligation::ObligationData> {
        let contract = ERC20EscrowObligation::new(
            self.client.address(Contract::Erc20EscrowObligation)?,
            self.client.provider(),
        );
        Ok(contract.getObligationData(uid).call().await?)
    }

    pub async fn get_payment(&self, uid: Uid) -> Result<ERC20PaymentObligation::ObligationData> {
        let contract = ERC20PaymentObligation::new(
            self.client.address(Contract::Erc20PaymentObligation)?,
            self.client.provider(),
        );
        Ok(contract.getObligationData(uid).call().await?)
    }
}
