use alloy::primitives::B256;

use crate::{
    AlkahestClient,
    abi::StringObligation,
    addresses::Contract,
    error::Result,
    types::{TxOutcome, Uid},
};

/// String obligations: free-form statements referencing another attestation,
/// typically the escrow they are meant to fulfill.
#[derive(Clone, Copy, Debug)]
pub struct StringClient<'c> {
    client: &'c AlkahestClient,
}

impl<'c> StringClient<'c> {
    pub(crate) fn new(client: &'c AlkahestClient) -> Self { Self { client } }

    /// Makes the statement, referencing `ref_uid` (zero for none).
    pub async fn do_obligation(
        &self,
        item: impl Into<String>,
        ref_uid: Option<Uid>,
    ) -> Result<TxOutcome> {
        let contract = StringObligation::new(
            self.client.address(Contract::StringObligation)?,
            self.client.provider(),
        );
        let data = StringObligation::ObligationData { item: item.into() };
        let call = contract.doObligation(data, ref_uid.unwrap_or(B256::ZERO));
        self.client.submit_obligation(call).await
    }

    pub async fn get_obligation(&self, uid: Uid) -> Result<StringObligation::ObligationData> {
        let contract = StringObligation::new(
            self.client.address(Contract::StringObligation)?,
            self.client.provider(),
        );
        Ok(contract.getObligationData(uid).call().await?)
    }
}
