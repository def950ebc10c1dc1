use alloy::providers::DynProvider;

use crate::{
    AlkahestClient,
    abi::{
        AttestationEscrowObligation::{self, AttestationEscrowObligationInstance},
        AttestationEscrowObligation2::{self, AttestationEscrowObligation2Instance},
    },
    addresses::Contract,
    error::Result,
    types::{TxOutcome, Uid},
};

/// Escrows of attestations.
///
/// [`AttestationEscrowObligation`] holds an attestation request that EAS
/// makes once the escrow is collected, so the escrow contract must be allowed
/// to attest with the requested schema.
/// [`AttestationEscrowObligation2`] holds a reference to an existing
/// attestation and, on collection, makes a validation attestation
/// referencing it.
///
/// In both cases the outcome of the collection carries the uid of the
/// attestation made.
#[derive(Clone, Copy, Debug)]
pub struct AttestationEscrowClient<'c> {
    client: &'c AlkahestClient,
}

impl<'c> AttestationEscrowClient<'c> {
    pub(crate) fn new(client: &'c AlkahestClient) -> Self { Self { client } }

    fn escrow(&self) -> Result<AttestationEscrowObligationInstance<&'c DynProvider>> {
        Ok(AttestationEscrowObligation::new(
            self.client.address(Contract::AttestationEscrowObligation)?,
            self.client.provider(),
        ))
    }

    fn escrow2(&self) -> Result<AttestationEscrowObligation2Instance<&'c DynProvider>> {
        Ok(AttestationEscrowObligation2::new(
            self.client.address(Contract::AttestationEscrowObligation2)?,
            self.client.provider(),
        ))
    }

    /// Escrows the attestation request until the demand of the arbiter is
    /// fulfilled.
    pub async fn create_escrow(
        &self,
        data: AttestationEscrowObligation::ObligationData,
        expiration: u64,
    ) -> Result<TxOutcome> {
        self.client.submit_obligation(self.escrow()?.doObligation(data, expiration)).await
    }

    /// Escrows the existing attestation until the demand of the arbiter is
    /// fulfilled.
    pub async fn create_escrow2(
        &self,
        data: AttestationEscrowObligation2::ObligationData,
        expiration: u64,
    ) -> Result<TxOutcome> {
        self.client.submit_obligation(self.escrow2()?.doObligation(data, expiration)).await
    }

    /// Collects the escrow, making the escrowed attestation.
    pub async fn collect_escrow(&self, escrow: Uid, fulfillment: Uid) -> Result<TxOutcome> {
        self.client.submit(self.escrow()?.collectEscrow(escrow, fulfillment)).await
    }

    /// Collects the escrow, making the validation attestation.
    pub async fn collect_escrow2(&self, escrow: Uid, fulfillment: Uid) -> Result<TxOutcome> {
        self.client.submit(self.escrow2()?.collectEscrow(escrow, fulfillment)).await
    }

    pub async fn reclaim_expired(&self, escrow: Uid) -> Result<TxOutcome> {
        self.client.submit(self.escrow()?.reclaimExpired(escrow)).await
    }

    pub async fn reclaim_expired2(&self, escrow: Uid) -> Result<TxOutcome> {
        self.client.submit(self.escrow2()?.reclaimExpired(escrow)).await
    }

    pub async fn get_escrow(
        &self,
        uid: Uid,
    ) -> Result<AttestationEscrowObligation::ObligationData> {
        Ok(self.escrow()?.getObligationData(uid).call().await?)
    }

    pub async fn get_escrow2(
        &self,
        uid: Uid,
    ) -> Result<AttestationEscrowObligation2::ObligationData> {
        Ok(self.escrow2()?.getObligationData(uid).call().await?)
    }
}
