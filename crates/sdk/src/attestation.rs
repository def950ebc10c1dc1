//! EAS reads and helpers over [`Attestation`] records.

use std::fmt::Display;

use crate::{
    AlkahestClient,
    abi::{Attestation, IEAS, ISchemaRegistry},
    addresses::Contract,
    arbiters::Demand,
    error::{AlkahestError, Result},
    obligations::Obligation,
    types::{Uid, format_timestamp},
};

impl Attestation {
    /// Indicates if the attestation has been revoked.
    pub fn is_revoked(&self) -> bool { self.revocationTime != 0 }

    /// Indicates if the attestation has expired by `now` (unix timestamp).
    /// Attestations with zero expiration time never expire.
    pub fn is_expired(&self, now: u64) -> bool {
        self.expirationTime != 0 && self.expirationTime <= now
    }
}

impl Display for Attestation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "uid:        {}", self.uid)?;
        writeln!(f, "schema:     {}", self.schema)?;
        writeln!(f, "attester:   {}", self.attester)?;
        writeln!(f, "recipient:  {}", self.recipient)?;
        writeln!(f, "ref uid:    {}", self.refUID)?;
        writeln!(f, "time:       {}", format_timestamp(self.time))?;
        if self.expirationTime != 0 {
            writeln!(f, "expires:    {}", format_timestamp(self.expirationTime))?;
        }
        if self.is_revoked() {
            writeln!(f, "revoked:    {}", format_timestamp(self.revocationTime))?;
        }
        write!(f, "data:       {}", self.data)
    }
}

/// Escrow attestation together with its decoded obligation and demand.
#[derive(Clone, Debug)]
pub struct EscrowView {
    pub attestation: Attestation,
    pub obligation: Obligation,
    pub demand: Demand,
}

#[cfg(feature = "display")]
impl tabled::Tabled for EscrowView {
    const LENGTH: usize = 5;

    fn fields(&self) -> Vec<std::borrow::Cow<'_, str>> {
        use colored::Colorize;

        let now = u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default();
        vec![
            self.attestation.uid.to_string().into(),
            self.obligation.to_string().into(),
            self.demand.to_string().into(),
            self.attestation.recipient.to_string().into(),
            if self.attestation.is_revoked() {
                "closed".bright_black().to_string().into()
            } else if self.attestation.is_expired(now) {
                format!("expired {}", format_timestamp(self.attestation.expirationTime))
                    .bright_red()
                    .to_string()
                    .into()
            } else if self.attestation.expirationTime > 0 {
                format!("until {}", format_timestamp(self.attestation.expirationTime)).into()
            } else {
                "open".green().to_string().into()
            },
        ]
    }

    fn headers() -> Vec<std::borrow::Cow<'static, str>> {
        vec![
            "Escrow".into(),
            "Obligation".into(),
            "Demand".into(),
            "Buyer".into(),
            "Status".into(),
        ]
    }
}

impl AlkahestClient {
    /// Fetches the attestation from EAS.
    ///
    /// EAS returns an empty record for unknown UIDs, which is reported as
    /// [`AlkahestError::AttestationNotFound`].
    pub async fn get_attestation(&self, uid: Uid) -> Result<Attestation> {
        let eas = IEAS::new(self.address(Contract::Eas)?, self.provider());
        let attestation = eas.getAttestation(uid).call().await?;
        if attestation.uid.is_zero() {
            return Err(AlkahestError::AttestationNotFound(uid));
        }
        Ok(attestation)
    }

    pub async fn is_attestation_valid(&self, uid: Uid) -> Result<bool> {
        let eas = IEAS::new(self.address(Contract::Eas)?, self.provider());
        Ok(eas.isAttestationValid(uid).call().await?)
    }

    pub async fn get_schema(&self, uid: Uid) -> Result<ISchemaRegistry::SchemaRecord> {
        let registry =
            ISchemaRegistry::new(self.address(Contract::SchemaRegistry)?, self.provider());
        Ok(registry.getSchema(uid).call().await?)
    }

    /// Fetches the escrow attestation and decodes what it demands.
    pub async fn get_escrow_and_demand(&self, uid: Uid) -> Result<EscrowView> {
        let (attestation, obligation) = self.get_obligation(uid).await?;
        let (arbiter, demand) = obligation.arbiter_and_demand().ok_or_else(|| {
            AlkahestError::InvalidArgument(format!("attestation {uid} is not an escrow obligation"))
        })?;
        let demand = Demand::decode(self.addresses(), arbiter, demand)?;
        Ok(EscrowView { attestation, obligation, demand })
    }
}
