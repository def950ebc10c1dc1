//! Obligations: attestations made by the escrow, payment and string
//! obligation contracts.
//!
//! Escrows lock an asset (tokens or an attestation) until collected with a
//! fulfillment the arbiter accepts.
//!
//! Every obligation contract stores its `ObligationData` ABI-encoded in the
//! `data` field of the attestation it makes, and is the `attester` of that
//! attestation. [`Obligation::decode`] relies on it to pick the decoder.

mod attestation;
mod erc1155;
mod erc20;
mod erc721;
mod native;
mod string;

use std::time::Duration;

use alloy::{
    primitives::{Address, Bytes, TxHash},
    rpc::types::Filter,
};
use alloy_sol_types::{SolEvent, SolValue};
pub use attestation::AttestationEscrowClient;
pub use erc20::Erc20Client;
pub use erc721::Erc721Client;
pub use erc1155::Erc1155Client;
pub use native::NativeTokenClient;
pub use string::StringClient;

use crate::{
    AlkahestClient,
    abi::{
        Attestation, AttestationEscrowObligation, AttestationEscrowObligation2,
        ERC20EscrowObligation::{self, EscrowCollected},
        ERC20PaymentObligation, ERC721EscrowObligation, ERC721PaymentObligation,
        ERC1155EscrowObligation, ERC1155PaymentObligation, NativeTokenEscrowObligation,
        NativeTokenPaymentObligation, StringObligation,
    },
    addresses::{AddressConfig, Contract},
    error::{AlkahestError, Result},
    stream,
    types::{TxOutcome, Uid},
};

/// Asset class handled by an escrow or payment obligation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Asset {
    Erc20,
    Erc721,
    Erc1155,
    NativeToken,
}

/// Kind of obligation contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObligationKind {
    /// Locks the asset until collected with a fulfillment accepted by the
    /// arbiter, or reclaimed after expiration.
    Escrow(Asset),
    /// Transfers the asset to the payee right away.
    Payment(Asset),
    /// Escrows an attestation request, made by EAS on collection.
    AttestationEscrow,
    /// Escrows an existing attestation, validated on collection.
    AttestationEscrow2,
    /// Plain string statement, usually fulfilling some escrow.
    String,
}

impl ObligationKind {
    /// Obligation kind implemented by the contract, if any.
    pub fn of(contract: Contract) -> Option<Self> {
        Some(match contract {
            Contract::Erc20EscrowObligation => Self::Escrow(Asset::Erc20),
            Contract::Erc721EscrowObligation => Self::Escrow(Asset::Erc721),
            Contract::Erc1155EscrowObligation => Self::Escrow(Asset::Erc1155),
            Contract::NativeTokenEscrowObligation => Self::Escrow(Asset::NativeToken),
            Contract::Erc20PaymentObligation => Self::Payment(Asset::Erc20),
            Contract::Erc721PaymentObligation => Self::Payment(Asset::Erc721),
            Contract::Erc1155PaymentObligation => Self::Payment(Asset::Erc1155),
            Contract::NativeTokenPaymentObligation => Self::Payment(Asset::NativeToken),
            Contract::AttestationEscrowObligation => Self::AttestationEscrow,
            Contract::AttestationEscrowObligation2 => Self::AttestationEscrow2,
            Contract::StringObligation => Self::String,
            _ => return None,
        })
    }

    /// Contract implementing the obligation kind.
    pub fn contract(&self) -> Contract {
        match self {
            Self::Escrow(Asset::Erc20) => Contract::Erc20EscrowObligation,
            Self::Escrow(Asset::Erc721) => Contract::Erc721EscrowObligation,
            Self::Escrow(Asset::Erc1155) => Contract::Erc1155EscrowObligation,
            Self::Escrow(Asset::NativeToken) => Contract::NativeTokenEscrowObligation,
            Self::Payment(Asset::Erc20) => Contract::Erc20PaymentObligation,
            Self::Payment(Asset::Erc721) => Contract::Erc721PaymentObligation,
            Self::Payment(Asset::Erc1155) => Contract::Erc1155PaymentObligation,
            Self::Payment(Asset::NativeToken) => Contract::NativeTokenPaymentObligation,
            Self::AttestationEscrow => Contract::AttestationEscrowObligation,
            Self::AttestationEscrow2 => Contract::AttestationEscrowObligation2,
            Self::String => Contract::StringObligation,
        }
    }

    /// Indicates if obligations of the kind are escrows, i.e. can be
    /// collected or reclaimed.
    pub fn is_escrow(&self) -> bool {
        matches!(self, Self::Escrow(_) | Self::AttestationEscrow | Self::AttestationEscrow2)
    }
}

/// Escrow collected with a fulfillment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EscrowCollection {
    pub escrow: Uid,
    pub fulfillment: Uid,
    pub fulfiller: Address,
    pub tx_hash: TxHash,
}

/// Decoded data of an obligation attestation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Obligation {
    Erc20Escrow(ERC20EscrowObligation::ObligationData),
    Erc721Escrow(ERC721EscrowObligation::ObligationData),
    Erc1155Escrow(ERC1155EscrowObligation::ObligationData),
    NativeTokenEscrow(NativeTokenEscrowObligation::ObligationData),
    Erc20Payment(ERC20PaymentObligation::ObligationData),
    Erc721Payment(ERC721PaymentObligation::ObligationData),
    Erc1155Payment(ERC1155PaymentObligation::ObligationData),
    NativeTokenPayment(NativeTokenPaymentObligation::ObligationData),
    AttestationEscrow(AttestationEscrowObligation::ObligationData),
    AttestationEscrow2(AttestationEscrowObligation2::ObligationData),
    String(StringObligation::ObligationData),
    /// Attestation made by a contract that is not a configured obligation.
    Unknown { attester: Address, data: Bytes },
}

impl Obligation {
    /// Decodes the obligation data of the attestation based on its attester.
    pub fn decode(addresses: &AddressConfig, attestation: &Attestation) -> Result<Self> {
        match addresses.contract_at(attestation.attester).and_then(ObligationKind::of) {
            Some(kind) => Self::decode_as(kind, &attestation.data),
            None => Ok(Self::Unknown {
                attester: attestation.attester,
                data: attestation.data.clone(),
            }),
        }
    }

    /// Decodes ABI-encoded obligation data of the given kind.
    pub fn decode_as(kind: ObligationKind, data: &[u8]) -> Result<Self> {
        Ok(match kind {
            ObligationKind::Escrow(Asset::Erc20) => {
                Self::Erc20Escrow(SolValue::abi_decode(data)?)
            },
            ObligationKind::Escrow(Asset::Erc721) => {
                Self::Erc721Escrow(SolValue::abi_decode(data)?)
            },
            ObligationKind::Escrow(Asset::Erc1155) => {
                Self::Erc1155Escrow(SolValue::abi_decode(data)?)
            },
            ObligationKind::Escrow(Asset::NativeToken) => {
                Self::NativeTokenEscrow(SolValue::abi_decode(data)?)
            },
            ObligationKind::Payment(Asset::Erc20) => {
                Self::Erc20Payment(SolValue::abi_decode(data)?)
            },
            ObligationKind::Payment(Asset::Erc721) => {
                Self::Erc721Payment(SolValue::abi_decode(data)?)
            },
            ObligationKind::Payment(Asset::Erc1155) => {
                Self::Erc1155Payment(SolValue::abi_decode(data)?)
            },
            ObligationKind::Payment(Asset::NativeToken) => {
                Self::NativeTokenPayment(SolValue::abi_decode(data)?)
            },
            ObligationKind::AttestationEscrow => {
                Self::AttestationEscrow(SolValue::abi_decode(data)?)
            },
            ObligationKind::AttestationEscrow2 => {
                Self::AttestationEscrow2(SolValue::abi_decode(data)?)
            },
            ObligationKind::String => Self::String(SolValue::abi_decode(data)?),
        })
    }

    /// ABI encoding of the obligation data, as stored in the attestation.
    pub fn encode(&self) -> Bytes {
        match self {
            Self::Erc20Escrow(d) => d.abi_encode().into(),
            Self::Erc721Escrow(d) => d.abi_encode().into(),
            Self::Erc1155Escrow(d) => d.abi_encode().into(),
            Self::NativeTokenEscrow(d) => d.abi_encode().into(),
            Self::Erc20Payment(d) => d.abi_encode().into(),
            Self::Erc721Payment(d) => d.abi_encode().into(),
            Self::Erc1155Payment(d) => d.abi_encode().into(),
            Self::NativeTokenPayment(d) => d.abi_encode().into(),
            Self::AttestationEscrow(d) => d.abi_encode().into(),
            Self::AttestationEscrow2(d) => d.abi_encode().into(),
            Self::String(d) => d.abi_encode().into(),
            Self::Unknown { data, .. } => data.clone(),
        }
    }

    /// Kind of the obligation, `None` for unknown attesters.
    pub fn kind(&self) -> Option<ObligationKind> {
        Some(match self {
            Self::Erc20Escrow(_) => ObligationKind::Escrow(Asset::Erc20),
            Self::Erc721Escrow(_) => ObligationKind::Escrow(Asset::Erc721),
            Self::Erc1155Escrow(_) => ObligationKind::Escrow(Asset::Erc1155),
            Self::NativeTokenEscrow(_) => ObligationKind::Escrow(Asset::NativeToken),
            Self::Erc20Payment(_) => ObligationKind::Payment(Asset::Erc20),
            Self::Erc721Payment(_) => ObligationKind::Payment(Asset::Erc721),
            Self::Erc1155Payment(_) => ObligationKind::Payment(Asset::Erc1155),
            Self::NativeTokenPayment(_) => ObligationKind::Payment(Asset::NativeToken),
            Self::AttestationEscrow(_) => ObligationKind::AttestationEscrow,
            Self::AttestationEscrow2(_) => ObligationKind::AttestationEscrow2,
            Self::String(_) => ObligationKind::String,
            Self::Unknown { .. } => return None,
        })
    }

    /// Arbiter and encoded demand of an escrow obligation.
    pub fn arbiter_and_demand(&self) -> Option<(Address, &Bytes)> {
        match self {
            Self::Erc20Escrow(d) => Some((d.arbiter, &d.demand)),
            Self::Erc721Escrow(d) => Some((d.arbiter, &d.demand)),
            Self::Erc1155Escrow(d) => Some((d.arbiter, &d.demand)),
            Self::NativeTokenEscrow(d) => Some((d.arbiter, &d.demand)),
            Self::AttestationEscrow(d) => Some((d.arbiter, &d.demand)),
            Self::AttestationEscrow2(d) => Some((d.arbiter, &d.demand)),
            _ => None,
        }
    }
}

impl std::fmt::Display for Obligation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Erc20Escrow(d) => write!(f, "erc20-escrow({} of {})", d.amount, d.token),
            Self::Erc721Escrow(d) => write!(f, "erc721-escrow(#{} of {})", d.tokenId, d.token),
            Self::Erc1155Escrow(d) => {
                write!(f, "erc1155-escrow({} of #{} of {})", d.amount, d.tokenId, d.token)
            },
            Self::NativeTokenEscrow(d) => write!(f, "native-escrow({})", d.amount),
            Self::Erc20Payment(d) => {
                write!(f, "erc20-payment({} of {} to {})", d.amount, d.token, d.payee)
            },
            Self::Erc721Payment(d) => {
                write!(f, "erc721-payment(#{} of {} to {})", d.tokenId, d.token, d.payee)
            },
            Self::Erc1155Payment(d) => write!(
                f,
                "erc1155-payment({} of #{} of {} to {})",
                d.amount, d.tokenId, d.token, d.payee
            ),
            Self::NativeTokenPayment(d) => write!(f, "native-payment({} to {})", d.amount, d.payee),
            Self::AttestationEscrow(d) => write!(
                f,
                "attestation-escrow(schema={}, recipient={})",
                d.attestation.schema, d.attestation.data.recipient
            ),
            Self::AttestationEscrow2(d) => {
                write!(f, "attestation-escrow2({})", d.attestationUid)
            },
            Self::String(d) => write!(f, "string({:?})", d.item),
            Self::Unknown { attester, data } => {
                write!(f, "unknown(attester={attester}, data={data})")
            },
        }
    }
}

impl AlkahestClient {
    pub fn erc20(&self) -> Erc20Client<'_> { Erc20Client::new(self) }

    pub fn erc721(&self) -> Erc721Client<'_> { Erc721Client::new(self) }

    pub fn erc1155(&self) -> Erc1155Client<'_> { Erc1155Client::new(self) }

    pub fn native_token(&self) -> NativeTokenClient<'_> { NativeTokenClient::new(self) }

    pub fn attestation_escrow(&self) -> AttestationEscrowClient<'_> {
        AttestationEscrowClient::new(self)
    }

    pub fn string_obligation(&self) -> StringClient<'_> { StringClient::new(self) }

    /// Fetches the attestation and decodes its obligation data.
    pub async fn get_obligation(&self, uid: Uid) -> Result<(Attestation, Obligation)> {
        let attestation = self.get_attestation(uid).await?;
        let obligation = Obligation::decode(self.addresses(), &attestation)?;
        Ok((attestation, obligation))
    }

    /// Collects the escrow with the fulfillment, dispatching to the escrow
    /// contract that made the escrow attestation.
    pub async fn collect_escrow(&self, escrow: Uid, fulfillment: Uid) -> Result<TxOutcome> {
        let kind = self.escrow_kind(escrow).await?;
        self.collect_escrow_of(kind, escrow, fulfillment).await
    }

    pub(crate) async fn collect_escrow_of(
        &self,
        kind: ObligationKind,
        escrow: Uid,
        fulfillment: Uid,
    ) -> Result<TxOutcome> {
        match kind {
            ObligationKind::Escrow(Asset::Erc20) => {
                self.erc20().collect_escrow(escrow, fulfillment).await
            },
            ObligationKind::Escrow(Asset::Erc721) => {
                self.erc721().collect_escrow(escrow, fulfillment).await
            },
            ObligationKind::Escrow(Asset::Erc1155) => {
                self.erc1155().collect_escrow(escrow, fulfillment).await
            },
            ObligationKind::Escrow(Asset::NativeToken) => {
                self.native_token().collect_escrow(escrow, fulfillment).await
            },
            ObligationKind::AttestationEscrow => {
                self.attestation_escrow().collect_escrow(escrow, fulfillment).await
            },
            ObligationKind::AttestationEscrow2 => {
                self.attestation_escrow().collect_escrow2(escrow, fulfillment).await
            },
            ObligationKind::Payment(_) | ObligationKind::String => Err(not_an_escrow(escrow)),
        }
    }

    /// Reclaims the expired escrow, dispatching to the escrow contract that
    /// made the escrow attestation.
    pub async fn reclaim_expired(&self, escrow: Uid) -> Result<TxOutcome> {
        match self.escrow_kind(escrow).await? {
            ObligationKind::Escrow(Asset::Erc20) => self.erc20().reclaim_expired(escrow).await,
            ObligationKind::Escrow(Asset::Erc721) => self.erc721().reclaim_expired(escrow).await,
            ObligationKind::Escrow(Asset::Erc1155) => {
                self.erc1155().reclaim_expired(escrow).await
            },
            ObligationKind::Escrow(Asset::NativeToken) => {
                self.native_token().reclaim_expired(escrow).await
            },
            ObligationKind::AttestationEscrow => {
                self.attestation_escrow().reclaim_expired(escrow).await
            },
            ObligationKind::AttestationEscrow2 => {
                self.attestation_escrow().reclaim_expired2(escrow).await
            },
            ObligationKind::Payment(_) | ObligationKind::String => Err(not_an_escrow(escrow)),
        }
    }

    /// Waits for the escrow to be collected, polling logs of the configured
    /// escrow contracts since the block.
    pub async fn wait_for_fulfillment<S, SFut>(
        &self,
        escrow: Uid,
        from_block: u64,
        sleep: S,
    ) -> Result<EscrowCollection>
    where
        S: Fn(Duration) -> SFut,
        SFut: Future<Output = ()>,
    {
        let contracts: Vec<_> = self
            .addresses()
            .configured()
            .filter(|(c, _)| ObligationKind::of(*c).is_some_and(|kind| kind.is_escrow()))
            .map(|(_, address)| address)
            .collect();
        if contracts.is_empty() {
            return Err(AlkahestError::MissingAddress(Contract::Erc20EscrowObligation));
        }
        // All escrow contracts share the event signature
        let filter = Filter::new()
            .address(contracts)
            .event_signature(EscrowCollected::SIGNATURE_HASH)
            .topic1(escrow);
        let ctx = stream::wait_for::<EscrowCollected, _, _, _>(
            self.provider(),
            filter,
            from_block,
            sleep,
        )
        .await?;
        let event = ctx.event();
        Ok(EscrowCollection {
            escrow: event.escrow,
            fulfillment: event.fulfillment,
            fulfiller: event.fulfiller,
            tx_hash: ctx.tx_hash(),
        })
    }

    async fn escrow_kind(&self, escrow: Uid) -> Result<ObligationKind> {
        let attestation = self.get_attestation(escrow).await?;
        match self.addresses().contract_at(attestation.attester).and_then(ObligationKind::of) {
            Some(kind) if kind.is_escrow() => Ok(kind),
            _ => Err(not_an_escrow(escrow)),
        }
    }
}

fn not_an_escrow(uid: Uid) -> AlkahestError {
    AlkahestError::InvalidArgument(format!("attestation {uid} is not an escrow obligation"))
}
