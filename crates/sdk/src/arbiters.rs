//! Demands: ABI-encoded parameters interpreted by arbiters.
//!
//! An escrow stores an arbiter address and an opaque demand. [`Demand`]
//! gives the demand a typed shape based on which protocol arbiter the
//! address belongs to. Composing arbiters (trusted party, attestation
//! property arbiters, any/all) wrap base demands, which are decoded
//! recursively.
//!
//! Payment obligations act as arbiters too: a payment attestation fulfills
//! a demand equal to the payment data.

use std::fmt::Display;

use alloy::primitives::{Address, B256, Bytes};
use alloy_sol_types::SolValue;
use itertools::Itertools;

use crate::{
    AlkahestClient,
    abi::{
        AllArbiter, AnyArbiter, Attestation, AttesterArbiter, ERC20PaymentObligation,
        ERC721PaymentObligation, ERC1155PaymentObligation, IArbiter, IntrinsicsArbiter2,
        NativeTokenPaymentObligation, RecipientArbiter, SchemaArbiter, SpecificAttestationArbiter,
        TrustedOracleArbiter, TrustedPartyArbiter,
    },
    addresses::{AddressConfig, Contract},
    error::{AlkahestError, Result},
    types::Uid,
};

/// Maximal nesting of composed demands accepted by the decoder.
pub const MAX_DEMAND_DEPTH: usize = 16;

/// Typed demand of a protocol arbiter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Demand {
    /// Accepts any fulfillment.
    Trivial,
    /// Fulfillment attestation must be valid: not expired, not revoked.
    Intrinsics,
    /// Same as [`Demand::Intrinsics`], plus fulfillment schema must match.
    Intrinsics2 { schema: B256 },
    /// Fulfillment must satisfy the base demand and be made for the escrow
    /// created by `creator`.
    TrustedParty { creator: Address, base: Box<Demand> },
    /// Fulfillment must be approved by the oracle; `data` is passed to the
    /// oracle as is.
    TrustedOracle { oracle: Address, data: Bytes },
    /// Fulfillment must be the particular attestation.
    SpecificAttestation { uid: Uid },
    /// At least one of the demands must be satisfied.
    Any(Vec<Demand>),
    /// All of the demands must be satisfied.
    All(Vec<Demand>),
    /// Base demand, plus fulfillment recipient must match.
    Recipient { recipient: Address, base: Box<Demand> },
    /// Base demand, plus fulfillment attester must match.
    Attester { attester: Address, base: Box<Demand> },
    /// Base demand, plus fulfillment schema must match.
    Schema { schema: B256, base: Box<Demand> },
    Erc20Payment(ERC20PaymentObligation::ObligationData),
    Erc721Payment(ERC721PaymentObligation::ObligationData),
    Erc1155Payment(ERC1155PaymentObligation::ObligationData),
    NativeTokenPayment(NativeTokenPaymentObligation::ObligationData),
    /// Demand of an arbiter that is not a configured protocol contract, or
    /// data the arbiter ignores (e.g. non-empty demand of the trivial
    /// arbiter), kept as is.
    Unknown { arbiter: Address, data: Bytes },
}

impl Demand {
    /// Contract checking the demand, `None` for [`Demand::Unknown`].
    pub fn contract(&self) -> Option<Contract> {
        Some(match self {
            Demand::Trivial => Contract::TrivialArbiter,
            Demand::Intrinsics => Contract::IntrinsicsArbiter,
            Demand::Intrinsics2 { .. } => Contract::IntrinsicsArbiter2,
            Demand::TrustedParty { .. } => Contract::TrustedPartyArbiter,
            Demand::TrustedOracle { .. } => Contract::TrustedOracleArbiter,
            Demand::SpecificAttestation { .. } => Contract::SpecificAttestationArbiter,
            Demand::Any(_) => Contract::AnyArbiter,
            Demand::All(_) => Contract::AllArbiter,
            Demand::Recipient { .. } => Contract::RecipientArbiter,
            Demand::Attester { .. } => Contract::AttesterArbiter,
            Demand::Schema { .. } => Contract::SchemaArbiter,
            Demand::Erc20Payment(_) => Contract::Erc20PaymentObligation,
            Demand::Erc721Payment(_) => Contract::Erc721PaymentObligation,
            Demand::Erc1155Payment(_) => Contract::Erc1155PaymentObligation,
            Demand::NativeTokenPayment(_) => Contract::NativeTokenPaymentObligation,
            Demand::Unknown { .. } => return None,
        })
    }

    /// Arbiter address and ABI-encoded demand, ready to be placed into
    /// an escrow.
    pub fn encode(&self, addresses: &AddressConfig) -> Result<(Address, Bytes)> {
        let data: Vec<u8> = match self {
            Demand::Unknown { arbiter, data } => return Ok((*arbiter, data.clone())),
            Demand::Trivial | Demand::Intrinsics => vec![],
            Demand::Intrinsics2 { schema } => {
                IntrinsicsArbiter2::DemandData { schema: *schema }.abi_encode()
            },
            Demand::TrustedParty { creator, base } => {
                let (base_arbiter, base_demand) = base.encode(addresses)?;
                TrustedPartyArbiter::DemandData {
                    baseArbiter: base_arbiter,
                    baseDemand: base_demand,
                    creator: *creator,
                }
                .abi_encode()
            },
            Demand::TrustedOracle { oracle, data } => {
                TrustedOracleArbiter::DemandData { oracle: *oracle, data: data.clone() }
                    .abi_encode()
            },
            Demand::SpecificAttestation { uid } => {
                SpecificAttestationArbiter::DemandData { uid: *uid }.abi_encode()
            },
            Demand::Any(demands) => {
                let (arbiters, demands) = encode_all(addresses, demands)?;
                AnyArbiter::DemandData { arbiters, demands }.abi_encode()
            },
            Demand::All(demands) => {
                let (arbiters, demands) = encode_all(addresses, demands)?;
                AllArbiter::DemandData { arbiters, demands }.abi_encode()
            },
            Demand::Recipient { recipient, base } => {
                let (base_arbiter, base_demand) = base.encode(addresses)?;
                RecipientArbiter::DemandData {
                    baseArbiter: base_arbiter,
                    baseDemand: base_demand,
                    recipient: *recipient,
                }
                .abi_encode()
            },
            Demand::Attester { attester, base } => {
                let (base_arbiter, base_demand) = base.encode(addresses)?;
                AttesterArbiter::DemandData {
                    baseArbiter: base_arbiter,
                    baseDemand: base_demand,
                    attester: *attester,
                }
                .abi_encode()
            },
            Demand::Schema { schema, base } => {
                let (base_arbiter, base_demand) = base.encode(addresses)?;
                SchemaArbiter::DemandData {
                    baseArbiter: base_arbiter,
                    baseDemand: base_demand,
                    schema: *schema,
                }
                .abi_encode()
            },
            Demand::Erc20Payment(d) => d.abi_encode(),
            Demand::Erc721Payment(d) => d.abi_encode(),
            Demand::Erc1155Payment(d) => d.abi_encode(),
            Demand::NativeTokenPayment(d) => d.abi_encode(),
        };
        // `contract()` is always `Some` past the `Unknown` arm above
        let contract = self
            .contract()
            .ok_or_else(|| AlkahestError::InvalidArgument("demand without arbiter".to_string()))?;
        Ok((addresses.require(contract)?, data.into()))
    }

    /// Decodes the demand of the arbiter.
    ///
    /// Arbiters that are not configured protocol contracts, as well as
    /// non-empty data of arbiters taking none, produce [`Demand::Unknown`],
    /// so that re-encoding always yields the original bytes.
    pub fn decode(addresses: &AddressConfig, arbiter: Address, data: &[u8]) -> Result<Self> {
        Self::decode_nested(addresses, arbiter, data, 0)
    }

    fn decode_nested(
        addresses: &AddressConfig,
        arbiter: Address,
        data: &[u8],
        depth: usize,
    ) -> Result<Self> {
        if depth > MAX_DEMAND_DEPTH {
            return Err(AlkahestError::InvalidArgument(format!(
                "demand nesting exceeds {MAX_DEMAND_DEPTH} levels"
            )));
        }
        let base = |arbiter: Address, data: &Bytes| {
            Self::decode_nested(addresses, arbiter, data, depth + 1).map(Box::new)
        };
        let Some(contract) = addresses.contract_at(arbiter) else {
            return Ok(Demand::Unknown { arbiter, data: Bytes::copy_from_slice(data) });
        };
        Ok(match contract {
            Contract::TrivialArbiter | Contract::IntrinsicsArbiter if !data.is_empty() => {
                Demand::Unknown { arbiter, data: Bytes::copy_from_slice(data) }
            },
            Contract::TrivialArbiter => Demand::Trivial,
            Contract::IntrinsicsArbiter => Demand::Intrinsics,
            Contract::IntrinsicsArbiter2 => {
                let d = IntrinsicsArbiter2::DemandData::abi_decode(data)?;
                Demand::Intrinsics2 { schema: d.schema }
            },
            Contract::TrustedPartyArbiter => {
                let d = TrustedPartyArbiter::DemandData::abi_decode(data)?;
                Demand::TrustedParty {
                    creator: d.creator,
                    base: base(d.baseArbiter, &d.baseDemand)?,
                }
            },
            Contract::TrustedOracleArbiter => {
                let d = TrustedOracleArbiter::DemandData::abi_decode(data)?;
                Demand::TrustedOracle { oracle: d.oracle, data: d.data }
            },
            Contract::SpecificAttestationArbiter => {
                let d = SpecificAttestationArbiter::DemandData::abi_decode(data)?;
                Demand::SpecificAttestation { uid: d.uid }
            },
            Contract::AnyArbiter => {
                let d = AnyArbiter::DemandData::abi_decode(data)?;
                Demand::Any(decode_all(addresses, &d.arbiters, &d.demands, depth)?)
            },
            Contract::AllArbiter => {
                let d = AllArbiter::DemandData::abi_decode(data)?;
                Demand::All(decode_all(addresses, &d.arbiters, &d.demands, depth)?)
            },
            Contract::RecipientArbiter => {
                let d = RecipientArbiter::DemandData::abi_decode(data)?;
                Demand::Recipient {
                    recipient: d.recipient,
                    base: base(d.baseArbiter, &d.baseDemand)?,
                }
            },
            Contract::AttesterArbiter => {
                let d = AttesterArbiter::DemandData::abi_decode(data)?;
                Demand::Attester { attester: d.attester, base: base(d.baseArbiter, &d.baseDemand)? }
            },
            Contract::SchemaArbiter => {
                let d = SchemaArbiter::DemandData::abi_decode(data)?;
                Demand::Schema { schema: d.schema, base: base(d.baseArbiter, &d.baseDemand)? }
            },
            Contract::Erc20PaymentObligation => Demand::Erc20Payment(SolValue::abi_decode(data)?),
            Contract::Erc721PaymentObligation => Demand::Erc721Payment(SolValue::abi_decode(data)?),
            Contract::Erc1155PaymentObligation => {
                Demand::Erc1155Payment(SolValue::abi_decode(data)?)
            },
            Contract::NativeTokenPaymentObligation => {
                Demand::NativeTokenPayment(SolValue::abi_decode(data)?)
            },
            // Contracts that are not arbiters
            Contract::Eas
            | Contract::SchemaRegistry
            | Contract::Erc20EscrowObligation
            | Contract::Erc721EscrowObligation
            | Contract::Erc1155EscrowObligation
            | Contract::NativeTokenEscrowObligation
            | Contract::AttestationEscrowObligation
            | Contract::AttestationEscrowObligation2
            | Contract::StringObligation => {
                Demand::Unknown { arbiter, data: Bytes::copy_from_slice(data) }
            },
        })
    }
}

impl Display for Demand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Demand::Trivial => write!(f, "trivial"),
            Demand::Intrinsics => write!(f, "intrinsics"),
            Demand::Intrinsics2 { schema } => write!(f, "intrinsics(schema={schema})"),
            Demand::TrustedParty { creator, base } => {
                write!(f, "trusted-party(creator={creator}, {base})")
            },
            Demand::TrustedOracle { oracle, data } => {
                write!(f, "trusted-oracle(oracle={oracle}, data={data})")
            },
            Demand::SpecificAttestation { uid } => write!(f, "specific-attestation({uid})"),
            Demand::Any(demands) => write!(f, "any({})", demands.iter().join(", ")),
            Demand::All(demands) => write!(f, "all({})", demands.iter().join(", ")),
            Demand::Recipient { recipient, base } => {
                write!(f, "recipient(recipient={recipient}, {base})")
            },
            Demand::Attester { attester, base } => {
                write!(f, "attester(attester={attester}, {base})")
            },
            Demand::Schema { schema, base } => write!(f, "schema(schema={schema}, {base})"),
            Demand::Erc20Payment(d) => {
                write!(
                    f,
                    "erc20-payment(token={}, amount={}, payee={})",
                    d.token, d.amount, d.payee
                )
            },
            Demand::Erc721Payment(d) => write!(
                f,
                "erc721-payment(token={}, token_id={}, payee={})",
                d.token, d.tokenId, d.payee
            ),
            Demand::Erc1155Payment(d) => write!(
                f,
                "erc1155-payment(token={}, token_id={}, amount={}, payee={})",
                d.token, d.tokenId, d.amount, d.payee
            ),
            Demand::NativeTokenPayment(d) => {
                write!(f, "native-payment(amount={}, payee={})", d.amount, d.payee)
            },
            Demand::Unknown { arbiter, data } => {
                write!(f, "unknown(arbiter={arbiter}, data={data})")
            },
        }
    }
}

fn encode_all(addresses: &AddressConfig, demands: &[Demand]) -> Result<(Vec<Address>, Vec<Bytes>)> {
    demands.iter().map(|d| d.encode(addresses)).collect()
}

fn decode_all(
    addresses: &AddressConfig,
    arbiters: &[Address],
    demands: &[Bytes],
    depth: usize,
) -> Result<Vec<Demand>> {
    if arbiters.len() != demands.len() {
        return Err(AlkahestError::InvalidArgument(format!(
            "{} arbiters for {} demands",
            arbiters.len(),
            demands.len()
        )));
    }
    arbiters
        .iter()
        .zip(demands)
        .map(|(arbiter, demand)| Demand::decode_nested(addresses, *arbiter, demand, depth + 1))
        .collect()
}

impl AlkahestClient {
    /// Asks the arbiter whether the obligation fulfills the demand.
    pub async fn check_obligation(
        &self,
        arbiter: Address,
        obligation: Attestation,
        demand: Bytes,
        counteroffer: Uid,
    ) -> Result<bool> {
        Ok(IArbiter::new(arbiter, self.provider())
            .checkObligation(obligation, demand, counteroffer)
            .call()
            .await?)
    }

    /// Same as [`Self::check_obligation`] for a typed demand.
    pub async fn check_demand(
        &self,
        obligation: Attestation,
        demand: &Demand,
        counteroffer: Uid,
    ) -> Result<bool> {
        let (arbiter, data) = demand.encode(self.addresses())?;
        self.check_obligation(arbiter, obligation, data, counteroffer).await
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::U256;

    use super::*;
    use crate::testing::fixtures;

    fn round_trip(addresses: &AddressConfig, demand: Demand) {
        let (arbiter, data) = demand.encode(addresses).unwrap();
        assert_eq!(Demand::decode(addresses, arbiter, &data).unwrap(), demand);
    }

    #[test]
    fn test_trusted_oracle_demand_layout() {
        let addresses = fixtures::addresses();
        let oracle = Address::with_last_byte(0x0a);
        let demand = Demand::TrustedOracle { oracle, data: Bytes::from_static(b"hi") };

        let (arbiter, data) = demand.encode(&addresses).unwrap();
        assert_eq!(arbiter, addresses.trusted_oracle_arbiter);
        let raw = TrustedOracleArbiter::DemandData::abi_decode(&data).unwrap();
        assert_eq!(raw.oracle, oracle);
        assert_eq!(raw.data, Bytes::from_static(b"hi"));
    }

    #[test]
    fn test_composed_demands() {
        let addresses = fixtures::addresses();
        let payment = Demand::Erc20Payment(ERC20PaymentObligation::ObligationData {
            token: Address::with_last_byte(0xee),
            amount: U256::from(10),
            payee: Address::with_last_byte(0x01),
        });
        round_trip(
            &addresses,
            Demand::All(vec![
                Demand::Intrinsics,
                Demand::TrustedParty {
                    creator: Address::with_last_byte(0x02),
                    base: Box::new(Demand::Recipient {
                        recipient: Address::with_last_byte(0x03),
                        base: Box::new(payment.clone()),
                    }),
                },
                Demand::Any(vec![
                    Demand::SpecificAttestation { uid: B256::with_last_byte(7) },
                    Demand::Schema {
                        schema: B256::with_last_byte(8),
                        base: Box::new(Demand::Trivial),
                    },
                ]),
            ]),
        );
    }

    #[test]
    fn test_unknown_arbiter_is_preserved() {
        let addresses = fixtures::addresses();
        let arbiter = Address::with_last_byte(0x99);
        let data = Bytes::from_static(&[0xde, 0xad]);

        let demand = Demand::decode(&addresses, arbiter, &data).unwrap();
        assert_eq!(demand, Demand::Unknown { arbiter, data: data.clone() });
        assert_eq!(demand.encode(&addresses).unwrap(), (arbiter, data));
        assert_eq!(demand.contract(), None);
    }

    #[test]
    fn test_ignored_demand_data_is_preserved() {
        let addresses = fixtures::addresses();
        let data = Bytes::from_static(b"note");

        let demand = Demand::decode(&addresses, addresses.trivial_arbiter, &data).unwrap();
        assert_eq!(demand.encode(&addresses).unwrap(), (addresses.trivial_arbiter, data));
        assert_eq!(
            Demand::decode(&addresses, addresses.intrinsics_arbiter, &[]).unwrap(),
            Demand::Intrinsics
        );

        let ignored = Bytes::from_static(&[1]);
        let nested = Demand::All(vec![
            Demand::Unknown { arbiter: addresses.intrinsics_arbiter, data: ignored },
            Demand::Trivial,
        ]);
        let (arbiter, encoded) = nested.encode(&addresses).unwrap();
        assert_eq!(Demand::decode(&addresses, arbiter, &encoded).unwrap(), nested);
    }

    #[test]
    fn test_any_length_mismatch() {
        let addresses = fixtures::addresses();
        let data = AnyArbiter::DemandData {
            arbiters: vec![addresses.trivial_arbiter, addresses.intrinsics_arbiter],
            demands: vec![Bytes::new()],
        }
        .abi_encode();

        assert!(matches!(
            Demand::decode(&addresses, addresses.any_arbiter, &data),
            Err(AlkahestError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_display() {
        let demand = Demand::Any(vec![
            Demand::Trivial,
            Demand::SpecificAttestation { uid: B256::ZERO },
        ]);
        let expected = format!("any(trivial, specific-attestation({}))", B256::ZERO);
        assert_eq!(demand.to_string(), expected);
    }

    #[test]
    fn test_missing_arbiter_address() {
        let addresses = AddressConfig::default();
        assert!(matches!(
            Demand::Trivial.encode(&addresses),
            Err(AlkahestError::MissingAddress(Contract::TrivialArbiter))
        ));
    }

    #[test]
    fn test_nesting_limit() {
        let addresses = fixtures::addresses();
        let mut demand = Demand::Trivial;
        for _ in 0..=MAX_DEMAND_DEPTH {
            demand = Demand::Recipient { recipient: Address::ZERO, base: Box::new(demand) };
        }
        let (arbiter, data) = demand.encode(&addresses).unwrap();
        assert!(Demand::decode(&addresses, arbiter, &data).is_err());
    }
}
