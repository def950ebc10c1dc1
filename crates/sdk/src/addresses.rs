//! Addresses of the deployed protocol contracts.
//!
//! Deployments are chain specific, so nothing is hard coded here: addresses
//! are either loaded from a JSON file (camelCase keys, as produced by the
//! deployment scripts) or assembled with [`AddressConfig::with`].
//! A zero address means the contract is not available on the chain.

use std::{fmt::Display, path::Path, str::FromStr};

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::error::{AlkahestError, Result};

macro_rules! protocol_contracts {
    ($($field:ident => $variant:ident: $name:literal,)+) => {
        /// Protocol contract the SDK interacts with.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum Contract {
            $($variant,)+
        }

        impl Contract {
            pub const ALL: &'static [Contract] = &[$(Contract::$variant,)+];

            /// Name of the contract, as used in configuration files.
            pub fn name(&self) -> &'static str {
                match self {
                    $(Contract::$variant => $name,)+
                }
            }
        }

        /// Addresses of the protocol contracts on a particular chain.
        #[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase", default)]
        pub struct AddressConfig {
            $(pub $field: Address,)+
        }

        impl AddressConfig {
            /// Configured address of the contract, zero if not configured.
            pub fn get(&self, contract: Contract) -> Address {
                match contract {
                    $(Contract::$variant => self.$field,)+
                }
            }

            fn slot(&mut self, contract: Contract) -> &mut Address {
                match contract {
                    $(Contract::$variant => &mut self.$field,)+
                }
            }
        }
    };
}

protocol_contracts! {
    eas => Eas: "eas",
    schema_registry => SchemaRegistry: "schemaRegistry",
    erc20_escrow_obligation => Erc20EscrowObligation: "erc20EscrowObligation",
    erc20_payment_obligation => Erc20PaymentObligation: "erc20PaymentObligation",
    erc721_escrow_obligation => Erc721EscrowObligation: "erc721EscrowObligation",
    erc721_payment_obligation => Erc721PaymentObligation: "erc721PaymentObligation",
    erc1155_escrow_obligation => Erc1155EscrowObligation: "erc1155EscrowObligation",
    erc1155_payment_obligation => Erc1155PaymentObligation: "erc1155PaymentObligation",
    native_token_escrow_obligation => NativeTokenEscrowObligation: "nativeTokenEscrowObligation",
    attestation_escrow_obligation => AttestationEscrowObligation: "attestationEscrowObligation",
    attestation_escrow_obligation2 => AttestationEscrowObligation2: "attestationEscrowObligation2",
    native_token_payment_obligation => NativeTokenPaymentObligation: "nativeTokenPaymentObligation",
    string_obligation => StringObligation: "stringObligation",
    trivial_arbiter => TrivialArbiter: "trivialArbiter",
    trusted_party_arbiter => TrustedPartyArbiter: "trustedPartyArbiter",
    trusted_oracle_arbiter => TrustedOracleArbiter: "trustedOracleArbiter",
    specific_attestation_arbiter => SpecificAttestationArbiter: "specificAttestationArbiter",
    intrinsics_arbiter => IntrinsicsArbiter: "intrinsicsArbiter",
    intrinsics_arbiter2 => IntrinsicsArbiter2: "intrinsicsArbiter2",
    any_arbiter => AnyArbiter: "anyArbiter",
    all_arbiter => AllArbiter: "allArbiter",
    recipient_arbiter => RecipientArbiter: "recipientArbiter",
    attester_arbiter => AttesterArbiter: "attesterArbiter",
    schema_arbiter => SchemaArbiter: "schemaArbiter",
}

impl AddressConfig {
    /// Reads the configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Returns the configuration with the contract address set.
    pub fn with(mut self, contract: Contract, address: Address) -> Self {
        *self.slot(contract) = address;
        self
    }

    /// Address of the contract, or [`AlkahestError::MissingAddress`] if the
    /// contract is not configured.
    pub fn require(&self, contract: Contract) -> Result<Address> {
        let address = self.get(contract);
        if address.is_zero() {
            return Err(AlkahestError::MissingAddress(contract));
        }
        Ok(address)
    }

    /// Resolves an address back to the protocol contract deployed at it.
    pub fn contract_at(&self, address: Address) -> Option<Contract> {
        if address.is_zero() {
            return None;
        }
        Contract::ALL.iter().copied().find(|c| self.get(*c) == address)
    }

    /// Contracts that are configured.
    pub fn configured(&self) -> impl Iterator<Item = (Contract, Address)> + '_ {
        Contract::ALL
            .iter()
            .map(|c| (*c, self.get(*c)))
            .filter(|(_, a)| !a.is_zero())
    }
}

impl FromStr for AddressConfig {
    type Err = AlkahestError;

    fn from_str(s: &str) -> Result<Self> { Ok(serde_json::from_str(s)?) }
}

impl Display for Contract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.name()) }
}

impl FromStr for Contract {
    type Err = AlkahestError;

    fn from_str(s: &str) -> Result<Self> {
        Contract::ALL
            .iter()
            .copied()
            .find(|c| c.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| AlkahestError::InvalidArgument(format!("unknown contract: {s}")))
    }
}
