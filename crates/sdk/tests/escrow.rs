use alkahest_sdk::{
    abi::{ERC20EscrowObligation, NativeTokenPaymentObligation, StringObligation},
    addresses::{AddressConfig, Contract},
    arbiters::Demand,
    barter::Ask,
    obligations::{Asset, Obligation, ObligationKind},
    testing::{self, fixtures},
};
use alloy::{
    primitives::{Address, B256, Bytes, U256, address},
    sol_types::SolValue,
};

/// Escrow demanding an oracle approval of a string statement made by a
/// particular party, or a native token payment.
fn composite_demand(oracle: Address, party: Address, payee: Address) -> Demand {
    Demand::Any(vec![
        Demand::Attester {
            attester: party,
            base: Box::new(Demand::TrustedOracle { oracle, data: Bytes::from_static(b"task") }),
        },
        Ask::NativeToken { amount: U256::from(10).pow(U256::from(18)) }.demand(payee),
    ])
}

#[test]
fn test_addresses_from_json() {
    let config: AddressConfig = r#"{
        "eas": "0x4200000000000000000000000000000000000021",
        "erc20EscrowObligation": "0x1000000000000000000000000000000000000001",
        "trustedOracleArbiter": "0x1000000000000000000000000000000000000002"
    }"#
    .parse()
    .unwrap();

    assert_eq!(config.contract_at(config.eas), Some(Contract::Eas));
    assert_eq!(
        config.require(Contract::TrustedOracleArbiter).unwrap(),
        address!("0x1000000000000000000000000000000000000002")
    );
    assert!(config.require(Contract::AnyArbiter).is_err());
    assert_eq!(config.configured().count(), 3);
}

/// Tests reading an escrow with composed demand, as the seller would before
/// fulfilling it.
#[tokio::test]
async fn test_escrow_with_composite_demand() {
    let addresses = fixtures::addresses();
    let (client, asserter) = testing::mocked_client(addresses.clone());

    let oracle = Address::with_last_byte(0x0a);
    let party = Address::with_last_byte(0x0b);
    let buyer = Address::with_last_byte(0x0c);
    let demand = composite_demand(oracle, party, buyer);
    let (arbiter, encoded) = demand.encode(&addresses).unwrap();
    assert_eq!(arbiter, addresses.any_arbiter);

    let escrow = ERC20EscrowObligation::ObligationData {
        arbiter,
        demand: encoded,
        token: Address::with_last_byte(0xee),
        amount: U256::from(500),
    };
    let attestation =
        fixtures::attestation(addresses.erc20_escrow_obligation, escrow.abi_encode().into());
    asserter.push_success(&Bytes::from(attestation.abi_encode()));

    let view = client.get_escrow_and_demand(attestation.uid).await.unwrap();
    assert_eq!(view.obligation.kind(), Some(ObligationKind::Escrow(Asset::Erc20)));
    assert_eq!(view.demand, demand);
    assert_eq!(
        view.demand.to_string(),
        format!(
            "any(attester(attester={party}, trusted-oracle(oracle={oracle}, data=0x7461736b)), \
             native-payment(amount=1000000000000000000, payee={buyer}))"
        )
    );
}

/// Tests asking the arbiter whether a statement fulfills the demand.
#[tokio::test]
async fn test_check_demand() {
    let addresses = fixtures::addresses();
    let (client, asserter) = testing::mocked_client(addresses.clone());
    let statement = StringObligation::ObligationData { item: "done".to_string() };
    let fulfillment = fixtures::attestation(
        addresses.string_obligation,
        Obligation::String(statement).encode(),
    );

    asserter.push_success(&Bytes::from(true.abi_encode()));
    asserter.push_success(&Bytes::from(false.abi_encode()));

    let demand = Demand::SpecificAttestation { uid: fulfillment.uid };
    assert!(client.check_demand(fulfillment.clone(), &demand, B256::ZERO).await.unwrap());
    let demand = Demand::NativeTokenPayment(NativeTokenPaymentObligation::ObligationData {
        amount: U256::from(1),
        payee: Address::with_last_byte(1),
    });
    assert!(!client.check_demand(fulfillment, &demand, B256::ZERO).await.unwrap());
}

#[tokio::test]
async fn test_missing_contract() {
    let (client, _asserter) = testing::mocked_client(AddressConfig::default());
    assert!(client.get_attestation(B256::with_last_byte(1)).await.is_err());
    assert!(composite_demand(Address::ZERO, Address::ZERO, Address::ZERO)
        .encode(client.addresses())
        .is_err());
}
