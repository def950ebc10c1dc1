use alkahest_sdk::{
    abi::{IEAS, IERC20, NativeTokenEscrowObligation},
    barter::{Ask, Bid},
    error::AlkahestError,
    testing::{self, fixtures},
};
use alloy::{
    primitives::{Address, B256, Bytes, TxHash, U256},
    sol_types::SolValue,
};

fn attested(uid: B256) -> IEAS::Attested {
    IEAS::Attested {
        recipient: Address::with_last_byte(1),
        attester: Address::with_last_byte(2),
        uid,
        schemaUID: B256::ZERO,
    }
}

/// Tests the uid of the created escrow is taken from the EAS event, even if
/// another contract emitted a look-alike event first.
#[tokio::test]
async fn test_create_escrow_takes_uid_from_eas() {
    let addresses = fixtures::addresses();
    let (client, asserter) = testing::mocked_client(addresses.clone());
    let tx_hash = TxHash::with_last_byte(0x11);
    let uid = B256::repeat_byte(0x42);
    let forged = attested(B256::repeat_byte(0xde));
    let logs = vec![
        fixtures::rpc_log(Address::repeat_byte(0x70), tx_hash, 0, forged),
        fixtures::rpc_log(addresses.eas, tx_hash, 1, attested(uid)),
    ];
    testing::push_mined(&asserter, tx_hash, true, logs);

    let outcome = client
        .native_token()
        .create_escrow(
            NativeTokenEscrowObligation::ObligationData {
                arbiter: addresses.trivial_arbiter,
                demand: Bytes::new(),
                amount: U256::from(1),
            },
            0,
        )
        .await
        .unwrap();
    assert_eq!(outcome.tx_hash, tx_hash);
    assert_eq!(outcome.uid, Some(uid));
    assert!(asserter.read_q().is_empty());
}

#[tokio::test]
async fn test_obligation_without_attestation() {
    let addresses = fixtures::addresses();
    let (client, asserter) = testing::mocked_client(addresses.clone());
    let tx_hash = TxHash::with_last_byte(0x12);
    let transfer = IERC20::Transfer {
        from: Address::ZERO,
        to: Address::with_last_byte(1),
        value: U256::from(5),
    };
    testing::push_mined(
        &asserter,
        tx_hash,
        true,
        vec![fixtures::rpc_log(Address::repeat_byte(0x70), tx_hash, 0, transfer)],
    );

    assert!(matches!(
        client.string_obligation().do_obligation("done", None).await,
        Err(AlkahestError::NoAttestation(hash)) if hash == tx_hash
    ));
}

#[tokio::test]
async fn test_reverted_transaction() {
    let addresses = fixtures::addresses();
    let (client, asserter) = testing::mocked_client(addresses.clone());
    let tx_hash = TxHash::with_last_byte(0x13);
    testing::push_mined(&asserter, tx_hash, false, Vec::new());

    let (escrow, fulfillment) = (B256::with_last_byte(1), B256::with_last_byte(2));
    let outcome = client.native_token().collect_escrow(escrow, fulfillment).await;
    assert!(matches!(outcome, Err(AlkahestError::Reverted(hash)) if hash == tx_hash));
}

/// Tests collection does not require an attestation to be made.
#[tokio::test]
async fn test_collect_escrow() {
    let addresses = fixtures::addresses();
    let (client, asserter) = testing::mocked_client(addresses.clone());
    let tx_hash = TxHash::with_last_byte(0x14);
    testing::push_mined(&asserter, tx_hash, true, Vec::new());

    let outcome =
        client.erc20().collect_escrow(B256::with_last_byte(1), B256::with_last_byte(2)).await;
    assert_eq!(outcome.unwrap().uid, None);
}

/// Tests an ERC-1155 bid skips approval when the escrow contract is already
/// an operator.
#[tokio::test]
async fn test_buy_with_erc1155() {
    let addresses = fixtures::addresses();
    let (client, asserter) = testing::mocked_client(addresses.clone());
    let tx_hash = TxHash::with_last_byte(0x15);
    let uid = B256::repeat_byte(0x43);
    asserter.push_success(&Bytes::from(true.abi_encode()));
    testing::push_mined(
        &asserter,
        tx_hash,
        true,
        vec![fixtures::rpc_log(addresses.eas, tx_hash, 0, attested(uid))],
    );

    let bid = Bid::Erc1155 {
        token: Address::with_last_byte(0x20),
        token_id: U256::from(7),
        amount: U256::from(2),
    };
    let ask = Ask::NativeToken { amount: U256::from(100) };
    let outcome = client.buy(&bid, &ask, 0).await.unwrap();
    assert_eq!(outcome.attestation().unwrap(), uid);
    assert!(asserter.read_q().is_empty());
}
