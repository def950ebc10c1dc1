//! Token barter composed from escrow and payment obligations.
//!
//! The buyer escrows the bid with the payment obligation contract of the
//! asked asset as the arbiter and the expected payment as the demand. The
//! seller makes that payment and collects the escrow with it.

use alloy::primitives::{Address, U256};

use crate::{
    AlkahestClient,
    abi::{
        ERC20EscrowObligation, ERC20PaymentObligation, ERC721EscrowObligation,
        ERC721PaymentObligation, ERC1155EscrowObligation, ERC1155PaymentObligation,
        NativeTokenEscrowObligation, NativeTokenPaymentObligation,
    },
    arbiters::Demand,
    error::{AlkahestError, Result},
    types::{TxOutcome, Uid},
};

/// Asset escrowed by the buyer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bid {
    Erc20 { token: Address, amount: U256 },
    Erc721 { token: Address, token_id: U256 },
    Erc1155 { token: Address, token_id: U256, amount: U256 },
    NativeToken { amount: U256 },
}

/// Asset asked in exchange for the escrowed bid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ask {
    Erc20 { token: Address, amount: U256 },
    Erc721 { token: Address, token_id: U256 },
    Erc1155 { token: Address, token_id: U256, amount: U256 },
    NativeToken { amount: U256 },
}

impl Ask {
    /// Payment demand to be paid to the payee.
    pub fn demand(&self, payee: Address) -> Demand {
        match *self {
            Ask::Erc20 { token, amount } => {
                Demand::Erc20Payment(ERC20PaymentObligation::ObligationData {
                    token,
                    amount,
                    payee,
                })
            },
            Ask::Erc721 { token, token_id } => {
                Demand::Erc721Payment(ERC721PaymentObligation::ObligationData {
                    token,
                    tokenId: token_id,
                    payee,
                })
            },
            Ask::Erc1155 { token, token_id, amount } => {
                Demand::Erc1155Payment(ERC1155PaymentObligation::ObligationData {
                    token,
                    tokenId: token_id,
                    amount,
                    payee,
                })
            },
            Ask::NativeToken { amount } => {
                Demand::NativeTokenPayment(NativeTokenPaymentObligation::ObligationData {
                    amount,
                    payee,
                })
            },
        }
    }
}

/// Transactions fulfilling a buy order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fulfillment {
    /// Payment made to the buyer.
    pub payment: TxOutcome,
    /// Collection of the escrowed bid.
    pub collection: TxOutcome,
}

impl AlkahestClient {
    /// Escrows the bid until the ask is paid to the signer.
    ///
    /// Approves the tokens to the escrow contract if needed.
    pub async fn buy(&self, bid: &Bid, ask: &Ask, expiration: u64) -> Result<TxOutcome> {
        let (arbiter, demand) = ask.demand(self.signer()).encode(self.addresses())?;
        tracing::debug!(?bid, ?ask, "creating buy order");
        match *bid {
            Bid::Erc20 { token, amount } => {
                self.erc20()
                    .approve_and_create_escrow(
                        ERC20EscrowObligation::ObligationData { arbiter, demand, token, amount },
                        expiration,
                    )
                    .await
            },
            Bid::Erc721 { token, token_id } => {
                self.erc721()
                    .approve_and_create_escrow(
                        ERC721EscrowObligation::ObligationData {
                            arbiter,
                            demand,
                            token,
                            tokenId: token_id,
                        },
                        expiration,
                    )
                    .await
            },
            Bid::Erc1155 { token, token_id, amount } => {
                self.erc1155()
                    .approve_and_create_escrow(
                        ERC1155EscrowObligation::ObligationData {
                            arbiter,
                            demand,
                            token,
                            tokenId: token_id,
                            amount,
                        },
                        expiration,
                    )
                    .await
            },
            Bid::NativeToken { amount } => {
                self.native_token()
                    .create_escrow(
                        NativeTokenEscrowObligation::ObligationData { arbiter, demand, amount },
                        expiration,
                    )
                    .await
            },
        }
    }

    /// Escrows `amount` of `token` until the ask is paid to the signer.
    pub async fn buy_with_erc20(
        &self,
        token: Address,
        amount: U256,
        ask: &Ask,
        expiration: u64,
    ) -> Result<TxOutcome> {
        self.buy(&Bid::Erc20 { token, amount }, ask, expiration).await
    }

    /// Makes the payment the demand asks for, approving tokens if needed.
    pub async fn pay_demand(&self, demand: Demand) -> Result<TxOutcome> {
        match demand {
            Demand::Erc20Payment(data) => self.erc20().approve_and_pay(data).await,
            Demand::Erc721Payment(data) => self.erc721().approve_and_pay(data).await,
            Demand::Erc1155Payment(data) => self.erc1155().approve_and_pay(data).await,
            Demand::NativeTokenPayment(data) => self.native_token().pay(data).await,
            demand => Err(AlkahestError::Unsupported(format!("{demand} is not a payment"))),
        }
    }

    /// Pays what the escrow demands and collects it.
    ///
    /// Only escrows demanding a payment obligation are supported, approvals
    /// are made if needed.
    pub async fn fulfill_with_payment(&self, buy: Uid) -> Result<Fulfillment> {
        let view = self.get_escrow_and_demand(buy).await?;
        let Some(kind) = view.obligation.kind().filter(|kind| kind.is_escrow()) else {
            return Err(AlkahestError::InvalidArgument(format!("{buy} is not an escrow")));
        };
        if view.attestation.is_revoked() {
            return Err(AlkahestError::InvalidRequest(format!("escrow {buy} is already closed")));
        }
        let now = u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default();
        if view.attestation.is_expired(now) {
            return Err(AlkahestError::InvalidRequest(format!("escrow {buy} has expired")));
        }

        let payment = self.pay_demand(view.demand).await?;
        let collection = self.collect_escrow_of(kind, buy, payment.attestation()?).await?;
        tracing::info!(%buy, payment = ?payment.uid, "buy order fulfilled");
        Ok(Fulfillment { payment, collection })
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::Bytes;
    use alloy_sol_types::SolValue;

    use super::*;
    use crate::{
        abi::Attestation,
        testing::{self, fixtures},
    };

    #[test]
    fn test_ask_demand() {
        let addresses = fixtures::addresses();
        let payee = Address::with_last_byte(0xb0);
        let token = Address::with_last_byte(0x20);
        let ask = Ask::Erc1155 { token, token_id: U256::from(7), amount: U256::from(3) };

        let (arbiter, demand) = ask.demand(payee).encode(&addresses).unwrap();
        assert_eq!(arbiter, addresses.erc1155_payment_obligation);
        let decoded = ERC1155PaymentObligation::ObligationData::abi_decode(&demand).unwrap();
        assert_eq!(decoded.payee, payee);
        assert_eq!(decoded.tokenId, U256::from(7));

        let (arbiter, _) = Ask::NativeToken { amount: U256::from(1) }
            .demand(payee)
            .encode(&addresses)
            .unwrap();
        assert_eq!(arbiter, addresses.native_token_payment_obligation);
    }

    fn escrow(arbiter: Address, demand: Bytes) -> Attestation {
        let addresses = fixtures::addresses();
        let data = ERC20EscrowObligation::ObligationData {
            arbiter,
            demand,
            token: Address::with_last_byte(0x20),
            amount: U256::from(10),
        };
        fixtures::attestation(addresses.erc20_escrow_obligation, data.abi_encode().into())
    }

    #[tokio::test]
    async fn test_fulfill_rejects_non_payment_demand() {
        let addresses = fixtures::addresses();
        let (client, asserter) = testing::mocked_client(addresses.clone());
        let attestation = escrow(addresses.trivial_arbiter, Bytes::new());
        asserter.push_success(&Bytes::from(attestation.abi_encode()));

        assert!(matches!(
            client.fulfill_with_payment(attestation.uid).await,
            Err(AlkahestError::Unsupported(_))
        ));
    }

    #[tokio::test]
    async fn test_fulfill_rejects_expired_escrow() {
        let addresses = fixtures::addresses();
        let (client, asserter) = testing::mocked_client(addresses.clone());
        let (arbiter, demand) = Ask::NativeToken { amount: U256::from(1) }
            .demand(Address::with_last_byte(0xb0))
            .encode(&addresses)
            .unwrap();
        let mut attestation = escrow(arbiter, demand);
        attestation.expirationTime = 1;
        asserter.push_success(&Bytes::from(attestation.abi_encode()));

        assert!(matches!(
            client.fulfill_with_payment(attestation.uid).await,
            Err(AlkahestError::InvalidRequest(_))
        ));
    }
}
