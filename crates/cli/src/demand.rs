use alkahest_sdk::{AlkahestClient, arbiters::Demand, barter::Ask, num};
use alloy::primitives::{Address, U256};
use anyhow::Context;
use colored::Colorize;

use crate::args::{AssetArgs, DemandArgs, DemandCommands};

pub(crate) async fn run(client: &AlkahestClient, command: DemandCommands) -> anyhow::Result<()> {
    match command {
        DemandCommands::Encode { demand } => {
            let demand = build(client, demand).await?;
            let (arbiter, data) = demand.encode(client.addresses())?;
            println!("{} {}", "Demand:".bold(), demand);
            println!("{} {}", "Arbiter:".bold(), arbiter);
            println!("{} {}", "Data:".bold(), data);
        },
        DemandCommands::Decode { arbiter, data } => {
            let demand = Demand::decode(client.addresses(), arbiter, &data)?;
            println!("{demand}");
        },
    }
    Ok(())
}

pub(crate) async fn build(client: &AlkahestClient, args: DemandArgs) -> anyhow::Result<Demand> {
    Ok(match args {
        DemandArgs::Trivial => Demand::Trivial,
        DemandArgs::Intrinsics => Demand::Intrinsics,
        DemandArgs::Oracle { oracle, data } => Demand::TrustedOracle { oracle, data },
        DemandArgs::Attestation { uid } => Demand::SpecificAttestation { uid },
        DemandArgs::Payment { payment } => {
            let (ask, payee) = ask(client, payment).await?;
            let signer = (!client.signer().is_zero()).then(|| client.signer());
            let payee = payee.or(signer).ok_or_else(|| {
                anyhow::anyhow!("payee is required without a signer, see `--payee`")
            })?;
            ask.demand(payee)
        },
    })
}

/// Converts the asset arguments into base units, along with the payee.
pub(crate) async fn ask(
    client: &AlkahestClient,
    args: AssetArgs,
) -> anyhow::Result<(Ask, Option<Address>)> {
    Ok(match args {
        AssetArgs::Erc20 { token, amount, payee } => {
            let amount = erc20_amount(client, token, &amount).await?;
            (Ask::Erc20 { token, amount }, payee.payee)
        },
        AssetArgs::Erc721 { token, token_id, payee } => {
            (Ask::Erc721 { token, token_id }, payee.payee)
        },
        AssetArgs::Erc1155 { token, token_id, amount, payee } => {
            (Ask::Erc1155 { token, token_id, amount }, payee.payee)
        },
        AssetArgs::Native { amount, payee } => {
            let amount = num::Converter::native()
                .to_unsigned(&amount)
                .context("parsing native token amount")?;
            (Ask::NativeToken { amount }, payee.payee)
        },
    })
}

pub(crate) async fn erc20_amount(
    client: &AlkahestClient,
    token: Address,
    amount: &str,
) -> anyhow::Result<U256> {
    let converter = client
        .erc20()
        .converter(token)
        .await
        .with_context(|| format!("fetching decimals of {token}"))?;
    converter
        .to_unsigned(amount)
        .with_context(|| format!("parsing amount {amount}"))
}

#[cfg(test)]
mod tests {
    use alkahest_sdk::testing::{self, fixtures};

    use super::*;
    use crate::args::PayeeArgs;

    fn payment(payee: Option<Address>) -> DemandArgs {
        DemandArgs::Payment {
            payment: AssetArgs::Erc721 {
                token: Address::with_last_byte(0x20),
                token_id: U256::from(1),
                payee: PayeeArgs { payee },
            },
        }
    }

    #[tokio::test]
    async fn test_payment_requires_payee_without_signer() {
        let (client, _asserter) = testing::mocked_client(fixtures::addresses());
        assert!(build(&client, payment(None)).await.is_err());

        let payee = Address::with_last_byte(0xb0);
        let Demand::Erc721Payment(data) = build(&client, payment(Some(payee))).await.unwrap()
        else {
            panic!("not an ERC-721 payment");
        };
        assert_eq!(data.payee, payee);
    }
}
