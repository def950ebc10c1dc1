use alkahest_sdk::{AlkahestClient, barter::Bid, num};
use anyhow::Context;
use colored::Colorize;

use crate::{
    args::{AssetArgs, BarterCommands},
    demand, expiration,
    escrow::print_outcome,
    require_signer,
};

pub(crate) async fn run(client: &AlkahestClient, command: BarterCommands) -> anyhow::Result<()> {
    require_signer(client)?;
    match command {
        BarterCommands::Buy { token, amount, expires_in, ask } => {
            let amount = demand::erc20_amount(client, token, &amount).await?;
            buy(client, Bid::Erc20 { token, amount }, ask, expires_in).await?;
        },
        BarterCommands::BuyErc721 { token, token_id, expires_in, ask } => {
            buy(client, Bid::Erc721 { token, token_id }, ask, expires_in).await?;
        },
        BarterCommands::BuyErc1155 { token, token_id, amount, expires_in, ask } => {
            buy(client, Bid::Erc1155 { token, token_id, amount }, ask, expires_in).await?;
        },
        BarterCommands::BuyNative { amount, expires_in, ask } => {
            let amount = num::Converter::native()
                .to_unsigned(&amount)
                .context("parsing native token amount")?;
            buy(client, Bid::NativeToken { amount }, ask, expires_in).await?;
        },
        BarterCommands::Fulfill { escrow } => {
            let fulfillment = client.fulfill_with_payment(escrow).await?;
            print_outcome("Payment made", &fulfillment.payment);
            print_outcome("Escrow collected", &fulfillment.collection);
            println!("{}", "Buy order fulfilled".bold());
        },
    }
    Ok(())
}

async fn buy(
    client: &AlkahestClient,
    bid: Bid,
    ask: AssetArgs,
    expires_in: Option<u64>,
) -> anyhow::Result<()> {
    let (ask, payee) = demand::ask(client, ask).await?;
    if payee.is_some_and(|payee| payee != client.signer()) {
        anyhow::bail!("buy orders are paid to the signer, `--payee` is not supported");
    }
    let outcome = client.buy(&bid, &ask, expiration(expires_in)).await?;
    print_outcome("Buy order created", &outcome);
    Ok(())
}
