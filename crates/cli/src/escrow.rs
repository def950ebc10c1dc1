use alkahest_sdk::{
    AlkahestClient,
    abi::{
        AttestationEscrowObligation, AttestationEscrowObligation2, AttestationRequest,
        AttestationRequestData, ERC20EscrowObligation,
    },
    types::{TxOutcome, Uid},
};
use colored::Colorize;
use tabled::{Table, settings::Style};
use tokio_util::sync::CancellationToken;

use crate::{
    args::{AssetArgs, EscrowCommands},
    demand, expiration, require_signer,
};

pub(crate) async fn run(
    client: &AlkahestClient,
    command: EscrowCommands,
    cancellation_token: CancellationToken,
) -> anyhow::Result<()> {
    match command {
        EscrowCommands::Create { token, amount, expires_in, demand } => {
            require_signer(client)?;
            let amount = demand::erc20_amount(client, token, &amount).await?;
            let (arbiter, demand) = demand::build(client, demand)
                .await?
                .encode(client.addresses())?;
            let outcome = client
                .erc20()
                .approve_and_create_escrow(
                    ERC20EscrowObligation::ObligationData { arbiter, demand, token, amount },
                    expiration(expires_in),
                )
                .await?;
            print_outcome("Escrow created", &outcome);
        },
        EscrowCommands::Attestation {
            schema,
            recipient,
            data,
            irrevocable,
            expires_in,
            demand,
        } => {
            require_signer(client)?;
            let (arbiter, demand) = demand::build(client, demand)
                .await?
                .encode(client.addresses())?;
            let attestation = AttestationRequest {
                schema,
                data: AttestationRequestData {
                    recipient,
                    revocable: !irrevocable,
                    data,
                    ..Default::default()
                },
            };
            let outcome = client
                .attestation_escrow()
                .create_escrow(
                    AttestationEscrowObligation::ObligationData { arbiter, demand, attestation },
                    expiration(expires_in),
                )
                .await?;
            print_outcome("Escrow created", &outcome);
        },
        EscrowCommands::AttestationRef { attestation, expires_in, demand } => {
            require_signer(client)?;
            let (arbiter, demand) = demand::build(client, demand)
                .await?
                .encode(client.addresses())?;
            let outcome = client
                .attestation_escrow()
                .create_escrow2(
                    AttestationEscrowObligation2::ObligationData {
                        arbiter,
                        demand,
                        attestationUid: attestation,
                    },
                    expiration(expires_in),
                )
                .await?;
            print_outcome("Escrow created", &outcome);
        },
        EscrowCommands::Show { uid } => {
            let view = client.get_escrow_and_demand(uid).await?;
            let mut table = Table::new([view]);
            table.with(Style::sharp());
            println!("{table}");
        },
        EscrowCommands::Collect { escrow, fulfillment } => {
            require_signer(client)?;
            let outcome = client.collect_escrow(escrow, fulfillment).await?;
            print_outcome("Escrow collected", &outcome);
        },
        EscrowCommands::Reclaim { escrow } => {
            require_signer(client)?;
            let outcome = client.reclaim_expired(escrow).await?;
            print_outcome("Escrow reclaimed", &outcome);
        },
        EscrowCommands::Wait { escrow, from_block } => {
            let from_block = match from_block {
                Some(block) => block,
                None => client.block_number().await?,
            };
            let wait = client.wait_for_fulfillment(escrow, from_block, tokio::time::sleep);
            tokio::select! {
                collection = wait => {
                    let collection = collection?;
                    println!(
                        "{} {} by {} in {}",
                        "Collected with".green(),
                        collection.fulfillment,
                        collection.fulfiller,
                        collection.tx_hash
                    );
                },
                _ = cancellation_token.cancelled() => {},
            }
        },
    }
    Ok(())
}

pub(crate) async fn pay(client: &AlkahestClient, payment: AssetArgs) -> anyhow::Result<()> {
    require_signer(client)?;
    let (ask, payee) = demand::ask(client, payment).await?;
    let payee = payee.ok_or_else(|| anyhow::anyhow!("payee is required, see `--payee`"))?;
    let outcome = client.pay_demand(ask.demand(payee)).await?;
    print_outcome("Payment made", &outcome);
    Ok(())
}

pub(crate) async fn string(
    client: &AlkahestClient,
    item: String,
    ref_uid: Option<Uid>,
) -> anyhow::Result<()> {
    require_signer(client)?;
    let outcome = client.string_obligation().do_obligation(item, ref_uid).await?;
    print_outcome("Statement made", &outcome);
    Ok(())
}

pub(crate) fn print_outcome(what: &str, outcome: &TxOutcome) {
    match outcome.uid {
        Some(uid) => println!("{}: {} (tx {})", what.green(), uid, outcome.tx_hash),
        None => println!("{} in tx {}", what.green(), outcome.tx_hash),
    }
}
