use alkahest_sdk::{
    AlkahestClient,
    abi::Attestation,
    obligations::Obligation,
    oracle::ListenOptions,
};
use colored::Colorize;
use tabled::{Table, settings::Style};
use tokio_util::sync::CancellationToken;

use crate::{args::OracleCommands, escrow::print_outcome, require_signer};

pub(crate) async fn run(
    client: &AlkahestClient,
    command: OracleCommands,
    cancellation_token: CancellationToken,
) -> anyhow::Result<()> {
    let oracle = client.oracle();
    match command {
        OracleCommands::Request { obligation, oracle: oracle_address } => {
            require_signer(client)?;
            let outcome = oracle.request_arbitration(obligation, oracle_address).await?;
            print_outcome("Arbitration requested", &outcome);
        },
        OracleCommands::Arbitrate { obligation, reject } => {
            require_signer(client)?;
            let outcome = oracle.arbitrate(obligation, !reject).await?;
            print_outcome(if reject { "Rejected" } else { "Approved" }, &outcome);
        },
        OracleCommands::Wait { obligation, oracle: oracle_address, from_block } => {
            let from_block = match from_block {
                Some(block) => block,
                None => client.block_number().await?,
            };
            let wait = oracle.wait_for_arbitration(
                obligation,
                oracle_address,
                from_block,
                tokio::time::sleep,
            );
            tokio::select! {
                arbitration = wait => {
                    let arbitration = arbitration?;
                    let decision = arbitration.event().decision;
                    println!(
                        "{} in tx {}",
                        if decision { "Approved".green() } else { "Rejected".red() },
                        arbitration.tx_hash()
                    );
                },
                _ = cancellation_token.cancelled() => {},
            }
        },
        OracleCommands::Listen { from_block, skip_arbitrated, contains } => {
            require_signer(client)?;
            let contains = contains.as_deref();
            let decide = move |attestation: Attestation| async move {
                decide_obligation(client, contains, &attestation).await
            };
            let decisions = oracle
                .listen_and_arbitrate(
                    ListenOptions { from_block, skip_arbitrated },
                    decide,
                    tokio::time::sleep,
                    &cancellation_token,
                )
                .await?;

            println!("\n{}", format!("{} decision(s) made", decisions.len()).bold().purple());
            if !decisions.is_empty() {
                let mut table = Table::new(decisions);
                table.with(Style::sharp());
                println!("{table}");
            }
        },
    }
    Ok(())
}

/// Approves valid obligations, only string ones containing the text if any.
async fn decide_obligation(
    client: &AlkahestClient,
    contains: Option<&str>,
    attestation: &Attestation,
) -> Option<bool> {
    let matches = match (contains, Obligation::decode(client.addresses(), attestation)) {
        (None, _) => true,
        (Some(text), Ok(Obligation::String(data))) => data.item.contains(text),
        (Some(_), Ok(other)) => {
            tracing::info!(uid = %attestation.uid, obligation = %other, "not a string obligation");
            false
        },
        (Some(_), Err(err)) => {
            tracing::warn!(uid = %attestation.uid, %err, "undecodable obligation");
            return None;
        },
    };
    if !matches {
        return Some(false);
    }
    match client.is_attestation_valid(attestation.uid).await {
        Ok(valid) => Some(valid),
        Err(err) => {
            tracing::warn!(uid = %attestation.uid, %err, "failed to check validity");
            None
        },
    }
}
