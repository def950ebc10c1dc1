pub mod args;
mod attestation;
mod barter;
mod demand;
mod escrow;
mod oracle;

use std::{str::FromStr, time::Duration};

use alkahest_sdk::{AlkahestClient, addresses::AddressConfig};
use alloy::{
    providers::{Provider, ProviderBuilder},
    rpc::client::RpcClient,
    signers::local::PrivateKeySigner,
    transports::layers::{RetryBackoffLayer, ThrottleLayer},
};
use anyhow::Context;
use args::Cli;
use tokio_util::sync::CancellationToken;

use crate::args::Commands;

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let rpc_client = if let Some(throttle) = cli.rpc_throttle {
        RpcClient::builder()
            .layer(ThrottleLayer::new(throttle))
            .layer(RetryBackoffLayer::new(10, 100, 200))
            .connect(&cli.rpc)
            .await
            .context("connecting to RPC")?
    } else {
        RpcClient::builder()
            .layer(RetryBackoffLayer::new(10, 100, 200))
            .connect(&cli.rpc)
            .await
            .context("connecting to RPC")?
    };
    rpc_client.set_poll_interval(Duration::from_millis(100));

    let addresses = match &cli.addresses {
        Some(path) => AddressConfig::load(path)
            .with_context(|| format!("loading addresses from {}", path.display()))?,
        None => AddressConfig::default(),
    };
    if addresses.configured().next().is_none() {
        tracing::warn!("no contract addresses configured, see `--addresses`");
    }

    let client = match &cli.private_key {
        Some(key) => {
            let signer = PrivateKeySigner::from_str(key).context("parsing private key")?;
            AlkahestClient::with_client(rpc_client, signer, addresses)
        },
        None => AlkahestClient::read_only(
            ProviderBuilder::new().connect_client(rpc_client).erased(),
            addresses,
        ),
    };
    tracing::debug!(rpc = %cli.rpc, signer = %client.signer(), "client ready");

    let cancellation_signal = CancellationToken::new();
    let cancellation_token = cancellation_signal.child_token();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "failed to install CTRL+C signal handler");
            return;
        }
        cancellation_signal.cancel();
    });

    match cli.command {
        Commands::Attestation { command } => attestation::run(&client, command).await,
        Commands::Demand { command } => demand::run(&client, command).await,
        Commands::Escrow { command } => escrow::run(&client, command, cancellation_token).await,
        Commands::Pay { payment } => escrow::pay(&client, payment).await,
        Commands::String { item, ref_uid } => escrow::string(&client, item, ref_uid).await,
        Commands::Barter { command } => barter::run(&client, command).await,
        Commands::Oracle { command } => oracle::run(&client, command, cancellation_token).await,
    }
}

/// Fails early for writes without a signer.
pub(crate) fn require_signer(client: &AlkahestClient) -> anyhow::Result<()> {
    if client.signer().is_zero() {
        anyhow::bail!("private key is required, see `--private-key`");
    }
    Ok(())
}

/// Unix timestamp the given number of seconds from now, 0 for none.
pub(crate) fn expiration(expires_in: Option<u64>) -> u64 {
    let now = u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default();
    expires_in.map(|secs| now.saturating_add(secs)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiration() {
        assert_eq!(expiration(None), 0);
        assert_eq!(expiration(Some(u64::MAX)), u64::MAX);
        assert!(expiration(Some(60)) > 60);
    }
}
