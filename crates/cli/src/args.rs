use std::path::PathBuf;

use alloy::primitives::{Address, B256, Bytes, U256};
use clap::{Args, Parser, Subcommand};

pub(crate) const DEFAULT_RPC_PROVIDER: &str = "http://localhost:8545";

#[derive(Parser, Debug)]
#[command(name = "alkahest-cli", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// RPC endpoint to connect to
    #[arg(
        long,
        global = true,
        env = "ALKAHEST_RPC",
        default_value_t = DEFAULT_RPC_PROVIDER.to_string()
    )]
    pub rpc: String,

    /// RPC throttling (req/sec) [default: none]
    #[arg(long, global = true)]
    pub rpc_throttle: Option<u32>,

    /// Private key to sign transactions with [default: none, read-only]
    #[arg(long, global = true, env = "ALKAHEST_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,

    /// JSON file with addresses of the protocol contracts
    #[arg(long, global = true, env = "ALKAHEST_ADDRESSES")]
    pub addresses: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect attestations
    Attestation {
        #[command(subcommand)]
        command: AttestationCommands,
    },
    /// Encode or decode arbiter demands
    Demand {
        #[command(subcommand)]
        command: DemandCommands,
    },
    /// Create, inspect and settle escrows
    Escrow {
        #[command(subcommand)]
        command: EscrowCommands,
    },
    /// Make a payment obligation
    Pay {
        #[command(subcommand)]
        payment: AssetArgs,
    },
    /// Make a string obligation
    String {
        /// Statement to make
        item: String,

        /// Attestation the statement refers to, usually the escrow it fulfills
        #[arg(long)]
        ref_uid: Option<B256>,
    },
    /// Exchange assets through escrow and payment obligations
    Barter {
        #[command(subcommand)]
        command: BarterCommands,
    },
    /// Request and make arbitrations of the trusted oracle arbiter
    Oracle {
        #[command(subcommand)]
        command: OracleCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum AttestationCommands {
    /// Show attestation with decoded obligation data
    Show { uid: B256 },
}

#[derive(Subcommand, Debug)]
pub enum DemandCommands {
    /// Print arbiter address and encoded demand
    Encode {
        #[command(subcommand)]
        demand: DemandArgs,
    },
    /// Decode demand of the arbiter
    Decode {
        arbiter: Address,
        data: Bytes,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum DemandArgs {
    /// Accept any fulfillment
    Trivial,
    /// Require valid fulfillment attestation
    Intrinsics,
    /// Require approval of the oracle
    Oracle {
        oracle: Address,

        /// Data passed to the oracle
        #[arg(long, default_value_t = Bytes::new())]
        data: Bytes,
    },
    /// Require the particular attestation
    Attestation { uid: B256 },
    /// Require a payment
    Payment {
        #[command(subcommand)]
        payment: AssetArgs,
    },
}

/// Asset transfer; amounts are in token units (e.g. `1.5`), not base units.
#[derive(Subcommand, Debug, Clone)]
pub enum AssetArgs {
    Erc20 {
        token: Address,
        amount: String,
        #[command(flatten)]
        payee: PayeeArgs,
    },
    Erc721 {
        token: Address,
        token_id: U256,
        #[command(flatten)]
        payee: PayeeArgs,
    },
    Erc1155 {
        token: Address,
        token_id: U256,
        amount: U256,
        #[command(flatten)]
        payee: PayeeArgs,
    },
    Native {
        amount: String,
        #[command(flatten)]
        payee: PayeeArgs,
    },
}

#[derive(Args, Debug, Clone)]
pub struct PayeeArgs {
    /// Recipient of the payment [default: signer]
    #[arg(long)]
    pub payee: Option<Address>,
}

#[derive(Subcommand, Debug)]
pub enum EscrowCommands {
    /// Escrow ERC-20 tokens until the demand is fulfilled
    Create {
        token: Address,
        amount: String,

        /// Seconds the escrow can be reclaimed after [default: never]
        #[arg(long)]
        expires_in: Option<u64>,

        #[command(subcommand)]
        demand: DemandArgs,
    },
    /// Escrow an attestation to be made by EAS once the demand is fulfilled
    Attestation {
        /// Schema of the attestation
        schema: B256,

        /// Recipient of the attestation
        recipient: Address,

        /// Attestation data
        #[arg(long, default_value_t = Bytes::new())]
        data: Bytes,

        /// Make the attestation irrevocable
        #[arg(long, default_value_t = false)]
        irrevocable: bool,

        /// Seconds the escrow can be reclaimed after [default: never]
        #[arg(long)]
        expires_in: Option<u64>,

        #[command(subcommand)]
        demand: DemandArgs,
    },
    /// Escrow an existing attestation, validated once the demand is fulfilled
    AttestationRef {
        attestation: B256,

        /// Seconds the escrow can be reclaimed after [default: never]
        #[arg(long)]
        expires_in: Option<u64>,

        #[command(subcommand)]
        demand: DemandArgs,
    },
    /// Show escrow with its demand
    Show { uid: B256 },
    /// Collect escrow with the fulfillment
    Collect { escrow: B256, fulfillment: B256 },
    /// Reclaim expired escrow
    Reclaim { escrow: B256 },
    /// Wait for escrow to be collected
    Wait {
        escrow: B256,

        /// Block to look for collection from [default: latest block]
        #[arg(long)]
        from_block: Option<u64>,
    },
}

#[derive(Subcommand, Debug)]
pub enum BarterCommands {
    /// Escrow ERC-20 tokens in exchange for the asset paid to the signer
    Buy {
        token: Address,
        amount: String,

        /// Seconds the order can be reclaimed after [default: never]
        #[arg(long)]
        expires_in: Option<u64>,

        #[command(subcommand)]
        ask: AssetArgs,
    },
    /// Escrow an ERC-721 token in exchange for the asset paid to the signer
    BuyErc721 {
        token: Address,
        token_id: U256,

        /// Seconds the order can be reclaimed after [default: never]
        #[arg(long)]
        expires_in: Option<u64>,

        #[command(subcommand)]
        ask: AssetArgs,
    },
    /// Escrow ERC-1155 tokens in exchange for the asset paid to the signer
    BuyErc1155 {
        token: Address,
        token_id: U256,
        amount: U256,

        /// Seconds the order can be reclaimed after [default: never]
        #[arg(long)]
        expires_in: Option<u64>,

        #[command(subcommand)]
        ask: AssetArgs,
    },
    /// Escrow native tokens in exchange for the asset paid to the signer
    BuyNative {
        amount: String,

        /// Seconds the order can be reclaimed after [default: never]
        #[arg(long)]
        expires_in: Option<u64>,

        #[command(subcommand)]
        ask: AssetArgs,
    },
    /// Pay what the escrow asks and collect it
    Fulfill { escrow: B256 },
}

#[derive(Subcommand, Debug)]
pub enum OracleCommands {
    /// Ask the oracle to arbitrate the obligation
    Request { obligation: B256, oracle: Address },
    /// Approve or reject the obligation as the oracle
    Arbitrate {
        obligation: B256,

        /// Reject the obligation instead of approving it
        #[arg(long, default_value_t = false)]
        reject: bool,
    },
    /// Wait for the oracle to arbitrate the obligation
    Wait {
        obligation: B256,
        oracle: Address,

        /// Block to look for arbitration from [default: latest block]
        #[arg(long)]
        from_block: Option<u64>,
    },
    /// Arbitrate requests addressed to the signer until terminated (Ctrl+C)
    Listen {
        /// Block to arbitrate past requests from [default: only new requests]
        #[arg(long)]
        from_block: Option<u64>,

        /// Skip obligations already arbitrated
        #[arg(long, default_value_t = false)]
        skip_arbitrated: bool,

        /// Approve only string obligations containing the text
        /// [default: approve everything]
        #[arg(long)]
        contains: Option<String>,
    },
}
