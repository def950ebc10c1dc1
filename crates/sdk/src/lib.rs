//! Alkahest SDK.
//!
//! # Overview
//!
//! Typed client for the Alkahest escrow protocol: obligations are EAS
//! attestations made by obligation contracts, escrows are collected with
//! fulfillments approved by arbiter contracts.
//!
//! Start with [`AlkahestClient::connect`] and [`addresses::AddressConfig`]
//! describing the deployment on the target chain, then use per-concern APIs:
//! [`AlkahestClient::erc20`] and friends to create escrows and payments,
//! [`arbiters::Demand`] to compose what an escrow demands,
//! [`AlkahestClient::oracle`] to request and make oracle arbitrations.
//!
//! All contract logic stays on-chain: the SDK only encodes calls, decodes
//! attestations and follows events.
//!
//! See `./tests` for examples.
//!
//! # Limitations/follow-ups
//!
//! * Events are followed with log polling, see [`stream::raw`].
//!
//! * ERC-20 permits and token bundles are not supported.
//!
//! # Features
//!
//! | Feature | Default | Description |
//! | --- | --- | --- |
//! | `display` | yes | Enables [`tabled::Tabled`] implementation for escrows and decisions. |
//! | `testing` | yes | Enables [`testing`] module. |
//!
//! # Testing
//!
//! [`testing`] module provides fixtures and a client over mocked transport,
//! so that RPC-facing code can be tested without a node.

pub mod abi;
pub mod addresses;
pub mod arbiters;
pub mod attestation;
pub mod barter;
mod client;
pub mod error;
pub mod num;
pub mod obligations;
pub mod oracle;
pub mod stream;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod types;

pub use client::AlkahestClient;
