use alloy::{
    primitives::{B256, TxHash},
    providers::PendingTransactionError,
    transports::TransportError,
};
use thiserror::Error;

use crate::addresses::Contract;

/// Errors produced by the SDK.
#[derive(Debug, Error)]
pub enum AlkahestError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("address of {0} is not configured")]
    MissingAddress(Contract),

    #[error("attestation {0} not found")]
    AttestationNotFound(B256),

    #[error("transaction {0} did not produce an attestation")]
    NoAttestation(TxHash),

    #[error("transaction {0} reverted")]
    Reverted(TxHash),

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error(transparent)]
    Contract(#[from] alloy::contract::Error),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    PendingTransaction(#[from] PendingTransactionError),

    #[error(transparent)]
    Abi(#[from] alloy::sol_types::Error),

    #[error(transparent)]
    Units(#[from] alloy::primitives::utils::UnitsError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AlkahestError>;
