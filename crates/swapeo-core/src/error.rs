//! DEX error taxonomy. Every error aborts the whole call; the host rolls
//! back state, so nothing here carries partial-application information.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DexError {
    #[error("invalid tokens: zero address or identical pair")]
    InvalidTokens,

    #[error("amount must be greater than zero")]
    ZeroAmount,

    #[error("pair not found")]
    PairNotFound,

    #[error("pair not found or has no liquidity")]
    PairNotFoundOrEmpty,

    #[error("insufficient LP balance: have {have}, need {need}")]
    InsufficientBalance { have: u128, need: u128 },

    #[error("swap output {amount_out} violates the safety bound for reserve {reserve_out}")]
    InvalidOutput { amount_out: u128, reserve_out: u128 },

    #[error("no fees collected")]
    NoFees,

    #[error("caller is not the owner")]
    Unauthorized,

    #[error("router call failed: {0}")]
    RouterCallFailed(String),

    #[error("token transfer failed: {0}")]
    TransferFailed(String),

    #[error("slippage exceeded: output {amount_out} < minimum {min_amount_out}")]
    SlippageExceeded { amount_out: u128, min_amount_out: u128 },

    #[error("reentrant call rejected")]
    Reentrancy,

    #[error("arithmetic overflow")]
    Overflow,

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl DexError {
    /// Stable reason code surfaced to callers and indexers.
    pub fn code(&self) -> &'static str {
        match self {
            DexError::InvalidTokens => "InvalidTokens",
            DexError::ZeroAmount => "ZeroAmount",
            DexError::PairNotFound => "PairNotFound",
            DexError::PairNotFoundOrEmpty => "PairNotFoundOrEmpty",
            DexError::InsufficientBalance { .. } => "InsufficientBalance",
            DexError::InvalidOutput { .. } => "InvalidOutput",
            DexError::NoFees => "NoFees",
            DexError::Unauthorized => "Unauthorized",
            DexError::RouterCallFailed(_) => "RouterCallFailed",
            DexError::TransferFailed(_) => "TransferFailed",
            DexError::SlippageExceeded { .. } => "SlippageExceeded",
            DexError::Reentrancy => "Reentrancy",
            DexError::Overflow => "Overflow",
            DexError::InvalidConfig(_) => "InvalidConfig",
        }
    }
}

pub type DexResult<T> = Result<T, DexError>;
