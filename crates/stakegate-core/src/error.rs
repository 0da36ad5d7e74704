use crate::types::{Balance, BlockDelay, BlockHeight, RawAmount};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StakeError {
    // ── Configuration errors (construction-time, fatal) ──────────────────────
    #[error("deposit delay must be non-negative, got {0}")]
    NegativeDepositDelay(BlockDelay),

    #[error("stake retraction delay must be non-negative, got {0}")]
    NegativeStakeRetractionDelay(BlockDelay),

    #[error("withdraw delay must be non-negative, got {0}")]
    NegativeWithdrawDelay(BlockDelay),

    #[error("stake retraction delay ({retraction} blocks) exceeds withdraw delay ({withdraw} blocks)")]
    StakeRetractionAfterWithdraw {
        retraction: BlockDelay,
        withdraw: BlockDelay,
    },

    // ── Operation errors (per call; ledger state unchanged on failure) ───────
    #[error("deposit amount must be greater than zero, got {0}")]
    ZeroOrNegativeDeposit(RawAmount),

    #[error("withdrawal amount must be greater than zero, got {0}")]
    ZeroOrNegativeWithdrawal(RawAmount),

    #[error("insufficient stake: requested {requested}, active {active}")]
    InsufficientStake { requested: Balance, active: Balance },

    #[error("retraction window closed at height {closed_at}, current height is {height}")]
    RetractionWindowClosed {
        closed_at: BlockHeight,
        height: BlockHeight,
    },

    #[error("no pending withdrawal at index {index} for participant {participant}")]
    WithdrawalNotFound { participant: String, index: usize },

    #[error("withdrawal queue full: {max} requests already pending")]
    WithdrawalQueueFull { max: usize },

    #[error("operation restricted to the designated address")]
    NotAuthorized,

    // ── Input errors ─────────────────────────────────────────────────────────
    #[error("invalid participant id: {0}")]
    InvalidParticipantId(String),

    // ── Serialization / storage ──────────────────────────────────────────────
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl StakeError {
    /// Canonical abort-code string, stable across releases. Surfaced in RPC
    /// error data so clients match on codes instead of message text.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NegativeDepositDelay(_) => "NEGATIVE_DEPOSIT_DELAY",
            Self::NegativeStakeRetractionDelay(_) => "NEGATIVE_STAKE_RETRACTION_DELAY",
            Self::NegativeWithdrawDelay(_) => "NEGATIVE_WITHDRAW_DELAY",
            Self::StakeRetractionAfterWithdraw { .. } => "STAKE_RETRACTION_AFTER_WITHDRAW",
            Self::ZeroOrNegativeDeposit(_) => "ZERO_OR_NEGATIVE_DEPOSIT",
            Self::ZeroOrNegativeWithdrawal(_) => "ZERO_OR_NEGATIVE_WITHDRAWAL",
            Self::InsufficientStake { .. } => "INSUFFICIENT_STAKE",
            Self::RetractionWindowClosed { .. } => "RETRACTION_WINDOW_CLOSED",
            Self::WithdrawalNotFound { .. } => "WITHDRAWAL_NOT_FOUND",
            Self::WithdrawalQueueFull { .. } => "WITHDRAWAL_QUEUE_FULL",
            Self::NotAuthorized => "NOT_AUTHORIZED",
            Self::InvalidParticipantId(_) => "INVALID_PARTICIPANT_ID",
            Self::Serialization(_) => "SERIALIZATION",
            Self::Storage(_) => "STORAGE",
        }
    }
}
