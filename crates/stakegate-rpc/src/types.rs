use serde::{Deserialize, Serialize};
use stakegate_core::{BlockHeight, ParticipantId};
use stakegate_ledger::{Account, PendingDeposit, PendingWithdrawal, StakeLedger};

/// JSON-serializable account summary returned by `stakegate_getAccount`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcAccount {
    pub participant: String,
    /// Stake backing withdrawal requests (u128 as string).
    pub active_stake: String,
    /// Stake counting toward election eligibility at the current height
    /// (u128 as string).
    pub matured_stake: String,
    /// Sum across pending withdrawals (u128 as string).
    pub pending_withdrawal_total: String,
    pub pending_deposits: Vec<RpcDeposit>,
    pub pending_withdrawals: Vec<RpcWithdrawal>,
}

impl RpcAccount {
    pub fn from_account(
        participant: &ParticipantId,
        account: &Account,
        height: BlockHeight,
    ) -> Self {
        Self {
            participant: participant.to_b58(),
            active_stake: account.active_stake.to_string(),
            matured_stake: account.matured_stake(height).to_string(),
            pending_withdrawal_total: account.pending_withdrawal_total().to_string(),
            pending_deposits: account
                .pending_deposits
                .iter()
                .map(RpcDeposit::from_record)
                .collect(),
            pending_withdrawals: account
                .withdrawal_queue
                .iter()
                .map(RpcWithdrawal::from_record)
                .collect(),
        }
    }
}

/// JSON-serializable deposit still aging toward maturity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcDeposit {
    pub amount: String,
    pub deposited_at: u64,
    pub matures_at: u64,
}

impl RpcDeposit {
    pub fn from_record(d: &PendingDeposit) -> Self {
        Self {
            amount: d.amount.to_string(),
            deposited_at: d.deposited_at,
            matures_at: d.matures_at,
        }
    }
}

/// JSON-serializable pending withdrawal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcWithdrawal {
    pub amount: String,
    pub requested_at: u64,
    /// Last height (inclusive) at which the request may be retracted.
    pub retraction_until: u64,
    /// First height at which the request becomes payable.
    pub payable_at: u64,
}

impl RpcWithdrawal {
    pub fn from_record(w: &PendingWithdrawal) -> Self {
        Self {
            amount: w.amount.to_string(),
            requested_at: w.requested_at,
            retraction_until: w.retraction_until,
            payable_at: w.payable_at,
        }
    }
}

/// Ledger configuration and aggregates returned by `stakegate_getLedgerInfo`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcLedgerInfo {
    pub protocol: String,
    pub deposit_delay: u64,
    pub stake_retraction_delay: u64,
    pub withdraw_delay: u64,
    pub restricted_address: Option<String>,
    pub genesis_height: u64,
    pub current_height: u64,
    pub account_count: u64,
    pub total_active_stake: String,
    pub total_pending_withdrawal: String,
}

impl RpcLedgerInfo {
    pub fn from_ledger(ledger: &StakeLedger) -> Self {
        let delays = ledger.delays();
        Self {
            protocol: "StakeGate".into(),
            deposit_delay: delays.deposit_delay,
            stake_retraction_delay: delays.stake_retraction_delay,
            withdraw_delay: delays.withdraw_delay,
            restricted_address: ledger.restricted_address().map(|a| a.to_b58()),
            genesis_height: ledger.genesis_height(),
            current_height: ledger.current_height(),
            account_count: ledger.account_count() as u64,
            total_active_stake: ledger.total_active_stake().to_string(),
            total_pending_withdrawal: ledger.total_pending_withdrawal().to_string(),
        }
    }
}
