use serde::{Deserialize, Serialize};
use stakegate_core::{Balance, BlockHeight};
use std::collections::VecDeque;

// ── PendingDeposit ───────────────────────────────────────────────────────────

/// A deposit whose contribution to matured stake is still aging.
///
/// The amount belongs to `active_stake` from the moment of deposit; this
/// record only tracks when it starts counting toward election-eligible
/// (matured) stake. Records age out lazily once
/// `current_height >= matures_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingDeposit {
    pub amount: Balance,
    pub deposited_at: BlockHeight,
    pub matures_at: BlockHeight,
}

// ── PendingWithdrawal ────────────────────────────────────────────────────────

/// A withdrawal request waiting out its delay.
///
/// Lifecycle: requested, then either retracted (while
/// `height <= retraction_until`) or payable (once `height >= payable_at`),
/// then settled. Payable is never stored; it is derived from `payable_at`
/// each time the queue is scanned, and settlement removes the record, so
/// each record settles exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingWithdrawal {
    pub amount: Balance,
    pub requested_at: BlockHeight,
    /// Last height (inclusive) at which this request may still be retracted.
    pub retraction_until: BlockHeight,
    /// First height at which this request becomes payable.
    pub payable_at: BlockHeight,
}

impl PendingWithdrawal {
    pub fn is_payable(&self, height: BlockHeight) -> bool {
        height >= self.payable_at
    }

    pub fn is_retractable(&self, height: BlockHeight) -> bool {
        height <= self.retraction_until
    }
}

// ── Account ──────────────────────────────────────────────────────────────────

/// Per-participant stake record.
///
/// Created on first deposit and never destroyed; a drained account keeps an
/// empty record. Both queues are oldest first, which holds because the
/// delay schedule is fixed for the ledger's lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Stake eligible to back withdrawal requests. Credited immediately on
    /// deposit, debited when a withdrawal is requested.
    pub active_stake: Balance,

    /// Deposits still aging toward maturity, oldest first.
    #[serde(default)]
    pub pending_deposits: VecDeque<PendingDeposit>,

    /// Withdrawal requests waiting out their delays, oldest first.
    #[serde(default)]
    pub withdrawal_queue: VecDeque<PendingWithdrawal>,
}

impl Account {
    /// Stake counting toward election eligibility: active stake minus
    /// deposits that have not yet aged past the deposit delay.
    pub fn matured_stake(&self, height: BlockHeight) -> Balance {
        let immature = self
            .pending_deposits
            .iter()
            .filter(|d| height < d.matures_at)
            .map(|d| d.amount)
            .fold(0u128, |acc, a| acc.saturating_add(a));
        self.active_stake.saturating_sub(immature)
    }

    /// Drop deposit records that have aged past maturity. Observable state
    /// (`active_stake`, `matured_stake`) is unaffected; only the bucket
    /// shrinks.
    pub fn sweep_matured_deposits(&mut self, height: BlockHeight) {
        while let Some(head) = self.pending_deposits.front() {
            if height < head.matures_at {
                break;
            }
            self.pending_deposits.pop_front();
        }
    }

    /// Total amount across pending withdrawal requests.
    pub fn pending_withdrawal_total(&self) -> Balance {
        self.withdrawal_queue
            .iter()
            .map(|w| w.amount)
            .fold(0u128, |acc, a| acc.saturating_add(a))
    }
}
