use crate::account::{Account, PendingDeposit, PendingWithdrawal};
use crate::clock::BlockClock;
use stakegate_core::constants::MAX_WITHDRAWAL_QUEUE_LEN;
use stakegate_core::{
    Balance, BlockHeight, DelaySchedule, ElectionConfig, ParticipantId, RawAmount, StakeError,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

// ── StakeLedger ──────────────────────────────────────────────────────────────

/// The delay-gated staking state machine.
///
/// One instance exclusively owns every account record. Each mutating
/// operation reads the injected clock exactly once at entry and validates
/// fully before touching state, so a failed call leaves the ledger exactly
/// as it was. Callers serialize operations (the RPC layer holds a write
/// lock); the ledger itself performs no locking.
pub struct StakeLedger {
    delays: DelaySchedule,
    restricted_address: Option<ParticipantId>,
    genesis_height: BlockHeight,
    accounts: HashMap<ParticipantId, Account>,
    clock: Arc<dyn BlockClock>,
}

impl StakeLedger {
    /// Validate `config` and construct an empty ledger. The clock's height
    /// at this moment becomes the genesis reference.
    pub fn new(config: &ElectionConfig, clock: Arc<dyn BlockClock>) -> Result<Self, StakeError> {
        let delays = config.validate()?;
        let genesis_height = clock.current_height();
        info!(
            deposit_delay = delays.deposit_delay,
            stake_retraction_delay = delays.stake_retraction_delay,
            withdraw_delay = delays.withdraw_delay,
            genesis_height,
            "stake ledger constructed"
        );
        Ok(Self {
            delays,
            restricted_address: config.restricted_address.clone(),
            genesis_height,
            accounts: HashMap::new(),
            clock,
        })
    }

    /// Rebuild a ledger from persisted parts. The config was validated when
    /// the ledger was first constructed; it is validated again so a
    /// tampered store cannot resurrect an invalid schedule.
    pub fn from_parts(
        config: &ElectionConfig,
        genesis_height: BlockHeight,
        accounts: HashMap<ParticipantId, Account>,
        clock: Arc<dyn BlockClock>,
    ) -> Result<Self, StakeError> {
        let delays = config.validate()?;
        Ok(Self {
            delays,
            restricted_address: config.restricted_address.clone(),
            genesis_height,
            accounts,
            clock,
        })
    }

    // ── Observers ────────────────────────────────────────────────────────────

    /// Current chain height as seen by the injected clock.
    pub fn current_height(&self) -> BlockHeight {
        self.clock.current_height()
    }

    /// Height at which this ledger was constructed.
    pub fn genesis_height(&self) -> BlockHeight {
        self.genesis_height
    }

    pub fn delays(&self) -> DelaySchedule {
        self.delays
    }

    pub fn restricted_address(&self) -> Option<&ParticipantId> {
        self.restricted_address.as_ref()
    }

    /// Whether `caller` may perform privileged operations. Open to anyone
    /// when no restricted address is configured.
    pub fn is_privileged(&self, caller: &ParticipantId) -> bool {
        match &self.restricted_address {
            Some(addr) => addr == caller,
            None => true,
        }
    }

    pub fn account(&self, participant: &ParticipantId) -> Option<&Account> {
        self.accounts.get(participant)
    }

    pub fn active_stake(&self, participant: &ParticipantId) -> Balance {
        self.accounts
            .get(participant)
            .map(|a| a.active_stake)
            .unwrap_or(0)
    }

    /// Stake counting toward election eligibility at the current height.
    pub fn matured_stake(&self, participant: &ParticipantId) -> Balance {
        let height = self.clock.current_height();
        self.accounts
            .get(participant)
            .map(|a| a.matured_stake(height))
            .unwrap_or(0)
    }

    pub fn pending_withdrawals(&self, participant: &ParticipantId) -> Vec<PendingWithdrawal> {
        self.accounts
            .get(participant)
            .map(|a| a.withdrawal_queue.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn pending_deposits(&self, participant: &ParticipantId) -> Vec<PendingDeposit> {
        self.accounts
            .get(participant)
            .map(|a| a.pending_deposits.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    pub fn total_active_stake(&self) -> Balance {
        self.accounts
            .values()
            .fold(0u128, |acc, a| acc.saturating_add(a.active_stake))
    }

    pub fn total_pending_withdrawal(&self) -> Balance {
        self.accounts
            .values()
            .fold(0u128, |acc, a| acc.saturating_add(a.pending_withdrawal_total()))
    }

    // ── Mutations ────────────────────────────────────────────────────────────

    /// Deposit stake for `participant`. The amount backs withdrawal
    /// requests immediately and counts toward matured stake once the
    /// deposit delay has elapsed. Returns the new active stake.
    pub fn deposit_stake(
        &mut self,
        participant: &ParticipantId,
        amount: RawAmount,
    ) -> Result<Balance, StakeError> {
        let now = self.clock.current_height();
        if amount <= 0 {
            return Err(StakeError::ZeroOrNegativeDeposit(amount));
        }
        let amount = amount as Balance;

        let account = self.accounts.entry(participant.clone()).or_default();
        account.sweep_matured_deposits(now);
        account.active_stake = account.active_stake.saturating_add(amount);
        account.pending_deposits.push_back(PendingDeposit {
            amount,
            deposited_at: now,
            matures_at: now.saturating_add(self.delays.deposit_delay),
        });
        info!(%participant, amount, height = now, active = account.active_stake, "stake deposited");
        Ok(account.active_stake)
    }

    /// Move `amount` from active stake into the withdrawal queue. The
    /// request may be retracted through `retraction_until` and becomes
    /// payable at `payable_at`. Returns the queued record.
    pub fn request_withdraw(
        &mut self,
        participant: &ParticipantId,
        amount: RawAmount,
    ) -> Result<PendingWithdrawal, StakeError> {
        let now = self.clock.current_height();
        if amount <= 0 {
            return Err(StakeError::ZeroOrNegativeWithdrawal(amount));
        }
        let amount = amount as Balance;

        let active = self.active_stake(participant);
        if amount > active {
            return Err(StakeError::InsufficientStake {
                requested: amount,
                active,
            });
        }
        // amount > 0 and amount <= active, so the account exists.
        let account = self
            .accounts
            .get_mut(participant)
            .ok_or(StakeError::InsufficientStake {
                requested: amount,
                active: 0,
            })?;
        if account.withdrawal_queue.len() >= MAX_WITHDRAWAL_QUEUE_LEN {
            return Err(StakeError::WithdrawalQueueFull {
                max: MAX_WITHDRAWAL_QUEUE_LEN,
            });
        }
        account.sweep_matured_deposits(now);
        account.active_stake -= amount;
        let record = PendingWithdrawal {
            amount,
            requested_at: now,
            retraction_until: now.saturating_add(self.delays.stake_retraction_delay),
            payable_at: now.saturating_add(self.delays.withdraw_delay),
        };
        account.withdrawal_queue.push_back(record.clone());
        info!(%participant, amount, height = now, payable_at = record.payable_at, "withdrawal requested");
        Ok(record)
    }

    /// Retract the pending withdrawal at `queue_index` (0 = oldest),
    /// restoring its full amount to active stake. Only possible while the
    /// current height is within the record's retraction window.
    pub fn retract_withdraw(
        &mut self,
        participant: &ParticipantId,
        queue_index: usize,
    ) -> Result<Balance, StakeError> {
        let now = self.clock.current_height();
        let not_found = || StakeError::WithdrawalNotFound {
            participant: participant.to_b58(),
            index: queue_index,
        };
        let account = self.accounts.get_mut(participant).ok_or_else(not_found)?;
        let record = account
            .withdrawal_queue
            .get(queue_index)
            .ok_or_else(not_found)?;
        if !record.is_retractable(now) {
            return Err(StakeError::RetractionWindowClosed {
                closed_at: record.retraction_until,
                height: now,
            });
        }
        let record = match account.withdrawal_queue.remove(queue_index) {
            Some(r) => r,
            None => return Err(not_found()),
        };
        account.active_stake = account.active_stake.saturating_add(record.amount);
        info!(%participant, amount = record.amount, height = now, "withdrawal retracted");
        Ok(record.amount)
    }

    /// Settle every payable withdrawal for `participant` and return the
    /// total paid out. Returns 0 when nothing has matured; that is a
    /// successful no-op, not an error, and repeated calls settle each
    /// record exactly once.
    pub fn withdraw(&mut self, participant: &ParticipantId) -> Balance {
        let now = self.clock.current_height();
        let Some(account) = self.accounts.get_mut(participant) else {
            return 0;
        };
        account.sweep_matured_deposits(now);
        let mut settled: Balance = 0;
        // Oldest first; the first immature record ends the scan since the
        // queue is ordered by request height and the delay is fixed.
        while let Some(head) = account.withdrawal_queue.front() {
            if !head.is_payable(now) {
                break;
            }
            settled = settled.saturating_add(head.amount);
            account.withdrawal_queue.pop_front();
        }
        if settled > 0 {
            info!(%participant, amount = settled, height = now, "withdrawals settled");
        }
        settled
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SharedClock;

    // ── Helpers ──────────────────────────────────────────────────────────────

    fn make_ledger(deposit: i64, retraction: i64, withdraw: i64) -> (StakeLedger, SharedClock) {
        let clock = SharedClock::starting_at(0);
        let config = ElectionConfig {
            deposit_delay: deposit,
            stake_retraction_delay: retraction,
            withdraw_delay: withdraw,
            restricted_address: None,
        };
        let ledger = StakeLedger::new(&config, Arc::new(clock.clone())).expect("valid config");
        (ledger, clock)
    }

    fn alice() -> ParticipantId {
        ParticipantId::from_label("alice")
    }

    fn bob() -> ParticipantId {
        ParticipantId::from_label("bob")
    }

    // ── Construction ─────────────────────────────────────────────────────────

    #[test]
    fn construction_validates_config() {
        let config = ElectionConfig {
            deposit_delay: 10,
            stake_retraction_delay: 15,
            withdraw_delay: 5,
            restricted_address: None,
        };
        assert!(matches!(
            StakeLedger::new(&config, Arc::new(SharedClock::starting_at(0))),
            Err(StakeError::StakeRetractionAfterWithdraw { .. })
        ));

        // Clause order carries through the constructor: negativity wins
        // over the ordering violation.
        let config = ElectionConfig {
            deposit_delay: -1,
            stake_retraction_delay: 15,
            withdraw_delay: 5,
            restricted_address: None,
        };
        assert!(matches!(
            StakeLedger::new(&config, Arc::new(SharedClock::starting_at(0))),
            Err(StakeError::NegativeDepositDelay(-1))
        ));
    }

    #[test]
    fn genesis_height_is_construction_height() {
        let clock = SharedClock::starting_at(42);
        let ledger = StakeLedger::new(&ElectionConfig::devnet(), Arc::new(clock.clone())).unwrap();
        assert_eq!(ledger.genesis_height(), 42);
        clock.advance(8);
        assert_eq!(ledger.genesis_height(), 42);
        assert_eq!(ledger.current_height(), 50);
    }

    #[test]
    fn privileged_predicate_follows_restricted_address() {
        let clock = Arc::new(SharedClock::starting_at(0));
        let open = StakeLedger::new(&ElectionConfig::devnet(), clock.clone()).unwrap();
        assert!(open.is_privileged(&alice()));

        let config = ElectionConfig {
            restricted_address: Some(alice()),
            ..ElectionConfig::devnet()
        };
        let restricted = StakeLedger::new(&config, clock).unwrap();
        assert!(restricted.is_privileged(&alice()));
        assert!(!restricted.is_privileged(&bob()));
    }

    // ── Lifecycle ────────────────────────────────────────────────────────────

    #[test]
    fn deposit_request_withdraw_lifecycle() {
        let (mut ledger, clock) = make_ledger(2, 2, 4);
        let p = alice();

        ledger.deposit_stake(&p, 1_000).unwrap();
        assert_eq!(ledger.active_stake(&p), 1_000);

        let record = ledger.request_withdraw(&p, 1_000).unwrap();
        assert_eq!(ledger.active_stake(&p), 0);
        assert_eq!(record.retraction_until, 2);
        assert_eq!(record.payable_at, 4);

        // Nothing matured yet: a successful no-op, not an error.
        assert_eq!(ledger.withdraw(&p), 0);
        assert_eq!(ledger.pending_withdrawals(&p).len(), 1);

        clock.advance(4);
        assert_eq!(ledger.withdraw(&p), 1_000);

        // Each record settles exactly once.
        assert_eq!(ledger.withdraw(&p), 0);
        assert!(ledger.pending_withdrawals(&p).is_empty());
    }

    #[test]
    fn zero_delays_settle_immediately() {
        let (mut ledger, _clock) = make_ledger(0, 0, 0);
        let p = alice();
        ledger.deposit_stake(&p, 50).unwrap();
        ledger.request_withdraw(&p, 50).unwrap();
        assert_eq!(ledger.withdraw(&p), 50);
        assert_eq!(ledger.active_stake(&p), 0);
    }

    // ── Deposit ──────────────────────────────────────────────────────────────

    #[test]
    fn deposit_rejects_zero_and_negative() {
        let (mut ledger, _clock) = make_ledger(2, 2, 4);
        let p = alice();
        assert!(matches!(
            ledger.deposit_stake(&p, 0).unwrap_err(),
            StakeError::ZeroOrNegativeDeposit(0)
        ));
        assert!(matches!(
            ledger.deposit_stake(&p, -5).unwrap_err(),
            StakeError::ZeroOrNegativeDeposit(-5)
        ));
        // A failed deposit creates no account record.
        assert_eq!(ledger.account_count(), 0);
    }

    #[test]
    fn matured_stake_honors_deposit_delay() {
        let (mut ledger, clock) = make_ledger(3, 0, 5);
        let p = alice();
        ledger.deposit_stake(&p, 700).unwrap();
        assert_eq!(ledger.active_stake(&p), 700);
        assert_eq!(ledger.matured_stake(&p), 0);
        clock.advance(2);
        assert_eq!(ledger.matured_stake(&p), 0);
        clock.advance(1);
        assert_eq!(ledger.matured_stake(&p), 700);

        ledger.deposit_stake(&p, 300).unwrap();
        assert_eq!(ledger.active_stake(&p), 1_000);
        assert_eq!(ledger.matured_stake(&p), 700);
        clock.advance(3);
        assert_eq!(ledger.matured_stake(&p), 1_000);
    }

    // ── Request withdraw ─────────────────────────────────────────────────────

    #[test]
    fn request_rejects_non_positive_amounts() {
        let (mut ledger, _clock) = make_ledger(2, 2, 4);
        let p = alice();
        ledger.deposit_stake(&p, 100).unwrap();
        assert!(matches!(
            ledger.request_withdraw(&p, 0).unwrap_err(),
            StakeError::ZeroOrNegativeWithdrawal(0)
        ));
        assert!(matches!(
            ledger.request_withdraw(&p, -1).unwrap_err(),
            StakeError::ZeroOrNegativeWithdrawal(-1)
        ));
        assert_eq!(ledger.active_stake(&p), 100);
    }

    #[test]
    fn insufficient_stake_leaves_state_unchanged() {
        let (mut ledger, _clock) = make_ledger(2, 2, 4);
        let p = alice();
        ledger.deposit_stake(&p, 500).unwrap();
        let err = ledger.request_withdraw(&p, 501).unwrap_err();
        assert!(matches!(
            err,
            StakeError::InsufficientStake {
                requested: 501,
                active: 500
            }
        ));
        assert_eq!(ledger.active_stake(&p), 500);
        assert!(ledger.pending_withdrawals(&p).is_empty());
    }

    #[test]
    fn request_from_unknown_participant_is_insufficient() {
        let (mut ledger, _clock) = make_ledger(2, 2, 4);
        let err = ledger.request_withdraw(&alice(), 100).unwrap_err();
        assert!(matches!(
            err,
            StakeError::InsufficientStake {
                requested: 100,
                active: 0
            }
        ));
        assert_eq!(ledger.account_count(), 0);
    }

    #[test]
    fn withdrawal_queue_is_capped() {
        let (mut ledger, _clock) = make_ledger(0, 0, 10);
        let p = alice();
        ledger
            .deposit_stake(&p, MAX_WITHDRAWAL_QUEUE_LEN as i128 + 10)
            .unwrap();
        for _ in 0..MAX_WITHDRAWAL_QUEUE_LEN {
            ledger.request_withdraw(&p, 1).unwrap();
        }
        let err = ledger.request_withdraw(&p, 1).unwrap_err();
        assert!(matches!(err, StakeError::WithdrawalQueueFull { .. }));
        assert_eq!(ledger.active_stake(&p), 10);
        assert_eq!(ledger.pending_withdrawals(&p).len(), MAX_WITHDRAWAL_QUEUE_LEN);
    }

    // ── Retract ──────────────────────────────────────────────────────────────

    #[test]
    fn retraction_restores_active_stake() {
        let (mut ledger, clock) = make_ledger(0, 2, 4);
        let p = alice();
        ledger.deposit_stake(&p, 800).unwrap();
        ledger.request_withdraw(&p, 300).unwrap();
        assert_eq!(ledger.active_stake(&p), 500);

        clock.advance(1);
        assert_eq!(ledger.retract_withdraw(&p, 0).unwrap(), 300);
        assert_eq!(ledger.active_stake(&p), 800);
        assert!(ledger.pending_withdrawals(&p).is_empty());
    }

    #[test]
    fn retraction_window_is_inclusive() {
        let (mut ledger, clock) = make_ledger(0, 2, 4);
        let p = alice();
        ledger.deposit_stake(&p, 100).unwrap();
        ledger.request_withdraw(&p, 100).unwrap();
        clock.advance(2);
        assert_eq!(ledger.retract_withdraw(&p, 0).unwrap(), 100);
    }

    #[test]
    fn retraction_after_window_rejected() {
        let (mut ledger, clock) = make_ledger(0, 2, 4);
        let p = alice();
        ledger.deposit_stake(&p, 100).unwrap();
        ledger.request_withdraw(&p, 100).unwrap();
        clock.advance(3);
        let err = ledger.retract_withdraw(&p, 0).unwrap_err();
        assert!(matches!(
            err,
            StakeError::RetractionWindowClosed {
                closed_at: 2,
                height: 3
            }
        ));
        // The request stays queued and settles at maturity.
        assert_eq!(ledger.pending_withdrawals(&p).len(), 1);
        clock.advance(1);
        assert_eq!(ledger.withdraw(&p), 100);
    }

    #[test]
    fn retract_missing_record_rejected() {
        let (mut ledger, _clock) = make_ledger(2, 2, 4);
        let p = alice();
        let err = ledger.retract_withdraw(&p, 0).unwrap_err();
        assert!(matches!(err, StakeError::WithdrawalNotFound { index: 0, .. }));

        ledger.deposit_stake(&p, 100).unwrap();
        ledger.request_withdraw(&p, 50).unwrap();
        let err = ledger.retract_withdraw(&p, 1).unwrap_err();
        assert!(matches!(err, StakeError::WithdrawalNotFound { index: 1, .. }));
    }

    #[test]
    fn retracting_middle_record_keeps_queue_order() {
        let (mut ledger, clock) = make_ledger(0, 5, 5);
        let p = alice();
        ledger.deposit_stake(&p, 600).unwrap();
        ledger.request_withdraw(&p, 100).unwrap();
        clock.advance(1);
        ledger.request_withdraw(&p, 200).unwrap();
        clock.advance(1);
        ledger.request_withdraw(&p, 300).unwrap();

        assert_eq!(ledger.retract_withdraw(&p, 1).unwrap(), 200);
        assert_eq!(ledger.active_stake(&p), 200);
        let amounts: Vec<Balance> = ledger
            .pending_withdrawals(&p)
            .iter()
            .map(|w| w.amount)
            .collect();
        assert_eq!(amounts, vec![100, 300]);
    }

    // ── Withdraw ─────────────────────────────────────────────────────────────

    #[test]
    fn settlement_stops_at_first_immature_record() {
        let (mut ledger, clock) = make_ledger(0, 0, 4);
        let p = alice();
        ledger.deposit_stake(&p, 1_000).unwrap();
        ledger.request_withdraw(&p, 400).unwrap();
        clock.advance(3);
        ledger.request_withdraw(&p, 250).unwrap();
        clock.advance(1);
        assert_eq!(ledger.withdraw(&p), 400);
        assert_eq!(ledger.pending_withdrawals(&p).len(), 1);
        clock.advance(3);
        assert_eq!(ledger.withdraw(&p), 250);
    }

    #[test]
    fn settlement_batches_all_payable_records() {
        let (mut ledger, clock) = make_ledger(0, 0, 2);
        let p = alice();
        ledger.deposit_stake(&p, 900).unwrap();
        ledger.request_withdraw(&p, 100).unwrap();
        ledger.request_withdraw(&p, 200).unwrap();
        clock.advance(1);
        ledger.request_withdraw(&p, 300).unwrap();
        clock.advance(1);
        assert_eq!(ledger.withdraw(&p), 300);
        clock.advance(1);
        assert_eq!(ledger.withdraw(&p), 300);
        assert_eq!(ledger.active_stake(&p), 300);
    }

    #[test]
    fn withdraw_for_unknown_participant_is_zero() {
        let (mut ledger, _clock) = make_ledger(2, 2, 4);
        assert_eq!(ledger.withdraw(&alice()), 0);
        assert_eq!(ledger.account_count(), 0);
    }

    // ── Isolation / determinism ──────────────────────────────────────────────

    #[test]
    fn participants_are_isolated() {
        let (mut ledger, clock) = make_ledger(0, 0, 2);
        ledger.deposit_stake(&alice(), 100).unwrap();
        ledger.deposit_stake(&bob(), 900).unwrap();
        ledger.request_withdraw(&alice(), 100).unwrap();
        clock.advance(2);
        assert_eq!(ledger.withdraw(&alice()), 100);
        assert_eq!(ledger.withdraw(&bob()), 0);
        assert_eq!(ledger.active_stake(&bob()), 900);
        assert_eq!(ledger.total_active_stake(), 900);
    }

    #[test]
    fn identical_histories_produce_identical_state() {
        let run = || {
            let (mut ledger, clock) = make_ledger(1, 2, 4);
            let p = alice();
            ledger.deposit_stake(&p, 1_000).unwrap();
            ledger.request_withdraw(&p, 600).unwrap();
            clock.advance(2);
            ledger.retract_withdraw(&p, 0).unwrap();
            ledger.request_withdraw(&p, 250).unwrap();
            clock.advance(4);
            let settled = ledger.withdraw(&p);
            (settled, ledger.account(&p).cloned())
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn totals_track_queue_movement() {
        let (mut ledger, clock) = make_ledger(0, 0, 3);
        ledger.deposit_stake(&alice(), 500).unwrap();
        ledger.deposit_stake(&bob(), 500).unwrap();
        ledger.request_withdraw(&alice(), 200).unwrap();
        assert_eq!(ledger.total_active_stake(), 800);
        assert_eq!(ledger.total_pending_withdrawal(), 200);
        clock.advance(3);
        ledger.withdraw(&alice());
        assert_eq!(ledger.total_pending_withdrawal(), 0);
        assert_eq!(ledger.total_active_stake(), 800);
    }
}
