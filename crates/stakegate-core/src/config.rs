use crate::constants::{
    DEFAULT_DEPOSIT_DELAY, DEFAULT_STAKE_RETRACTION_DELAY, DEFAULT_WITHDRAW_DELAY,
};
use crate::error::StakeError;
use crate::types::{BlockDelay, ParticipantId};
use serde::{Deserialize, Serialize};

/// Election configuration as submitted at ledger construction.
///
/// Delays are raw signed block counts straight off the wire; [`validate`]
/// turns them into a [`DelaySchedule`] or rejects the whole record. The
/// record is immutable once the ledger is constructed.
///
/// [`validate`]: ElectionConfig::validate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElectionConfig {
    /// Blocks a deposit must age before it counts toward matured stake.
    pub deposit_delay: BlockDelay,

    /// Blocks during which a pending withdrawal may still be retracted.
    pub stake_retraction_delay: BlockDelay,

    /// Blocks after a withdrawal request before the funds become payable.
    pub withdraw_delay: BlockDelay,

    /// Address privileged operations are restricted to. `None` leaves them
    /// open (local devnet).
    #[serde(default)]
    pub restricted_address: Option<ParticipantId>,
}

impl ElectionConfig {
    /// Devnet defaults: short delays suited to local block ticking.
    pub fn devnet() -> Self {
        Self {
            deposit_delay: DEFAULT_DEPOSIT_DELAY,
            stake_retraction_delay: DEFAULT_STAKE_RETRACTION_DELAY,
            withdraw_delay: DEFAULT_WITHDRAW_DELAY,
            restricted_address: None,
        }
    }

    /// Checks the delay clauses in declaration order; the first violated
    /// clause decides the error. Zero delays are valid, as is a retraction
    /// window equal to the withdraw window.
    pub fn validate(&self) -> Result<DelaySchedule, StakeError> {
        if self.deposit_delay < 0 {
            return Err(StakeError::NegativeDepositDelay(self.deposit_delay));
        }
        if self.stake_retraction_delay < 0 {
            return Err(StakeError::NegativeStakeRetractionDelay(
                self.stake_retraction_delay,
            ));
        }
        if self.withdraw_delay < 0 {
            return Err(StakeError::NegativeWithdrawDelay(self.withdraw_delay));
        }
        if self.stake_retraction_delay > self.withdraw_delay {
            return Err(StakeError::StakeRetractionAfterWithdraw {
                retraction: self.stake_retraction_delay,
                withdraw: self.withdraw_delay,
            });
        }
        Ok(DelaySchedule {
            deposit_delay: self.deposit_delay as u64,
            stake_retraction_delay: self.stake_retraction_delay as u64,
            withdraw_delay: self.withdraw_delay as u64,
        })
    }
}

impl Default for ElectionConfig {
    fn default() -> Self {
        Self::devnet()
    }
}

/// Delay schedule after validation: every count non-negative and the
/// retraction window no longer than the withdraw window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelaySchedule {
    pub deposit_delay: u64,
    pub stake_retraction_delay: u64,
    pub withdraw_delay: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(deposit: i64, retraction: i64, withdraw: i64) -> ElectionConfig {
        ElectionConfig {
            deposit_delay: deposit,
            stake_retraction_delay: retraction,
            withdraw_delay: withdraw,
            restricted_address: None,
        }
    }

    #[test]
    fn accepts_positive_delays() {
        let schedule = config(10, 5, 5).validate().unwrap();
        assert_eq!(schedule.deposit_delay, 10);
        assert_eq!(schedule.stake_retraction_delay, 5);
        assert_eq!(schedule.withdraw_delay, 5);
    }

    #[test]
    fn accepts_retraction_shorter_than_withdraw() {
        assert!(config(10, 5, 15).validate().is_ok());
    }

    #[test]
    fn accepts_all_zero_delays() {
        let schedule = config(0, 0, 0).validate().unwrap();
        assert_eq!(schedule.withdraw_delay, 0);
    }

    #[test]
    fn rejects_negative_deposit_delay() {
        let err = config(-10, 5, 5).validate().unwrap_err();
        assert!(matches!(err, StakeError::NegativeDepositDelay(-10)));
        assert_eq!(err.code(), "NEGATIVE_DEPOSIT_DELAY");
    }

    #[test]
    fn rejects_negative_retraction_delay() {
        let err = config(10, -5, 5).validate().unwrap_err();
        assert!(matches!(err, StakeError::NegativeStakeRetractionDelay(-5)));
        assert_eq!(err.code(), "NEGATIVE_STAKE_RETRACTION_DELAY");
    }

    #[test]
    fn rejects_negative_withdraw_delay() {
        let err = config(10, 5, -5).validate().unwrap_err();
        assert!(matches!(err, StakeError::NegativeWithdrawDelay(-5)));
        assert_eq!(err.code(), "NEGATIVE_WITHDRAW_DELAY");
    }

    #[test]
    fn rejects_retraction_longer_than_withdraw() {
        let err = config(10, 15, 5).validate().unwrap_err();
        assert!(matches!(
            err,
            StakeError::StakeRetractionAfterWithdraw {
                retraction: 15,
                withdraw: 5
            }
        ));
        assert_eq!(err.code(), "STAKE_RETRACTION_AFTER_WITHDRAW");
    }

    #[test]
    fn first_violated_clause_wins() {
        // Deposit clause fires even though the ordering clause is also
        // violated.
        let err = config(-1, 15, 5).validate().unwrap_err();
        assert!(matches!(err, StakeError::NegativeDepositDelay(-1)));

        // Retraction clause fires before the withdraw clause.
        let err = config(0, -3, -7).validate().unwrap_err();
        assert!(matches!(err, StakeError::NegativeStakeRetractionDelay(-3)));
    }

    #[test]
    fn devnet_defaults_validate() {
        assert!(ElectionConfig::devnet().validate().is_ok());
    }

    #[test]
    fn config_roundtrips_through_json() {
        let cfg = ElectionConfig {
            restricted_address: Some(ParticipantId::from_label("operator")),
            ..ElectionConfig::devnet()
        };
        let json = serde_json::to_string(&cfg).unwrap();
        let back: ElectionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.deposit_delay, cfg.deposit_delay);
        assert_eq!(back.restricted_address, cfg.restricted_address);
    }
}
