//! Delay-gated staking ledger.
//!
//! [`StakeLedger`] is the deterministic core: per-participant accounts,
//! deposit maturity buckets, withdrawal queues, all gated on an injected
//! [`BlockClock`]. [`LedgerStore`] is the collaborator-side persistence
//! that carries the ledger across restarts.

pub mod account;
pub mod clock;
pub mod ledger;
pub mod store;

pub use account::{Account, PendingDeposit, PendingWithdrawal};
pub use clock::{BlockClock, SharedClock};
pub use ledger::StakeLedger;
pub use store::{LedgerMeta, LedgerStore};
