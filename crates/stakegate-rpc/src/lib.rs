//! stakegate-rpc
//!
//! JSON-RPC 2.0 server for StakeGate nodes.
//!
//! Namespace: "stakegate"
//! Methods:
//!   stakegate_depositStake          — deposit stake for a participant
//!   stakegate_requestWithdraw       — queue a delay-gated withdrawal
//!   stakegate_retractWithdraw       — retract a queued withdrawal
//!   stakegate_withdraw              — settle matured withdrawals
//!   stakegate_getAccount            — full account summary
//!   stakegate_getActiveStake        — active stake for a participant
//!   stakegate_getPendingWithdrawals — queued withdrawals, oldest first
//!   stakegate_currentHeight         — chain height seen by the ledger
//!   stakegate_getLedgerInfo         — delay schedule and aggregates
//!   stakegate_advanceHeight         — devnet chain progression

pub mod api;
pub mod server;
pub mod types;

pub use server::{RpcServer, RpcServerState};
pub use types::{RpcAccount, RpcDeposit, RpcLedgerInfo, RpcWithdrawal};
