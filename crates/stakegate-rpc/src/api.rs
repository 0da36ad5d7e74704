use jsonrpsee::core::RpcResult;
use jsonrpsee::proc_macros::rpc;

use crate::types::{RpcAccount, RpcLedgerInfo, RpcWithdrawal};

/// StakeGate JSON-RPC 2.0 API definition.
///
/// All method names are prefixed with "stakegate_" via
/// `namespace = "stakegate"`. Amounts travel as decimal strings; u128
/// would lose precision as a JSON number.
#[rpc(server, namespace = "stakegate")]
pub trait StakegateApi {
    /// Deposit stake for a participant. `amount` is a signed decimal
    /// string; zero and negative deposits are rejected by the ledger.
    /// Returns the updated account summary.
    #[method(name = "depositStake")]
    async fn deposit_stake(&self, participant: String, amount: String) -> RpcResult<RpcAccount>;

    /// Queue a withdrawal of `amount` from active stake. Returns the
    /// queued record with its retraction and payable heights.
    #[method(name = "requestWithdraw")]
    async fn request_withdraw(
        &self,
        participant: String,
        amount: String,
    ) -> RpcResult<RpcWithdrawal>;

    /// Retract the pending withdrawal at `index` (0 = oldest). Returns
    /// the restored amount as a decimal string.
    #[method(name = "retractWithdraw")]
    async fn retract_withdraw(&self, participant: String, index: u32) -> RpcResult<String>;

    /// Settle every payable withdrawal for the participant. Returns the
    /// settled total as a decimal string; "0" means nothing had matured
    /// yet and is a success, not an error.
    #[method(name = "withdraw")]
    async fn withdraw(&self, participant: String) -> RpcResult<String>;

    /// Get the full account summary by base-58 participant id, or null
    /// for a participant that has never deposited.
    #[method(name = "getAccount")]
    async fn get_account(&self, participant: String) -> RpcResult<Option<RpcAccount>>;

    /// Get active stake by base-58 participant id ("0" for unknown).
    #[method(name = "getActiveStake")]
    async fn get_active_stake(&self, participant: String) -> RpcResult<String>;

    /// List pending withdrawals for a participant, oldest first.
    #[method(name = "getPendingWithdrawals")]
    async fn get_pending_withdrawals(&self, participant: String) -> RpcResult<Vec<RpcWithdrawal>>;

    /// Current chain height as seen by the ledger.
    #[method(name = "currentHeight")]
    async fn current_height(&self) -> RpcResult<u64>;

    /// Ledger-wide configuration and aggregates.
    #[method(name = "getLedgerInfo")]
    async fn get_ledger_info(&self) -> RpcResult<RpcLedgerInfo>;

    /// Advance the devnet chain by `blocks`. Restricted to the configured
    /// address when one is set. Returns the new height.
    #[method(name = "advanceHeight")]
    async fn advance_height(&self, caller: String, blocks: u64) -> RpcResult<u64>;
}
