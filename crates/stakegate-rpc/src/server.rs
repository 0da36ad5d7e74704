use std::net::SocketAddr;
use std::sync::Arc;

use jsonrpsee::core::{async_trait, RpcResult};
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::types::ErrorObject;
use tokio::sync::RwLock;
use tracing::info;

use stakegate_core::{ParticipantId, RawAmount, StakeError};
use stakegate_ledger::{LedgerStore, SharedClock, StakeLedger};

use crate::api::StakegateApiServer;
use crate::types::{RpcAccount, RpcLedgerInfo, RpcWithdrawal};

fn rpc_err(code: i32, msg: impl Into<String>) -> ErrorObject<'static> {
    ErrorObject::owned(code, msg.into(), None::<()>)
}

/// Map a ledger error onto a JSON-RPC error object. The canonical abort
/// code string rides in the error data so clients match on it instead of
/// message text.
fn ledger_err(e: &StakeError) -> ErrorObject<'static> {
    ErrorObject::owned(-32000, e.to_string(), Some(e.code()))
}

fn parse_participant(s: &str) -> Result<ParticipantId, ErrorObject<'static>> {
    ParticipantId::from_b58(s).map_err(|e| rpc_err(-32602, format!("invalid participant id: {e}")))
}

fn parse_amount(s: &str) -> Result<RawAmount, ErrorObject<'static>> {
    s.trim()
        .parse::<RawAmount>()
        .map_err(|e| rpc_err(-32602, format!("invalid amount: {e}")))
}

/// Shared state passed to the RPC server.
pub struct RpcServerState {
    /// The in-memory ledger. The write lock serializes mutations; the
    /// ledger itself performs no locking.
    pub ledger: RwLock<StakeLedger>,
    /// Collaborator-side persistence; the changed account is written after
    /// each successful mutation.
    pub store: Arc<LedgerStore>,
    /// Handle used by `advanceHeight`; the same clock sits inside the
    /// ledger.
    pub clock: SharedClock,
}

impl RpcServerState {
    /// Persist the participant's account and the chain height. Called with
    /// the ledger lock held so the store never sees a half-applied
    /// operation.
    fn persist(&self, ledger: &StakeLedger, participant: &ParticipantId) -> Result<(), StakeError> {
        if let Some(account) = ledger.account(participant) {
            self.store.put_account(participant, account)?;
        }
        self.store.put_chain_height(ledger.current_height())?;
        self.store.flush()?;
        Ok(())
    }
}

/// The RPC server implementation.
pub struct RpcServer {
    state: Arc<RpcServerState>,
}

impl RpcServer {
    pub fn new(state: Arc<RpcServerState>) -> Self {
        Self { state }
    }

    /// Start the JSON-RPC server on `addr`. Returns a handle to stop it.
    pub async fn start(self, addr: SocketAddr) -> anyhow::Result<ServerHandle> {
        let server = Server::builder().build(addr).await?;
        let module = self.into_rpc();
        let handle = server.start(module);
        info!(%addr, "RPC server started");
        Ok(handle)
    }
}

#[async_trait]
impl StakegateApiServer for RpcServer {
    async fn deposit_stake(&self, participant: String, amount: String) -> RpcResult<RpcAccount> {
        let id = parse_participant(&participant)?;
        let amount = parse_amount(&amount)?;

        let mut ledger = self.state.ledger.write().await;
        ledger
            .deposit_stake(&id, amount)
            .map_err(|e| ledger_err(&e))?;
        self.state.persist(&ledger, &id).map_err(|e| ledger_err(&e))?;

        let height = ledger.current_height();
        let account = ledger
            .account(&id)
            .ok_or_else(|| rpc_err(-32603, "account missing after deposit"))?;
        Ok(RpcAccount::from_account(&id, account, height))
    }

    async fn request_withdraw(
        &self,
        participant: String,
        amount: String,
    ) -> RpcResult<RpcWithdrawal> {
        let id = parse_participant(&participant)?;
        let amount = parse_amount(&amount)?;

        let mut ledger = self.state.ledger.write().await;
        let record = ledger
            .request_withdraw(&id, amount)
            .map_err(|e| ledger_err(&e))?;
        self.state.persist(&ledger, &id).map_err(|e| ledger_err(&e))?;

        Ok(RpcWithdrawal::from_record(&record))
    }

    async fn retract_withdraw(&self, participant: String, index: u32) -> RpcResult<String> {
        let id = parse_participant(&participant)?;

        let mut ledger = self.state.ledger.write().await;
        let restored = ledger
            .retract_withdraw(&id, index as usize)
            .map_err(|e| ledger_err(&e))?;
        self.state.persist(&ledger, &id).map_err(|e| ledger_err(&e))?;

        Ok(restored.to_string())
    }

    async fn withdraw(&self, participant: String) -> RpcResult<String> {
        let id = parse_participant(&participant)?;

        let mut ledger = self.state.ledger.write().await;
        let settled = ledger.withdraw(&id);
        self.state.persist(&ledger, &id).map_err(|e| ledger_err(&e))?;

        Ok(settled.to_string())
    }

    async fn get_account(&self, participant: String) -> RpcResult<Option<RpcAccount>> {
        let id = parse_participant(&participant)?;
        let ledger = self.state.ledger.read().await;
        let height = ledger.current_height();
        Ok(ledger
            .account(&id)
            .map(|a| RpcAccount::from_account(&id, a, height)))
    }

    async fn get_active_stake(&self, participant: String) -> RpcResult<String> {
        let id = parse_participant(&participant)?;
        let ledger = self.state.ledger.read().await;
        Ok(ledger.active_stake(&id).to_string())
    }

    async fn get_pending_withdrawals(&self, participant: String) -> RpcResult<Vec<RpcWithdrawal>> {
        let id = parse_participant(&participant)?;
        let ledger = self.state.ledger.read().await;
        Ok(ledger
            .pending_withdrawals(&id)
            .iter()
            .map(RpcWithdrawal::from_record)
            .collect())
    }

    async fn current_height(&self) -> RpcResult<u64> {
        let ledger = self.state.ledger.read().await;
        Ok(ledger.current_height())
    }

    async fn get_ledger_info(&self) -> RpcResult<RpcLedgerInfo> {
        let ledger = self.state.ledger.read().await;
        Ok(RpcLedgerInfo::from_ledger(&ledger))
    }

    async fn advance_height(&self, caller: String, blocks: u64) -> RpcResult<u64> {
        let id = parse_participant(&caller)?;

        // Holding the read guard keeps the advance out of any in-flight
        // mutation, which reads the height once at entry.
        let ledger = self.state.ledger.read().await;
        if !ledger.is_privileged(&id) {
            return Err(ledger_err(&StakeError::NotAuthorized));
        }
        let height = self.state.clock.advance(blocks);
        self.state
            .store
            .put_chain_height(height)
            .and_then(|_| self.state.store.flush())
            .map_err(|e| ledger_err(&e))?;
        info!(height, blocks, "devnet height advanced");
        Ok(height)
    }
}
