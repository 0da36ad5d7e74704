use anyhow::{bail, Context};

use stakegate_rpc::{RpcAccount, RpcLedgerInfo, RpcWithdrawal};

/// Simple JSON-RPC 2.0 client used by the CLI to talk to a running node.
///
/// Uses raw HTTP POST with serde_json rather than the full jsonrpsee client
/// to keep the CLI binary lean.
pub struct LedgerRpcClient {
    url: String,
    client: reqwest::Client,
}

impl LedgerRpcClient {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Call a JSON-RPC method and return the `result` field.
    async fn call(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> anyhow::Result<serde_json::Value> {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });

        let resp = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("connecting to node at {}", self.url))?;

        let json: serde_json::Value = resp.json().await.context("parsing RPC response")?;

        if let Some(err) = json.get("error") {
            bail!("RPC error: {}", err);
        }

        Ok(json["result"].clone())
    }

    /// Deposit stake. Returns the updated account summary.
    pub async fn deposit_stake(
        &self,
        participant: &str,
        amount: &str,
    ) -> anyhow::Result<RpcAccount> {
        let result = self
            .call(
                "stakegate_depositStake",
                serde_json::json!([participant, amount]),
            )
            .await?;
        serde_json::from_value(result).context("parsing account response")
    }

    /// Queue a withdrawal. Returns the queued record.
    pub async fn request_withdraw(
        &self,
        participant: &str,
        amount: &str,
    ) -> anyhow::Result<RpcWithdrawal> {
        let result = self
            .call(
                "stakegate_requestWithdraw",
                serde_json::json!([participant, amount]),
            )
            .await?;
        serde_json::from_value(result).context("parsing withdrawal response")
    }

    /// Retract the pending withdrawal at `index`. Returns the restored amount.
    pub async fn retract_withdraw(&self, participant: &str, index: u32) -> anyhow::Result<u128> {
        let result = self
            .call(
                "stakegate_retractWithdraw",
                serde_json::json!([participant, index]),
            )
            .await?;
        let restored = result.as_str().context("expected string amount")?;
        restored.parse().context("parsing restored amount")
    }

    /// Settle payable withdrawals. Returns the settled total.
    pub async fn withdraw(&self, participant: &str) -> anyhow::Result<u128> {
        let result = self
            .call("stakegate_withdraw", serde_json::json!([participant]))
            .await?;
        let settled = result.as_str().context("expected string amount")?;
        settled.parse().context("parsing settled total")
    }

    /// Get the full account summary, or None for an unknown participant.
    pub async fn get_account(&self, participant: &str) -> anyhow::Result<Option<RpcAccount>> {
        let result = self
            .call("stakegate_getAccount", serde_json::json!([participant]))
            .await?;
        if result.is_null() {
            return Ok(None);
        }
        let account = serde_json::from_value(result).context("parsing account response")?;
        Ok(Some(account))
    }

    /// List pending withdrawals, oldest first.
    pub async fn get_pending_withdrawals(
        &self,
        participant: &str,
    ) -> anyhow::Result<Vec<RpcWithdrawal>> {
        let result = self
            .call(
                "stakegate_getPendingWithdrawals",
                serde_json::json!([participant]),
            )
            .await?;
        serde_json::from_value(result).context("parsing withdrawals response")
    }

    /// Ledger configuration and aggregates.
    pub async fn get_ledger_info(&self) -> anyhow::Result<RpcLedgerInfo> {
        let result = self
            .call("stakegate_getLedgerInfo", serde_json::json!([]))
            .await?;
        serde_json::from_value(result).context("parsing ledger info")
    }

    /// Current chain height.
    pub async fn current_height(&self) -> anyhow::Result<u64> {
        let result = self
            .call("stakegate_currentHeight", serde_json::json!([]))
            .await?;
        result.as_u64().context("expected height number")
    }

    /// Advance the devnet chain by `blocks`. Returns the new height.
    pub async fn advance_height(&self, caller: &str, blocks: u64) -> anyhow::Result<u64> {
        let result = self
            .call(
                "stakegate_advanceHeight",
                serde_json::json!([caller, blocks]),
            )
            .await?;
        result.as_u64().context("expected height number")
    }
}
