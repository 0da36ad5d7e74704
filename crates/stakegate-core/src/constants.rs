/// ─── StakeGate Protocol Constants ───────────────────────────────────────────
///
/// "Stake that waits for the chain, not the clock."
///
/// Every delay is measured in blocks. The ledger never reads wall-clock
/// time; block height is its only notion of progression.

// ── Devnet delay defaults (blocks) ───────────────────────────────────────────

/// Default deposit maturity delay for devnet configs.
pub const DEFAULT_DEPOSIT_DELAY: i64 = 2;

/// Default retraction window for devnet configs.
pub const DEFAULT_STAKE_RETRACTION_DELAY: i64 = 2;

/// Default withdraw delay for devnet configs. Must stay >= the retraction
/// default or `ElectionConfig::devnet()` would fail its own validation.
pub const DEFAULT_WITHDRAW_DELAY: i64 = 4;

// ── Ledger limits ────────────────────────────────────────────────────────────

/// Maximum pending withdrawal requests per participant. A request past this
/// cap is rejected; settled and retracted records free their slots.
pub const MAX_WITHDRAWAL_QUEUE_LEN: usize = 1_024;

// ── Devnet chain clock ───────────────────────────────────────────────────────

/// Default block interval for the node's height ticker (milliseconds).
/// An interval of zero disables the ticker; height then only moves through
/// the privileged advance operation.
pub const DEFAULT_BLOCK_INTERVAL_MS: u64 = 1_000;
