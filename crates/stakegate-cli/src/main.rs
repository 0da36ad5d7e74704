//! stakegate-cli
//!
//! CLI for a running StakeGate node. Resolves the participant identity,
//! drives stake operations over JSON-RPC, and prints the resulting state.
//!
//! Usage:
//!   stakegate-cli deposit          --amount <n> (--participant <b58> | --label <name>) [--rpc <url>]
//!   stakegate-cli request-withdraw --amount <n> (--participant <b58> | --label <name>) [--rpc <url>]
//!   stakegate-cli retract-withdraw --index <i>  (--participant <b58> | --label <name>) [--rpc <url>]
//!   stakegate-cli withdraw         (--participant <b58> | --label <name>) [--rpc <url>]
//!   stakegate-cli account          (--participant <b58> | --label <name>) [--rpc <url>]
//!   stakegate-cli pending          (--participant <b58> | --label <name>) [--rpc <url>]
//!   stakegate-cli info             [--rpc <url>]
//!   stakegate-cli height           [--rpc <url>]
//!   stakegate-cli advance-height   --blocks <n> (--participant <b58> | --label <name>) [--rpc <url>]

use anyhow::bail;
use clap::{Parser, Subcommand};

use stakegate_core::ParticipantId;
use stakegate_rpc::RpcAccount;

mod rpc_client;
use rpc_client::LedgerRpcClient;

// ── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "stakegate-cli",
    version,
    about = "StakeGate CLI: drive a staking ledger node over JSON-RPC"
)]
struct Args {
    /// Participant id (base-58, 32 bytes). Takes precedence over --label.
    #[arg(long, global = true)]
    participant: Option<String>,

    /// Derive the participant id from a human-readable label (devnet).
    #[arg(long, global = true)]
    label: Option<String>,

    /// Node RPC endpoint.
    #[arg(long, global = true, default_value = "http://127.0.0.1:9650")]
    rpc: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Deposit stake for the participant.
    Deposit {
        /// Amount in base units (decimal string, forwarded as-is).
        #[arg(long)]
        amount: String,
    },

    /// Queue a withdrawal from active stake.
    RequestWithdraw {
        /// Amount in base units (decimal string, forwarded as-is).
        #[arg(long)]
        amount: String,
    },

    /// Retract a pending withdrawal while its window is open.
    RetractWithdraw {
        /// Queue index of the withdrawal (0 = oldest; see `pending`).
        #[arg(long)]
        index: u32,
    },

    /// Settle every payable withdrawal for the participant.
    Withdraw,

    /// Print the full account summary.
    Account,

    /// List pending withdrawals with their queue indices.
    Pending,

    /// Print ledger configuration and aggregates.
    Info,

    /// Print the current chain height.
    Height,

    /// Advance the devnet chain height (restricted address only, when set).
    AdvanceHeight {
        /// Number of blocks to advance.
        #[arg(long, default_value_t = 1)]
        blocks: u64,
    },
}

// ── Main ─────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("warn,stakegate_cli=info")
        .init();

    let args = Args::parse();
    let client = LedgerRpcClient::new(&args.rpc);

    match &args.command {
        Command::Deposit { amount } => {
            let id = resolve_participant(&args)?;
            let account = client.deposit_stake(&id.to_b58(), amount).await?;
            println!("Deposited {} for {}", amount, id.to_b58());
            print_account(&account);
            Ok(())
        }

        Command::RequestWithdraw { amount } => {
            let id = resolve_participant(&args)?;
            let record = client.request_withdraw(&id.to_b58(), amount).await?;
            println!("Withdrawal queued for {}", id.to_b58());
            println!("  Amount:           {}", record.amount);
            println!("  Requested at:     {}", record.requested_at);
            println!("  Retractable until {} (inclusive)", record.retraction_until);
            println!("  Payable at:       {}", record.payable_at);
            Ok(())
        }

        Command::RetractWithdraw { index } => {
            let id = resolve_participant(&args)?;
            let restored = client.retract_withdraw(&id.to_b58(), *index).await?;
            println!("Retracted withdrawal #{}: {} restored to active stake", index, restored);
            Ok(())
        }

        Command::Withdraw => {
            let id = resolve_participant(&args)?;
            let settled = client.withdraw(&id.to_b58()).await?;
            if settled == 0 {
                println!("Nothing payable yet (settled 0)");
            } else {
                println!("Settled: {}", settled);
            }
            Ok(())
        }

        Command::Account => {
            let id = resolve_participant(&args)?;
            match client.get_account(&id.to_b58()).await? {
                Some(account) => print_account(&account),
                None => println!("No account for {}", id.to_b58()),
            }
            Ok(())
        }

        Command::Pending => {
            let id = resolve_participant(&args)?;
            let pending = client.get_pending_withdrawals(&id.to_b58()).await?;
            if pending.is_empty() {
                println!("No pending withdrawals for {}", id.to_b58());
                return Ok(());
            }
            println!("Pending withdrawals for {}:", id.to_b58());
            for (i, w) in pending.iter().enumerate() {
                println!(
                    "  #{}  amount={}  requested_at={}  retractable_until={}  payable_at={}",
                    i, w.amount, w.requested_at, w.retraction_until, w.payable_at
                );
            }
            Ok(())
        }

        Command::Info => {
            let info = client.get_ledger_info().await?;
            println!("Protocol:            {}", info.protocol);
            println!("Deposit delay:       {} blocks", info.deposit_delay);
            println!("Retraction delay:    {} blocks", info.stake_retraction_delay);
            println!("Withdraw delay:      {} blocks", info.withdraw_delay);
            match &info.restricted_address {
                Some(addr) => println!("Restricted address:  {}", addr),
                None => println!("Restricted address:  (none, open devnet)"),
            }
            println!("Genesis height:      {}", info.genesis_height);
            println!("Current height:      {}", info.current_height);
            println!("Accounts:            {}", info.account_count);
            println!("Total active stake:  {}", info.total_active_stake);
            println!("Total pending:       {}", info.total_pending_withdrawal);
            Ok(())
        }

        Command::Height => {
            let height = client.current_height().await?;
            println!("{}", height);
            Ok(())
        }

        Command::AdvanceHeight { blocks } => {
            let id = resolve_participant(&args)?;
            let height = client.advance_height(&id.to_b58(), *blocks).await?;
            println!("Height advanced to {}", height);
            Ok(())
        }
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Resolve the participant from --participant (base-58) or --label.
fn resolve_participant(args: &Args) -> anyhow::Result<ParticipantId> {
    match (&args.participant, &args.label) {
        (Some(b58), _) => {
            ParticipantId::from_b58(b58).map_err(|e| anyhow::anyhow!("invalid participant id: {e}"))
        }
        (None, Some(label)) => Ok(ParticipantId::from_label(label)),
        (None, None) => bail!("pass --participant <b58> or --label <name>"),
    }
}

fn print_account(account: &RpcAccount) {
    println!("Account:          {}", account.participant);
    println!("Active stake:     {}", account.active_stake);
    println!("Matured stake:    {}", account.matured_stake);
    println!("Pending total:    {}", account.pending_withdrawal_total);
    if !account.pending_deposits.is_empty() {
        println!("Aging deposits:");
        for d in &account.pending_deposits {
            println!(
                "  amount={}  deposited_at={}  matures_at={}",
                d.amount, d.deposited_at, d.matures_at
            );
        }
    }
    if !account.pending_withdrawals.is_empty() {
        println!("Pending withdrawals:");
        for (i, w) in account.pending_withdrawals.iter().enumerate() {
            println!(
                "  #{}  amount={}  retractable_until={}  payable_at={}",
                i, w.amount, w.retraction_until, w.payable_at
            );
        }
    }
}
