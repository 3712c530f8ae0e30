// crates/lockstake-cli/src/commands/simulate.rs
//
// `lockstake simulate <scenario.toml>`: replay a scripted sequence of
// staking operations against an in-memory engine and report the outcome of
// every step, the final position of every account, and the notifications
// emitted along the way.
//
// Scenario format:
//
//   start = 1700000000            # optional unix start time
//   penalty_authority = "slasher" # optional default penalty caller
//
//   [[accounts]]
//   name = "alice"
//   balance = 50000               # whole LST minted before the first step
//
//   [[steps]]
//   day = 0                       # days after `start`
//   seconds = 0                   # optional extra seconds
//   account = "alice"
//   action = "stake"
//   amount = 1000
//   lockup_days = 90
//
// Steps must be in non-decreasing time order. Account names are labels
// hashed into account ids unless they are 64-character hex keys.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use serde::{Deserialize, Serialize};
use tabled::Tabled;
use thiserror::Error;

use lockstake_core::{checked_days, AccountId, Amount, Role, StakeError, StakingEvent, Timestamp};
use lockstake_economics::{EventLog, InMemoryLedger, RoleRegistry, StakingEngine};

use crate::config::{resolve_account, LockstakeConfig};
use crate::output::{
    format_bps, format_duration, format_json, format_table, format_timestamp, OutputFormat,
};

/// Arguments for `lockstake simulate`.
#[derive(Debug, Args)]
pub struct SimulateCmd {
    /// Path to the scenario TOML file.
    pub scenario: PathBuf,

    /// Stop at the first failing step instead of recording it and continuing.
    #[arg(long)]
    pub strict: bool,
}

// ---------------------------------------------------------------------------
// Scenario file
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct Scenario {
    #[serde(default = "default_start")]
    pub start: Timestamp,

    #[serde(default = "default_penalty_authority")]
    pub penalty_authority: String,

    #[serde(default)]
    pub accounts: Vec<Funding>,

    #[serde(default)]
    pub steps: Vec<Step>,
}

fn default_start() -> Timestamp {
    1_700_000_000
}

fn default_penalty_authority() -> String {
    "penalty-authority".to_string()
}

/// Initial token balance for a named account.
#[derive(Debug, Deserialize)]
pub struct Funding {
    pub name: String,
    pub balance: u64,
}

#[derive(Debug, Deserialize)]
pub struct Step {
    pub day: u64,
    #[serde(default)]
    pub seconds: u64,
    pub account: String,
    #[serde(flatten)]
    pub action: Action,
}

/// One staking operation. Amounts are whole LST.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Stake { amount: u64, lockup_days: u64 },
    IncreaseAmount { amount: u64 },
    IncreaseLockup { days: u64 },
    InitiateUnstake { amount: u64 },
    Unstake { amount: u64 },
    InitiateEarlyUnstake { amount: u64 },
    EarlyUnstake { amount: u64 },
    Penalty {
        amount: u64,
        #[serde(default)]
        caller: Option<String>,
    },
}

impl Action {
    fn label(&self) -> String {
        match self {
            Action::Stake { amount, lockup_days } => {
                format!("stake {} LST for {}d", amount, lockup_days)
            }
            Action::IncreaseAmount { amount } => format!("increase amount +{} LST", amount),
            Action::IncreaseLockup { days } => format!("increase lockup +{}d", days),
            Action::InitiateUnstake { amount } => format!("initiate unstake {} LST", amount),
            Action::Unstake { amount } => format!("unstake {} LST", amount),
            Action::InitiateEarlyUnstake { amount } => {
                format!("initiate early unstake {} LST", amount)
            }
            Action::EarlyUnstake { amount } => format!("early unstake {} LST", amount),
            Action::Penalty { amount, .. } => format!("penalty {} LST", amount),
        }
    }
}

impl Scenario {
    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Account names in first-mention order.
    fn account_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        let mentioned = self
            .accounts
            .iter()
            .map(|f| &f.name)
            .chain(self.steps.iter().map(|s| &s.account));
        for name in mentioned {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }
}

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("step {index} at {at} is earlier than the previous step at {previous}")]
    OutOfOrder {
        index: usize,
        at: Timestamp,
        previous: Timestamp,
    },

    #[error("step {index} timestamp is out of range")]
    TimestampOverflow { index: usize },

    #[error("step {index} ({action}) failed: {source}")]
    StepFailed {
        index: usize,
        action: String,
        source: StakeError,
    },
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Tabled)]
pub struct StepRow {
    #[tabled(rename = "#")]
    pub step: usize,
    #[tabled(rename = "T+")]
    pub elapsed: String,
    #[tabled(rename = "Account")]
    pub account: String,
    #[tabled(rename = "Action")]
    pub action: String,
    #[tabled(rename = "Outcome")]
    pub outcome: String,
    #[tabled(skip)]
    pub ok: bool,
}

#[derive(Debug, Serialize, Tabled)]
pub struct AccountRow {
    #[tabled(rename = "Account")]
    pub account: String,
    #[tabled(rename = "State")]
    pub state: String,
    #[tabled(rename = "Staked")]
    pub staked: String,
    #[tabled(rename = "Locked")]
    pub locked: String,
    #[tabled(rename = "Unlocked")]
    pub unlocked: String,
    #[tabled(rename = "Cooldown")]
    pub cooldown: String,
    #[tabled(rename = "Ready")]
    pub ready: String,
    #[tabled(rename = "Early exit")]
    pub early_exit: String,
    #[tabled(rename = "Multiplier")]
    pub multiplier: String,
    #[tabled(rename = "Unlocks at")]
    pub unlock_at: String,
    #[tabled(rename = "Wallet")]
    pub wallet: String,
}

#[derive(Debug, Serialize, Tabled)]
pub struct EventRow {
    #[tabled(rename = "Event")]
    pub event: String,
    #[tabled(rename = "Account")]
    pub account: String,
    #[tabled(rename = "Details")]
    pub details: String,
}

#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub finished_at: String,
    pub total_staked: String,
    pub treasury: String,
    pub steps: Vec<StepRow>,
    pub accounts: Vec<AccountRow>,
    pub events: Vec<EventRow>,
}

fn describe(event: &StakingEvent) -> String {
    match event {
        StakingEvent::Staked {
            amount,
            multiplier,
            lockup,
            ..
        } => format!(
            "amount={} multiplier={} lockup={}",
            amount,
            format_bps(*multiplier),
            format_duration(*lockup)
        ),
        StakingEvent::AmountIncreased {
            delta,
            new_total,
            new_multiplier,
            ..
        } => format!(
            "delta={} total={} multiplier={}",
            delta,
            new_total,
            format_bps(*new_multiplier)
        ),
        StakingEvent::LockupIncreased {
            delta,
            new_lockup,
            new_multiplier,
            ..
        } => format!(
            "delta={} lockup={} multiplier={}",
            format_duration(*delta),
            format_duration(*new_lockup),
            format_bps(*new_multiplier)
        ),
        StakingEvent::UnstakeInitiated {
            timestamp,
            new_cooldown_total,
            ..
        } => format!(
            "at={} cooling={}",
            format_timestamp(*timestamp),
            new_cooldown_total
        ),
        StakingEvent::Unstaked { amount, .. } => format!("amount={}", amount),
        StakingEvent::EarlyUnstake {
            payout, penalty, ..
        } => format!("payout={} penalty={}", payout, penalty),
        StakingEvent::PenaltyApplied { actual_penalty, .. } => {
            format!("penalty={}", actual_penalty)
        }
    }
}

// ---------------------------------------------------------------------------
// Replay
// ---------------------------------------------------------------------------

fn whole(amount: u64) -> Result<Amount, StakeError> {
    Amount::from_tokens(u128::from(amount))
}

fn apply(
    engine: &StakingEngine,
    account: &AccountId,
    action: &Action,
    at: Timestamp,
    default_caller: &AccountId,
) -> Result<String, StakeError> {
    match action {
        Action::Stake {
            amount,
            lockup_days,
        } => {
            let p = engine.stake(account, whole(*amount)?, checked_days(*lockup_days)?, at)?;
            Ok(format!("multiplier {}", format_bps(p.effective_multiplier)))
        }
        Action::IncreaseAmount { amount } => {
            let p = engine.increase_amount(account, whole(*amount)?, at)?;
            Ok(format!(
                "total {}, lockup {}, multiplier {}",
                p.amount,
                format_duration(p.effective_lockup),
                format_bps(p.effective_multiplier)
            ))
        }
        Action::IncreaseLockup { days: d } => {
            let p = engine.increase_lockup(account, checked_days(*d)?, at)?;
            Ok(format!(
                "lockup {}, multiplier {}",
                format_duration(p.effective_lockup),
                format_bps(p.effective_multiplier)
            ))
        }
        Action::InitiateUnstake { amount } => {
            let p = engine.initiate_unstake(account, whole(*amount)?, at)?;
            Ok(format!("cooling {}", p.cooldown_amount))
        }
        Action::Unstake { amount } => {
            let paid = engine.unstake(account, whole(*amount)?, at)?;
            Ok(format!("paid {}", paid))
        }
        Action::InitiateEarlyUnstake { amount } => {
            let p = engine.initiate_early_unstake(account, whole(*amount)?, at)?;
            Ok(format!("queued {}", p.early_cooldown_amount))
        }
        Action::EarlyUnstake { amount } => {
            let exit = engine.early_unstake(account, whole(*amount)?, at)?;
            Ok(format!("paid {}, penalty {}", exit.payout, exit.penalty))
        }
        Action::Penalty { amount, caller } => {
            let caller = caller
                .as_deref()
                .map(resolve_account)
                .unwrap_or(*default_caller);
            let actual = engine.apply_penalty(&caller, account, whole(*amount)?, at)?;
            Ok(format!("deducted {}", actual))
        }
    }
}

/// Replay `scenario` under `config`.
pub fn simulate(
    scenario: &Scenario,
    config: &LockstakeConfig,
    strict: bool,
) -> Result<SimulationReport, Box<dyn std::error::Error>> {
    let settings = config.admin.to_settings()?;
    let treasury = settings.treasury;
    let ledger = Arc::new(InMemoryLedger::new());
    let events = Arc::new(EventLog::new());

    for funding in &scenario.accounts {
        ledger.mint(&resolve_account(&funding.name), whole(funding.balance)?)?;
    }
    let authority = resolve_account(&scenario.penalty_authority);
    let roles = RoleRegistry::new().with_member(Role::PenaltyAuthority, authority);

    let engine = StakingEngine::new(config.params.clone(), settings, ledger.clone(), Arc::new(roles))?
        .with_strategy(config.strategy.build())
        .with_event_sink(events.clone());
    tracing::info!(
        strategy = engine.strategy().name(),
        steps = scenario.steps.len(),
        accounts = scenario.accounts.len(),
        "replaying scenario"
    );

    let mut names: HashMap<AccountId, String> = HashMap::new();
    for name in scenario.account_names() {
        names.insert(resolve_account(&name), name);
    }
    names.insert(treasury, "treasury".to_string());

    let mut rows = Vec::with_capacity(scenario.steps.len());
    let mut previous = scenario.start;
    for (i, step) in scenario.steps.iter().enumerate() {
        let index = i + 1;
        let at = checked_days(step.day)
            .ok()
            .and_then(|offset| scenario.start.checked_add(offset))
            .and_then(|t| t.checked_add(step.seconds))
            .ok_or(ScenarioError::TimestampOverflow { index })?;
        if at < previous {
            return Err(ScenarioError::OutOfOrder {
                index,
                at,
                previous,
            }
            .into());
        }
        previous = at;

        let account = resolve_account(&step.account);
        let label = step.action.label();
        let (outcome, ok) = match apply(&engine, &account, &step.action, at, &authority) {
            Ok(message) => (message, true),
            Err(e) => {
                tracing::warn!(step = index, account = %step.account, error = %e, "step rejected");
                if strict {
                    return Err(ScenarioError::StepFailed {
                        index,
                        action: label,
                        source: e,
                    }
                    .into());
                }
                (format!("rejected: {}", e), false)
            }
        };
        rows.push(StepRow {
            step: index,
            elapsed: format_duration(at - scenario.start),
            account: step.account.clone(),
            action: label,
            outcome,
            ok,
        });
    }

    let now = previous;
    let accounts = scenario
        .account_names()
        .into_iter()
        .map(|name| {
            let id = resolve_account(&name);
            let summary = engine.get_summary(&id, now);
            AccountRow {
                account: name,
                state: summary.state.to_string(),
                staked: summary.total_staked.to_string(),
                locked: summary.locked_amount.to_string(),
                unlocked: summary.unlocked_amount.to_string(),
                cooldown: summary.cooldown_amount.to_string(),
                ready: summary.ready_amount.to_string(),
                early_exit: summary.early_exit_amount.to_string(),
                multiplier: format_bps(summary.multiplier),
                unlock_at: format_timestamp(summary.unlock_time),
                wallet: ledger.balance_of(&id).to_string(),
            }
        })
        .collect();

    let events = events
        .drain()
        .iter()
        .map(|event| EventRow {
            event: event.name().to_string(),
            account: names
                .get(event.account())
                .cloned()
                .unwrap_or_else(|| event.account().to_hex()),
            details: describe(event),
        })
        .collect();

    let total = Amount::from_wei(engine.total_staked_all())
        .map(|a| a.to_string())
        .unwrap_or_else(|_| format!("{} wei", engine.total_staked_all()));

    Ok(SimulationReport {
        finished_at: format_timestamp(now),
        total_staked: total,
        treasury: ledger.balance_of(&treasury).to_string(),
        steps: rows,
        accounts,
        events,
    })
}

/// Run the simulate command.
pub fn run(
    cmd: &SimulateCmd,
    config: &LockstakeConfig,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let contents = fs::read_to_string(&cmd.scenario)?;
    let scenario = Scenario::parse(&contents)?;
    let report = simulate(&scenario, config, cmd.strict)?;

    match format {
        OutputFormat::Json => println!("{}", format_json(&report)),
        OutputFormat::Table => {
            println!("Steps");
            println!("{}", format_table(&report.steps));
            println!();
            println!("Accounts at {}", report.finished_at);
            println!("{}", format_table(&report.accounts));
            println!();
            println!("Events");
            println!("{}", format_table(&report.events));
            println!();
            println!("Total staked: {}", report.total_staked);
            println!("Treasury:     {}", report.treasury);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROUND_TRIP: &str = r#"
        [[accounts]]
        name = "alice"
        balance = 5000

        [[steps]]
        day = 0
        account = "alice"
        action = "stake"
        amount = 1000
        lockup_days = 30

        [[steps]]
        day = 31
        account = "alice"
        action = "initiate_unstake"
        amount = 1000

        [[steps]]
        day = 33
        seconds = 1
        account = "alice"
        action = "unstake"
        amount = 1000
    "#;

    #[test]
    fn test_parse_scenario() {
        let scenario = Scenario::parse(ROUND_TRIP).unwrap();
        assert_eq!(scenario.start, 1_700_000_000);
        assert_eq!(scenario.steps.len(), 3);
        assert!(matches!(
            scenario.steps[0].action,
            Action::Stake {
                amount: 1000,
                lockup_days: 30
            }
        ));
        assert_eq!(scenario.steps[2].seconds, 1);
    }

    #[test]
    fn test_round_trip_scenario() {
        let scenario = Scenario::parse(ROUND_TRIP).unwrap();
        let report = simulate(&scenario, &LockstakeConfig::default(), true).unwrap();
        assert!(report.steps.iter().all(|s| s.ok));
        assert_eq!(report.steps[2].outcome, "paid 1000 LST");
        assert_eq!(report.accounts[0].state, "NoStake");
        assert_eq!(report.accounts[0].wallet, "5000 LST");
        let names: Vec<&str> = report.events.iter().map(|e| e.event.as_str()).collect();
        assert_eq!(names, ["Staked", "UnstakeInitiated", "Unstaked"]);
    }

    #[test]
    fn test_rejected_step_recorded() {
        let toml = r#"
            [[accounts]]
            name = "alice"
            balance = 5000

            [[steps]]
            day = 0
            account = "alice"
            action = "stake"
            amount = 1000
            lockup_days = 30

            [[steps]]
            day = 1
            account = "alice"
            action = "initiate_unstake"
            amount = 1000
        "#;
        let scenario = Scenario::parse(toml).unwrap();
        let report = simulate(&scenario, &LockstakeConfig::default(), false).unwrap();
        assert!(!report.steps[1].ok);
        assert!(report.steps[1].outcome.starts_with("rejected"));

        let err = simulate(&scenario, &LockstakeConfig::default(), true).unwrap_err();
        assert!(err.to_string().contains("step 2"));
    }

    #[test]
    fn test_out_of_order_steps() {
        let toml = r#"
            [[steps]]
            day = 5
            account = "alice"
            action = "increase_lockup"
            days = 30

            [[steps]]
            day = 4
            account = "alice"
            action = "increase_lockup"
            days = 30
        "#;
        let scenario = Scenario::parse(toml).unwrap();
        let err = simulate(&scenario, &LockstakeConfig::default(), false).unwrap_err();
        assert!(err.to_string().contains("earlier than the previous step"));
    }

    #[test]
    fn test_huge_day_counts_rejected() {
        let toml = r#"
            [[accounts]]
            name = "alice"
            balance = 5000

            [[steps]]
            day = 0
            account = "alice"
            action = "stake"
            amount = 1000
            lockup_days = 144115188075855902
        "#;
        let scenario = Scenario::parse(toml).unwrap();
        let report = simulate(&scenario, &LockstakeConfig::default(), false).unwrap();
        assert!(!report.steps[0].ok);
        assert_eq!(report.accounts[0].staked, "0 LST");

        let toml = r#"
            [[steps]]
            day = 213503982334602
            account = "alice"
            action = "increase_lockup"
            days = 30
        "#;
        let scenario = Scenario::parse(toml).unwrap();
        let err = simulate(&scenario, &LockstakeConfig::default(), false).unwrap_err();
        assert!(err.to_string().contains("timestamp is out of range"));
    }

    #[test]
    fn test_penalty_uses_default_authority() {
        let toml = r#"
            penalty_authority = "slasher"

            [[accounts]]
            name = "alice"
            balance = 2000

            [[steps]]
            day = 0
            account = "alice"
            action = "stake"
            amount = 2000
            lockup_days = 90

            [[steps]]
            day = 1
            account = "alice"
            action = "penalty"
            amount = 500

            [[steps]]
            day = 1
            account = "alice"
            action = "penalty"
            amount = 500
            caller = "alice"
        "#;
        let scenario = Scenario::parse(toml).unwrap();
        let report = simulate(&scenario, &LockstakeConfig::default(), false).unwrap();
        assert!(report.steps[1].ok);
        assert_eq!(report.steps[1].outcome, "deducted 500 LST");
        assert!(!report.steps[2].ok);
        assert_eq!(report.treasury, "500 LST");
        assert_eq!(report.accounts[0].staked, "1500 LST");
    }
}
