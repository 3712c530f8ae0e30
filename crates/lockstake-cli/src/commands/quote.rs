// crates/lockstake-cli/src/commands/quote.rs
//
// `lockstake quote`: compute the multiplier for one (amount, lockup) pair
// and show how it splits into the duration and amount components.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use lockstake_core::{checked_days, Amount, BasisPoints};
use lockstake_economics::multiplier::duration_multiplier;
use lockstake_economics::MultiplierStrategy;

use crate::output::{format_bps, format_json, format_table, OutputFormat};

/// Arguments for `lockstake quote`.
#[derive(Debug, Args)]
pub struct QuoteCmd {
    /// Stake amount in whole LST.
    #[arg(long)]
    pub amount: u128,

    /// Lockup duration in days (30..=365).
    #[arg(long)]
    pub days: u64,
}

/// One quote, as printed.
#[derive(Debug, Serialize, Tabled)]
pub struct QuoteRow {
    #[tabled(rename = "Strategy")]
    pub strategy: String,
    #[tabled(rename = "Amount")]
    pub amount: String,
    #[tabled(rename = "Lockup (days)")]
    pub lockup_days: u64,
    #[tabled(rename = "Duration (bps)")]
    pub duration_bps: BasisPoints,
    #[tabled(rename = "Bonus (bps)")]
    pub bonus_bps: BasisPoints,
    #[tabled(rename = "Multiplier (bps)")]
    pub multiplier_bps: BasisPoints,
    #[tabled(rename = "Multiplier")]
    pub multiplier: String,
}

/// Compute the quote without printing it.
pub fn quote(
    strategy: &dyn MultiplierStrategy,
    tokens: u128,
    lockup_days: u64,
) -> Result<QuoteRow, Box<dyn std::error::Error>> {
    let amount = Amount::from_tokens(tokens)?;
    let lockup = checked_days(lockup_days)?;
    let total = strategy.multiplier(amount, lockup)?;
    let duration = duration_multiplier(lockup)?;
    Ok(QuoteRow {
        strategy: strategy.name().to_string(),
        amount: amount.to_string(),
        lockup_days,
        duration_bps: duration,
        bonus_bps: total - duration,
        multiplier_bps: total,
        multiplier: format_bps(total),
    })
}

/// Run the quote command.
pub fn run(
    cmd: &QuoteCmd,
    strategy: &dyn MultiplierStrategy,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let row = quote(strategy, cmd.amount, cmd.days)?;
    tracing::debug!(multiplier = row.multiplier_bps, "quote computed");
    match format {
        OutputFormat::Table => println!("{}", format_table(&[row])),
        OutputFormat::Json => println!("{}", format_json(&row)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockstake_economics::{LogarithmicBonus, TieredBonus};

    #[test]
    fn test_quote_splits_components() {
        let row = quote(&TieredBonus, 10_000, 365).unwrap();
        assert_eq!(row.duration_bps, 15_000);
        assert_eq!(row.bonus_bps, 4_500);
        assert_eq!(row.multiplier_bps, 19_500);
        assert_eq!(row.multiplier, "1.9500x");
        assert_eq!(row.strategy, "tiered");
    }

    #[test]
    fn test_quote_logarithmic() {
        // 4_000 / 1_000 = 4 -> log2 = 2 -> 3_000 bps
        let row = quote(&LogarithmicBonus, 4_000, 90).unwrap();
        assert_eq!(row.bonus_bps, 3_000);
        assert_eq!(row.multiplier_bps, 14_000);
    }

    #[test]
    fn test_quote_rejects_short_lockup() {
        assert!(quote(&TieredBonus, 1_000, 10).is_err());
    }

    #[test]
    fn test_quote_rejects_huge_lockup() {
        // Wrapping 2^57 + 30 days to seconds would land on exactly 30 days.
        assert!(quote(&TieredBonus, 1_000, 30 + (1u64 << 57)).is_err());
        assert!(quote(&TieredBonus, 1_000, u64::MAX).is_err());
    }

    #[test]
    fn test_quote_rejects_small_amount() {
        assert!(quote(&TieredBonus, 999, 30).is_err());
    }
}
