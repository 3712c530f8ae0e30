// crates/lockstake-cli/src/commands/matrix.rs
//
// `lockstake matrix`: sweep the multiplier over amount and lockup grids.
//
// Table mode prints CSV with the header `tokens,lockup_days,multiplier`,
// the format the charting notebooks read.

use clap::Args;

use lockstake_economics::{sweep, MultiplierStrategy, SweepRow};

use crate::output::{format_json, OutputFormat};

/// Arguments for `lockstake matrix`.
#[derive(Debug, Args)]
pub struct MatrixCmd {
    /// Comma-separated stake amounts in whole LST.
    #[arg(
        long,
        value_delimiter = ',',
        default_values_t = vec![1_000u128, 2_000, 4_000, 6_000, 8_000, 10_000]
    )]
    pub amounts: Vec<u128>,

    /// Comma-separated lockup durations in days.
    #[arg(
        long,
        value_delimiter = ',',
        default_values_t = vec![30u64, 60, 90, 120, 180, 270, 365]
    )]
    pub days: Vec<u64>,
}

/// Render sweep rows as CSV.
pub fn render_csv(rows: &[SweepRow]) -> String {
    let mut out = String::from("tokens,lockup_days,multiplier\n");
    for row in rows {
        out.push_str(&format!("{},{},{}\n", row.tokens, row.lockup_days, row.multiplier));
    }
    out
}

/// Run the matrix command.
pub fn run(
    cmd: &MatrixCmd,
    strategy: &dyn MultiplierStrategy,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let rows = sweep(strategy, &cmd.amounts, &cmd.days)?;
    tracing::info!(
        strategy = strategy.name(),
        rows = rows.len(),
        "multiplier matrix computed"
    );
    match format {
        OutputFormat::Table => print!("{}", render_csv(&rows)),
        OutputFormat::Json => println!("{}", format_json(&rows)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockstake_economics::TieredBonus;

    #[test]
    fn test_render_csv() {
        let rows = sweep(&TieredBonus, &[1_000, 10_000], &[30, 365]).unwrap();
        let csv = render_csv(&rows);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "tokens,lockup_days,multiplier");
        assert_eq!(lines[1], "1000,30,10500");
        assert_eq!(lines[2], "10000,30,15000");
        assert_eq!(lines[4], "10000,365,19500");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_sweep_rejects_out_of_range_lockup() {
        assert!(sweep(&TieredBonus, &[1_000], &[400]).is_err());
    }
}
