// crates/lockstake-core/src/token.rs
//
// $LST token amount type and unit constants.
//
// The smallest unit of $LST is the "wei". 1 LST = 10^18 wei. All internal
// accounting uses integer wei; there is no floating point anywhere in the
// staking arithmetic.
//
// Stake amounts are persisted in a 96-bit field, so `Amount` refuses any
// value above 2^96 - 1 at construction instead of truncating later.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::StakeError;

/// Number of wei in one LST. 1 LST = 10^18 wei.
pub const WEI_PER_TOKEN: u128 = 1_000_000_000_000_000_000;

/// Largest representable stake amount in wei (2^96 - 1).
pub const MAX_AMOUNT_WEI: u128 = (1u128 << 96) - 1;

/// Unix timestamp in seconds.
pub type Timestamp = u64;

/// A duration in seconds.
pub type Seconds = u64;

/// Basis points: 10_000 = 100% (or 1.00x for multipliers).
pub type BasisPoints = u32;

/// 10_000 basis points.
pub const BASIS_POINTS: BasisPoints = 10_000;

/// Seconds in one day.
pub const SECONDS_PER_DAY: Seconds = 86_400;

/// Convert whole days to seconds. For literal durations only; day counts
/// from input go through [`checked_days`].
pub const fn days(n: u64) -> Seconds {
    n * SECONDS_PER_DAY
}

/// Convert a day count from input to seconds.
///
/// # Errors
/// Returns `StakeError::ArithmeticOverflow` if the result does not fit.
pub fn checked_days(n: u64) -> Result<Seconds, StakeError> {
    n.checked_mul(SECONDS_PER_DAY)
        .ok_or(StakeError::ArithmeticOverflow { context: "day count" })
}

/// An $LST amount in wei, range-checked to the 96-bit storage width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u128", into = "u128")]
pub struct Amount(u128);

impl Amount {
    /// Zero LST.
    pub const ZERO: Amount = Amount(0);

    /// The largest storable amount.
    pub const MAX: Amount = Amount(MAX_AMOUNT_WEI);

    /// Create an amount from a wei value.
    ///
    /// # Errors
    /// Returns `StakeError::StakeAmountTooLarge` if `wei` exceeds 2^96 - 1.
    pub fn from_wei(wei: u128) -> Result<Self, StakeError> {
        if wei > MAX_AMOUNT_WEI {
            return Err(StakeError::StakeAmountTooLarge { value: wei });
        }
        Ok(Self(wei))
    }

    /// Create an amount from a whole-token value.
    pub fn from_tokens(tokens: u128) -> Result<Self, StakeError> {
        let wei = tokens
            .checked_mul(WEI_PER_TOKEN)
            .ok_or(StakeError::StakeAmountTooLarge { value: u128::MAX })?;
        Self::from_wei(wei)
    }

    /// The raw wei value.
    pub fn wei(self) -> u128 {
        self.0
    }

    /// Whole tokens, truncated.
    pub fn whole_tokens(self) -> u128 {
        self.0 / WEI_PER_TOKEN
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Add two amounts, failing if the sum leaves the storage range.
    pub fn checked_add(self, rhs: Amount) -> Result<Amount, StakeError> {
        let sum = self
            .0
            .checked_add(rhs.0)
            .ok_or(StakeError::StakeAmountTooLarge { value: u128::MAX })?;
        Amount::from_wei(sum)
    }

    /// Subtract, returning `None` on underflow.
    pub fn checked_sub(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_sub(rhs.0).map(Amount)
    }

    pub fn saturating_sub(self, rhs: Amount) -> Amount {
        Amount(self.0.saturating_sub(rhs.0))
    }

    /// `self * bps / 10_000`, rounded down.
    pub fn mul_bps(self, bps: BasisPoints) -> Amount {
        // 2^96 * 10_000 < 2^128, so this cannot overflow.
        Amount(self.0 * u128::from(bps) / u128::from(BASIS_POINTS))
    }
}

impl TryFrom<u128> for Amount {
    type Error = StakeError;

    fn try_from(wei: u128) -> Result<Self, Self::Error> {
        Amount::from_wei(wei)
    }
}

impl From<Amount> for u128 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / WEI_PER_TOKEN;
        let frac = self.0 % WEI_PER_TOKEN;
        if frac == 0 {
            write!(f, "{} LST", whole)
        } else {
            let frac_str = format!("{:018}", frac);
            let trimmed = frac_str.trim_end_matches('0');
            write!(f, "{}.{} LST", whole, trimmed)
        }
    }
}
