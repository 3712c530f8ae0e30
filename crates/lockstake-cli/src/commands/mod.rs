// crates/lockstake-cli/src/commands/mod.rs
//
// Command module declarations for the Lockstake CLI.

pub mod matrix;
pub mod quote;
pub mod simulate;
