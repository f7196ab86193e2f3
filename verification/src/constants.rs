//! Consensus constants.

/// Maximum serialized block size.
pub const MAX_BLOCK_SIZE: usize = 1_000_000;

/// Maximum number of signature operations in a block.
pub const MAX_BLOCK_SIGOPS: usize = MAX_BLOCK_SIZE / 50;

/// Number of blocks before a spent coinbase output may itself be spent.
pub const COINBASE_MATURITY: u32 = 100;

/// Total currency cap, in satoshis.
pub const MAX_MONEY: u64 = 21_000_000 * 100_000_000;

/// How far in the future a block timestamp may lie (seconds).
pub const BLOCK_MAX_FUTURE: u32 = 2 * 60 * 60;

/// Number of preceding headers the past-median time is computed over.
pub const MEDIAN_TIMESPAN: usize = 11;

/// Coinbase input script size bounds.
pub const MIN_COINBASE_SIZE: usize = 2;
pub const MAX_COINBASE_SIZE: usize = 100;

/// Target difficulty readjustment period (seconds): two weeks.
pub const TARGET_TIMESPAN_SECONDS: u32 = 2 * 7 * 24 * 60 * 60;

/// Target interval between blocks (seconds).
pub const TARGET_SPACING_SECONDS: u32 = 10 * 60;

/// Two weeks worth of blocks: the retargeting interval.
pub const RETARGETING_INTERVAL: u32 = TARGET_TIMESPAN_SECONDS / TARGET_SPACING_SECONDS;

/// Testnet allows a minimum-difficulty block once no block has appeared
/// for twice the target spacing.
pub const DOUBLE_SPACING_SECONDS: u32 = 2 * TARGET_SPACING_SECONDS;
