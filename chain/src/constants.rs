// Below flags apply in the context of BIP68.
/// If this flag set, `TransactionInput::sequence` is NOT interpreted as a
/// relative lock-time.
pub const SEQUENCE_LOCKTIME_DISABLE_FLAG: u32 = 1u32 << 31;

/// Setting `sequence` to this value for every input in a transaction
/// disables the lock-time.
pub const SEQUENCE_FINAL: u32 = 0xffff_ffff;

/// Threshold for `lock_time`: below this value it is interpreted as a block
/// number, otherwise as UNIX timestamp.
pub const LOCKTIME_THRESHOLD: u32 = 500_000_000; // Tue Nov 5 00:53:20 1985 UTC
