use chain::OutPoint;
use hash::{H160, H256};
use input_point::InputPoint;

/// Kind of a history row.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum HistoryKind {
	/// Address received an output.
	Output,
	/// An output of the address was spent.
	Spend,
}

/// Single row of per-address history.
#[derive(Debug, PartialEq, Clone)]
pub struct HistoryRow {
	pub kind: HistoryKind,
	/// Received outpoint for `Output` rows, spent outpoint for `Spend` rows.
	pub point: OutPoint,
	/// Spender, for `Spend` rows.
	pub spender: Option<InputPoint>,
	/// Height of the block the row was produced by.
	pub height: u32,
	/// Output value; zero for `Spend` rows.
	pub value: u64,
}

/// Read-only access to the per-address history index.
pub trait HistoryProvider {
	/// History of the given address hash, oldest first, starting at
	/// `from_height`, at most `limit` rows (zero for no limit).
	fn history(&self, address_hash: &H160, limit: u64, from_height: u32) -> Vec<HistoryRow>;
}

/// Query prefix for the stealth index: the leading `bits` of `prefix`
/// must match a row's prefix word.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct StealthPrefix {
	pub bits: u8,
	pub prefix: u32,
}

impl StealthPrefix {
	pub fn matches(&self, row_prefix: u32) -> bool {
		if self.bits == 0 {
			return true;
		}

		let shift = 32 - self.bits as u32;
		(row_prefix >> shift) == (self.prefix >> shift)
	}
}

/// Single row of the stealth index.
#[derive(Debug, PartialEq, Clone)]
pub struct StealthRow {
	/// Prefix word derived from the data-carrier output script.
	pub prefix: u32,
	/// Hash of the transaction carrying the output.
	pub tx_hash: H256,
	/// Height of the block the row was produced by.
	pub height: u32,
}

/// Read-only access to the stealth index.
pub trait StealthProvider {
	/// Rows matching the prefix, starting at `from_height`.
	fn stealth(&self, prefix: StealthPrefix, from_height: u32) -> Vec<StealthRow>;
}
