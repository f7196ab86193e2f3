use chain::OutPoint;
use input_point::InputPoint;

/// Statistical info about the unspent-output index.
#[derive(Debug, Clone, PartialEq)]
pub struct UtxoStatInfo {
	/// Number of buckets used in the hashtable.
	/// load factor = rows / buckets
	pub buckets: u64,
	/// Total number of utxo rows ever allocated.
	pub rows: u64,
}

/// Read-only access to the unspent-output index.
///
/// An outpoint is present iff it is unspent on the main chain.
pub trait UtxoProvider {
	/// Resolve the recorded input point of an unspent outpoint.
	fn utxo(&self, outpoint: &OutPoint) -> Option<InputPoint>;

	/// Is the outpoint unspent on the main chain?
	fn is_unspent(&self, outpoint: &OutPoint) -> bool {
		self.utxo(outpoint).is_some()
	}

	/// Index statistics.
	fn utxo_statinfo(&self) -> UtxoStatInfo;
}
