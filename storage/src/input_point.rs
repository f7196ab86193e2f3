use hash::H256;

/// The spender side of a transaction output: the transaction and input
/// index that consume (or last consumed) an outpoint.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct InputPoint {
	pub hash: H256,
	pub index: u32,
}

impl InputPoint {
	/// Input point of an output nothing has spent yet.
	pub fn null() -> Self {
		InputPoint {
			hash: H256::default(),
			index: u32::max_value(),
		}
	}

	pub fn is_null(&self) -> bool {
		self.hash.is_zero() && self.index == u32::max_value()
	}
}
