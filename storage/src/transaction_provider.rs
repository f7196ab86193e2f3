use chain::Transaction;
use hash::H256;

/// Position of a connected transaction within the main chain.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct TransactionIndex {
	/// Height of the block the transaction is part of.
	pub height: u32,
	/// Position of the transaction within its block.
	pub position: u32,
}

/// Read-only access to transactions of connected blocks.
pub trait TransactionProvider {
	/// Does the store contain the transaction?
	fn contains_transaction(&self, hash: &H256) -> bool {
		self.transaction(hash).is_some()
	}

	/// Resolve transaction body by its hash.
	fn transaction(&self, hash: &H256) -> Option<Transaction>;

	/// Resolve (height, position-in-block) by transaction hash.
	fn transaction_index(&self, hash: &H256) -> Option<TransactionIndex>;
}
