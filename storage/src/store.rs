use std::sync::Arc;
use best_block::BestBlock;
use {
	BlockProvider, BlockHeaderProvider, TransactionProvider, UtxoProvider,
	HistoryProvider, StealthProvider,
};

/// Blockchain storage interface
pub trait Store: AsSubstore {
	/// Get best block; `None` for an empty store.
	fn best_block(&self) -> Option<BestBlock>;
}

/// Allows casting `Arc<Store>` to reference to any substore type
pub trait AsSubstore:
	BlockProvider +
	TransactionProvider +
	UtxoProvider +
	HistoryProvider +
	StealthProvider
{
	fn as_block_provider(&self) -> &BlockProvider;

	fn as_block_header_provider(&self) -> &BlockHeaderProvider;

	fn as_transaction_provider(&self) -> &TransactionProvider;

	fn as_utxo_provider(&self) -> &UtxoProvider;

	fn as_history_provider(&self) -> &HistoryProvider;

	fn as_stealth_provider(&self) -> &StealthProvider;
}

impl<T> AsSubstore for T
	where T: BlockProvider +
		TransactionProvider +
		UtxoProvider +
		HistoryProvider +
		StealthProvider
{
	fn as_block_provider(&self) -> &BlockProvider {
		&*self
	}

	fn as_block_header_provider(&self) -> &BlockHeaderProvider {
		&*self
	}

	fn as_transaction_provider(&self) -> &TransactionProvider {
		&*self
	}

	fn as_utxo_provider(&self) -> &UtxoProvider {
		&*self
	}

	fn as_history_provider(&self) -> &HistoryProvider {
		&*self
	}

	fn as_stealth_provider(&self) -> &StealthProvider {
		&*self
	}
}

pub type SharedStore = Arc<Store + Send + Sync>;
