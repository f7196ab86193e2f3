//! Chain view used while validating a candidate chain: heights up to the
//! fork point resolve from the store, heights above it from the candidate
//! (orphan) chain.

use chain::{BlockHeader, IndexedBlock, OutPoint, Transaction};
use primitives::compact::Compact;
use primitives::hash::H256;
use storage::{BlockHeaderProvider, TransactionProvider, UtxoProvider};
use constants::MEDIAN_TIMESPAN;

/// Store access the view needs.
pub trait ForkStore: BlockHeaderProvider + TransactionProvider + UtxoProvider {}

impl<T> ForkStore for T where T: BlockHeaderProvider + TransactionProvider + UtxoProvider {}

/// Read access to the chain being built out of a candidate (orphan) chain
/// rooted at `fork_height` on the main chain.
///
/// `orphan_index` is the position of the block under validation within the
/// candidate chain; lookups never reach past it.
pub struct ForkChainView<'a> {
	store: &'a ForkStore,
	/// Height of the last block common to the main chain and the candidate
	/// chain; `None` when the candidate chain starts at the genesis height.
	fork_height: Option<u32>,
	orphan_chain: &'a [IndexedBlock],
	orphan_index: usize,
}

impl<'a> ForkChainView<'a> {
	pub fn new(
		store: &'a ForkStore,
		fork_height: Option<u32>,
		orphan_chain: &'a [IndexedBlock],
		orphan_index: usize,
	) -> Self {
		debug_assert!(orphan_index < orphan_chain.len());
		ForkChainView {
			store: store,
			fork_height: fork_height,
			orphan_chain: orphan_chain,
			orphan_index: orphan_index,
		}
	}

	/// Height of the first block of the candidate chain.
	fn first_orphan_height(&self) -> u32 {
		match self.fork_height {
			Some(fork_height) => fork_height + 1,
			None => 0,
		}
	}

	/// Is the height on the main-chain side of the fork?
	pub fn is_main_chain_height(&self, height: u32) -> bool {
		match self.fork_height {
			Some(fork_height) => height <= fork_height,
			None => false,
		}
	}

	/// Header of the block at the given height, on either side of the fork.
	pub fn block_header(&self, height: u32) -> Option<BlockHeader> {
		if self.is_main_chain_height(height) {
			return self.store.block_header(height.into());
		}

		let position = (height - self.first_orphan_height()) as usize;
		if position > self.orphan_index {
			return None;
		}

		self.orphan_chain.get(position).map(|block| block.header.raw.clone())
	}

	/// Bits of the block preceding the given height.
	pub fn previous_block_bits(&self, height: u32) -> Compact {
		debug_assert!(height > 0);
		self.block_header(height - 1)
			.expect("blocks below the one under validation exist on one side of the fork; qed")
			.bits
	}

	/// Versions of up to `maximum` headers preceding the given height,
	/// newest first. Versions above 255 are clamped, as a few historical
	/// blocks carry them.
	pub fn preceding_block_versions(&self, height: u32, maximum: usize) -> Vec<u8> {
		let count = ::std::cmp::min(maximum as u32, height);
		(0..count)
			.map(|index| {
				let version = self.block_header(height - index - 1)
					.expect("headers below the validated height exist; qed")
					.version;
				::std::cmp::min(version, u8::max_value() as u32) as u8
			})
			.collect()
	}

	/// Time difference between the headers at `height - 1` and
	/// `height - interval`.
	pub fn actual_timespan(&self, height: u32, interval: u32) -> i64 {
		debug_assert!(height >= interval);
		let last = self.block_header(height - 1)
			.expect("headers below the validated height exist; qed");
		let first = self.block_header(height - interval)
			.expect("headers below the validated height exist; qed");
		last.time as i64 - first.time as i64
	}

	/// Median timestamp of the headers preceding the given height.
	pub fn median_time_past(&self, height: u32) -> u32 {
		let count = ::std::cmp::min(MEDIAN_TIMESPAN as u32, height);
		let mut timestamps: Vec<u32> = (0..count)
			.map(|index| self.block_header(height - index - 1)
				.expect("headers below the validated height exist; qed")
				.time)
			.collect();

		if timestamps.is_empty() {
			return 0;
		}

		timestamps.sort();
		timestamps[timestamps.len() / 2]
	}

	/// Resolve a transaction and the height it was connected at: the main
	/// chain below the fork first, the candidate chain up to and including
	/// the block under validation second.
	pub fn transaction_with_height(&self, hash: &H256) -> Option<(Transaction, u32)> {
		if let Some(index) = self.store.transaction_index(hash) {
			if self.is_main_chain_height(index.height) {
				let transaction = self.store.transaction(hash)
					.expect("transaction index entries reference stored transactions; qed");
				return Some((transaction, index.height));
			}
		}

		self.orphan_transaction_with_height(hash)
	}

	fn orphan_transaction_with_height(&self, hash: &H256) -> Option<(Transaction, u32)> {
		for (position, orphan_block) in self.orphan_chain.iter().take(self.orphan_index + 1).enumerate() {
			for orphan_tx in &orphan_block.transactions {
				if orphan_tx.hash == *hash {
					return Some((orphan_tx.raw.clone(), self.first_orphan_height() + position as u32));
				}
			}
		}

		None
	}

	/// Does the transaction exist in the main chain below the fork?
	pub fn transaction_exists(&self, hash: &H256) -> bool {
		self.store.transaction_index(hash)
			.map(|index| self.is_main_chain_height(index.height))
			.unwrap_or(false)
	}

	/// Is the main-chain outpoint spent? Valid only for outpoints whose
	/// producing transaction is on the main-chain side of the fork: there
	/// an outpoint is unspent iff the unspent-output index holds it.
	pub fn is_main_chain_spent(&self, outpoint: &OutPoint) -> bool {
		!self.store.is_unspent(outpoint)
	}

	/// Is the outpoint spent by any candidate-chain input before (and
	/// including) the block under validation? The input at
	/// (`skip_transaction`, `skip_input`) of that block is the one being
	/// connected and is excluded.
	pub fn is_orphan_spent(&self, outpoint: &OutPoint, skip_transaction: usize, skip_input: usize) -> bool {
		for (position, orphan_block) in self.orphan_chain.iter().take(self.orphan_index + 1).enumerate() {
			let transactions = &orphan_block.transactions;
			debug_assert!(!transactions.is_empty());

			for (tx_index, orphan_tx) in transactions.iter().enumerate() {
				for (input_index, orphan_input) in orphan_tx.raw.inputs.iter().enumerate() {
					if position == self.orphan_index && tx_index == skip_transaction && input_index == skip_input {
						continue;
					}

					if orphan_input.previous_output == *outpoint {
						return true;
					}
				}
			}
		}

		false
	}
}
