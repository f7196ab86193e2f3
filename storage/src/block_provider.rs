use chain::{Block, BlockHeader, IndexedBlock};
use hash::H256;
use block_ref::BlockRef;

/// Read-only access to persisted block headers.
pub trait BlockHeaderProvider {
	/// Resolve header by block reference.
	fn block_header(&self, block_ref: BlockRef) -> Option<BlockHeader>;

	/// Resolve height by block hash.
	fn block_number(&self, hash: &H256) -> Option<u32>;

	/// Resolve hash by block height.
	fn block_hash(&self, number: u32) -> Option<H256>;
}

/// Read-only access to persisted blocks.
pub trait BlockProvider: BlockHeaderProvider {
	/// Does the store contain the block?
	fn contains_block(&self, block_ref: BlockRef) -> bool {
		self.block_header(block_ref).is_some()
	}

	/// Resolve the full block.
	fn block(&self, block_ref: BlockRef) -> Option<Block>;

	/// Resolve the full block with cached hashes.
	fn indexed_block(&self, block_ref: BlockRef) -> Option<IndexedBlock> {
		self.block(block_ref).map(IndexedBlock::from_raw)
	}

	/// Hashes of the block transactions, in block order.
	fn block_transaction_hashes(&self, block_ref: BlockRef) -> Vec<H256>;
}
