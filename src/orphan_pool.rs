//! Bounded pool of received blocks not yet on the main chain.

use std::collections::{HashMap, VecDeque};
use chain::IndexedBlock;
use primitives::hash::H256;

/// Blocks waiting for a parent or for enough work, keyed by hash and
/// linked by previous-block hash. Capacity is fixed; the oldest entry is
/// evicted on overflow.
pub struct OrphanPool {
	capacity: usize,
	/// Insertion order, oldest first.
	order: VecDeque<H256>,
	blocks: HashMap<H256, IndexedBlock>,
	/// previous-block hash -> blocks waiting on it
	by_previous: HashMap<H256, Vec<H256>>,
}

impl OrphanPool {
	pub fn new(capacity: usize) -> Self {
		OrphanPool {
			capacity: capacity,
			order: VecDeque::new(),
			blocks: HashMap::new(),
			by_previous: HashMap::new(),
		}
	}

	pub fn len(&self) -> usize {
		self.blocks.len()
	}

	pub fn capacity(&self) -> usize {
		self.capacity
	}

	pub fn contains(&self, hash: &H256) -> bool {
		self.blocks.contains_key(hash)
	}

	/// Add a block. Returns false if a block with the same hash is already
	/// pooled. The oldest block is evicted when the pool is full.
	pub fn add(&mut self, block: IndexedBlock) -> bool {
		let hash = block.hash().clone();
		if self.blocks.contains_key(&hash) {
			return false;
		}

		if self.blocks.len() == self.capacity {
			if let Some(oldest) = self.order.front().cloned() {
				trace!(target: "chain", "orphan pool is full, evicting {}", oldest.to_reversed_str());
				self.remove(&oldest);
			}
		}

		self.by_previous.entry(block.header.raw.previous_header_hash.clone())
			.or_insert_with(Vec::new)
			.push(hash.clone());
		self.order.push_back(hash.clone());
		self.blocks.insert(hash, block);
		true
	}

	pub fn block(&self, hash: &H256) -> Option<&IndexedBlock> {
		self.blocks.get(hash)
	}

	/// Remove and return a block, transferring ownership to the caller.
	pub fn remove(&mut self, hash: &H256) -> Option<IndexedBlock> {
		let block = self.blocks.remove(hash)?;

		self.order.retain(|pooled| pooled != hash);

		let previous = block.header.raw.previous_header_hash.clone();
		let children_left = {
			let children = self.by_previous.get_mut(&previous);
			match children {
				Some(children) => {
					children.retain(|child| child != hash);
					!children.is_empty()
				},
				None => false,
			}
		};
		if !children_left {
			self.by_previous.remove(&previous);
		}

		Some(block)
	}

	/// Hashes of blocks waiting on the given parent.
	pub fn children_of(&self, previous: &H256) -> Vec<H256> {
		self.by_previous.get(previous).cloned().unwrap_or_default()
	}

	/// Pooled hashes in insertion order.
	pub fn hashes(&self) -> Vec<H256> {
		self.order.iter().cloned().collect()
	}
}

#[cfg(test)]
mod tests {
	use chain::IndexedBlock;
	use network::Network;
	use test_chain::ChainBuilder;
	use super::OrphanPool;

	#[test]
	fn test_orphan_pool_add_remove() {
		let blocks = ChainBuilder::new(Network::Unitest).generate(3);
		let mut pool = OrphanPool::new(10);

		assert!(pool.add(blocks[0].clone()));
		assert!(!pool.add(blocks[0].clone()));
		assert!(pool.add(blocks[1].clone()));

		assert_eq!(pool.len(), 2);
		assert!(pool.contains(blocks[0].hash()));

		let removed = pool.remove(blocks[0].hash()).unwrap();
		assert_eq!(&removed, &blocks[0]);
		assert!(!pool.contains(blocks[0].hash()));
		assert_eq!(pool.remove(blocks[0].hash()), None);
	}

	#[test]
	fn test_orphan_pool_children_index() {
		let blocks = ChainBuilder::new(Network::Unitest).generate(2);
		let mut pool = OrphanPool::new(10);
		pool.add(blocks[1].clone());

		let children = pool.children_of(blocks[0].hash());
		assert_eq!(children, vec![blocks[1].hash().clone()]);
	}

	#[test]
	fn test_orphan_pool_evicts_oldest() {
		let blocks = ChainBuilder::new(Network::Unitest).generate(3);
		let mut pool = OrphanPool::new(2);

		pool.add(blocks[0].clone());
		pool.add(blocks[1].clone());
		pool.add(blocks[2].clone());

		assert_eq!(pool.len(), 2);
		assert!(!pool.contains(blocks[0].hash()));
		assert!(pool.contains(blocks[1].hash()));
		assert!(pool.contains(blocks[2].hash()));
	}

	#[test]
	fn test_orphan_pool_remove_missing() {
		let mut pool = OrphanPool::new(2);
		let missing: IndexedBlock = Network::Unitest.genesis_block().into();
		assert_eq!(pool.remove(missing.hash()), None);
	}
}
