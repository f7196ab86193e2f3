//! Deterministic block builder for tests.

use chain::{Block, BlockHeader, IndexedBlock, OutPoint, Transaction, TransactionInput, TransactionOutput};
use network::Network;
use primitives::hash::H256;
use verification::is_valid_proof_of_work_hash;

/// Builds valid test chains on top of the network genesis block.
pub struct ChainBuilder {
	network: Network,
}

impl ChainBuilder {
	pub fn new(network: Network) -> Self {
		ChainBuilder {
			network: network,
		}
	}

	pub fn genesis(&self) -> IndexedBlock {
		self.network.genesis_block().into()
	}

	/// A coinbase that mints the full subsidy; `salt` makes the hash of
	/// otherwise identical coinbases differ between chains.
	pub fn coinbase(&self, salt: u32) -> Transaction {
		let mut script_sig = vec![0x04];
		script_sig.extend_from_slice(&salt.to_le_bytes());

		Transaction {
			version: 1,
			inputs: vec![TransactionInput::coinbase(script_sig.into())],
			outputs: vec![TransactionOutput {
				value: 50 * 100_000_000,
				script_pubkey: "76a914404371705fa9bd789a2fcd52d2c580b65d35549d88ac".into(),
			}],
			lock_time: 0,
		}
	}

	/// A transaction moving the full value of `prevout` to a fresh output.
	pub fn spend(&self, prevout: OutPoint, value: u64) -> Transaction {
		Transaction {
			version: 1,
			inputs: vec![TransactionInput {
				previous_output: prevout,
				script_sig: vec![0x01, 0x02].into(),
				sequence: 0xffff_ffff,
			}],
			outputs: vec![TransactionOutput {
				value: value,
				script_pubkey: "76a914aab76ba4877d696590d94ea3e02948b55294815188ac".into(),
			}],
			lock_time: 0,
		}
	}

	/// Child of `parent` carrying the given transactions after a salted
	/// coinbase, mined to the network's maximum-target bits.
	pub fn block_with_transactions(&self, parent: &IndexedBlock, transactions: Vec<Transaction>, salt: u32) -> IndexedBlock {
		let mut block_transactions = vec![self.coinbase(salt)];
		block_transactions.extend(transactions);

		let header = BlockHeader {
			version: 1,
			previous_header_hash: parent.hash().clone(),
			merkle_root_hash: merkle_of(&block_transactions),
			time: parent.header.raw.time + 600,
			bits: self.network.max_bits(),
			nonce: 0,
		};

		IndexedBlock::from_raw(Block::new(self.mine(header), block_transactions))
	}

	/// Child of `parent` with only a salted coinbase.
	pub fn block_on(&self, parent: &IndexedBlock, salt: u32) -> IndexedBlock {
		self.block_with_transactions(parent, Vec::new(), salt)
	}

	/// `count` empty blocks on top of the genesis block, salted with their
	/// heights.
	pub fn generate(&self, count: u32) -> Vec<IndexedBlock> {
		self.generate_from(&self.genesis(), count, 0)
	}

	/// `count` empty blocks on top of `parent`.
	pub fn generate_from(&self, parent: &IndexedBlock, count: u32, salt: u32) -> Vec<IndexedBlock> {
		let mut blocks: Vec<IndexedBlock> = Vec::with_capacity(count as usize);
		for index in 0..count {
			let block = {
				let previous = blocks.last().unwrap_or(parent);
				self.block_on(previous, salt.wrapping_add(index))
			};
			blocks.push(block);
		}
		blocks
	}

	fn mine(&self, mut header: BlockHeader) -> BlockHeader {
		let bits = header.bits;
		loop {
			if is_valid_proof_of_work_hash(bits, &header.hash()) {
				return header;
			}
			header.nonce += 1;
		}
	}
}

fn merkle_of(transactions: &[Transaction]) -> H256 {
	let hashes = transactions.iter().map(Transaction::hash).collect::<Vec<_>>();
	::chain::merkle_root(&hashes)
}
