//! Block, transaction and sibling indexes aggregated behind one write
//! barrier, together with the memory-mapped unspent-output index.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use byteorder::{ByteOrder, LittleEndian};
use parking_lot::RwLock;
use chain::{Block, BlockHeader, IndexedBlock, OutPoint, Transaction};
use crypto::sha256;
use primitives::hash::{H160, H256};
use script::Script;
use storage::{
	BestBlock, BlockHeaderProvider, BlockProvider, BlockRef, Error as StorageError,
	HistoryKind, HistoryProvider, HistoryRow, InputPoint, StealthPrefix, StealthProvider,
	StealthRow, Store, TransactionIndex, TransactionProvider, UtxoProvider, UtxoStatInfo,
};
use utxo::{UtxoDatabase, UTXO_NUMBER_BUCKETS};
use error::Error;

const UTXO_FILE: &'static str = "utxo";

#[derive(Default)]
struct InnerDatabase {
	block_hash: HashMap<u32, H256>,
	block_header: HashMap<H256, BlockHeader>,
	block_number: HashMap<H256, u32>,
	block_transactions: HashMap<H256, Vec<H256>>,
	transaction: HashMap<H256, Transaction>,
	transaction_index: HashMap<H256, TransactionIndex>,
	history: HashMap<H160, Vec<HistoryRow>>,
	stealth: Vec<StealthRow>,
	best_block: Option<BestBlock>,
}

/// The database of connected blocks.
///
/// Mutations happen only through `push_block` and `pop_block`, invoked by
/// the write strand; readers are serialized against them by the facade's
/// seqlock, the inner locks only guard memory safety of individual calls.
pub struct BlockChainDatabase {
	data: RwLock<InnerDatabase>,
	utxo: RwLock<UtxoDatabase>,
}

impl BlockChainDatabase {
	/// Open the database inside the given directory.
	pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
		Self::open_with_utxo_buckets(path, UTXO_NUMBER_BUCKETS)
	}

	/// Open with an explicit UTXO bucket count (tests use small tables).
	pub fn open_with_utxo_buckets<P: AsRef<Path>>(path: P, buckets: u64) -> Result<Self, Error> {
		fs::create_dir_all(path.as_ref())?;
		let utxo = UtxoDatabase::with_buckets(path.as_ref().join(UTXO_FILE), buckets)?;

		Ok(BlockChainDatabase {
			data: RwLock::new(InnerDatabase::default()),
			utxo: RwLock::new(utxo),
		})
	}

	/// Append the block at the given height, updating every sibling index
	/// and the unspent-output index.
	pub fn push_block(&self, block: &IndexedBlock, height: u32) -> Result<(), StorageError> {
		let mut data = self.data.write();
		let mut utxo = self.utxo.write();

		match data.best_block {
			Some(ref best) if best.number + 1 != height || best.hash != block.header.raw.previous_header_hash =>
				return Err(StorageError::CannotCanonize),
			None if height != 0 => return Err(StorageError::CannotCanonize),
			_ => (),
		}

		let block_hash = block.hash().clone();
		let tx_hashes: HashSet<H256> = block.transactions.iter().map(|tx| tx.hash.clone()).collect();
		let spent_in_block: HashSet<OutPoint> = block.transactions.iter()
			.filter(|tx| !tx.raw.is_coinbase())
			.flat_map(|tx| tx.raw.inputs.iter().map(|input| input.previous_output.clone()))
			.collect();

		// spends leave the set before new outputs enter it, so an output
		// produced and consumed by this very block never becomes visible
		for tx in &block.transactions {
			if tx.raw.is_coinbase() {
				continue;
			}

			for (input_index, input) in tx.raw.inputs.iter().enumerate() {
				let prevout = &input.previous_output;
				if tx_hashes.contains(&prevout.hash) {
					continue;
				}

				utxo.remove(prevout);

				if let Some(address) = spent_output_address(&*data, prevout) {
					data.history.entry(address).or_insert_with(Vec::new).push(HistoryRow {
						kind: HistoryKind::Spend,
						point: prevout.clone(),
						spender: Some(InputPoint {
							hash: tx.hash.clone(),
							index: input_index as u32,
						}),
						height: height,
						value: 0,
					});
				}
			}
		}

		for tx in &block.transactions {
			for (output_index, output) in tx.raw.outputs.iter().enumerate() {
				let script = Script::new(output.script_pubkey.clone());
				if script.is_null_data_script() {
					data.stealth.push(StealthRow {
						prefix: stealth_prefix(&script),
						tx_hash: tx.hash.clone(),
						height: height,
					});
					continue;
				}

				let outpoint = OutPoint {
					hash: tx.hash.clone(),
					index: output_index as u32,
				};
				if spent_in_block.contains(&outpoint) {
					continue;
				}

				utxo.store(&outpoint, &InputPoint::null()).map_err(StorageError::from)?;

				if let Some(script_address) = script.extract_address() {
					data.history.entry(script_address.hash().clone()).or_insert_with(Vec::new).push(HistoryRow {
						kind: HistoryKind::Output,
						point: outpoint,
						spender: None,
						height: height,
						value: output.value,
					});
				}
			}
		}

		for (tx_index, tx) in block.transactions.iter().enumerate() {
			data.transaction.insert(tx.hash.clone(), tx.raw.clone());
			data.transaction_index.insert(tx.hash.clone(), TransactionIndex {
				height: height,
				position: tx_index as u32,
			});
		}

		data.block_hash.insert(height, block_hash.clone());
		data.block_number.insert(block_hash.clone(), height);
		data.block_header.insert(block_hash.clone(), block.header.raw.clone());
		data.block_transactions.insert(block_hash.clone(), block.transactions.iter().map(|tx| tx.hash.clone()).collect());
		data.best_block = Some(BestBlock {
			number: height,
			hash: block_hash.clone(),
		});

		utxo.sync().map_err(StorageError::from)?;
		trace!(target: "db", "canonized block {} at height {}", block_hash.to_reversed_str(), height);
		Ok(())
	}

	/// Remove the top block of the chain, restoring the outpoints it spent
	/// and dropping the outputs it produced. Returns the removed block.
	pub fn pop_block(&self) -> Result<IndexedBlock, StorageError> {
		let mut data = self.data.write();
		let mut utxo = self.utxo.write();

		let best = match data.best_block.take() {
			Some(best) => best,
			None => return Err(StorageError::CannotDecanonize),
		};

		let header = data.block_header.remove(&best.hash).ok_or(StorageError::InconsistentData)?;
		let tx_hashes = data.block_transactions.remove(&best.hash).ok_or(StorageError::InconsistentData)?;
		let transactions = tx_hashes.iter()
			.map(|tx_hash| data.transaction.get(tx_hash).cloned().ok_or(StorageError::InconsistentData))
			.collect::<Result<Vec<Transaction>, _>>()?;

		let tx_hash_set: HashSet<H256> = tx_hashes.iter().cloned().collect();
		let spent_in_block: HashSet<OutPoint> = transactions.iter()
			.filter(|tx| !tx.is_coinbase())
			.flat_map(|tx| tx.inputs.iter().map(|input| input.previous_output.clone()))
			.collect();

		// drop produced outputs first, then restore the spent outpoints
		for (tx_hash, tx) in tx_hashes.iter().zip(&transactions) {
			for (output_index, output) in tx.outputs.iter().enumerate() {
				let script = Script::new(output.script_pubkey.clone());
				if script.is_null_data_script() {
					continue;
				}

				let outpoint = OutPoint {
					hash: tx_hash.clone(),
					index: output_index as u32,
				};
				if spent_in_block.contains(&outpoint) {
					continue;
				}

				utxo.remove(&outpoint);
			}
		}

		for (tx_hash, tx) in tx_hashes.iter().zip(&transactions) {
			if tx.is_coinbase() {
				continue;
			}

			for (input_index, input) in tx.inputs.iter().enumerate() {
				let prevout = &input.previous_output;
				if tx_hash_set.contains(&prevout.hash) {
					continue;
				}

				// the disconnected spender stays on record
				utxo.store(prevout, &InputPoint {
					hash: tx_hash.clone(),
					index: input_index as u32,
				}).map_err(StorageError::from)?;
			}
		}

		for tx_hash in &tx_hashes {
			data.transaction.remove(tx_hash);
			data.transaction_index.remove(tx_hash);
		}

		let removed_height = best.number;
		for rows in data.history.values_mut() {
			rows.retain(|row| row.height != removed_height);
		}
		data.stealth.retain(|row| row.height != removed_height);

		data.block_hash.remove(&best.number);
		data.block_number.remove(&best.hash);
		data.best_block = match best.number.checked_sub(1) {
			Some(previous_number) => {
				let previous_hash = data.block_hash.get(&previous_number).cloned()
					.ok_or(StorageError::InconsistentData)?;
				Some(BestBlock {
					number: previous_number,
					hash: previous_hash,
				})
			},
			None => None,
		};

		utxo.sync().map_err(StorageError::from)?;
		trace!(target: "db", "decanonized block {} at height {}", best.hash.to_reversed_str(), removed_height);

		Ok(IndexedBlock::from_raw(Block::new(header, transactions)))
	}

	/// Flush the unspent-output index.
	pub fn sync(&self) -> Result<(), Error> {
		self.utxo.write().sync()
	}
}

/// Address of the output an input spends, looked up in the tx index.
fn spent_output_address(data: &InnerDatabase, prevout: &OutPoint) -> Option<H160> {
	data.transaction.get(&prevout.hash)
		.and_then(|tx| tx.outputs.get(prevout.index as usize))
		.and_then(|output| Script::new(output.script_pubkey.clone()).extract_address())
		.map(|address| address.hash().clone())
}

/// Prefix word of a data-carrier output, used by the stealth index.
fn stealth_prefix(script: &Script) -> u32 {
	let digest = sha256(script);
	LittleEndian::read_u32(&digest[..4])
}

impl BlockHeaderProvider for BlockChainDatabase {
	fn block_header(&self, block_ref: BlockRef) -> Option<BlockHeader> {
		let data = self.data.read();
		let hash = match block_ref {
			BlockRef::Hash(hash) => hash,
			BlockRef::Number(number) => match data.block_hash.get(&number) {
				Some(hash) => hash.clone(),
				None => return None,
			},
		};
		data.block_header.get(&hash).cloned()
	}

	fn block_number(&self, hash: &H256) -> Option<u32> {
		self.data.read().block_number.get(hash).cloned()
	}

	fn block_hash(&self, number: u32) -> Option<H256> {
		self.data.read().block_hash.get(&number).cloned()
	}
}

impl BlockProvider for BlockChainDatabase {
	fn block(&self, block_ref: BlockRef) -> Option<Block> {
		let data = self.data.read();
		let hash = match block_ref {
			BlockRef::Hash(hash) => hash,
			BlockRef::Number(number) => match data.block_hash.get(&number) {
				Some(hash) => hash.clone(),
				None => return None,
			},
		};

		let header = match data.block_header.get(&hash) {
			Some(header) => header.clone(),
			None => return None,
		};
		let transactions = data.block_transactions.get(&hash)?
			.iter()
			.map(|tx_hash| data.transaction.get(tx_hash).cloned())
			.collect::<Option<Vec<Transaction>>>()?;

		Some(Block::new(header, transactions))
	}

	fn block_transaction_hashes(&self, block_ref: BlockRef) -> Vec<H256> {
		let data = self.data.read();
		let hash = match block_ref {
			BlockRef::Hash(hash) => hash,
			BlockRef::Number(number) => match data.block_hash.get(&number) {
				Some(hash) => hash.clone(),
				None => return Vec::new(),
			},
		};
		data.block_transactions.get(&hash).cloned().unwrap_or_default()
	}
}

impl TransactionProvider for BlockChainDatabase {
	fn transaction(&self, hash: &H256) -> Option<Transaction> {
		self.data.read().transaction.get(hash).cloned()
	}

	fn transaction_index(&self, hash: &H256) -> Option<TransactionIndex> {
		self.data.read().transaction_index.get(hash).cloned()
	}
}

impl UtxoProvider for BlockChainDatabase {
	fn utxo(&self, outpoint: &OutPoint) -> Option<InputPoint> {
		self.utxo.read().get(outpoint)
	}

	fn utxo_statinfo(&self) -> UtxoStatInfo {
		self.utxo.read().statinfo()
	}
}

impl HistoryProvider for BlockChainDatabase {
	fn history(&self, address_hash: &H160, limit: u64, from_height: u32) -> Vec<HistoryRow> {
		let data = self.data.read();
		let rows = data.history.get(address_hash)
			.map(|rows| rows.iter()
				.filter(|row| row.height >= from_height)
				.cloned()
				.collect::<Vec<_>>())
			.unwrap_or_default();

		match limit {
			0 => rows,
			limit => rows.into_iter().take(limit as usize).collect(),
		}
	}
}

impl StealthProvider for BlockChainDatabase {
	fn stealth(&self, prefix: StealthPrefix, from_height: u32) -> Vec<StealthRow> {
		self.data.read().stealth.iter()
			.filter(|row| row.height >= from_height && prefix.matches(row.prefix))
			.cloned()
			.collect()
	}
}

impl Store for BlockChainDatabase {
	fn best_block(&self) -> Option<BestBlock> {
		self.data.read().best_block.clone()
	}
}
