//! Context-free block checks, runnable before the block's place in the
//! chain is known.

use std::collections::HashSet;
use rayon::prelude::{IntoParallelRefIterator, IndexedParallelIterator, ParallelIterator};
use chain::IndexedBlock;
use network::ConsensusParams;
use primitives::compact::Compact;
use constants::{BLOCK_MAX_FUTURE, MAX_BLOCK_SIGOPS, MAX_BLOCK_SIZE};
use error::Error;
use sigops::transaction_sigops;
use stop::StopSignal;
use verify_transaction::TransactionVerifier;
use work::is_valid_proof_of_work;

/// Context-free verification of a block.
pub struct BlockVerifier<'a> {
	pub size: BlockSize<'a>,
	pub proof_of_work: BlockProofOfWork<'a>,
	pub timestamp: BlockTimestamp<'a>,
	pub coinbase: BlockCoinbase<'a>,
	pub transactions: Vec<TransactionVerifier<'a>>,
	pub distinct_transactions: BlockDistinctTransactions<'a>,
	pub sigops: BlockSigops<'a>,
	pub merkle_root: BlockMerkleRoot<'a>,
}

impl<'a> BlockVerifier<'a> {
	pub fn new(block: &'a IndexedBlock, consensus: &'a ConsensusParams, current_time: u32) -> Self {
		trace!(target: "verification", "Block pre-verification {}", block.hash().to_reversed_str());
		BlockVerifier {
			size: BlockSize::new(block),
			proof_of_work: BlockProofOfWork::new(block, consensus),
			timestamp: BlockTimestamp::new(block, current_time),
			coinbase: BlockCoinbase::new(block),
			transactions: block.transactions.iter().map(TransactionVerifier::new).collect(),
			distinct_transactions: BlockDistinctTransactions::new(block),
			sigops: BlockSigops::new(block),
			merkle_root: BlockMerkleRoot::new(block),
		}
	}

	/// Run every check, polling the stop signal between them.
	pub fn check(&self, stop: &StopSignal) -> Result<(), Error> {
		self.size.check()?;
		self.proof_of_work.check()?;
		stop.check()?;
		self.timestamp.check()?;
		stop.check()?;
		self.coinbase.check()?;
		stop.check()?;
		self.check_transactions()?;
		stop.check()?;
		self.distinct_transactions.check()?;
		stop.check()?;
		self.sigops.check()?;
		stop.check()?;
		self.merkle_root.check()?;
		Ok(())
	}

	fn check_transactions(&self) -> Result<(), Error> {
		self.transactions.par_iter()
			.enumerate()
			.fold(|| Ok(()), |result, (index, tx)| result.and_then(|_| tx.check().map_err(|err| Error::Transaction(index, err))))
			.reduce(|| Ok(()), |acc, check| acc.and(check))
	}
}

pub struct BlockSize<'a> {
	block: &'a IndexedBlock,
}

impl<'a> BlockSize<'a> {
	fn new(block: &'a IndexedBlock) -> Self {
		BlockSize {
			block: block,
		}
	}

	fn check(&self) -> Result<(), Error> {
		let transactions = &self.block.transactions;
		if transactions.is_empty() || transactions.len() > MAX_BLOCK_SIZE || self.block.size() > MAX_BLOCK_SIZE {
			Err(Error::SizeLimits)
		} else {
			Ok(())
		}
	}
}

pub struct BlockProofOfWork<'a> {
	block: &'a IndexedBlock,
	max_work_bits: Compact,
}

impl<'a> BlockProofOfWork<'a> {
	fn new(block: &'a IndexedBlock, consensus: &ConsensusParams) -> Self {
		BlockProofOfWork {
			block: block,
			max_work_bits: consensus.network.max_bits(),
		}
	}

	fn check(&self) -> Result<(), Error> {
		if is_valid_proof_of_work(self.max_work_bits, self.block.header.raw.bits, &self.block.header.hash) {
			Ok(())
		} else {
			Err(Error::Pow)
		}
	}
}

pub struct BlockTimestamp<'a> {
	block: &'a IndexedBlock,
	current_time: u32,
}

impl<'a> BlockTimestamp<'a> {
	fn new(block: &'a IndexedBlock, current_time: u32) -> Self {
		BlockTimestamp {
			block: block,
			current_time: current_time,
		}
	}

	fn check(&self) -> Result<(), Error> {
		if self.block.header.raw.time > self.current_time + BLOCK_MAX_FUTURE {
			Err(Error::FuturisticTimestamp)
		} else {
			Ok(())
		}
	}
}

pub struct BlockCoinbase<'a> {
	block: &'a IndexedBlock,
}

impl<'a> BlockCoinbase<'a> {
	fn new(block: &'a IndexedBlock) -> Self {
		BlockCoinbase {
			block: block,
		}
	}

	fn check(&self) -> Result<(), Error> {
		let mut transactions = self.block.transactions.iter();
		match transactions.next() {
			Some(tx) if tx.raw.is_coinbase() => (),
			_ => return Err(Error::FirstNotCoinbase),
		}

		if transactions.any(|tx| tx.raw.is_coinbase()) {
			Err(Error::ExtraCoinbases)
		} else {
			Ok(())
		}
	}
}

pub struct BlockDistinctTransactions<'a> {
	block: &'a IndexedBlock,
}

impl<'a> BlockDistinctTransactions<'a> {
	fn new(block: &'a IndexedBlock) -> Self {
		BlockDistinctTransactions {
			block: block,
		}
	}

	fn check(&self) -> Result<(), Error> {
		let mut hashes = HashSet::with_capacity(self.block.transactions.len());
		for tx in &self.block.transactions {
			if !hashes.insert(tx.hash.clone()) {
				return Err(Error::Duplicate);
			}
		}

		Ok(())
	}
}

pub struct BlockSigops<'a> {
	block: &'a IndexedBlock,
}

impl<'a> BlockSigops<'a> {
	fn new(block: &'a IndexedBlock) -> Self {
		BlockSigops {
			block: block,
		}
	}

	fn check(&self) -> Result<(), Error> {
		let sigops: usize = self.block.transactions.iter()
			.map(|tx| transaction_sigops(&tx.raw))
			.sum();

		if sigops > MAX_BLOCK_SIGOPS {
			Err(Error::TooManySigops)
		} else {
			Ok(())
		}
	}
}

pub struct BlockMerkleRoot<'a> {
	block: &'a IndexedBlock,
}

impl<'a> BlockMerkleRoot<'a> {
	fn new(block: &'a IndexedBlock) -> Self {
		BlockMerkleRoot {
			block: block,
		}
	}

	fn check(&self) -> Result<(), Error> {
		if self.block.merkle_root() == self.block.header.raw.merkle_root_hash {
			Ok(())
		} else {
			Err(Error::MerkleMismatch)
		}
	}
}

#[cfg(test)]
mod tests {
	use chain::IndexedBlock;
	use network::{ConsensusParams, Network};
	use error::Error;
	use stop::StopSignal;
	use super::BlockVerifier;

	#[test]
	fn test_genesis_passes_context_free_checks() {
		let genesis: IndexedBlock = Network::Mainnet.genesis_block().into();
		let consensus = ConsensusParams::new(Network::Mainnet);
		let verifier = BlockVerifier::new(&genesis, &consensus, genesis.header.raw.time);
		assert_eq!(verifier.check(&StopSignal::new()), Ok(()));
	}

	#[test]
	fn test_stopped_block_verification() {
		let genesis: IndexedBlock = Network::Mainnet.genesis_block().into();
		let consensus = ConsensusParams::new(Network::Mainnet);
		let verifier = BlockVerifier::new(&genesis, &consensus, genesis.header.raw.time);

		let stop = StopSignal::new();
		stop.stop();
		assert_eq!(verifier.check(&stop), Err(Error::ServiceStopped));
	}

	#[test]
	fn test_empty_block_rejected() {
		let block = IndexedBlock::new(Network::Mainnet.genesis_block().block_header.into(), Vec::new());
		let consensus = ConsensusParams::new(Network::Mainnet);
		let verifier = BlockVerifier::new(&block, &consensus, block.header.raw.time);
		assert_eq!(verifier.check(&StopSignal::new()), Err(Error::SizeLimits));
	}
}
