//! Chain organization: given freshly pooled blocks, find the best chain,
//! reorganize onto it and publish what changed.

use std::collections::HashMap;
use std::sync::Arc;
use parking_lot::Mutex;
use chain::IndexedBlock;
use db::BlockChainDatabase;
use network::ConsensusParams;
use primitives::bigint::U256;
use primitives::hash::H256;
use script::ScriptVerifier;
use storage::{BlockHeaderProvider, Store};
use verification::{block_work, BlockAcceptor, BlockConnector, BlockDeployments, BlockVerifier,
	Error, ForkChainView, StopSignal};
use orphan_pool::OrphanPool;

/// What a reorganization changed, published to subscribers.
#[derive(Debug)]
pub struct ReorganizationEvent {
	/// Height of the last block common to the old and the new chain;
	/// `None` when the new chain replaced everything.
	pub fork_height: Option<u32>,
	/// Blocks removed from the main chain, ascending by height.
	pub disconnected: Vec<IndexedBlock>,
	/// Blocks connected to the main chain, ascending by height.
	pub connected: Vec<IndexedBlock>,
}

pub type ReorganizeHandler = Box<Fn(&ReorganizationEvent) + Send>;

/// Runs on the write strand. Walks the orphan pool for chains rooted on
/// the main chain, compares cumulative work and performs the switch.
pub struct Organizer {
	database: Arc<BlockChainDatabase>,
	consensus: ConsensusParams,
	script_verifier: Arc<ScriptVerifier>,
	subscribers: Arc<Mutex<Vec<ReorganizeHandler>>>,
	stop: StopSignal,
	confirmed: HashMap<H256, u32>,
	rejected: HashMap<H256, Error>,
}

impl Organizer {
	pub fn new(
		database: Arc<BlockChainDatabase>,
		consensus: ConsensusParams,
		script_verifier: Arc<ScriptVerifier>,
		subscribers: Arc<Mutex<Vec<ReorganizeHandler>>>,
		stop: StopSignal,
	) -> Self {
		Organizer {
			database: database,
			consensus: consensus,
			script_verifier: script_verifier,
			subscribers: subscribers,
			stop: stop,
			confirmed: HashMap::new(),
			rejected: HashMap::new(),
		}
	}

	/// Forget outcomes recorded by previous organizations.
	pub fn clear_outcomes(&mut self) {
		self.confirmed.clear();
		self.rejected.clear();
	}

	/// Height the block was confirmed at during the last organization.
	pub fn take_confirmed(&mut self, hash: &H256) -> Option<u32> {
		self.confirmed.remove(hash)
	}

	/// Error the block was rejected with during the last organization.
	pub fn take_rejected(&mut self, hash: &H256) -> Option<Error> {
		self.rejected.remove(hash)
	}

	/// Process the pool until no chain can be improved any further.
	pub fn organize(&mut self, orphans: &mut OrphanPool) -> Result<(), Error> {
		loop {
			if self.stop.is_stopped() {
				return Err(Error::ServiceStopped);
			}

			match self.best_candidate(orphans) {
				Some((fork_height, hashes)) => {
					if !self.replace_chain(fork_height, hashes, orphans)? {
						return Ok(());
					}
				},
				None => return Ok(()),
			}
		}
	}

	/// The attachable candidate chain gaining the most work over the main
	/// chain above its fork point. Chains are traced backwards from pool
	/// tips (blocks nothing else waits on).
	fn best_candidate(&self, orphans: &OrphanPool) -> Option<(Option<u32>, Vec<H256>)> {
		let mut best: Option<(U256, Option<u32>, Vec<H256>)> = None;

		for tip in orphans.hashes() {
			if !orphans.children_of(&tip).is_empty() {
				continue;
			}

			let (fork_height, hashes) = match self.trace_chain(orphans, &tip) {
				Some(traced) => traced,
				None => continue,
			};

			let work = hashes.iter().fold(U256::zero(), |work, hash| {
				let block = orphans.block(hash).expect("chain was traced through the pool; qed");
				work + block_work(block.header.raw.bits)
			});

			let threshold = self.main_chain_work_above(fork_height);
			if work <= threshold {
				continue;
			}

			let advantage = work - threshold;
			let better = match best {
				Some((best_advantage, _, _)) => advantage > best_advantage,
				None => true,
			};
			if better {
				best = Some((advantage, fork_height, hashes));
			}
		}

		best.map(|(_, fork_height, hashes)| (fork_height, hashes))
	}

	/// Walk back from `tip` through the pool. The traced chain is a
	/// candidate when its root attaches to the main chain, or is itself a
	/// chain-bottom block.
	fn trace_chain(&self, orphans: &OrphanPool, tip: &H256) -> Option<(Option<u32>, Vec<H256>)> {
		let mut hashes = vec![tip.clone()];
		let mut parent_hash = orphans.block(tip)?.header.raw.previous_header_hash.clone();

		while let Some(parent) = orphans.block(&parent_hash) {
			hashes.push(parent_hash.clone());
			parent_hash = parent.header.raw.previous_header_hash.clone();
		}

		hashes.reverse();

		if let Some(fork_height) = self.database.block_number(&parent_hash) {
			return Some((Some(fork_height), hashes));
		}

		if parent_hash.is_zero() {
			return Some((None, hashes));
		}

		None
	}

	/// Reorganize onto the candidate chain if it carries more work than
	/// the main chain above the fork point. Returns true if the pool
	/// changed.
	fn replace_chain(
		&mut self,
		fork_height: Option<u32>,
		hashes: Vec<H256>,
		orphans: &mut OrphanPool,
	) -> Result<bool, Error> {
		let chain: Vec<IndexedBlock> = hashes.iter()
			.map(|hash| orphans.block(hash).expect("chain was traced through the pool; qed").clone())
			.collect();

		let threshold = self.main_chain_work_above(fork_height);
		let candidate_work = chain.iter()
			.fold(U256::zero(), |work, block| work + block_work(block.header.raw.bits));
		if candidate_work <= threshold {
			return Ok(false);
		}

		// roll back the main chain above the fork point, in reverse order
		let mut disconnected: Vec<IndexedBlock> = Vec::new();
		while self.is_above_fork(fork_height) {
			disconnected.push(self.database.pop_block()?);
		}
		disconnected.reverse();

		let first_height = fork_height.map(|height| height + 1).unwrap_or(0);
		let current_time = ::time::get_time().sec as u32;

		let mut failure: Option<(usize, Error)> = None;
		for (index, block) in chain.iter().enumerate() {
			let height = first_height + index as u32;
			if let Err(err) = self.validate_and_connect(block, index, &chain, fork_height, height, current_time) {
				failure = Some((index, err));
				break;
			}
		}

		match failure {
			None => {
				for (index, hash) in hashes.iter().enumerate() {
					orphans.remove(hash);
					self.confirmed.insert(hash.clone(), first_height + index as u32);
				}

				// the replaced blocks may become the best chain again
				for block in &disconnected {
					orphans.add(block.clone());
				}

				info!(
					target: "chain",
					"reorganized above height {:?}: {} blocks out, {} blocks in",
					fork_height,
					disconnected.len(),
					chain.len(),
				);
				self.notify(fork_height, disconnected, chain);
				Ok(true)
			},
			Some((failed_index, err)) => {
				// abort: disconnect what was just connected and restore
				// the pre-existing main chain
				for _ in 0..failed_index {
					self.database.pop_block()?;
				}
				for (offset, block) in disconnected.iter().enumerate() {
					self.database.push_block(block, first_height + offset as u32)?;
				}

				if err == Error::ServiceStopped {
					return Err(err);
				}

				warn!(
					target: "chain",
					"rejecting block {}: {:?}",
					hashes[failed_index].to_reversed_str(),
					err,
				);

				// the failed block and everything pooled on top of it are
				// dropped; the valid prefix stays pooled and is retried
				for hash in &hashes[failed_index..] {
					orphans.remove(hash);
					self.rejected.insert(hash.clone(), err.clone());
				}

				Ok(true)
			},
		}
	}

	fn validate_and_connect(
		&self,
		block: &IndexedBlock,
		orphan_index: usize,
		chain: &[IndexedBlock],
		fork_height: Option<u32>,
		height: u32,
		current_time: u32,
	) -> Result<(), Error> {
		BlockVerifier::new(block, &self.consensus, current_time).check(&self.stop)?;

		let view = ForkChainView::new(&*self.database, fork_height, chain, orphan_index);
		let deployments = BlockDeployments::new(&view, height, block.header.raw.version, &self.consensus);

		BlockAcceptor::new(&view, &self.consensus, block, height, &deployments).check(&self.stop)?;
		BlockConnector::new(&view, &self.consensus, block, height, &deployments, &*self.script_verifier)
			.check(&self.stop)?;

		self.database.push_block(block, height)?;
		Ok(())
	}

	fn is_above_fork(&self, fork_height: Option<u32>) -> bool {
		match (self.database.best_block(), fork_height) {
			(Some(best), Some(fork_height)) => best.number > fork_height,
			(Some(_), None) => true,
			(None, _) => false,
		}
	}

	fn main_chain_work_above(&self, fork_height: Option<u32>) -> U256 {
		let best = match self.database.best_block() {
			Some(best) => best,
			None => return U256::zero(),
		};

		let start = fork_height.map(|height| height + 1).unwrap_or(0);
		let mut work = U256::zero();
		for height in start..best.number + 1 {
			let header = self.database.block_header(height.into())
				.expect("main chain heights up to best are stored; qed");
			work = work + block_work(header.bits);
		}

		work
	}

	fn notify(&self, fork_height: Option<u32>, disconnected: Vec<IndexedBlock>, connected: Vec<IndexedBlock>) {
		let event = ReorganizationEvent {
			fork_height: fork_height,
			disconnected: disconnected,
			connected: connected,
		};

		for subscriber in self.subscribers.lock().iter() {
			subscriber(&event);
		}
	}
}
